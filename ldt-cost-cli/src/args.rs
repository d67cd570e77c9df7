use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use directories::ProjectDirs;
use lazy_static::lazy_static;

lazy_static! {
    pub(crate) static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub(crate) static ref CONFIG_FOLDER: Option<PathBuf> =
        std::env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub(crate) static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
}

/// Estimate the costs of low-degree tests compiled into succinct arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(author, version = version(), about)]
pub(crate) struct LdtCostArgs {
    /// Configuration file, applied on top of the user configuration
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub parameters: ParameterArgs,

    #[command(flatten)]
    pub schedules: ScheduleArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub(crate) enum Command {
    /// Simulate one low-degree test and print its per-round costs
    Simulate {
        #[arg(value_enum)]
        low_degree_test: LowDegreeTestKind,

        /// Prefix the low-degree test with an Aurora-style commitment round
        #[arg(long)]
        aurora: bool,

        /// Print the cost report as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON cost report to a file instead of stdout
        #[arg(long, value_name = "PATH", requires = "json")]
        out: Option<PathBuf>,
    },

    /// Simulate FRI and STIR on the same parameters and compare their totals
    Compare,

    /// Compare Aurora-FRI with Aurora-STIR for a grid of rates and degrees
    Table {
        /// The (log₂ of the) inverse rates to sweep, comma separated
        #[arg(long, value_name = "BITS", value_delimiter = ',')]
        rates: Option<Vec<usize>>,

        /// The (log₂ of the) degrees to sweep, comma separated
        #[arg(long, value_name = "BITS", value_delimiter = ',')]
        degrees: Option<Vec<usize>>,
    },

    /// Print the round-by-round soundness errors of STIR
    Soundness(SoundnessArgs),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, ValueEnum)]
pub(crate) enum LowDegreeTestKind {
    Fri,
    Stir,
}

/// Overrides for the experiment's parameters.
#[derive(Debug, Default, Clone, PartialEq, Args)]
pub(crate) struct ParameterArgs {
    /// The targeted security level in bits
    #[arg(long, value_name = "BITS")]
    pub security_level: Option<usize>,

    /// Bits of security achieved by proof-of-work
    #[arg(long, value_name = "BITS")]
    pub pow_bits: Option<usize>,

    /// Size of one field element in bits
    #[arg(long, value_name = "BITS")]
    pub field_size_bits: Option<usize>,

    /// The (log₂ of the) degree of the initial polynomial
    #[arg(long, value_name = "BITS")]
    pub log2_degree: Option<usize>,

    /// The (log₂ of the) inverse rate of the initial polynomial
    #[arg(long, value_name = "BITS")]
    pub log2_inverse_rate: Option<usize>,

    /// Output size of the hash function in bits
    #[arg(long, value_name = "BITS")]
    pub hash_size_bits: Option<usize>,

    /// Only rely on proven proximity gaps
    #[arg(long)]
    pub proven: bool,
}

/// Overrides for the round schedules of the low-degree tests.
#[derive(Debug, Default, Clone, PartialEq, Args)]
pub(crate) struct ScheduleArgs {
    /// Folding factors of FRI, comma separated; the last one is repeated
    #[arg(long, value_name = "FACTORS", value_delimiter = ',')]
    pub fri_folding: Option<Vec<usize>>,

    /// Folding factors of STIR, comma separated; the last one is repeated
    #[arg(long, value_name = "FACTORS", value_delimiter = ',')]
    pub stir_folding: Option<Vec<usize>>,

    /// Domain-shrinkage ratios of STIR, comma separated; the last one is
    /// repeated
    #[arg(long, value_name = "RATIOS", value_delimiter = ',')]
    pub domain_shrinkage: Option<Vec<f64>>,

    /// Polynomials of at most this degree are sent in the clear
    #[arg(long, value_name = "DEGREE")]
    pub stopping_degree: Option<usize>,
}

/// Overrides for the soundness trace of STIR.
#[derive(Debug, Default, Clone, PartialEq, Args)]
pub(crate) struct SoundnessArgs {
    /// Targeted security in bits, without proof-of-work
    #[arg(long, value_name = "BITS")]
    pub security_level: Option<usize>,

    #[arg(long, value_name = "BITS")]
    pub log2_degree: Option<usize>,

    #[arg(long, value_name = "BITS")]
    pub log2_field_size: Option<usize>,

    #[arg(long, value_name = "BITS")]
    pub log2_inverse_rate: Option<usize>,

    #[arg(long, value_name = "FACTOR")]
    pub folding_factor: Option<usize>,

    /// Out-of-domain samples per round
    #[arg(long, value_name = "COUNT")]
    pub ood_samples: Option<usize>,

    #[arg(long, value_name = "DEGREE")]
    pub stopping_degree: Option<usize>,
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "ldt-cost", env!("CARGO_PKG_NAME"))
}

pub(crate) fn get_config_dir() -> PathBuf {
    CONFIG_FOLDER
        .clone()
        .or_else(|| project_directory().map(|dirs| dirs.config_local_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

pub(crate) fn version() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let author = clap::crate_authors!();
    let config_dir_path = get_config_dir().display().to_string();

    format!(
        "{version}\n\n\
        Authors: {author}\n\n\
        Config directory: {config_dir_path}"
    )
}
