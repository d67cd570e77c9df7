use std::path::Path;

use color_eyre::eyre::Result;
use config::ConfigError;
use config::FileFormat;
use ldt_cost::prelude::*;
use ldt_cost::soundness::StirSoundnessConfig;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::args::ParameterArgs;
use crate::args::ScheduleArgs;
use crate::args::SoundnessArgs;
use crate::args::get_config_dir;

const DEFAULT_CONFIG: &str = include_str!("../.config/default_config.json");

const CONFIG_FILES: [(&str, FileFormat); 3] = [
    ("config.json", FileFormat::Json),
    ("config.yaml", FileFormat::Yaml),
    ("config.toml", FileFormat::Toml),
];

/// Everything an invocation of the command line tool might need.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ExperimentConfig {
    pub parameters: LdtParameters,
    pub fri: FriConfig,
    pub stir: StirConfig,
    pub aurora: AuroraLayout,
    pub table: TableConfig,
    pub soundness: StirSoundnessConfig,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FriConfig {
    pub folding_factors: Vec<usize>,
    pub stopping_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StirConfig {
    pub folding_factors: Vec<usize>,
    pub domain_shrinkage: Vec<f64>,
    pub stopping_degree: usize,
}

/// The grid of the Aurora-FRI vs. Aurora-STIR comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TableConfig {
    pub log2_inverse_rates: Vec<usize>,
    pub log2_degrees: Vec<usize>,
    pub fri_folding_factors: Vec<usize>,
    pub stir_folding_factors: Vec<usize>,
    pub domain_shrinkage: Vec<f64>,
    pub stopping_degree: usize,
}

impl Default for FriConfig {
    fn default() -> Self {
        Self {
            folding_factors: vec![8],
            stopping_degree: 1 << 6,
        }
    }
}

impl Default for StirConfig {
    fn default() -> Self {
        Self {
            folding_factors: vec![16],
            domain_shrinkage: vec![2.0],
            stopping_degree: 1 << 6,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            log2_inverse_rates: vec![1, 2, 3, 4],
            log2_degrees: vec![18, 20, 22, 24, 26, 28, 30],
            fri_folding_factors: vec![2, 8],
            stir_folding_factors: vec![2, 16],
            domain_shrinkage: vec![2.0],
            stopping_degree: 1 << 6,
        }
    }
}

impl ExperimentConfig {
    /// The embedded defaults, overwritten by any configuration file in the
    /// user's configuration directory, overwritten by the explicitly given
    /// configuration file, if any.
    pub fn new(explicit_config: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(&get_config_dir(), explicit_config)
    }

    pub(crate) fn from_sources(
        config_dir: &Path,
        explicit_config: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config_builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Json));

        for (file, format) in CONFIG_FILES {
            let config_path = config_dir.join(file);
            if config_path.exists() {
                info!("Adding configuration file: {}", config_path.display());
                let config_file = config::File::from(config_path).format(format);
                config_builder = config_builder.add_source(config_file);
            } else {
                debug!("Configuration file not found: {}", config_path.display());
            }
        }

        if let Some(config_path) = explicit_config {
            info!("Adding configuration file: {}", config_path.display());
            config_builder = config_builder.add_source(config::File::from(config_path));
        }

        config_builder.build()?.try_deserialize()
    }

    pub fn override_parameters(&mut self, args: &ParameterArgs) {
        let params = &mut self.parameters;
        override_with(&mut params.security_level, args.security_level);
        override_with(&mut params.pow_bits, args.pow_bits);
        override_with(&mut params.field_size_bits, args.field_size_bits);
        override_with(&mut params.log2_degree, args.log2_degree);
        override_with(&mut params.log2_inverse_rate, args.log2_inverse_rate);
        override_with(&mut params.rom.hash_size_bits, args.hash_size_bits);
        if args.proven {
            params.soundness = SoundnessRegime::Proven;
        }
    }

    pub fn override_schedules(&mut self, args: &ScheduleArgs) {
        override_with(&mut self.fri.folding_factors, args.fri_folding.clone());
        override_with(&mut self.stir.folding_factors, args.stir_folding.clone());
        override_with(&mut self.stir.domain_shrinkage, args.domain_shrinkage.clone());
        override_with(&mut self.fri.stopping_degree, args.stopping_degree);
        override_with(&mut self.stir.stopping_degree, args.stopping_degree);
        override_with(&mut self.table.stopping_degree, args.stopping_degree);
    }

    pub fn override_soundness(&mut self, args: &SoundnessArgs) {
        let soundness = &mut self.soundness;
        override_with(&mut soundness.security_level, args.security_level);
        override_with(&mut soundness.log2_degree, args.log2_degree);
        override_with(&mut soundness.log2_field_size, args.log2_field_size);
        override_with(&mut soundness.log2_inverse_rate, args.log2_inverse_rate);
        override_with(&mut soundness.folding_factor, args.folding_factor);
        override_with(&mut soundness.num_ood_samples, args.ood_samples);
        override_with(&mut soundness.stopping_degree, args.stopping_degree);
    }

    pub fn fri(&self) -> Result<Fri, LdtParameterError> {
        Fri::new(self.fri.folding_factors.clone(), self.fri.stopping_degree)
    }

    pub fn stir(&self) -> Result<Stir, LdtParameterError> {
        let StirConfig {
            folding_factors,
            domain_shrinkage,
            stopping_degree,
        } = self.stir.clone();
        Stir::new(folding_factors, domain_shrinkage, stopping_degree)
    }
}

fn override_with<T>(value: &mut T, replacement: Option<T>) {
    if let Some(replacement) = replacement {
        *value = replacement;
    }
}
