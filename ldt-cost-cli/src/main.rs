//! `ldt-cost` estimates what low-degree tests like FRI and STIR cost once
//! compiled into succinct arguments: argument size, proof length, and the
//! number of verifier queries.

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::args::Command;
use crate::args::LOG_ENV;
use crate::args::LdtCostArgs;
use crate::config::ExperimentConfig;

pub(crate) mod args;
pub(crate) mod commands;
pub(crate) mod config;

fn main() -> Result<()> {
    initialize_panic_handler()?;
    initialize_logging();

    let args = LdtCostArgs::parse();
    let mut config = ExperimentConfig::new(args.config.as_deref())?;
    config.override_parameters(&args.parameters);
    config.override_schedules(&args.schedules);

    match args.command {
        Command::Simulate {
            low_degree_test,
            aurora,
            json,
            out,
        } => commands::simulate(&config, low_degree_test, aurora, json, out.as_deref()),
        Command::Compare => commands::compare(&config),
        Command::Table { rates, degrees } => {
            commands::table(&config, rates.as_deref(), degrees.as_deref())
        }
        Command::Soundness(soundness_args) => {
            config.override_soundness(&soundness_args);
            commands::soundness(&config)
        }
    }
}

fn initialize_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV.as_str()))
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));
    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .with(ErrorLayer::default())
        .init();
}

fn initialize_panic_handler() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug. Consider reporting it along with the invoked command.")
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;
    panic_hook.install();
    Ok(())
}
