mod config;
mod observability;
mod sample;

use clap::{Args, Parser};
use config::{Config, ConfigError};
use observability::ObservabilityError;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(about = "HTTP demo service that answers with weighted random status codes")]
enum CliCommand {
    /// Serve the demo API and the admin endpoints
    DemoApi(RunArgs),
    /// Draw status codes locally and print how they are distributed
    Sample(SampleArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    config_file_path: PathBuf,
}

#[derive(Args)]
struct SampleArgs {
    /// Number of codes to draw
    #[arg(long, default_value_t = 10_000)]
    count: u64,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Take the distribution from this config file instead of the default
    #[arg(long)]
    config_file_path: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("config file has no `{0}` section")]
    MissingSection(&'static str),
    #[error(transparent)]
    Observability(#[from] ObservabilityError),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    DemoApi(#[from] demo_api::ApiError),
    #[error(transparent)]
    Sample(#[from] sample::SampleError),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::DemoApi(args) => run_demo_api(args),
        CliCommand::Sample(args) => sample::run(args.count, args.seed, args.config_file_path)
            .map_err(CliError::from),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run_demo_api(args: RunArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config_file_path)?;
    let demo_api_config = config.demo_api.ok_or(CliError::MissingSection("demo_api"))?;

    let _sentry_guard = observability::init_logging(&config.common.logging)?;
    if let Some(metrics_config) = &config.common.metrics {
        observability::init_metrics(metrics_config, demo_api::metrics_defs::ALL_METRICS)?;
    }

    tracing::info!(config = %args.config_file_path.display(), "Starting demo API");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    rt.block_on(demo_api::run(demo_api_config))?;

    Ok(())
}
