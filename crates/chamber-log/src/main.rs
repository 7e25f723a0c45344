//! Polls a thermal chamber on a timed loop and writes the readings to CSV.

mod config;
mod factory;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "chamber.toml")]
    config: PathBuf,

    /// Output CSV path; overrides the config file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Seconds between samples (1-60); overrides the config file.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Hours to run (0.1-24); overrides the config file.
    #[arg(long)]
    run_hours: Option<f64>,
}

// The transports block on one request at a time, so a current-thread
// runtime is all the concurrency this program has.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let app_config = AppConfig::load(&args.config)?;
    let sampler_config = app_config.sampler_config(args.interval_secs, args.run_hours);
    let output = args.output.unwrap_or(app_config.output);

    // A connection failure is fatal here, before any samples are taken.
    let chamber = factory::connect(&app_config.chamber).await?;

    let samples = chamber_sampler::run(chamber.as_ref(), &sampler_config).await?;

    chamber.close().await?;
    chamber_sampler::write_csv_file(&samples, &output)?;

    tracing::info!(
        samples = samples.len(),
        output = %output.display(),
        "run complete"
    );
    Ok(())
}
