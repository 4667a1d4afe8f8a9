//! wktfit - Structured workout to FIT converter
//!
//! Usage: `wktfit <workout.json> [output.fit] [--config <export.toml>]`

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueHint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wktfit::export::generate_fit_filename;
use wktfit::storage::config;
use wktfit::{Workout, WorkoutExporter};

/// Convert a structured workout into a FIT workout file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workout JSON to convert
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output FIT path (defaults to a name derived from the workout)
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Export config TOML (defaults to the platform config directory)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    let export_config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load export config")?;

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let workout: Workout = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse workout {}", args.input.display()))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(generate_fit_filename(&workout)));

    WorkoutExporter::new(export_config)
        .export_to_file(&workout, &output)
        .with_context(|| format!("Failed to export {}", output.display()))?;

    tracing::info!("Wrote {}", output.display());
    Ok(())
}
