//! Fetches the forecast for the configured location and writes the meteogram display
//! model as JSON for the chart renderer.

use anyhow::Context;
use clap::Parser;
use log::info;
use meteogram::{Config, Meteogram};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meteogram", version, about = "Met Office forecast to meteogram display model")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Where to write the display model. Overrides `files.output_file_name`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Query the API even if the cached responses are fresh.
    #[arg(long)]
    ignore_cache: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Loading configuration from {:?}", cli.config);
    let config = Config::load(&cli.config)?;
    let output = cli
        .output
        .unwrap_or_else(|| config.files.output_file_name.clone());

    let meteogram = Meteogram::new(config)?;
    let responses = meteogram.fetch().ignore_cache(cli.ignore_cache).call()?;
    let sun = meteogram.sun()?;
    let events = meteogram.calendar_events()?;

    let model = meteogram
        .display_model()
        .hourly(&responses.hourly)
        .three_hourly(&responses.three_hourly)
        .sun(&sun)
        .events(&events)
        .call()?;
    info!(
        "Forecast has {} points, {} condition bars and {} calendar bars",
        model.forecast.len(),
        model.condition_bars.bars.len(),
        model.event_bars.bars.len()
    );

    let json = serde_json::to_string_pretty(&model)?;
    std::fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote display model to {}", output.display());
    Ok(())
}
