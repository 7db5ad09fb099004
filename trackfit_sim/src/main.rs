// trackfit_sim/src/main.rs

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackfit_sim::cli::{Cli, Command};
use trackfit_sim::prelude::*;

fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for JSON and TOML output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            scenario,
            seed,
            output,
            diagnostics,
            pretty,
        } => run(
            scenario.as_deref(),
            seed,
            output.as_deref(),
            diagnostics.as_deref(),
            pretty,
        )?,
        Command::Batch {
            scenario,
            first_seed,
            count,
            output,
            pretty,
        } => {
            let config = load_scenario(scenario.as_deref())?;
            let first_seed = first_seed.unwrap_or(config.simulation.seed);
            let summary = run_batch(&config, first_seed, count);
            emit_json(&summary, output.as_deref(), pretty)?;
        }
        Command::Sweep { dir, count, output } => {
            let entries = run_sweep(&dir, count);
            info!("Swept {} scenario(s) under {:?}", entries.len(), dir);
            emit_json(&entries, output.as_deref(), true)?;
        }
        Command::DumpConfig => {
            print!("{}", toml::to_string_pretty(&ScenarioConfig::default())?);
        }
    }

    Ok(())
}

fn run(
    scenario_path: Option<&Path>,
    seed: Option<u64>,
    output: Option<&Path>,
    diagnostics: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let scenario = load_scenario(scenario_path)?;
    let seed = seed.unwrap_or(scenario.simulation.seed);

    let track = run_seeded(&scenario, seed)
        .with_context(|| format!("track with seed {seed} could not be fitted"))?;

    let record = &track.record;
    if let (Some(fit), Some(truth)) = (record.kf_track.last(), record.true_track.last()) {
        info!(
            seed,
            layers = record.detector_layers.len(),
            last_fit_y = fit.y,
            last_true_y = truth.y,
            "track fitted"
        );
    }

    emit_json(record, output, pretty)?;
    if let Some(path) = diagnostics {
        emit_json(&track.diagnostics, Some(path), true)
            .with_context(|| format!("writing diagnostics to {}", path.display()))?;
    }
    Ok(())
}
