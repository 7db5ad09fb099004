// trackfit_sim/src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// trackfit: Kalman-filter track fitting through flat detector layers.
///
/// Simulates charged-particle tracks in a uniform field, fits them layer by
/// layer and reports how much the fit improves on the raw hits.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Simulate and fit one track, and print the record as JSON.
    Run {
        /// Scenario TOML file. Built-in reference setup if omitted.
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Overrides `simulation.seed` from the scenario.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the record here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the per-layer filter diagnostics to this file.
        #[arg(long)]
        diagnostics: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Run many independent tracks in parallel and summarize them.
    Batch {
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// First seed of the batch. Defaults to `simulation.seed`.
        #[arg(long)]
        first_seed: Option<u64>,
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Run a batch study for every `*.toml` scenario under a directory.
    Sweep {
        dir: PathBuf,
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the built-in reference scenario as TOML.
    DumpConfig,
}
