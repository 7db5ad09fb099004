// trackfit_sim/src/simulation/config/mod.rs

//! Loading and validating scenario configuration.
//!
//! Sources are layered: built-in defaults, then the scenario TOML file, then
//! environment variables prefixed `TRACKFIT_` (nested keys split on `__`, e.g.
//! `TRACKFIT_FILTER__MEASUREMENT_SIGMA=3.0`).

mod catalog;

pub mod structs;

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::info;

use crate::simulation::error::SimulationError;

// Re-export public types
pub use catalog::{discover_scenarios, ScenarioEntry};
pub use structs::{
    DetectorConfig, InitialStateConfig, PriorConfig, ScenarioConfig, SimulationConfig,
};

pub const ENV_PREFIX: &str = "TRACKFIT_";

/// Builds the layered provider stack without extracting it.
pub fn scenario_figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(ScenarioConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads, merges and validates a scenario. `None` gives the reference setup
/// (still subject to environment overrides).
pub fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig, SimulationError> {
    if let Some(path) = path {
        // figment silently treats a missing file as empty.
        if !path.is_file() {
            return Err(SimulationError::ScenarioNotFound(path.to_path_buf()));
        }
        info!("Loading scenario from: {}", path.display());
    }

    let scenario: ScenarioConfig = scenario_figment(path).extract()?;
    scenario.validate()?;
    Ok(scenario)
}
