// trackfit_sim/src/simulation/error.rs

use std::path::PathBuf;

use thiserror::Error;
use trackfit_core::error::{ConfigError, TrackFitError};

/// Errors raised around a fit: loading scenarios, writing results.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("scenario file not found: {}", .0.display())]
    ScenarioNotFound(PathBuf),

    #[error("failed to load scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    Invalid(#[from] ConfigError),

    #[error("track fit failed: {0}")]
    Fit(#[from] TrackFitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode TOML: {0}")]
    Toml(#[from] toml::ser::Error),
}
