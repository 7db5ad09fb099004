// trackfit_core/src/error.rs

use thiserror::Error;

/// Everything that can end a single track's fit.
///
/// Errors are local to one track: nothing here is ever written back into the
/// shared geometry or into another track's state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackFitError {
    /// The trajectory angle left `(-pi/2, pi/2)`, or the state stopped being finite.
    #[error("trajectory angle phi = {phi} at x = {x} is outside the model domain")]
    Domain { x: f64, phi: f64 },

    /// The innovation covariance could not be inverted.
    #[error("innovation covariance S = {value} at layer {layer} is not invertible")]
    SingularMatrix { layer: usize, value: f64 },

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("detector geometry has no layers")]
    EmptyGeometry,

    #[error("layer {index} at x = {x} is not at a positive position")]
    NonPositiveLayer { index: usize, x: f64 },

    #[error("layer {index} at x = {x} does not follow the previous layer at x = {previous}")]
    NonIncreasingLayers { index: usize, previous: f64, x: f64 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("expected {expected} hits (one per layer), got {actual}")]
    HitCountMismatch { expected: usize, actual: usize },

    #[error("hit {index} at x = {hit_x} does not sit on layer x = {layer_x}")]
    HitLayerMismatch { index: usize, hit_x: f64, layer_x: f64 },

    #[error("hit at x = {hit_x} is not ahead of the filter position x = {position}")]
    HitBehindFilter { hit_x: f64, position: f64 },

    #[error("hit ({x}, {y}) is not finite")]
    NonFiniteHit { x: f64, y: f64 },

    #[error("truth_step = {step} needs {samples} path samples, above the limit of {limit}")]
    TooManyTruthSamples { step: f64, samples: f64, limit: usize },
}

/// Checks that a configuration value is strictly positive and finite.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Checks that a configuration value is zero or positive, and finite.
pub fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
