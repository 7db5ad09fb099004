// trackfit_core/src/estimation/mod.rs

use crate::error::TrackFitError;
use crate::types::{Covariance, FittedPoint, Hit, State};

/// The filter's current belief about the track: the state vector, its
/// covariance and the longitudinal position both refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// The actual numerical data vector `[y, phi]`.
    pub vector: State,
    /// The covariance matrix `P`.
    pub covariance: Covariance,
    /// The longitudinal position `x` of the last predict/update.
    pub position: f64,
}

impl FilterState {
    pub fn new(vector: State, covariance: Covariance, position: f64) -> Self {
        Self {
            vector,
            covariance,
            position,
        }
    }
}

/// The contract for any algorithm that performs the track-fitting role.
/// It consumes one hit per layer, strictly forward in `x`.
pub trait TrackEstimator {
    /// Advances the estimate to the hit's layer and fuses the hit.
    /// Returns the fitted point at that layer.
    fn process(&mut self, hit: &Hit) -> Result<FittedPoint, TrackFitError>;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> &FilterState;
}

pub mod ekf;
pub mod filters;
