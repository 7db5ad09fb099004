// trackfit_core/src/models/measurement/mod.rs

use crate::types::{Observation, ObservationMatrix, ObservationNoise, State};
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a detector layer. `z = h(x) + v`
pub trait MeasurementModel: Debug + Send + Sync {
    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &ObservationNoise;

    /// Predicts the ideal measurement `z_pred = h(x)` from the filter's state.
    fn predict_measurement(&self, state: &State) -> Observation;

    /// Calculates the measurement Jacobian `H = ∂h/∂x`.
    fn calculate_jacobian(&self, state: &State) -> ObservationMatrix;
}

pub mod layer;
