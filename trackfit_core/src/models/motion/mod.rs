// trackfit_core/src/models/motion/mod.rs

use crate::error::TrackFitError;
use crate::types::{Jacobian, State, IDX_PHI, IDX_Y};
use std::f64::consts::FRAC_PI_2;
use std::fmt::Debug;

/// Smallest `cos(phi)` the models accept. Below this `tan(phi)` exceeds 1e6
/// and the step is meaningless.
pub const MIN_COS_PHI: f64 = 1e-6;

// --- MOTION MODEL TRAIT ---
// Represents how a track state evolves along the longitudinal axis. `x' = f(x; x_from, x_to)`
/// A motion model transports a track state between two longitudinal
/// positions and provides the matching linearization.
///
/// The independent variable is the longitudinal position `x`, not time. Both
/// methods must refuse states outside the model domain instead of returning
/// non-finite or runaway values.
pub trait MotionModel: Debug + Send + Sync {
    /// Advances `state` from `x_from` to `x_to`.
    ///
    /// # Errors
    /// [`TrackFitError::Domain`] if the input or the propagated state leaves
    /// the valid angle range.
    fn propagate(&self, state: &State, x_from: f64, x_to: f64) -> Result<State, TrackFitError>;

    /// Calculates `F = ∂propagate/∂state`, evaluated at `state`.
    ///
    /// # Errors
    /// [`TrackFitError::Domain`] if `state` is outside the valid angle range.
    fn calculate_jacobian(
        &self,
        state: &State,
        x_from: f64,
        x_to: f64,
    ) -> Result<Jacobian, TrackFitError>;
}

/// Verifies that `state` is finite and its angle is inside the model domain.
/// Returns `cos(phi)` so callers don't evaluate it twice.
pub fn check_domain(state: &State, x: f64) -> Result<f64, TrackFitError> {
    let phi = state[IDX_PHI];
    if !state[IDX_Y].is_finite() || !phi.is_finite() || phi.abs() >= FRAC_PI_2 {
        return Err(TrackFitError::Domain { x, phi });
    }

    let cos_phi = phi.cos();
    if cos_phi < MIN_COS_PHI {
        return Err(TrackFitError::Domain { x, phi });
    }
    Ok(cos_phi)
}

pub mod helix;
