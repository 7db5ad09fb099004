// trackfit_core/src/estimation/ekf.rs

use crate::error::TrackFitError;
use crate::estimation::FilterState;
use crate::models::measurement::MeasurementModel;
use crate::models::motion::MotionModel;
use crate::types::{Covariance, Gain, Observation, ObservationNoise};

/// Innovation variances at or below this are treated as non-invertible.
pub const MIN_INNOVATION_VARIANCE: f64 = 1e-12;

/// A container for parameters needed by the EKF prediction step.
pub struct EkfPredictParams<'a> {
    pub motion: &'a dyn MotionModel,
    pub process_noise_q: &'a Covariance,
}

/// A container for parameters needed by the EKF update step.
pub struct EkfUpdateParams<'a> {
    pub model: &'a dyn MeasurementModel,
    pub z: &'a Observation,
    /// Layer index, only used to label a singular innovation.
    pub layer: usize,
}

/// What an update step produced, beyond the corrected state.
#[derive(Debug, Clone, PartialEq)]
pub struct EkfUpdateOutcome {
    pub state: FilterState,
    /// Innovation `z - H·x_pred`.
    pub residual: f64,
    /// Innovation covariance `S = H·P·Hᵀ + R`.
    pub innovation_variance: f64,
    pub kalman_gain: Gain,
}

/// PURE FUNCTION: Performs one EKF prediction step to `x_to`.
/// Takes a state and returns the new, predicted state. It has no side effects.
pub fn ekf_predict(
    current_state: &FilterState,
    params: &EkfPredictParams,
    x_to: f64,
) -> Result<FilterState, TrackFitError> {
    let x_from = current_state.position;

    // Linearize at the current estimate, before moving it.
    let f_jac = params
        .motion
        .calculate_jacobian(&current_state.vector, x_from, x_to)?;
    let new_x = params
        .motion
        .propagate(&current_state.vector, x_from, x_to)?;

    // P_k+1 = F * P_k * F^T + Q
    let new_p = f_jac * current_state.covariance * f_jac.transpose() + params.process_noise_q;

    Ok(FilterState {
        vector: new_x,
        covariance: new_p,
        position: x_to,
    })
}

/// PURE FUNCTION: Performs one EKF measurement update step.
/// Takes a predicted state and returns the corrected state. It has no side effects.
///
/// # Errors
/// [`TrackFitError::SingularMatrix`] if the innovation covariance is not
/// invertible. What to do about it is the caller's policy.
pub fn ekf_update(
    predicted_state: &FilterState,
    params: &EkfUpdateParams,
) -> Result<EkfUpdateOutcome, TrackFitError> {
    let h_jacobian = params.model.calculate_jacobian(&predicted_state.vector);
    let z_pred = params.model.predict_measurement(&predicted_state.vector);
    let r_matrix = params.model.get_r();

    // Standard EKF update equations
    let p_priori = &predicted_state.covariance;
    let x_priori = &predicted_state.vector;
    let y = params.z - z_pred; // Innovation

    let s = h_jacobian * p_priori * h_jacobian.transpose() + r_matrix;
    let s_inv = invert_innovation(&s).ok_or(TrackFitError::SingularMatrix {
        layer: params.layer,
        value: s[(0, 0)],
    })?;

    let k_gain: Gain = p_priori * h_jacobian.transpose() * s_inv;

    let new_x = x_priori + k_gain * y;
    let i_kh = Covariance::identity() - k_gain * h_jacobian;
    let new_p = enforce_symmetric_psd(&(i_kh * p_priori));

    Ok(EkfUpdateOutcome {
        state: FilterState {
            vector: new_x,
            covariance: new_p,
            position: predicted_state.position,
        },
        residual: y[0],
        innovation_variance: s[(0, 0)],
        kalman_gain: k_gain,
    })
}

fn invert_innovation(s: &ObservationNoise) -> Option<ObservationNoise> {
    let value = s[(0, 0)];
    if !value.is_finite() || value <= MIN_INNOVATION_VARIANCE {
        return None;
    }
    s.try_inverse()
}

/// Forces a covariance back to a symmetric, positive semi-definite matrix.
///
/// The off-diagonal terms are averaged with the transpose. If rounding has
/// still left a negative eigenvalue, the eigenvalues are clamped to zero and
/// the matrix is recomposed.
pub fn enforce_symmetric_psd(p: &Covariance) -> Covariance {
    let sym = (p + p.transpose()) * 0.5;

    let det = sym[(0, 0)] * sym[(1, 1)] - sym[(0, 1)] * sym[(1, 0)];
    if sym[(0, 0)] >= 0.0 && sym[(1, 1)] >= 0.0 && det >= 0.0 {
        return sym;
    }

    let mut eigen = sym.symmetric_eigen();
    eigen.eigenvalues = eigen.eigenvalues.map(|lambda| lambda.max(0.0));
    let repaired = eigen.recompose();
    (repaired + repaired.transpose()) * 0.5
}
