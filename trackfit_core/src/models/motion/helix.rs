// trackfit_core/src/models/motion/helix.rs

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError, TrackFitError};
use crate::models::motion::{check_domain, MotionModel};
use crate::types::{Jacobian, State, IDX_PHI, IDX_Y};

/// Converts `p_t [GeV] / B [T]` into a bending radius in cm.
const RADIUS_CM_PER_GEV_PER_TESLA: f64 = 100.0 / 0.3;

/// Kinematic inputs of the bending model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrackPhysics {
    /// Transverse momentum in GeV.
    pub pt_gev: f64,
    /// Magnetic field strength in tesla. Uniform and constant.
    pub field_tesla: f64,
}

impl Default for TrackPhysics {
    fn default() -> Self {
        Self {
            pt_gev: 1.0,
            field_tesla: 1.0,
        }
    }
}

impl TrackPhysics {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("pt_gev", self.pt_gev)?;
        ensure_positive("field_tesla", self.field_tesla)?;
        Ok(())
    }

    /// `R = p_t * 100 / (0.3 * B)`, in cm.
    pub fn radius_of_curvature(&self) -> f64 {
        RADIUS_CM_PER_GEV_PER_TESLA * self.pt_gev / self.field_tesla
    }
}

// --- Small-Step Helix Model ---
// First-order transport of a helix projected on the bending plane:
//   y'   = y + dx * tan(phi)
//   phi' = phi - (dx / R) / cos(phi)
// This is only accurate for small dx; the ground truth sub-steps it, the
// filter steps layer to layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HelixSmallStepModel {
    radius: f64,
}

impl HelixSmallStepModel {
    pub fn new(radius: f64) -> Result<Self, ConfigError> {
        let radius = ensure_positive("radius_of_curvature", radius)?;
        Ok(Self { radius })
    }

    pub fn from_physics(physics: &TrackPhysics) -> Result<Self, ConfigError> {
        physics.validate()?;
        Self::new(physics.radius_of_curvature())
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl MotionModel for HelixSmallStepModel {
    fn propagate(&self, state: &State, x_from: f64, x_to: f64) -> Result<State, TrackFitError> {
        let cos_phi = check_domain(state, x_from)?;
        let y = state[IDX_Y];
        let phi = state[IDX_PHI];
        let delta_x = x_to - x_from;

        let next = State::new(
            y + delta_x * phi.tan(),
            phi - (delta_x / self.radius) / cos_phi,
        );

        // A long enough step can bend the track out of the domain.
        check_domain(&next, x_to)?;
        Ok(next)
    }

    fn calculate_jacobian(
        &self,
        state: &State,
        x_from: f64,
        x_to: f64,
    ) -> Result<Jacobian, TrackFitError> {
        let cos_phi = check_domain(state, x_from)?;
        let phi = state[IDX_PHI];
        let delta_x = x_to - x_from;
        let cos2 = cos_phi * cos_phi;

        // Row-major: [[dy'/dy, dy'/dphi], [dphi'/dy, dphi'/dphi]]
        Ok(Jacobian::new(
            1.0,
            delta_x / cos2,
            0.0,
            1.0 - (delta_x / self.radius) * phi.sin() / cos2,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn reference_model() -> HelixSmallStepModel {
        HelixSmallStepModel::from_physics(&TrackPhysics::default()).unwrap()
    }

    /// Central finite difference of `propagate` with respect to each state component.
    fn numerical_jacobian(
        model: &HelixSmallStepModel,
        state: &State,
        x_from: f64,
        x_to: f64,
    ) -> Jacobian {
        let h = 1e-6;
        let mut jac = Jacobian::zeros();
        for col in 0..2 {
            let mut plus = *state;
            let mut minus = *state;
            plus[col] += h;
            minus[col] -= h;
            let f_plus = model.propagate(&plus, x_from, x_to).unwrap();
            let f_minus = model.propagate(&minus, x_from, x_to).unwrap();
            for row in 0..2 {
                jac[(row, col)] = (f_plus[row] - f_minus[row]) / (2.0 * h);
            }
        }
        jac
    }

    #[test]
    fn test_radius_from_reference_physics() {
        let physics = TrackPhysics::default();
        assert_relative_eq!(physics.radius_of_curvature(), 333.333_333_333, epsilon = 1e-6);

        let stiff = TrackPhysics {
            pt_gev: 3.0,
            field_tesla: 2.0,
        };
        assert_relative_eq!(stiff.radius_of_curvature(), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_physics_is_rejected() {
        let no_field = TrackPhysics {
            pt_gev: 1.0,
            field_tesla: 0.0,
        };
        assert!(HelixSmallStepModel::from_physics(&no_field).is_err());
        assert!(HelixSmallStepModel::new(-5.0).is_err());
    }

    #[test]
    fn test_propagate_single_step() {
        let model = reference_model();
        let state = State::new(5.0, -0.2);
        let next = model.propagate(&state, 0.0, 10.0).unwrap();

        let radius = model.radius();
        assert_abs_diff_eq!(next[IDX_Y], 5.0 + 10.0 * (-0.2f64).tan(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            next[IDX_PHI],
            -0.2 - (10.0 / radius) / (0.2f64).cos(),
            epsilon = 1e-12
        );
        // A positive charge in this convention bends towards negative phi.
        assert!(next[IDX_PHI] < state[IDX_PHI]);
    }

    #[test]
    fn test_zero_length_step_is_identity() {
        let model = reference_model();
        let state = State::new(-1.5, 0.7);
        let next = model.propagate(&state, 42.0, 42.0).unwrap();
        assert_eq!(next, state);

        let jac = model.calculate_jacobian(&state, 42.0, 42.0).unwrap();
        assert_eq!(jac, Jacobian::identity());
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let model = reference_model();
        let states = [
            State::new(5.0, -0.2),
            State::new(0.0, 0.0),
            State::new(-12.0, 0.9),
            State::new(3.0, -1.2),
        ];
        let steps = [(0.0, 0.5), (10.0, 20.0), (0.0, 10.0), (50.0, 47.0)];

        for state in &states {
            for &(x_from, x_to) in &steps {
                let analytic = model.calculate_jacobian(state, x_from, x_to).unwrap();
                let numeric = numerical_jacobian(&model, state, x_from, x_to);
                for row in 0..2 {
                    for col in 0..2 {
                        assert_relative_eq!(
                            analytic[(row, col)],
                            numeric[(row, col)],
                            epsilon = 1e-9,
                            max_relative = 1e-6
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_domain_guard_near_vertical_angle() {
        let model = reference_model();
        for epsilon in [1e-7, 1e-9, 1e-12, 0.0] {
            for sign in [1.0, -1.0] {
                let state = State::new(0.0, sign * (FRAC_PI_2 - epsilon));
                assert!(matches!(
                    model.propagate(&state, 0.0, 0.5),
                    Err(TrackFitError::Domain { .. })
                ));
                assert!(matches!(
                    model.calculate_jacobian(&state, 0.0, 0.5),
                    Err(TrackFitError::Domain { .. })
                ));
            }
        }
    }

    #[test]
    fn test_domain_guard_rejects_non_finite_state() {
        let model = reference_model();
        let state = State::new(f64::NAN, 0.1);
        assert!(model.propagate(&state, 0.0, 1.0).is_err());
        let state = State::new(0.0, f64::INFINITY);
        assert!(model.calculate_jacobian(&state, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_step_bending_out_of_domain_is_reported() {
        let model = reference_model();
        // Valid input, but the bend over 10 cm pushes phi past -pi/2.
        let state = State::new(0.0, -1.5);
        let err = model.propagate(&state, 0.0, 10.0).unwrap_err();
        match err {
            TrackFitError::Domain { x, phi } => {
                assert_eq!(x, 10.0);
                assert!(phi < -FRAC_PI_2);
            }
            other => panic!("expected a domain error, got {other:?}"),
        }
    }
}
