// trackfit_core/src/models/measurement/layer.rs

use crate::error::{ensure_positive, ConfigError};
use crate::models::measurement::MeasurementModel;
use crate::types::{Observation, ObservationMatrix, ObservationNoise, State, IDX_Y};

/// A flat layer measures the lateral offset `y` of the track and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerHitModel {
    // The R matrix for this layer
    pub noise_covariance: ObservationNoise,
}

impl LayerHitModel {
    /// Builds the model from the layer resolution (standard deviation of `y`).
    pub fn new(resolution: f64) -> Result<Self, ConfigError> {
        let sigma = ensure_positive("measurement_sigma", resolution)?;
        Ok(Self {
            noise_covariance: ObservationNoise::new(sigma * sigma),
        })
    }
}

impl MeasurementModel for LayerHitModel {
    fn get_r(&self) -> &ObservationNoise {
        &self.noise_covariance
    }

    fn predict_measurement(&self, state: &State) -> Observation {
        Observation::new(state[IDX_Y])
    }

    fn calculate_jacobian(&self, _state: &State) -> ObservationMatrix {
        // d(z)/d(y) = 1, d(z)/d(phi) = 0
        ObservationMatrix::new(1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_model_observes_y_only() {
        let model = LayerHitModel::new(2.0).unwrap();
        let state = State::new(7.5, -0.3);

        assert_eq!(model.predict_measurement(&state)[0], 7.5);
        assert_eq!(model.calculate_jacobian(&state), ObservationMatrix::new(1.0, 0.0));
        assert_eq!(model.get_r()[(0, 0)], 4.0);
    }

    #[test]
    fn test_non_positive_resolution_is_rejected() {
        assert!(LayerHitModel::new(0.0).is_err());
        assert!(LayerHitModel::new(-2.0).is_err());
    }
}
