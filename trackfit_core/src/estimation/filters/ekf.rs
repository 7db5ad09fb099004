// trackfit_core/src/estimation/filters/ekf.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detector::DetectorGeometry;
use crate::error::{ensure_non_negative, ensure_positive, ConfigError, TrackFitError};
use crate::estimation::ekf::{ekf_predict, ekf_update, EkfPredictParams, EkfUpdateParams};
use crate::estimation::{FilterState, TrackEstimator};
use crate::models::measurement::layer::LayerHitModel;
use crate::models::measurement::MeasurementModel;
use crate::models::motion::MotionModel;
use crate::types::{Covariance, FittedPoint, Gain, Hit, Observation, State, IDX_Y};

/// What the filter does when the innovation covariance cannot be inverted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularUpdatePolicy {
    /// Keep the predicted state for this layer and move on.
    #[default]
    SkipUpdate,
    /// Fail the whole track.
    Abort,
}

/// Configuration parameters of the track Kalman filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct KalmanFilterConfig {
    /// Layer resolution: standard deviation of a measured `y`.
    pub measurement_sigma: f64,
    /// Variance added to `phi` on every step (unmodeled scattering).
    pub process_noise_phi: f64,
    /// Prior variance of `y`.
    pub initial_variance_y: f64,
    /// Prior variance of `phi`.
    pub initial_variance_phi: f64,
    pub singular_policy: SingularUpdatePolicy,
}

impl Default for KalmanFilterConfig {
    fn default() -> Self {
        Self {
            measurement_sigma: 2.0,
            process_noise_phi: 0.01,
            initial_variance_y: 100.0,
            initial_variance_phi: 1.0,
            singular_policy: SingularUpdatePolicy::default(),
        }
    }
}

impl KalmanFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("measurement_sigma", self.measurement_sigma)?;
        ensure_positive("process_noise_phi", self.process_noise_phi)?;
        ensure_non_negative("initial_variance_y", self.initial_variance_y)?;
        ensure_non_negative("initial_variance_phi", self.initial_variance_phi)?;
        Ok(())
    }

    /// `Q = diag(0, q_phi)`: no direct noise on `y`.
    pub fn process_noise_q(&self) -> Covariance {
        Covariance::new(0.0, 0.0, 0.0, self.process_noise_phi)
    }

    pub fn initial_covariance(&self) -> Covariance {
        Covariance::new(self.initial_variance_y, 0.0, 0.0, self.initial_variance_phi)
    }
}

/// Per-layer record of what the update did, kept for inspection and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDiagnostics {
    pub layer: usize,
    pub x: f64,
    /// Predicted state before the hit was fused.
    pub predicted: State,
    /// Innovation `z - y_pred`. Zero when the update was skipped.
    pub residual: f64,
    /// Innovation covariance `S`.
    pub innovation_variance: f64,
    pub kalman_gain: Gain,
    /// Posterior covariance after this layer.
    pub covariance: Covariance,
    pub covariance_trace: f64,
    pub update_skipped: bool,
}

/// The completed, immutable result of a filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedTrack {
    pub points: Vec<FittedPoint>,
    pub diagnostics: Vec<LayerDiagnostics>,
    pub final_state: FilterState,
}

/// A concrete implementation of an Extended Kalman Filter over detector layers.
///
/// The filter owns its state exclusively. One instance fits one track;
/// independent tracks use independent instances.
#[derive(Debug)]
pub struct ExtendedKalmanFilter {
    /// The current state of the filter (x, P, position).
    state: FilterState,
    /// The process noise covariance matrix (Q), modeling unmodeled scattering.
    process_noise_q: Covariance,

    motion: Box<dyn MotionModel>,
    measurement: Box<dyn MeasurementModel>,
    singular_policy: SingularUpdatePolicy,

    /// Index of the next layer to be processed.
    layer_index: usize,
    diagnostics: Vec<LayerDiagnostics>,
}

impl ExtendedKalmanFilter {
    /// Creates a filter seeded with `prior` at longitudinal position `origin`.
    pub fn new(
        prior: State,
        origin: f64,
        config: &KalmanFilterConfig,
        motion: Box<dyn MotionModel>,
    ) -> Result<Self, TrackFitError> {
        config.validate()?;
        let measurement = LayerHitModel::new(config.measurement_sigma)?;

        Ok(Self {
            state: FilterState::new(prior, config.initial_covariance(), origin),
            process_noise_q: config.process_noise_q(),
            motion,
            measurement: Box::new(measurement),
            singular_policy: config.singular_policy,
            layer_index: 0,
            diagnostics: Vec::new(),
        })
    }

    /// Replaces the layer measurement model, e.g. for a detector with a
    /// different readout.
    pub fn with_measurement_model(mut self, measurement: Box<dyn MeasurementModel>) -> Self {
        self.measurement = measurement;
        self
    }

    pub fn diagnostics(&self) -> &[LayerDiagnostics] {
        &self.diagnostics
    }

    /// Runs the filter over one hit per layer of `geometry` and returns the
    /// completed track.
    ///
    /// The hits must match the geometry one-to-one, in order.
    pub fn fit(
        mut self,
        geometry: &DetectorGeometry,
        hits: &[Hit],
    ) -> Result<FittedTrack, TrackFitError> {
        if hits.len() != geometry.len() {
            return Err(ConfigError::HitCountMismatch {
                expected: geometry.len(),
                actual: hits.len(),
            }
            .into());
        }
        for (index, (hit, &layer_x)) in hits.iter().zip(geometry.layers()).enumerate() {
            if hit.x != layer_x {
                return Err(ConfigError::HitLayerMismatch {
                    index,
                    hit_x: hit.x,
                    layer_x,
                }
                .into());
            }
        }

        let mut points = Vec::with_capacity(hits.len());
        for hit in hits {
            points.push(self.process(hit)?);
        }

        Ok(FittedTrack {
            points,
            diagnostics: self.diagnostics,
            final_state: self.state,
        })
    }

    // --- Private Helper Methods for the EKF Algorithm ---

    /// The internal "predict" step. Advances the state to the next layer.
    fn predict(&mut self, x_to: f64) -> Result<(), TrackFitError> {
        let params = EkfPredictParams {
            motion: self.motion.as_ref(),
            process_noise_q: &self.process_noise_q,
        };
        self.state = ekf_predict(&self.state, &params, x_to)?;
        Ok(())
    }

    /// The internal "update" step. Fuses the hit and records the layer.
    fn update(&mut self, hit: &Hit) -> Result<(), TrackFitError> {
        let z = Observation::new(hit.y);
        let params = EkfUpdateParams {
            model: self.measurement.as_ref(),
            z: &z,
            layer: self.layer_index,
        };
        let predicted = self.state.vector;

        let record = match ekf_update(&self.state, &params) {
            Ok(outcome) => {
                self.state = outcome.state;
                LayerDiagnostics {
                    layer: self.layer_index,
                    x: hit.x,
                    predicted,
                    residual: outcome.residual,
                    innovation_variance: outcome.innovation_variance,
                    kalman_gain: outcome.kalman_gain,
                    covariance: self.state.covariance,
                    covariance_trace: self.state.covariance.trace(),
                    update_skipped: false,
                }
            }
            Err(TrackFitError::SingularMatrix { layer, value })
                if self.singular_policy == SingularUpdatePolicy::SkipUpdate =>
            {
                // Carry the prediction forward unchanged.
                warn!(
                    layer,
                    x = hit.x,
                    innovation_variance = value,
                    "singular innovation covariance, skipping update"
                );
                LayerDiagnostics {
                    layer,
                    x: hit.x,
                    predicted,
                    residual: 0.0,
                    innovation_variance: value,
                    kalman_gain: Gain::zeros(),
                    covariance: self.state.covariance,
                    covariance_trace: self.state.covariance.trace(),
                    update_skipped: true,
                }
            }
            Err(e) => return Err(e),
        };

        debug!(
            layer = record.layer,
            x = record.x,
            residual = record.residual,
            y = self.state.vector[IDX_Y],
            trace = record.covariance_trace,
            "layer processed"
        );
        self.diagnostics.push(record);
        Ok(())
    }
}

// --- The Public Trait Implementation ---
impl TrackEstimator for ExtendedKalmanFilter {
    fn process(&mut self, hit: &Hit) -> Result<FittedPoint, TrackFitError> {
        if !hit.x.is_finite() || !hit.y.is_finite() {
            return Err(ConfigError::NonFiniteHit { x: hit.x, y: hit.y }.into());
        }
        // Layers are visited strictly forward.
        if hit.x <= self.state.position {
            return Err(ConfigError::HitBehindFilter {
                hit_x: hit.x,
                position: self.state.position,
            }
            .into());
        }

        // 1. PREDICT: Advance the state to the layer of the hit.
        self.predict(hit.x)?;

        // 2. UPDATE: Now that we're at the layer, fuse the measurement.
        self.update(hit)?;

        self.layer_index += 1;
        Ok(FittedPoint::new(hit.x, self.state.vector[IDX_Y]))
    }

    fn get_state(&self) -> &FilterState {
        &self.state
    }
}
