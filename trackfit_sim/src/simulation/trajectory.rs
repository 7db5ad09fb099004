// trackfit_sim/src/simulation/trajectory.rs

use trackfit_core::error::ensure_positive;
use trackfit_core::prelude::*;

/// Upper bound on the number of dense ground-truth samples of one track.
pub const MAX_TRUTH_SAMPLES: usize = 1_000_000;

/// Number of points `true_path` records for `geometry` sampled every
/// `truth_step`. Rejects a step that is not positive, or one so small that the
/// path would exceed [`MAX_TRUTH_SAMPLES`].
pub fn truth_sample_count(
    geometry: &DetectorGeometry,
    truth_step: f64,
) -> Result<usize, ConfigError> {
    let step = ensure_positive("truth_step", truth_step)?;

    let mut samples = 0.0;
    let mut x = geometry.origin();
    for &layer_x in geometry.layers() {
        samples += ((layer_x - x) / step).ceil();
        x = layer_x;
    }

    if !samples.is_finite() || samples > MAX_TRUTH_SAMPLES as f64 {
        return Err(ConfigError::TooManyTruthSamples {
            step,
            samples,
            limit: MAX_TRUTH_SAMPLES,
        });
    }
    Ok(samples as usize)
}

/// Everything the simulator produces for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedEvent {
    /// Dense ground truth, for plotting and residuals.
    pub true_track: Vec<TruePathPoint>,
    /// One noisy hit per layer, in layer order.
    pub hits: Vec<Hit>,
}

/// Generates the ground-truth path and the noisy layer hits of a particle.
///
/// The simulator borrows the shared geometry and motion model; it never sees
/// the filter.
#[derive(Debug)]
pub struct TrajectorySimulator<'a> {
    geometry: &'a DetectorGeometry,
    motion: &'a dyn MotionModel,
    truth_step: f64,
    measurement_sigma: f64,
}

impl<'a> TrajectorySimulator<'a> {
    pub fn new(
        geometry: &'a DetectorGeometry,
        motion: &'a dyn MotionModel,
        truth_step: f64,
        measurement_sigma: f64,
    ) -> Result<Self, ConfigError> {
        truth_sample_count(geometry, truth_step)?;
        Ok(Self {
            geometry,
            motion,
            truth_step: ensure_positive("truth_step", truth_step)?,
            measurement_sigma: ensure_positive("measurement_sigma", measurement_sigma)?,
        })
    }

    /// Sub-steps the motion model from the origin through the last layer.
    ///
    /// The step before each layer is shortened so every layer position is
    /// sampled exactly. The origin itself is not part of the path.
    pub fn true_path(&self, initial: &State) -> Result<Vec<TruePathPoint>, TrackFitError> {
        let capacity = truth_sample_count(self.geometry, self.truth_step)?;
        let mut points = Vec::with_capacity(capacity);
        let mut state = *initial;
        let mut x = self.geometry.origin();

        for &layer_x in self.geometry.layers() {
            let start = x;
            let steps = ((layer_x - start) / self.truth_step).ceil() as usize;
            for i in 1..=steps {
                let next_x = if i == steps {
                    layer_x
                } else {
                    (start + i as f64 * self.truth_step).min(layer_x)
                };
                state = self.motion.propagate(&state, x, next_x)?;
                x = next_x;
                points.push(TruePathPoint::new(x, state[IDX_Y]));
            }
        }

        Ok(points)
    }

    /// Propagates layer to layer, without sub-stepping, and smears `y` at
    /// every layer. Draws exactly one sample per hit, in layer order.
    pub fn hits(
        &self,
        initial: &State,
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<Hit>, TrackFitError> {
        let mut hits = Vec::with_capacity(self.geometry.len());
        let mut state = *initial;
        let mut x = self.geometry.origin();

        for &layer_x in self.geometry.layers() {
            state = self.motion.propagate(&state, x, layer_x)?;
            x = layer_x;
            let measured_y = noise.sample_gaussian(state[IDX_Y], self.measurement_sigma);
            hits.push(Hit::new(layer_x, measured_y));
        }

        Ok(hits)
    }

    /// Runs both passes from the same initial state.
    pub fn simulate(
        &self,
        initial: &State,
        noise: &mut dyn NoiseSource,
    ) -> Result<SimulatedEvent, TrackFitError> {
        Ok(SimulatedEvent {
            true_track: self.true_path(initial)?,
            hits: self.hits(initial, noise)?,
        })
    }
}
