// trackfit_sim/src/simulation/config/structs.rs

use serde::{Deserialize, Serialize};
use trackfit_core::error::ensure_non_negative;
use trackfit_core::prelude::*;

use crate::simulation::trajectory::truth_sample_count;

// --- Top-Level Scenario Configuration ---

/// Everything needed to reproduce one run: the detector, the particle, the
/// noise, and the filter settings. Missing sections fall back to the
/// reference setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub detector: DetectorConfig,
    pub physics: TrackPhysics,
    pub initial_state: InitialStateConfig,
    pub prior: PriorConfig,
    pub filter: KalmanFilterConfig,
}

impl ScenarioConfig {
    /// Checks every section. Domain problems of the initial state are left to
    /// the motion model, which reports them as a failed track.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let geometry = self.detector.geometry()?;
        self.physics.validate()?;
        self.filter.validate()?;
        truth_sample_count(&geometry, self.simulation.truth_step)?;
        ensure_non_negative("prior.sigma_y", self.prior.sigma_y)?;
        ensure_non_negative("prior.sigma_phi", self.prior.sigma_phi)?;
        Ok(())
    }
}

// --- Section Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Seed used by `run` when none is given on the command line.
    pub seed: u64,
    /// Sub-step length of the dense ground truth, in cm.
    pub truth_step: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            truth_step: 0.5,
        }
    }
}

/// Layer positions, either listed explicitly or as `layer_count` layers
/// spaced `layer_spacing` apart. An explicit list wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DetectorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<f64>>,
    pub layer_count: usize,
    pub layer_spacing: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            layers: None,
            layer_count: 10,
            layer_spacing: 10.0,
        }
    }
}

impl DetectorConfig {
    pub fn geometry(&self) -> Result<DetectorGeometry, ConfigError> {
        match &self.layers {
            Some(layers) => DetectorGeometry::new(layers.clone()),
            None => DetectorGeometry::uniform(self.layer_count, self.layer_spacing),
        }
    }
}

/// The true particle state at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InitialStateConfig {
    pub y: f64,
    pub phi: f64,
}

impl Default for InitialStateConfig {
    fn default() -> Self {
        Self { y: 5.0, phi: -0.2 }
    }
}

impl InitialStateConfig {
    pub fn state(&self) -> State {
        State::new(self.y, self.phi)
    }
}

/// How far the filter's starting guess is smeared away from the truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PriorConfig {
    pub sigma_y: f64,
    pub sigma_phi: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            sigma_y: 5.0,
            sigma_phi: 0.1,
        }
    }
}

impl PriorConfig {
    /// Draws the filter's initial guess around `truth`: `y` first, then `phi`.
    pub fn draw(&self, truth: &State, noise: &mut dyn NoiseSource) -> State {
        let y = noise.sample_gaussian(truth[IDX_Y], self.sigma_y);
        let phi = noise.sample_gaussian(truth[IDX_PHI], self.sigma_phi);
        State::new(y, phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_reference_setup() {
        let scenario = ScenarioConfig::default();
        assert!(scenario.validate().is_ok());

        let geometry = scenario.detector.geometry().unwrap();
        assert_eq!(
            geometry.layers(),
            &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
        );
        assert_eq!(scenario.initial_state.state(), State::new(5.0, -0.2));
        assert_eq!(scenario.filter.measurement_sigma, 2.0);
    }

    #[test]
    fn test_explicit_layers_take_precedence() {
        let detector = DetectorConfig {
            layers: Some(vec![5.0, 7.5, 30.0]),
            layer_count: 99,
            layer_spacing: 1.0,
        };
        assert_eq!(detector.geometry().unwrap().layers(), &[5.0, 7.5, 30.0]);
    }

    #[test]
    fn test_invalid_sections_are_reported() {
        let mut scenario = ScenarioConfig::default();
        scenario.simulation.truth_step = 0.0;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::NonPositive {
                name: "truth_step",
                ..
            })
        ));

        let mut scenario = ScenarioConfig::default();
        scenario.simulation.truth_step = 1e-18;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::TooManyTruthSamples { .. })
        ));

        let mut scenario = ScenarioConfig::default();
        scenario.prior.sigma_phi = -0.1;
        assert!(scenario.validate().is_err());

        let mut scenario = ScenarioConfig::default();
        scenario.detector.layers = Some(vec![]);
        assert_eq!(scenario.validate(), Err(ConfigError::EmptyGeometry));
    }

    #[test]
    fn test_prior_draws_y_then_phi() {
        let mut noise = FixedSequenceNoise::new(vec![1.0, -2.0]);
        let prior = PriorConfig::default().draw(&State::new(5.0, -0.2), &mut noise);
        assert_eq!(prior[IDX_Y], 10.0);
        assert!((prior[IDX_PHI] - (-0.4)).abs() < 1e-12);
        assert_eq!(noise.draws(), 2);
    }

    #[test]
    fn test_default_scenario_survives_toml_roundtrip() {
        let text = toml::to_string_pretty(&ScenarioConfig::default()).unwrap();
        assert!(text.contains("singular_policy = \"skip_update\""));
        assert!(!text.contains("layers ="));
        let parsed: ScenarioConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, ScenarioConfig::default());
    }
}
