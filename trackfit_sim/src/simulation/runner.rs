// trackfit_sim/src/simulation/runner.rs

use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use trackfit_core::prelude::*;

use crate::simulation::config::{discover_scenarios, load_scenario, ScenarioConfig};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::metrics::{ResidualSummary, TrackResiduals};
use crate::simulation::output::SimulationRecord;
use crate::simulation::trajectory::TrajectorySimulator;

/// The outcome of one simulated and fitted track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRun {
    pub record: SimulationRecord,
    /// The filter's starting guess.
    pub prior: State,
    pub diagnostics: Vec<LayerDiagnostics>,
    pub final_state: FilterState,
}

/// Simulates one track and fits it.
///
/// `noise` is drawn from in a fixed order: one sample per hit in layer order,
/// then the prior's `y` and `phi`.
pub fn run_track(
    scenario: &ScenarioConfig,
    noise: &mut dyn NoiseSource,
) -> Result<TrackRun, TrackFitError> {
    scenario.validate()?;
    let geometry = scenario.detector.geometry()?;
    let motion = HelixSmallStepModel::from_physics(&scenario.physics)?;

    // --- 1. Simulate ---
    let simulator = TrajectorySimulator::new(
        &geometry,
        &motion,
        scenario.simulation.truth_step,
        scenario.filter.measurement_sigma,
    )?;
    let truth_start = scenario.initial_state.state();
    let event = simulator.simulate(&truth_start, noise)?;

    // --- 2. Seed the prior ---
    let prior = scenario.prior.draw(&truth_start, noise);

    // --- 3. Fit ---
    let filter = ExtendedKalmanFilter::new(
        prior,
        geometry.origin(),
        &scenario.filter,
        Box::new(motion.clone()),
    )?;
    let fitted = filter.fit(&geometry, &event.hits)?;

    Ok(TrackRun {
        record: SimulationRecord {
            detector_layers: geometry.layers().to_vec(),
            true_track: event.true_track,
            hits: event.hits,
            kf_track: fitted.points,
        },
        prior,
        diagnostics: fitted.diagnostics,
        final_state: fitted.final_state,
    })
}

/// [`run_track`] with a fresh generator seeded from `seed`.
pub fn run_seeded(scenario: &ScenarioConfig, seed: u64) -> Result<TrackRun, TrackFitError> {
    let mut rng = SimulationRng::from_seed(seed);
    run_track(scenario, &mut rng)
}

/// Aggregate statistics of many independent tracks of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub first_seed: u64,
    pub attempted: usize,
    pub succeeded: usize,
    pub domain_failures: usize,
    pub singular_failures: usize,
    pub configuration_failures: usize,
    /// Layers whose update was skipped over all successful tracks.
    pub skipped_updates: usize,
    /// `None` if no track succeeded.
    pub residuals: Option<ResidualSummary>,
}

/// The part of a track's outcome a batch keeps.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackTally {
    skipped_updates: usize,
    residuals: Option<TrackResiduals>,
}

impl TrackTally {
    fn from_run(run: &TrackRun) -> Self {
        Self {
            skipped_updates: run.diagnostics.iter().filter(|d| d.update_skipped).count(),
            residuals: TrackResiduals::from_record(&run.record),
        }
    }
}

/// Runs `count` tracks with seeds `first_seed, first_seed + 1, ...` in
/// parallel. Failed tracks are counted, not propagated.
pub fn run_batch(scenario: &ScenarioConfig, first_seed: u64, count: usize) -> BatchSummary {
    // Each track is reduced to its tally on the worker; the dense paths are
    // dropped there.
    let outcomes: Vec<(u64, Result<TrackTally, TrackFitError>)> = (0..count)
        .into_par_iter()
        .map(|i| {
            let seed = first_seed.wrapping_add(i as u64);
            (seed, run_seeded(scenario, seed).map(|run| TrackTally::from_run(&run)))
        })
        .collect();

    let mut summary = BatchSummary {
        first_seed,
        attempted: count,
        succeeded: 0,
        domain_failures: 0,
        singular_failures: 0,
        configuration_failures: 0,
        skipped_updates: 0,
        residuals: None,
    };
    let mut residuals = Vec::with_capacity(count);

    for (seed, outcome) in outcomes {
        match outcome {
            Ok(tally) => {
                summary.succeeded += 1;
                summary.skipped_updates += tally.skipped_updates;
                match tally.residuals {
                    Some(r) => residuals.push(r),
                    None => debug!(seed, "no truth sample at some layer, residuals skipped"),
                }
            }
            Err(TrackFitError::Domain { x, phi }) => {
                summary.domain_failures += 1;
                warn!(seed, x, phi, "track left the model domain");
            }
            Err(TrackFitError::SingularMatrix { layer, value }) => {
                summary.singular_failures += 1;
                warn!(seed, layer, value, "track aborted on a singular update");
            }
            Err(TrackFitError::Configuration(e)) => {
                summary.configuration_failures += 1;
                warn!(seed, "track rejected: {e}");
            }
        }
    }
    summary.residuals = ResidualSummary::from_tracks(&residuals);

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        domain_failures = summary.domain_failures,
        singular_failures = summary.singular_failures,
        "batch complete"
    );
    summary
}

/// One scenario's result within a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub scenario: String,
    pub summary: BatchSummary,
}

/// Runs a batch study for every scenario under `root`, each starting at its
/// own configured seed. Scenarios that fail to load are logged and skipped.
pub fn run_sweep(root: &Path, count: usize) -> Vec<SweepEntry> {
    let mut entries = Vec::new();
    for found in discover_scenarios(root) {
        match load_scenario(Some(&found.path)) {
            Ok(scenario) => {
                info!("Sweeping scenario: '{}'", found.key);
                let summary = run_batch(&scenario, scenario.simulation.seed, count);
                entries.push(SweepEntry {
                    scenario: found.key,
                    summary,
                });
            }
            Err(e) => {
                error!("Failed to load scenario from {:?}: {}", found.path, e);
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FIXED_DRAWS: [f64; 12] = [
        0.8, -1.3, 0.4, 1.6, -0.7, -1.1, 1.2, -0.2, 0.9, -1.5, 0.6, -0.4,
    ];

    #[test]
    fn test_reference_scenario_shape() {
        let run = run_seeded(&ScenarioConfig::default(), 0).unwrap();
        let record = &run.record;

        assert_eq!(record.detector_layers.len(), 10);
        assert_eq!(record.hits.len(), 10);
        assert_eq!(record.kf_track.len(), 10);
        assert_eq!(run.diagnostics.len(), 10);
        for ((hit, fitted), &layer_x) in record
            .hits
            .iter()
            .zip(&record.kf_track)
            .zip(&record.detector_layers)
        {
            assert_eq!(hit.x, layer_x);
            assert_eq!(fitted.x, layer_x);
        }
        assert!(record.true_track.windows(2).all(|w| w[1].x > w[0].x));
        assert_eq!(record.true_track.last().unwrap().x, 100.0);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let scenario = ScenarioConfig::default();
        let a = run_seeded(&scenario, 17).unwrap();
        let b = run_seeded(&scenario, 17).unwrap();
        assert_eq!(a.record, b.record);
        assert_eq!(a.prior, b.prior);

        let c = run_seeded(&scenario, 18).unwrap();
        assert_ne!(a.record.hits, c.record.hits);
    }

    #[test]
    fn test_noise_is_consumed_hits_first_then_prior() {
        let mut noise = FixedSequenceNoise::new(FIXED_DRAWS.to_vec());
        let run = run_track(&ScenarioConfig::default(), &mut noise).unwrap();

        assert_eq!(noise.draws(), 12);
        assert_abs_diff_eq!(run.prior[IDX_Y], 5.0 + 5.0 * 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(run.prior[IDX_PHI], -0.2 + 0.1 * -0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_beats_hits_on_fixed_noise() {
        let mut noise = FixedSequenceNoise::new(FIXED_DRAWS.to_vec());
        let run = run_track(&ScenarioConfig::default(), &mut noise).unwrap();
        let residuals = TrackResiduals::from_record(&run.record).unwrap();

        assert!(residuals.mean_abs_fit < residuals.mean_abs_hit);
        assert_abs_diff_eq!(residuals.mean_abs_hit, 2.009_060_3, epsilon = 1e-6);
        assert_abs_diff_eq!(residuals.mean_abs_fit, 1.537_702_4, epsilon = 1e-6);
        assert!(residuals.fit_improves_last_layer());
    }

    #[test]
    fn test_invalid_scenario_fails_before_simulating() {
        let mut scenario = ScenarioConfig::default();
        scenario.filter.measurement_sigma = 0.0;
        let mut noise = FixedSequenceNoise::silent();

        let result = run_track(&scenario, &mut noise);
        assert!(matches!(result, Err(TrackFitError::Configuration(_))));
        assert_eq!(noise.draws(), 0);
    }

    #[test]
    fn test_track_tally_keeps_residuals_and_skips() {
        let mut noise = FixedSequenceNoise::new(FIXED_DRAWS.to_vec());
        let run = run_track(&ScenarioConfig::default(), &mut noise).unwrap();
        let tally = TrackTally::from_run(&run);

        assert_eq!(tally.skipped_updates, 0);
        assert_eq!(tally.residuals, TrackResiduals::from_record(&run.record));
        assert!(tally.residuals.is_some());
    }

    #[test]
    fn test_tiny_truth_step_fails_fast() {
        let mut scenario = ScenarioConfig::default();
        scenario.simulation.truth_step = 1e-18;

        assert!(matches!(
            run_seeded(&scenario, 0),
            Err(TrackFitError::Configuration(ConfigError::TooManyTruthSamples { .. }))
        ));
        let summary = run_batch(&scenario, 0, 4);
        assert_eq!(summary.configuration_failures, 4);
        assert!(summary.residuals.is_none());
    }

    #[test]
    fn test_batch_counts_domain_failures() {
        let mut scenario = ScenarioConfig::default();
        scenario.initial_state.phi = -1.5;

        let summary = run_batch(&scenario, 0, 8);
        assert_eq!(summary.attempted, 8);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.domain_failures, 8);
        assert!(summary.residuals.is_none());
    }

    #[test]
    fn test_batch_matches_individual_runs() {
        let scenario = ScenarioConfig::default();
        let summary = run_batch(&scenario, 100, 16);
        assert_eq!(summary.succeeded, 16);
        assert_eq!(summary.skipped_updates, 0);

        let tracks: Vec<TrackResiduals> = (100..116)
            .map(|seed| {
                let run = run_seeded(&scenario, seed).unwrap();
                TrackResiduals::from_record(&run.record).unwrap()
            })
            .collect();
        let expected = ResidualSummary::from_tracks(&tracks).unwrap();
        assert_eq!(summary.residuals, Some(expected));
    }
}
