// trackfit_sim/src/simulation/metrics.rs

use serde::Serialize;
use trackfit_core::prelude::TruePathPoint;

use crate::simulation::output::SimulationRecord;

/// Layer positions and truth samples are compared with this tolerance.
const X_MATCH_TOLERANCE: f64 = 1e-9;

/// The true `y` at longitudinal position `x`, if the dense path sampled it.
pub fn truth_at(true_track: &[TruePathPoint], x: f64) -> Option<f64> {
    let index = true_track.partition_point(|p| p.x < x - X_MATCH_TOLERANCE);
    true_track
        .get(index)
        .filter(|p| (p.x - x).abs() <= X_MATCH_TOLERANCE)
        .map(|p| p.y)
}

/// Absolute residuals against the ground truth for one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackResiduals {
    pub mean_abs_hit: f64,
    pub mean_abs_fit: f64,
    pub last_abs_hit: f64,
    pub last_abs_fit: f64,
}

impl TrackResiduals {
    /// `None` if the record is empty or a layer was not sampled by the truth.
    pub fn from_record(record: &SimulationRecord) -> Option<Self> {
        let mut hit_errors = Vec::with_capacity(record.hits.len());
        let mut fit_errors = Vec::with_capacity(record.kf_track.len());

        for (hit, fitted) in record.hits.iter().zip(&record.kf_track) {
            let truth = truth_at(&record.true_track, hit.x)?;
            hit_errors.push((hit.y - truth).abs());
            fit_errors.push((fitted.y - truth).abs());
        }

        Some(Self {
            mean_abs_hit: mean(&hit_errors)?,
            mean_abs_fit: mean(&fit_errors)?,
            last_abs_hit: *hit_errors.last()?,
            last_abs_fit: *fit_errors.last()?,
        })
    }

    /// Whether the fit beats the raw hit at the last layer.
    pub fn fit_improves_last_layer(&self) -> bool {
        self.last_abs_fit < self.last_abs_hit
    }
}

/// Residuals averaged over the successful tracks of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualSummary {
    pub mean_abs_hit: f64,
    pub mean_abs_fit: f64,
    pub mean_abs_last_hit: f64,
    pub mean_abs_last_fit: f64,
    /// Fraction of tracks whose fitted last-layer point is closer to the truth
    /// than the raw hit.
    pub last_layer_improvement_rate: f64,
}

impl ResidualSummary {
    pub fn from_tracks(tracks: &[TrackResiduals]) -> Option<Self> {
        let field = |f: fn(&TrackResiduals) -> f64| mean(&tracks.iter().map(f).collect::<Vec<_>>());
        let improved = tracks.iter().filter(|t| t.fit_improves_last_layer()).count();

        Some(Self {
            mean_abs_hit: field(|t| t.mean_abs_hit)?,
            mean_abs_fit: field(|t| t.mean_abs_fit)?,
            mean_abs_last_hit: field(|t| t.last_abs_hit)?,
            mean_abs_last_fit: field(|t| t.last_abs_fit)?,
            last_layer_improvement_rate: improved as f64 / tracks.len() as f64,
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
