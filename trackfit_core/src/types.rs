// trackfit_core/src/types.rs

use nalgebra::{Matrix1, Matrix1x2, Matrix2, Vector1, Vector2};
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
// Everything in the per-layer loop is statically sized, so no step of the
// filter touches the heap.

/// Track state `[y, phi]`: lateral offset and local trajectory angle at a
/// longitudinal position `x`.
pub type State = Vector2<f64>;
/// The 2x2 state covariance `P`.
pub type Covariance = Matrix2<f64>;
/// Linearized transport matrix `F = ∂f/∂x` of the motion model.
pub type Jacobian = Matrix2<f64>;
/// Kalman gain for a scalar observation.
pub type Gain = Vector2<f64>;
/// A single-layer observation `z`.
pub type Observation = Vector1<f64>;
/// Observation matrix `H`.
pub type ObservationMatrix = Matrix1x2<f64>;
/// Observation noise `R` (also the shape of the innovation covariance `S`).
pub type ObservationNoise = Matrix1<f64>;

/// Index of the lateral offset in [`State`].
pub const IDX_Y: usize = 0;
/// Index of the trajectory angle in [`State`].
pub const IDX_PHI: usize = 1;

/// The longitudinal position at which the initial track state is defined.
pub const TRACK_ORIGIN_X: f64 = 0.0;

/// An `(x, y)` sample in the bending plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

impl TrackPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A measured lateral position on a detector layer.
pub type Hit = TrackPoint;
/// One sample of the dense ground-truth path. Display only.
pub type TruePathPoint = TrackPoint;
/// The filtered lateral position on a detector layer.
pub type FittedPoint = TrackPoint;
