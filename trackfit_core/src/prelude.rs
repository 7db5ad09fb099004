// trackfit_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::TrackEstimator;
pub use crate::models::measurement::MeasurementModel;
pub use crate::models::motion::MotionModel;
pub use crate::noise::NoiseSource;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::detector::DetectorGeometry;
pub use crate::error::{ConfigError, TrackFitError};
pub use crate::estimation::FilterState;
pub use crate::types::{
    Covariance, FittedPoint, Hit, State, TrackPoint, TruePathPoint, IDX_PHI, IDX_Y,
};

// --- Estimation Algorithms ---
pub use crate::estimation::ekf::{ekf_predict, ekf_update, EkfPredictParams, EkfUpdateParams};
pub use crate::estimation::filters::ekf::{
    ExtendedKalmanFilter, FittedTrack, KalmanFilterConfig, LayerDiagnostics, SingularUpdatePolicy,
};

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::measurement::layer::LayerHitModel;
pub use crate::models::motion::helix::{HelixSmallStepModel, TrackPhysics};
pub use crate::noise::FixedSequenceNoise;
