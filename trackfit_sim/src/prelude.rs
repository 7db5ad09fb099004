// trackfit_sim/src/prelude.rs

// Re-export the entire trackfit_core prelude so you can easily access
// pure types like `State`, `MotionModel`, `ExtendedKalmanFilter`, etc.
pub use trackfit_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{discover_scenarios, load_scenario, ScenarioEntry};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::error::SimulationError;
pub use crate::simulation::metrics::{ResidualSummary, TrackResiduals};
pub use crate::simulation::output::{emit_json, write_json, SimulationRecord};
pub use crate::simulation::runner::{
    run_batch, run_seeded, run_sweep, run_track, BatchSummary, SweepEntry, TrackRun,
};
pub use crate::simulation::trajectory::{SimulatedEvent, TrajectorySimulator};
