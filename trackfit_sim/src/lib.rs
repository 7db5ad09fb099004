// trackfit_sim/src/lib.rs

//! Simulation and study harness around `trackfit_core`: seeded noise,
//! ground-truth and hit generation, scenario files, batch studies and JSON
//! output.

// This prelude is for convenience for other files WITHIN the trackfit_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;
