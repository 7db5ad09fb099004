// trackfit_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod error;
pub mod metrics;
pub mod output;
pub mod runner;
pub mod trajectory;
