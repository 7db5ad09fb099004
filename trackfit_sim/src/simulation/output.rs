// trackfit_sim/src/simulation/output.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use trackfit_core::prelude::{FittedPoint, Hit, TruePathPoint};

use crate::simulation::error::SimulationError;

/// The record of one run, as handed to plotting and analysis tools.
/// All sequences are ordered by increasing `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub detector_layers: Vec<f64>,
    pub true_track: Vec<TruePathPoint>,
    pub hits: Vec<Hit>,
    pub kf_track: Vec<FittedPoint>,
}

/// Serializes `value` as JSON into `writer`, followed by a newline.
pub fn write_json<T: Serialize, W: Write>(
    value: &T,
    mut writer: W,
    pretty: bool,
) -> Result<(), SimulationError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes to `path` if given, else to stdout.
pub fn emit_json<T: Serialize>(
    value: &T,
    path: Option<&Path>,
    pretty: bool,
) -> Result<(), SimulationError> {
    match path {
        Some(path) => write_json(value, BufWriter::new(File::create(path)?), pretty),
        None => write_json(value, io::stdout().lock(), pretty),
    }
}
