//! Parameter files.
//!
//! A parameter file is `ScreenParameters` as JSON. Axes are validated on load so a
//! bad file fails before any computation starts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::ScreenError;
use crate::sweep::ScreenParameters;

pub fn load_params(path: &Path) -> Result<ScreenParameters, ScreenError> {
    let file = File::open(path)
        .map_err(|e| ScreenError::Io(format!("Failed to open parameter file '{}': {e}", path.display())))?;
    let params: ScreenParameters = serde_json::from_reader(file)
        .map_err(|e| ScreenError::Io(format!("Invalid parameter file '{}': {e}", path.display())))?;
    params.slope.validate()?;
    params.pipe.validate()?;
    info!(path = %path.display(), project = %params.project_name, "parameters loaded");
    Ok(params)
}

pub fn write_params(path: &Path, params: &ScreenParameters) -> Result<(), ScreenError> {
    let file = File::create(path)
        .map_err(|e| ScreenError::Io(format!("Failed to create parameter file '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, params)
        .map_err(|e| ScreenError::Io(format!("Failed to write parameter file: {e}")))?;
    out.flush()
        .map_err(|e| ScreenError::Io(format!("Failed to flush parameter file: {e}")))
}

pub fn params_to_json(params: &ScreenParameters) -> Result<String, ScreenError> {
    serde_json::to_string_pretty(params).map_err(|e| ScreenError::Io(format!("Failed to encode parameters: {e}")))
}
