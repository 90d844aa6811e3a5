//! Read/write decision-matrix JSON files.
//!
//! Matrix JSON is the complete, re-loadable result of a run:
//! - run metadata (tool, generation time, project)
//! - every decision record and skipped pipe evaluation
//! - the summary statistics

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::DecisionMatrix;
use crate::error::ScreenError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub project_name: String,
    pub matrix: DecisionMatrix,
}

impl MatrixFile {
    pub fn new(project_name: impl Into<String>, matrix: DecisionMatrix) -> Self {
        Self {
            tool: "pgd".to_string(),
            generated_at: Utc::now(),
            project_name: project_name.into(),
            matrix,
        }
    }
}

/// Write a matrix JSON file.
pub fn write_matrix_json(path: &Path, file: &MatrixFile) -> Result<(), ScreenError> {
    let out = File::create(path)
        .map_err(|e| ScreenError::Io(format!("Failed to create matrix JSON '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut out, file)
        .map_err(|e| ScreenError::Io(format!("Failed to write matrix JSON: {e}")))?;
    out.flush()
        .map_err(|e| ScreenError::Io(format!("Failed to flush matrix JSON: {e}")))
}

/// Read a matrix JSON file.
pub fn read_matrix_json(path: &Path) -> Result<MatrixFile, ScreenError> {
    let file = File::open(path)
        .map_err(|e| ScreenError::Io(format!("Failed to open matrix JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| ScreenError::Io(format!("Invalid matrix JSON: {e}")))
}
