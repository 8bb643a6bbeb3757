//! Read/write result JSON files.
//!
//! Result JSON is the "portable" representation of a sequential build:
//! - run metadata (formula, exposure, predictor chain, engine, level)
//! - the tidy rows
//!
//! The schema is defined by [`ResultFile`].

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::{EngineKind, ResultRow, ResultTable};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub tool: String,
    pub generated_at: String,
    pub formula: String,
    pub exposure: Option<String>,
    pub chain: Vec<String>,
    pub engine: EngineKind,
    pub confidence_level: f64,
}

impl RunMetadata {
    pub fn new(
        formula: &str,
        exposure: Option<&str>,
        chain: &[String],
        engine: EngineKind,
        confidence_level: f64,
    ) -> Self {
        Self {
            tool: "seqmod".to_string(),
            generated_at: Local::now().to_rfc3339(),
            formula: formula.to_string(),
            exposure: exposure.map(str::to_string),
            chain: chain.to_vec(),
            engine,
            confidence_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub meta: RunMetadata,
    pub rows: Vec<ResultRow>,
}

/// Write a result JSON file.
pub fn write_results_json(path: &Path, meta: RunMetadata, table: &ResultTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    let doc = ResultFile {
        meta,
        rows: table.rows().to_vec(),
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))
}
