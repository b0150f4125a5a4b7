//! Read/write fit report JSON files.
//!
//! A report is the portable representation of a fit:
//! - sample/parameter counts, residual variance, R²
//! - the coefficient table
//! - the interval table for the requested query points
//!
//! The schema is defined by `domain::FitReport`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote fit report");
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: FitReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
