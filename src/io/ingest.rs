//! CSV ingest.
//!
//! Turns a CSV with a header row into aligned predictor columns, responses and
//! optional weights that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for the named columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;

use crate::domain::{FitConfig, UncertaintyKind};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: aligned columns + row errors.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub predictor_names: Vec<String>,
    /// Predictor columns, in the order of `predictor_names`.
    pub predictors: Vec<Vec<f64>>,
    pub observations: Vec<f64>,
    /// Inverse-variance weights (converted from σ when needed).
    pub weights: Option<Vec<f64>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    pub fn rows_used(&self) -> usize {
        self.observations.len()
    }
}

/// Load the CSV named by `config`.
pub fn load_dataset(config: &FitConfig) -> Result<Dataset, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.csv_path.display()),
        )
    })?;
    read_dataset(file, config)
}

/// Parse a dataset from any reader (used by [`load_dataset`] and tests).
pub fn read_dataset<R: Read>(input: R, config: &FitConfig) -> Result<Dataset, AppError> {
    if config.predictors.is_empty() {
        return Err(AppError::new(2, "At least one predictor column is required."));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    // Resolve every requested column up front for clearer errors.
    let response_idx = column_index(&header_map, &config.response)?;
    let predictor_idx = config
        .predictors
        .iter()
        .map(|name| column_index(&header_map, name))
        .collect::<Result<Vec<_>, _>>()?;
    let uncertainty_idx = match &config.uncertainty {
        Some((name, kind)) => Some((column_index(&header_map, name)?, *kind)),
        None => None,
    };

    let mut predictors = vec![Vec::new(); predictor_idx.len()];
    let mut observations = Vec::new();
    let mut weights = uncertainty_idx.map(|_| Vec::new());
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &headers, response_idx, &predictor_idx, uncertainty_idx) {
            Ok((xs, y, w)) => {
                for (col, x) in predictors.iter_mut().zip(xs) {
                    col.push(x);
                }
                observations.push(y);
                if let (Some(ws), Some(w)) = (weights.as_mut(), w) {
                    ws.push(w);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        tracing::warn!(line = err.line, "skipped row: {}", err.message);
    }

    if observations.is_empty() {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    Ok(Dataset {
        predictor_names: config.predictors.clone(),
        predictors,
        observations,
        weights,
        row_errors,
        rows_read,
    })
}

type ParsedRow = (Vec<f64>, f64, Option<f64>);

fn parse_row(
    record: &StringRecord,
    headers: &StringRecord,
    response_idx: usize,
    predictor_idx: &[usize],
    uncertainty_idx: Option<(usize, UncertaintyKind)>,
) -> Result<ParsedRow, String> {
    let xs = predictor_idx
        .iter()
        .map(|&i| get_f64(record, headers, i))
        .collect::<Result<Vec<_>, _>>()?;
    let y = get_f64(record, headers, response_idx)?;

    let w = match uncertainty_idx {
        None => None,
        Some((i, kind)) => {
            let v = get_f64(record, headers, i)?;
            if v <= 0.0 {
                return Err(format!(
                    "Column `{}` must be > 0, got {v}",
                    headers.get(i).unwrap_or("?")
                ));
            }
            let w = match kind {
                UncertaintyKind::Weight => v,
                UncertaintyKind::Sigma => 1.0 / (v * v),
            };
            // 1/σ² overflows for tiny σ and underflows to 0 for huge σ.
            if !(w.is_finite() && w > 0.0) {
                return Err(format!(
                    "Column `{}` value {v} gives unusable weight {w}",
                    headers.get(i).unwrap_or("?")
                ));
            }
            Some(w)
        }
    };

    Ok((xs, y, w))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM on the first header, as written by some spreadsheet exports.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn get_f64(record: &StringRecord, headers: &StringRecord, idx: usize) -> Result<f64, String> {
    let name = headers.get(idx).unwrap_or("?");
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}' in `{name}`"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{raw}' in `{name}`"))
    }
}
