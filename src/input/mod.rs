//! Row sources for the analysis engine.
//!
//! Rows can come from a CSV file, a JSON array of objects, or the
//! built-in sample set. Loaders coerce cells into typed values and cap the
//! number of rows; the engine re-checks types on its own.

use crate::models::{FieldValue, Record};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default cap on the number of rows handed to the engine.
pub const DEFAULT_MAX_ROWS: usize = 20;

/// Errors raised while loading rows.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of records")]
    NotAnArray,

    #[error("row {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Rows loaded from a source, after the row cap was applied.
#[derive(Debug, Clone)]
pub struct LoadedRows {
    pub rows: Vec<Record>,
    /// Rows discarded because of the cap.
    pub dropped: usize,
}

impl LoadedRows {
    /// Applies `max_rows` to `rows`.
    pub fn capped(mut rows: Vec<Record>, max_rows: usize) -> Self {
        let dropped = rows.len().saturating_sub(max_rows);
        if dropped > 0 {
            warn!(
                "Input has {} rows; only the first {} are analyzed",
                rows.len(),
                max_rows
            );
            rows.truncate(max_rows);
        }
        Self { rows, dropped }
    }
}

/// The built-in demo rows.
pub fn sample_rows() -> Vec<Record> {
    vec![
        Record::new()
            .with("id", 1.0)
            .with("name", "Entry A")
            .with("value", 75.0)
            .with("note", "good"),
        Record::new()
            .with("id", 2.0)
            .with("name", "Entry B")
            .with("value", 20.0)
            .with("note", "bad"),
        Record::new()
            .with("id", 3.0)
            .with("name", "Entry C")
            .with("value", 50.0)
            .with("note", "ok"),
    ]
}

/// Load rows from `path`, picking the parser by file extension.
///
/// `.json` files are parsed as a JSON array; anything else is read as CSV.
pub fn load_rows(path: &Path, max_rows: usize) -> Result<LoadedRows, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let rows = if is_json {
        parse_json(&text)?
    } else {
        parse_csv(&text)
    };
    debug!("Parsed {} rows from {}", rows.len(), path.display());

    Ok(LoadedRows::capped(rows, max_rows))
}

/// Parse simple comma-separated text with a header line.
///
/// Every row gets an `id` field holding its 1-based line number (blank
/// lines excluded). Quoted cells are not supported.
pub fn parse_csv(text: &str) -> Vec<Record> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some(line) => line.split(',').map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    lines
        .enumerate()
        .map(|(i, line)| {
            let mut record = Record::new().with("id", (i + 1) as f64);
            for (idx, cell) in line.split(',').enumerate() {
                let key = match header.get(idx) {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => format!("c{}", idx),
                };
                record.insert(&key, coerce_cell(cell));
            }
            record
        })
        .collect()
}

/// Coerce a raw CSV cell: empty becomes null, numeric text becomes a number.
pub fn coerce_cell(cell: &str) -> FieldValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return FieldValue::Null;
    }

    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => FieldValue::Number(n),
        _ => FieldValue::Text(cell.to_string()),
    }
}

/// Parse a JSON array of flat objects.
pub fn parse_json(text: &str) -> Result<Vec<Record>, InputError> {
    let value: Value = serde_json::from_str(text)?;
    let items = value.as_array().ok_or(InputError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<Record, InputError> {
            let object = item
                .as_object()
                .ok_or(InputError::NotAnObject { index: i + 1 })?;
            let mut record = Record::new();
            for (key, value) in object {
                record.insert(key, json_to_field(value));
            }
            Ok(record)
        })
        .collect()
}

fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
        Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}
