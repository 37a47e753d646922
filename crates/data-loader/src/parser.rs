//! Parser for delimited survey datasets.
//!
//! Expected layout is a header row followed by one row per student, e.g.:
//!
//! ```text
//! StudentID,Year,LearningStyle,ConfidenceLevel,BloomLevel,PreferredTool
//! S001,2nd Year,Visual,4,Apply,Quiz
//! ```
//!
//! Cells are interpreted with [`AttributeValue::parse_cell`]; the label column
//! is kept as a trimmed string.

use crate::error::{DatasetError, Result};
use crate::types::*;
use std::path::Path;
use tracing::debug;

/// Header plus labeled rows read from one file
#[derive(Debug)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<LabeledRecord>,
}

fn file_name(path: &Path) -> String {
    path.display().to_string()
}

/// Parse a delimited file whose header contains `label_column`.
///
/// Fails with:
/// - `FileNotFound` if the path does not exist
/// - `MissingLabelColumn` if the header lacks the label column
/// - `ParseError` for ragged rows, invalid UTF-8 or an empty label cell
pub fn parse_labeled_table(path: &Path, label_column: &str, delimiter: u8) -> Result<ParsedTable> {
    let file = file_name(path);
    if !path.exists() {
        return Err(DatasetError::FileNotFound { path: file });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(&file, e, 1))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&file, e, 1))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let label_idx = columns
        .iter()
        .position(|c| c == label_column)
        .ok_or_else(|| DatasetError::MissingLabelColumn {
            column: label_column.to_string(),
            file: file.clone(),
        })?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1
        let fallback_line = idx + 2;
        let record = result.map_err(|e| csv_error(&file, e, fallback_line))?;
        let line_no = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        if record.iter().all(|cell| cell.is_empty()) {
            continue; // Skip blank lines
        }

        let label = record
            .get(label_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DatasetError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Missing {}", label_column),
            })?;

        let mut raw = RawRecord::new();
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx == label_idx {
                continue;
            }
            if let Some(value) = AttributeValue::parse_cell(cell) {
                raw.insert(columns[col_idx].clone(), value);
            }
        }

        rows.push(LabeledRecord {
            record: raw,
            label: label.to_string(),
        });
    }

    debug!("Parsed {} rows from {}", rows.len(), file);
    Ok(ParsedTable { columns, rows })
}

/// Convert a csv error into our taxonomy, keeping I/O failures distinct
fn csv_error(file: &str, err: csv::Error, fallback_line: usize) -> DatasetError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return DatasetError::IoError(io);
        }
        return DatasetError::ParseError {
            file: file.to_string(),
            line,
            reason: "I/O failure".to_string(),
        };
    }
    DatasetError::ParseError {
        file: file.to_string(),
        line,
        reason: err.to_string(),
    }
}
