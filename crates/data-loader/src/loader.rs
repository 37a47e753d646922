//! Dataset loading and validation.
//!
//! Wraps the parser with the checks training relies on:
//! - the label column exists
//! - there is at least one data row
//! - at least one column is left once identifier/label columns are removed

use crate::error::{DatasetError, Result};
use crate::parser;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// How a dataset file should be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Column holding the ground-truth tool
    pub label_column: String,
    /// Field delimiter byte (`b','` for CSV, `b'\t'` for TSV)
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            label_column: LABEL_COLUMN.to_string(),
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Picks tab for `.tsv` files, comma otherwise
    pub fn for_path(path: &Path) -> Self {
        let tab = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        Self::default().with_delimiter(if tab { b'\t' } else { b',' })
    }

    /// True if the column is an identifier or label and must not become a feature
    pub fn is_non_feature(&self, column: &str) -> bool {
        column == self.label_column || NON_FEATURE_COLUMNS.contains(&column)
    }
}

impl Dataset {
    /// Load and validate a labeled dataset.
    ///
    /// This is the main entry point used by training.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        let table = parser::parse_labeled_table(path, &options.label_column, options.delimiter)?;
        let file = path.display().to_string();

        if table.rows.is_empty() {
            return Err(DatasetError::EmptyDataset { file });
        }

        if !table.columns.iter().any(|c| !options.is_non_feature(c)) {
            return Err(DatasetError::NoFeatureColumns { file });
        }

        let dataset = Dataset {
            source: path.to_path_buf(),
            columns: table.columns,
            label_column: options.label_column.clone(),
            examples: table.rows,
        };

        info!(
            "Loaded {} rows with {} columns from {}",
            dataset.len(),
            dataset.columns.len(),
            file
        );
        Ok(dataset)
    }

    /// Header columns that are candidates for features, in header order
    pub fn feature_columns(&self, options: &LoadOptions) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !options.is_non_feature(c))
            .cloned()
            .collect()
    }
}
