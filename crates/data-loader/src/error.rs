//! Error types for the data-loader crate.
//!
//! Every failure that can happen while reading a labeled dataset surfaces as a
//! [`DatasetError`]. Training aborts on any of them and hands the error back to
//! the caller unchanged.

use thiserror::Error;

/// Errors that can occur during dataset loading and parsing
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// File could not be found
    #[error("Dataset file not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A row in the data file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// The designated label column is absent from the header
    #[error("Label column '{column}' not found in {file}")]
    MissingLabelColumn { column: String, file: String },

    /// Header was read but no data rows followed
    #[error("Dataset {file} contains no rows")]
    EmptyDataset { file: String },

    /// Every column was an identifier or label column
    #[error("Dataset {file} has no feature columns")]
    NoFeatureColumns { file: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DatasetError>;
