//! Errors raised while rendering rubrics.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RubricError {
    #[error("Unknown rubric format '{0}' (expected text, json or html)")]
    UnknownFormat(String),

    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RubricError>;
