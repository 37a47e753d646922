//! Errors raised by training, inference and persistence.

use data_loader::DatasetError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when training, querying or persisting the model
#[derive(Error, Debug)]
pub enum ModelError {
    /// The training dataset was missing, unreadable or malformed
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// `predict`/`persist` called before any successful `train` or `restore`
    #[error("Model not loaded: train or restore a model first")]
    ModelNotLoaded,

    /// Filesystem failure while persisting or restoring a snapshot
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot exists but was written by an incompatible schema, or its
    /// parts disagree with each other
    #[error("Incompatible snapshot {}: {reason}", .path.display())]
    SnapshotIncompatible { path: PathBuf, reason: String },

    /// Record shares no column with the trained layout (strict mode only)
    #[error("Record shares no columns with the trained feature layout {expected:?}")]
    FeatureMismatch { expected: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ModelError>;
