//! Versioned on-disk snapshots of a trained model.
//!
//! A snapshot is a single JSON document. Writes go to a temporary file in the
//! destination directory which is then renamed over the target, so readers
//! never observe a half-written snapshot.

use crate::error::{ModelError, Result};
use crate::forest::RandomForest;
use crate::model::{TrainedModel, TrainingSummary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const SNAPSHOT_FORMAT: &str = "fa-recommender/model-snapshot";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    format: String,
    schema_version: u32,
    feature_names: Vec<String>,
    fa_tools: Vec<String>,
    classes: Vec<String>,
    forest: RandomForest,
    summary: TrainingSummary,
}

/// Read first so an old schema is reported as such rather than as a parse error
#[derive(Deserialize)]
struct SnapshotHeader {
    format: String,
    schema_version: u32,
}

/// Write `model` to `path`, creating parent directories as needed
pub fn save_snapshot(model: &TrainedModel, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ModelError::io(dir, e))?;

    let snapshot = Snapshot {
        format: SNAPSHOT_FORMAT.to_string(),
        schema_version: SCHEMA_VERSION,
        feature_names: model.feature_names.clone(),
        fa_tools: model.fa_tools.clone(),
        classes: model.classes.clone(),
        forest: model.forest.clone(),
        summary: model.summary.clone(),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(|e| ModelError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush().map_err(|e| ModelError::io(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| ModelError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| ModelError::io(path, e.error))?;

    info!(
        "Saved model snapshot to {} ({} trees, {} classes)",
        path.display(),
        model.forest.n_trees(),
        model.classes.len()
    );
    Ok(())
}

/// Read a snapshot.
///
/// Returns `Ok(None)` when `path` does not exist and
/// [`ModelError::SnapshotIncompatible`] when it exists but cannot be used.
pub fn load_snapshot(path: &Path) -> Result<Option<TrainedModel>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No snapshot at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(ModelError::io(path, e)),
    };

    let incompatible = |reason: String| ModelError::SnapshotIncompatible {
        path: path.to_path_buf(),
        reason,
    };

    let header: SnapshotHeader =
        serde_json::from_slice(&bytes).map_err(|e| incompatible(format!("unreadable header: {e}")))?;
    if header.format != SNAPSHOT_FORMAT {
        return Err(incompatible(format!("unexpected format {:?}", header.format)));
    }
    if header.schema_version != SCHEMA_VERSION {
        return Err(incompatible(format!(
            "schema version {} (expected {SCHEMA_VERSION})",
            header.schema_version
        )));
    }

    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|e| incompatible(format!("malformed body: {e}")))?;

    if snapshot.forest.n_features() != snapshot.feature_names.len() {
        return Err(incompatible(format!(
            "forest expects {} features but {} feature names are stored",
            snapshot.forest.n_features(),
            snapshot.feature_names.len()
        )));
    }
    if snapshot.forest.n_classes() != snapshot.classes.len() {
        return Err(incompatible(format!(
            "forest predicts {} classes but {} class names are stored",
            snapshot.forest.n_classes(),
            snapshot.classes.len()
        )));
    }
    if !snapshot.forest.is_consistent() {
        return Err(incompatible("forest structure is inconsistent".to_string()));
    }

    info!(
        "Restored model snapshot from {} ({} features, {} classes)",
        path.display(),
        snapshot.feature_names.len(),
        snapshot.classes.len()
    );

    Ok(Some(TrainedModel {
        forest: snapshot.forest,
        classes: snapshot.classes,
        feature_names: snapshot.feature_names,
        fa_tools: snapshot.fa_tools,
        summary: snapshot.summary,
    }))
}
