//! Training configuration.

use crate::error::{ModelError, Result};
use crate::forest::ForestConfig;
use data_loader::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where snapshots are written unless configured otherwise
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/fa_model.json";

/// Training data read at startup when no model snapshot exists
pub const DEFAULT_DATASET_PATH: &str = "data/dataset.csv";

/// Everything `train` needs besides the dataset path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub load: LoadOptions,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    pub split_seed: u64,
    pub forest: ForestConfig,
    /// Reject records that share no column with the trained layout
    pub strict_alignment: bool,
    pub snapshot_path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            test_fraction: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
            strict_alignment: false,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl TrainingConfig {
    /// Seed both the split and the forest
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self.forest.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_strict_alignment(mut self, strict: bool) -> Self {
        self.strict_alignment = strict;
        self
    }

    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.load.label_column.is_empty() {
            return Err(ModelError::InvalidConfig("label column name is empty".into()));
        }
        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.load.label_column, "PreferredTool");
        assert!(!config.strict_alignment);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_seed_sets_both() {
        let config = TrainingConfig::default().with_seed(7);
        assert_eq!(config.split_seed, 7);
        assert_eq!(config.forest.seed, 7);
    }

    #[test]
    fn test_validate_rejects_fraction() {
        let config = TrainingConfig::default().with_test_fraction(0.0);
        assert!(matches!(config.validate(), Err(ModelError::InvalidConfig(_))));
    }
}
