//! # FA Tool Recommender
//!
//! Owns the live model and coordinates the train/infer contract:
//! 1. Load the labeled dataset
//! 2. Encode it through the feature pipeline (missing values filled with 0)
//! 3. Split into train/test partitions with a fixed seed
//! 4. Fit the random forest on the training partition
//! 5. Evaluate on the held-out partition
//! 6. Write a snapshot, then publish the new model
//!
//! The live model sits behind `RwLock<Option<Arc<TrainedModel>>>`. Readers
//! clone the `Arc` and predict outside the lock; training builds a complete
//! model first and swaps it in with one write, so a reader never sees a
//! forest paired with the wrong feature layout.

use crate::config::TrainingConfig;
use crate::error::{ModelError, Result};
use crate::forest::RandomForest;
use crate::metrics::{ClassificationReport, ConfusionMatrix, accuracy};
use crate::model::{PredictionResult, TrainedModel, TrainingReport, TrainingSummary};
use crate::snapshot;
use crate::split::train_test_split;
use data_loader::{DatasetError, Dataset, FA_TOOLS, RawRecord};
use pipeline::{FeaturePipeline, MISSING_FILL};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{info, instrument};

/// Recommends a formative-assessment tool from a student's attributes.
///
/// Construct once and share through `Arc`; every method takes `&self`.
pub struct FaRecommender {
    pipeline: FeaturePipeline,
    config: TrainingConfig,
    model: RwLock<Option<Arc<TrainedModel>>>,
}

impl FaRecommender {
    /// Create an Unloaded recommender using the standard pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self::with_pipeline(config, FeaturePipeline::standard())
    }

    pub fn with_pipeline(config: TrainingConfig, pipeline: FeaturePipeline) -> Self {
        Self {
            pipeline,
            config,
            model: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Default location used by [`Self::train`]
    pub fn snapshot_path(&self) -> &Path {
        &self.config.snapshot_path
    }

    pub fn is_loaded(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The live model, if any
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `model` live without writing a snapshot
    pub fn install(&self, model: TrainedModel) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(model));
    }

    /// Train a model and evaluate it without touching the live model.
    #[instrument(skip(self), fields(dataset = %dataset_path.display()))]
    pub fn fit(&self, dataset_path: &Path) -> Result<(TrainedModel, TrainingReport)> {
        self.config.validate()?;
        let start = Instant::now();

        let dataset = Dataset::load(dataset_path, &self.config.load)?;
        let split = train_test_split(dataset.len(), self.config.test_fraction, self.config.split_seed)?;

        let columns = dataset.feature_columns(&self.config.load);
        let records: Vec<RawRecord> = dataset.records().cloned().collect();
        let frame = self.pipeline.transform_batch(&columns, &records);
        if frame.feature_names.is_empty() {
            return Err(DatasetError::NoFeatureColumns {
                file: dataset_path.display().to_string(),
            }
            .into());
        }
        let matrix = frame.fill_missing(MISSING_FILL);
        let labels: Vec<&str> = dataset.labels().collect();

        let mut classes: Vec<String> = split.train.iter().map(|&i| labels[i].to_string()).collect();
        classes.sort();
        classes.dedup();
        let class_index = |label: &str| classes.binary_search_by(|c| c.as_str().cmp(label)).ok();

        let x_train: Vec<Vec<f64>> = split.train.iter().map(|&i| matrix[i].clone()).collect();
        let y_train: Vec<usize> = split
            .train
            .iter()
            .filter_map(|&i| class_index(labels[i]))
            .collect();

        let forest = RandomForest::fit(&x_train, &y_train, classes.len(), &self.config.forest)?;

        // Test labels unseen in training can never be predicted correctly
        let unseen = classes.len();
        let y_test: Vec<usize> = split
            .test
            .iter()
            .map(|&i| class_index(labels[i]).unwrap_or(unseen))
            .collect();
        let y_pred: Vec<usize> = split.test.iter().map(|&i| forest.predict(&matrix[i])).collect();
        let test_accuracy = accuracy(&y_test, &y_pred);

        let model = TrainedModel {
            forest,
            classes: classes.clone(),
            feature_names: frame.feature_names,
            fa_tools: FA_TOOLS.iter().map(|t| t.to_string()).collect(),
            summary: TrainingSummary {
                dataset: dataset_path.display().to_string(),
                n_train: split.train.len(),
                n_test: split.test.len(),
                accuracy: test_accuracy,
                seed: self.config.forest.seed,
                forest: self.config.forest.clone(),
            },
        };

        let report = TrainingReport {
            accuracy: test_accuracy,
            n_train: split.train.len(),
            n_test: split.test.len(),
            classification: ClassificationReport::new(&y_test, &y_pred, &classes),
            confusion: ConfusionMatrix::new(&y_test, &y_pred, &classes),
            classes,
            feature_importances: model.feature_importances(),
        };

        info!(
            "Trained on {} rows, accuracy {:.4} on {} held-out rows in {:.2?}",
            report.n_train,
            report.accuracy,
            report.n_test,
            start.elapsed()
        );
        Ok((model, report))
    }

    /// Train, publish and persist; returns held-out accuracy
    pub fn train(&self, dataset_path: &Path) -> Result<f64> {
        self.train_with_report(dataset_path).map(|report| report.accuracy)
    }

    /// Like [`Self::train`] but returns the full evaluation
    pub fn train_with_report(&self, dataset_path: &Path) -> Result<TrainingReport> {
        let (model, report) = self.fit(dataset_path)?;
        self.publish(model)?;
        Ok(report)
    }

    /// Snapshot `model` to the configured path, then make it live.
    ///
    /// If the write fails the previous model stays live.
    pub fn publish(&self, model: TrainedModel) -> Result<()> {
        snapshot::save_snapshot(&model, &self.config.snapshot_path)?;
        self.install(model);
        Ok(())
    }

    /// Recommend a tool for one student record
    pub fn predict(&self, record: &RawRecord) -> Result<PredictionResult> {
        let model = self.current().ok_or(ModelError::ModelNotLoaded)?;
        model.predict(&self.pipeline, record, self.config.strict_alignment)
    }

    /// Write the live model to `path`
    pub fn persist(&self, path: &Path) -> Result<()> {
        let model = self.current().ok_or(ModelError::ModelNotLoaded)?;
        snapshot::save_snapshot(&model, path)
    }

    /// Load a snapshot and publish it; `Ok(false)` if `path` does not exist
    pub fn restore(&self, path: &Path) -> Result<bool> {
        match snapshot::load_snapshot(path)? {
            Some(model) => {
                self.install(model);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Default for FaRecommender {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

