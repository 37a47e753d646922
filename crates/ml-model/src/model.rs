//! The trained model bundle and the values it produces.

use crate::error::{ModelError, Result};
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics::{ClassificationReport, ConfusionMatrix};
use data_loader::RawRecord;
use pipeline::FeaturePipeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Facts about the training run stored alongside the forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub dataset: String,
    pub n_train: usize,
    pub n_test: usize,
    pub accuracy: f64,
    pub seed: u64,
    /// Hyperparameters the forest was grown with
    pub forest: ForestConfig,
}

/// A forest together with the layout and vocabulary it was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub forest: RandomForest,
    /// Sorted distinct labels seen in training; index = class index
    pub classes: Vec<String>,
    /// Feature layout, in training column order
    pub feature_names: Vec<String>,
    /// Fixed tool catalogue
    pub fa_tools: Vec<String>,
    pub summary: TrainingSummary,
}

/// One recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_tool: String,
    /// Probability of `predicted_tool`
    pub confidence: f64,
    /// Probability per training class
    pub all_probabilities: BTreeMap<String, f64>,
}

impl PredictionResult {
    /// Classes ordered by descending probability
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .all_probabilities
            .iter()
            .map(|(tool, p)| (tool.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Held-out evaluation of a freshly trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub classes: Vec<String>,
    pub classification: ClassificationReport,
    pub confusion: ConfusionMatrix,
    /// Feature name and importance, most important first
    pub feature_importances: Vec<(String, f64)>,
}

impl TrainedModel {
    /// Predict for one record.
    ///
    /// The record is reindexed to `feature_names`; absent columns count as
    /// missing. With `strict`, a record that shares no column with the
    /// layout is rejected instead of predicted from an all-missing vector.
    pub fn predict(&self, pipeline: &FeaturePipeline, record: &RawRecord, strict: bool) -> Result<PredictionResult> {
        let aligned = pipeline.transform_aligned(record, &self.feature_names);
        if aligned.has_no_overlap() {
            if strict {
                return Err(ModelError::FeatureMismatch {
                    expected: self.feature_names.clone(),
                });
            }
            warn!(
                "Record shares no columns with the trained layout; predicting from missing values only"
            );
        }

        let proba = self.forest.predict_proba(&aligned.values);
        let best = crate::forest::argmax(&proba);

        Ok(PredictionResult {
            predicted_tool: self.classes[best].clone(),
            confidence: proba[best],
            all_probabilities: self.classes.iter().cloned().zip(proba).collect(),
        })
    }

    /// Importance per feature, most important first
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.forest.feature_importances())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
