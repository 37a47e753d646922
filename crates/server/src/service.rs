//! # Assessment Service
//!
//! Async facade over the recommender and the rubric generator:
//! 1. Bootstrap the model (restore a snapshot, else train from the dataset)
//! 2. Recommend a tool for a student record
//! 3. Attach a rubric for the recommended tool when the request names an assessment
//! 4. Retrain on demand, optionally within a wall-clock budget
//!
//! Training is CPU-bound and runs on tokio's blocking pool. A budgeted
//! retrain that overruns is abandoned: its result is never installed, so
//! the live model stays whatever it was before the call.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use data_loader::{BLOOM_COLUMN, BloomLevel, RawRecord};
use ml_model::{FaRecommender, ModelError, PredictionResult, TrainingReport};
use rubric::Rubric;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Marks used for a rubric when the request does not say
pub const DEFAULT_TOTAL_MARKS: u32 = 20;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Retraining exceeded its budget; the live model was left untouched
    #[error("Training did not finish within {budget:?}")]
    TrainingTimeout { budget: Duration },

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// How the model came to be available at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BootstrapOutcome {
    Restored,
    Trained { accuracy: f64 },
    /// Neither a snapshot nor a dataset was found
    Unloaded,
}

/// A student's answers plus optional assessment details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub record: RawRecord,
    #[serde(default)]
    pub assessment_name: Option<String>,
    #[serde(default)]
    pub total_marks: Option<u32>,
    #[serde(default)]
    pub bloom_level: Option<String>,
}

impl AssessmentRequest {
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    pub fn with_assessment(mut self, name: impl Into<String>, total_marks: u32) -> Self {
        self.assessment_name = Some(name.into());
        self.total_marks = Some(total_marks);
        self
    }

    pub fn with_bloom_level(mut self, level: impl Into<String>) -> Self {
        self.bloom_level = Some(level.into());
        self
    }

    /// Requested Bloom level, else the record's, else Apply
    fn target_bloom_level(&self) -> String {
        self.bloom_level
            .clone()
            .or_else(|| {
                self.record
                    .get(BLOOM_COLUMN)
                    .and_then(|v| v.as_text())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| BloomLevel::Apply.label().to_string())
    }
}

/// Recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub prediction: PredictionResult,
    pub explanation: String,
    pub rubric: Option<Rubric>,
}

/// Shared service handle; clone the `Arc` it is usually wrapped in
pub struct AssessmentService {
    recommender: Arc<FaRecommender>,
    training_budget: Option<Duration>,
    retrain_lock: Mutex<()>,
}

impl AssessmentService {
    pub fn new(recommender: Arc<FaRecommender>) -> Self {
        Self {
            recommender,
            training_budget: None,
            retrain_lock: Mutex::new(()),
        }
    }

    /// Abandon retraining that takes longer than `budget`
    pub fn with_training_budget(mut self, budget: Duration) -> Self {
        self.training_budget = Some(budget);
        self
    }

    pub fn recommender(&self) -> &Arc<FaRecommender> {
        &self.recommender
    }

    /// Restore the configured snapshot, else train from `dataset` if it exists
    pub async fn bootstrap(&self, dataset: &Path) -> Result<BootstrapOutcome> {
        let recommender = self.recommender.clone();
        let restored = tokio::task::spawn_blocking(move || {
            let path = recommender.snapshot_path().to_path_buf();
            recommender.restore(&path)
        })
        .await
        .map_err(|e| ServiceError::TaskFailed(e.to_string()))??;

        if restored {
            info!("Model restored from {}", self.recommender.snapshot_path().display());
            return Ok(BootstrapOutcome::Restored);
        }

        if !dataset.exists() {
            warn!(
                "No snapshot at {} and no dataset at {}; model stays unloaded",
                self.recommender.snapshot_path().display(),
                dataset.display()
            );
            return Ok(BootstrapOutcome::Unloaded);
        }

        let report = self.retrain(dataset).await?;
        Ok(BootstrapOutcome::Trained {
            accuracy: report.accuracy,
        })
    }

    /// Train a replacement model and publish it if it finishes in time.
    ///
    /// Concurrent retrains run one after another.
    pub async fn retrain(&self, dataset: &Path) -> Result<TrainingReport> {
        let _guard = self.retrain_lock.lock().await;
        let start = Instant::now();

        let recommender = self.recommender.clone();
        let path: PathBuf = dataset.to_path_buf();
        let task = tokio::task::spawn_blocking(move || recommender.fit(&path));

        let joined = match self.training_budget {
            Some(budget) => match tokio::time::timeout(budget, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Retraining exceeded {budget:?}; keeping the current model");
                    return Err(ServiceError::TrainingTimeout { budget });
                }
            },
            None => task.await,
        };
        let (model, report) = joined.map_err(|e| ServiceError::TaskFailed(e.to_string()))??;

        let recommender = self.recommender.clone();
        tokio::task::spawn_blocking(move || recommender.publish(model))
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))??;

        info!(
            "Retrained model in {:.2?} (accuracy {:.4})",
            start.elapsed(),
            report.accuracy
        );
        Ok(report)
    }

    /// Recommend a tool, with a rubric when an assessment is named
    pub fn recommend(&self, request: &AssessmentRequest) -> Result<AssessmentResponse> {
        let prediction = self.recommender.predict(&request.record)?;
        let explanation = format!(
            "Recommended based on ML model ({:.0}% confidence)",
            prediction.confidence * 100.0
        );

        let rubric = request.assessment_name.as_deref().map(|name| {
            rubric::generate(
                name,
                &prediction.predicted_tool,
                request.total_marks.unwrap_or(DEFAULT_TOTAL_MARKS),
                &request.target_bloom_level(),
            )
        });

        Ok(AssessmentResponse {
            prediction,
            explanation,
            rubric,
        })
    }

    pub fn rubric(&self, assessment_name: &str, fa_tool: &str, total_marks: u32, bloom_level: &str) -> Rubric {
        rubric::generate(assessment_name, fa_tool, total_marks, bloom_level)
    }
}
