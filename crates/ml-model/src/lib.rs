//! # ML Model Crate
//!
//! Random-forest recommendation of formative-assessment tools.
//!
//! ## Main Components
//!
//! - **tree** / **forest**: CART trees (Gini impurity) bagged into a seeded forest
//! - **split**: Seeded train/test partitioning
//! - **metrics**: Accuracy, classification report, confusion matrix
//! - **model**: `TrainedModel` and prediction/report types
//! - **snapshot**: Versioned JSON persistence with atomic replacement
//! - **recommender**: `FaRecommender`, the Unloaded/Loaded state machine
//!
//! ## Example Usage
//!
//! ```ignore
//! use ml_model::{FaRecommender, TrainingConfig};
//! use std::path::Path;
//!
//! let recommender = FaRecommender::new(TrainingConfig::default());
//! if !recommender.restore(recommender.snapshot_path())? {
//!     recommender.train(Path::new("data/dataset.csv"))?;
//! }
//! let result = recommender.predict(&record)?;
//! println!("{} ({:.2})", result.predicted_tool, result.confidence);
//! ```

pub mod config;
pub mod error;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod recommender;
pub mod snapshot;
pub mod split;
pub mod tree;

pub use config::{DEFAULT_DATASET_PATH, DEFAULT_SNAPSHOT_PATH, TrainingConfig};
pub use error::{ModelError, Result};
pub use forest::{ForestConfig, MaxFeatures, RandomForest};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix, UNSEEN_CLASS};
pub use model::{PredictionResult, TrainedModel, TrainingReport, TrainingSummary};
pub use recommender::FaRecommender;
