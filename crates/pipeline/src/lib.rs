//! Feature pipeline for student learning records.
//!
//! This crate provides:
//! - AttributeEncoder trait and implementations for per-column encoding
//! - FeaturePipeline for composing encoders
//! - Feature containers with explicit missing values
//!
//! ## Architecture
//! Records are processed in stages:
//! 1. Identifier and label columns are dropped
//! 2. Each remaining column is encoded (lookup table or numeric parse)
//! 3. Missing values are filled with 0 just before reaching the model
//! 4. At inference, the vector is reindexed to the trained feature layout
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FeaturePipeline;
//!
//! let pipeline = FeaturePipeline::standard();
//! let frame = pipeline.transform_batch(&dataset.columns, &records);
//! let matrix = frame.fill_missing(pipeline::MISSING_FILL);
//!
//! let aligned = pipeline.transform_aligned(&record, &model.feature_names);
//! ```

pub mod traits;
pub mod encoders;
pub mod feature_pipeline;
pub mod features;

// Re-export main types
pub use traits::AttributeEncoder;
pub use feature_pipeline::FeaturePipeline;
pub use features::{AlignedFeatures, FeatureFrame, FeatureRow, FeatureValue, MISSING_FILL};
