//! Core traits for the feature pipeline.
//!
//! This module defines the AttributeEncoder trait that turns one raw
//! attribute into one numeric feature.

use crate::features::FeatureValue;
use data_loader::AttributeValue;

/// Encodes a single named attribute into a feature value.
///
/// All encoders must implement this trait to be registered in the FeaturePipeline.
///
/// ## Design Note
/// - `Send + Sync` allows the pipeline to encode records on rayon workers
/// - Encoders are pure: same input, same output, no state
/// - Absent or unmappable input is `FeatureValue::Missing`, never an error
pub trait AttributeEncoder: Send + Sync {
    /// Returns the name of this encoder (for logging/debugging)
    fn name(&self) -> &str;

    /// The record column this encoder reads
    fn column(&self) -> &str;

    /// Encode the column's value for one record.
    ///
    /// # Arguments
    /// * `value` - The raw value, or `None` when the record lacks the column
    fn encode(&self, value: Option<&AttributeValue>) -> FeatureValue;
}
