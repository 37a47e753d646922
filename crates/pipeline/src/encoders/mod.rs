//! Encoder implementations for the feature pipeline.
//!
//! This module contains the concrete encoders that can be registered in a
//! FeaturePipeline.

pub mod numeric;
pub mod ordinal;

// Re-export for convenience
pub use numeric::NumericEncoder;
pub use ordinal::OrdinalEncoder;
