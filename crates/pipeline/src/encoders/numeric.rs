//! Encoder for attributes that are already numeric.

use crate::features::FeatureValue;
use crate::traits::AttributeEncoder;
use data_loader::{AttributeValue, CONFIDENCE_COLUMN};

/// Passes numbers through, parsing text leniently.
///
/// Non-numeric text and non-finite numbers become `Missing`. The pipeline
/// also uses this encoder for columns it has no dedicated encoder for.
pub struct NumericEncoder {
    name: String,
    column: String,
}

impl NumericEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: format!("NumericEncoder({})", column),
            column,
        }
    }

    /// `ConfidenceLevel`, already on an ordinal scale
    pub fn confidence_level() -> Self {
        Self::new(CONFIDENCE_COLUMN)
    }
}

impl AttributeEncoder for NumericEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn encode(&self, value: Option<&AttributeValue>) -> FeatureValue {
        value.and_then(AttributeValue::as_number).into()
    }
}
