//! Lookup-table encoder for categorical attributes.
//!
//! Year, LearningStyle and BloomLevel are all stored as survey labels and
//! mapped to small positive integers through a fixed table.

use crate::features::FeatureValue;
use crate::traits::AttributeEncoder;
use data_loader::{
    AttributeValue, BLOOM_COLUMN, BloomLevel, LEARNING_STYLE_COLUMN, LearningStyle, YEAR_COLUMN,
    YearOfStudy,
};

/// Maps label strings to fixed codes.
///
/// ## Algorithm
/// 1. Only `Text` values are looked up; numbers are not labels
/// 2. Lookup is exact (no trimming, case-sensitive)
/// 3. Anything not in the table is `Missing`
pub struct OrdinalEncoder {
    name: String,
    column: String,
    table: Vec<(String, f64)>,
}

impl OrdinalEncoder {
    /// Create a new OrdinalEncoder.
    ///
    /// # Arguments
    /// * `column` - Record column to read
    /// * `table` - `(label, code)` pairs
    pub fn new<L: Into<String>>(column: impl Into<String>, table: impl IntoIterator<Item = (L, f64)>) -> Self {
        let column = column.into();
        Self {
            name: format!("OrdinalEncoder({})", column),
            column,
            table: table.into_iter().map(|(label, code)| (label.into(), code)).collect(),
        }
    }

    /// `"1st Year"→1 .. "4th Year"→4`
    pub fn year() -> Self {
        Self::new(
            YEAR_COLUMN,
            YearOfStudy::ALL.map(|y| (y.label(), f64::from(y.ordinal()))),
        )
    }

    /// `Visual→1, Auditory→2, Reading/Writing→3, Kinesthetic→4`
    pub fn learning_style() -> Self {
        Self::new(
            LEARNING_STYLE_COLUMN,
            LearningStyle::ALL.map(|s| (s.label(), f64::from(s.ordinal()))),
        )
    }

    /// `Remember→1 .. Create→6`
    pub fn bloom_level() -> Self {
        Self::new(
            BLOOM_COLUMN,
            BloomLevel::ALL.map(|b| (b.label(), f64::from(b.ordinal()))),
        )
    }

    pub fn lookup(&self, label: &str) -> Option<f64> {
        self.table
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, code)| *code)
    }
}

impl AttributeEncoder for OrdinalEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn encode(&self, value: Option<&AttributeValue>) -> FeatureValue {
        value
            .and_then(AttributeValue::as_text)
            .and_then(|label| self.lookup(label))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_table() {
        let encoder = OrdinalEncoder::year();
        assert_eq!(encoder.column(), "Year");
        assert_eq!(
            encoder.encode(Some(&AttributeValue::from("1st Year"))),
            FeatureValue::Known(1.0)
        );
        assert_eq!(
            encoder.encode(Some(&AttributeValue::from("4th Year"))),
            FeatureValue::Known(4.0)
        );
    }

    #[test]
    fn test_learning_style_table() {
        let encoder = OrdinalEncoder::learning_style();
        assert_eq!(
            encoder.encode(Some(&AttributeValue::from("Reading/Writing"))),
            FeatureValue::Known(3.0)
        );
    }

    #[test]
    fn test_bloom_table() {
        let encoder = OrdinalEncoder::bloom_level();
        assert_eq!(
            encoder.encode(Some(&AttributeValue::from("Evaluate"))),
            FeatureValue::Known(5.0)
        );
    }

    #[test]
    fn test_unknown_values_are_missing() {
        let encoder = OrdinalEncoder::year();
        assert_eq!(encoder.encode(Some(&AttributeValue::from("5th Year"))), FeatureValue::Missing);
        assert_eq!(encoder.encode(Some(&AttributeValue::from("2nd year"))), FeatureValue::Missing);
        // A bare number is not a label
        assert_eq!(encoder.encode(Some(&AttributeValue::from(2))), FeatureValue::Missing);
        assert_eq!(encoder.encode(None), FeatureValue::Missing);
    }
}
