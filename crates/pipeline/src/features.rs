//! Feature values and the containers the pipeline produces.
//!
//! Missing-ness is explicit (`FeatureValue::Missing`) until the very last
//! step, where it is filled with [`MISSING_FILL`] before reaching the model.

use serde::{Deserialize, Serialize};

/// Value substituted for missing features.
///
/// None of the current mapping tables produce 0, so the sentinel cannot
/// collide with a real level. An attribute whose valid range includes 0
/// would make missing and legitimate values indistinguishable to the model.
pub const MISSING_FILL: f64 = 0.0;

/// One encoded attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Known(f64),
    Missing,
}

impl FeatureValue {
    /// Collapse to a number, using `fill` for missing values
    pub fn fill(self, fill: f64) -> f64 {
        match self {
            Self::Known(v) => v,
            Self::Missing => fill,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Missing,
        }
    }
}

/// Encoded features of a single record, in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub names: Vec<String>,
    pub values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// Numeric vector with missing values filled
    pub fn to_vector(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.fill(MISSING_FILL)).collect()
    }
}

/// Encoded features of many records sharing one column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<FeatureValue>>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of missing cells per feature, in `feature_names` order
    pub fn missing_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.feature_names.len()];
        for row in &self.rows {
            for (count, value) in counts.iter_mut().zip(row) {
                if value.is_missing() {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Dense matrix with missing values replaced by `fill`
    pub fn fill_missing(&self, fill: f64) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| v.fill(fill)).collect())
            .collect()
    }
}

/// A record reindexed to a trained model's feature layout
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatures {
    /// Exactly `feature_names.len()` values, in `feature_names` order
    pub values: Vec<f64>,
    /// How many of the expected columns the record actually carried
    pub matched: usize,
}

impl AlignedFeatures {
    /// True when the record shared no column with the expected layout
    pub fn has_no_overlap(&self) -> bool {
        self.matched == 0 && !self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill() {
        assert_eq!(FeatureValue::Known(3.0).fill(MISSING_FILL), 3.0);
        assert_eq!(FeatureValue::Missing.fill(MISSING_FILL), 0.0);
        assert_eq!(FeatureValue::from(None), FeatureValue::Missing);
    }

    #[test]
    fn test_frame_missing_counts() {
        let frame = FeatureFrame {
            feature_names: vec!["a".into(), "b".into()],
            rows: vec![
                vec![FeatureValue::Known(1.0), FeatureValue::Missing],
                vec![FeatureValue::Missing, FeatureValue::Missing],
            ],
        };
        assert_eq!(frame.missing_counts(), vec![1, 2]);
        assert_eq!(frame.fill_missing(0.0), vec![vec![1.0, 0.0], vec![0.0, 0.0]]);
    }
}
