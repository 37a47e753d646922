//! The FeaturePipeline turns raw records into feature vectors.
//!
//! This module provides the main FeaturePipeline struct that registers
//! encoders per column using the builder pattern.

use crate::encoders::{NumericEncoder, OrdinalEncoder};
use crate::features::{AlignedFeatures, FeatureFrame, FeatureRow, FeatureValue, MISSING_FILL};
use crate::traits::AttributeEncoder;
use data_loader::{NON_FEATURE_COLUMNS, RawRecord};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Maps raw records to feature vectors through per-column encoders.
///
/// ## Usage
/// ```ignore
/// let pipeline = FeaturePipeline::new()
///     .add_encoder(OrdinalEncoder::year())
///     .add_encoder(NumericEncoder::confidence_level())
///     .drop_column("StudentID");
///
/// let row = pipeline.transform(&record);
/// let aligned = pipeline.transform_aligned(&record, &feature_names);
/// ```
///
/// Columns without a registered encoder are read as plain numbers.
pub struct FeaturePipeline {
    encoders: Vec<Box<dyn AttributeEncoder>>,
    by_column: HashMap<String, usize>,
    dropped: BTreeSet<String>,
}

impl FeaturePipeline {
    /// Create a new empty FeaturePipeline.
    pub fn new() -> Self {
        Self {
            encoders: Vec::new(),
            by_column: HashMap::new(),
            dropped: BTreeSet::new(),
        }
    }

    /// The survey pipeline: Year, LearningStyle, ConfidenceLevel and
    /// BloomLevel encoders, with identifier and label columns dropped.
    pub fn standard() -> Self {
        NON_FEATURE_COLUMNS.iter().fold(
            Self::new()
                .add_encoder(OrdinalEncoder::year())
                .add_encoder(OrdinalEncoder::learning_style())
                .add_encoder(NumericEncoder::confidence_level())
                .add_encoder(OrdinalEncoder::bloom_level()),
            |pipeline, column| pipeline.drop_column(*column),
        )
    }

    /// Add an encoder to the pipeline (builder pattern).
    ///
    /// A later encoder for the same column replaces the earlier one.
    pub fn add_encoder(mut self, encoder: impl AttributeEncoder + 'static) -> Self {
        let column = encoder.column().to_string();
        debug!("Registering {} encoder for column {}", encoder.name(), column);
        match self.by_column.get(&column) {
            Some(&idx) => self.encoders[idx] = Box::new(encoder),
            None => {
                self.by_column.insert(column, self.encoders.len());
                self.encoders.push(Box::new(encoder));
            }
        }
        self
    }

    /// Never emit this column as a feature (builder pattern).
    pub fn drop_column(mut self, column: impl Into<String>) -> Self {
        self.dropped.insert(column.into());
        self
    }

    pub fn is_dropped(&self, column: &str) -> bool {
        self.dropped.contains(column)
    }

    /// Columns with a dedicated encoder, in registration order
    pub fn encoded_columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.iter().map(|e| e.column())
    }

    /// Encode one column's value, falling back to numeric parsing
    pub fn encode_value(&self, column: &str, record: &RawRecord) -> FeatureValue {
        let value = record.get(column);
        match self.by_column.get(column) {
            Some(&idx) => self.encoders[idx].encode(value),
            None => value.and_then(|v| v.as_number()).into(),
        }
    }

    /// Keep the feature columns of `columns`, preserving order
    pub fn feature_columns<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        columns
            .into_iter()
            .filter(|c| !self.is_dropped(c))
            .map(str::to_string)
            .collect()
    }

    /// Encode one record using its own columns (sorted by name).
    pub fn transform(&self, record: &RawRecord) -> FeatureRow {
        let names = self.feature_columns(record.keys());
        let values = names
            .iter()
            .map(|name| self.encode_value(name, record))
            .collect();
        FeatureRow { names, values }
    }

    /// Encode many records against a shared header.
    ///
    /// The output layout is `columns` minus dropped columns, in the given
    /// order. Rows are encoded in parallel; output order matches input order.
    pub fn transform_batch(&self, columns: &[String], records: &[RawRecord]) -> FeatureFrame {
        let feature_names = self.feature_columns(columns.iter().map(String::as_str));
        debug!(
            "Encoding {} records into {} features",
            records.len(),
            feature_names.len()
        );
        let rows = records
            .par_iter()
            .map(|record| {
                feature_names
                    .iter()
                    .map(|name| self.encode_value(name, record))
                    .collect::<Vec<_>>()
            })
            .collect();
        FeatureFrame { feature_names, rows }
    }

    /// Encode a record reindexed to a trained layout.
    ///
    /// The result has exactly `feature_names.len()` values in that order.
    /// Expected columns the record lacks become [`MISSING_FILL`]; record
    /// columns outside `feature_names` are ignored.
    pub fn transform_aligned(&self, record: &RawRecord, feature_names: &[String]) -> AlignedFeatures {
        let mut matched = 0;
        let values = feature_names
            .iter()
            .map(|name| {
                if record.contains(name) && !self.is_dropped(name) {
                    matched += 1;
                    self.encode_value(name, record).fill(MISSING_FILL)
                } else {
                    MISSING_FILL
                }
            })
            .collect();
        AlignedFeatures { values, matched }
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::AttributeValue;

    fn sample_record() -> RawRecord {
        RawRecord::new()
            .with("StudentID", "S042")
            .with("Year", "2nd Year")
            .with("LearningStyle", "Visual")
            .with("ConfidenceLevel", 4)
            .with("BloomLevel", "Apply")
            .with("PreferredTool", "Quiz")
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_pipeline_reads_numbers() {
        let pipeline = FeaturePipeline::new();
        let record = RawRecord::new().with("Score", 7).with("Year", "2nd Year");

        let row = pipeline.transform(&record);
        assert_eq!(row.names, names(&["Score", "Year"]));
        assert_eq!(row.values, vec![FeatureValue::Known(7.0), FeatureValue::Missing]);
    }

    #[test]
    fn test_standard_transform_drops_identifiers() {
        let pipeline = FeaturePipeline::standard();
        let row = pipeline.transform(&sample_record());

        assert!(row.get("StudentID").is_none());
        assert!(row.get("PreferredTool").is_none());
        assert_eq!(row.get("Year"), Some(FeatureValue::Known(2.0)));
        assert_eq!(row.get("LearningStyle"), Some(FeatureValue::Known(1.0)));
        assert_eq!(row.get("ConfidenceLevel"), Some(FeatureValue::Known(4.0)));
        assert_eq!(row.get("BloomLevel"), Some(FeatureValue::Known(3.0)));
    }

    #[test]
    fn test_transform_is_repeatable() {
        let pipeline = FeaturePipeline::standard();
        let record = sample_record();
        let first = pipeline.transform(&record).to_vector();
        let second = pipeline.transform(&record).to_vector();
        let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn test_aligned_reorders_and_fills() {
        let pipeline = FeaturePipeline::standard();
        let layout = names(&["BloomLevel", "Year", "Attendance", "ConfidenceLevel"]);
        let record = RawRecord::new()
            .with("Year", "3rd Year")
            .with("BloomLevel", "Create")
            .with("Unrelated", 99);

        let aligned = pipeline.transform_aligned(&record, &layout);
        assert_eq!(aligned.values, vec![6.0, 3.0, 0.0, 0.0]);
        assert_eq!(aligned.matched, 2);
        assert!(!aligned.has_no_overlap());
    }

    #[test]
    fn test_aligned_no_overlap() {
        let pipeline = FeaturePipeline::standard();
        let layout = names(&["Year", "LearningStyle"]);
        let record = RawRecord::new().with("Colour", "blue");

        let aligned = pipeline.transform_aligned(&record, &layout);
        assert_eq!(aligned.values, vec![0.0, 0.0]);
        assert!(aligned.has_no_overlap());
    }

    #[test]
    fn test_unknown_category_degrades_to_zero() {
        let pipeline = FeaturePipeline::standard();
        let layout = names(&["Year", "LearningStyle", "ConfidenceLevel", "BloomLevel"]);
        let record = RawRecord::new()
            .with("Year", "Graduate")
            .with("LearningStyle", "Telepathic")
            .with("ConfidenceLevel", "very")
            .with("BloomLevel", "Memorize");

        let aligned = pipeline.transform_aligned(&record, &layout);
        assert_eq!(aligned.values, vec![0.0; 4]);
        assert_eq!(aligned.matched, 4);
    }

    #[test]
    fn test_batch_preserves_header_order() {
        let pipeline = FeaturePipeline::standard();
        let header = names(&["StudentID", "ConfidenceLevel", "Year", "PreferredTool"]);
        let records = vec![
            sample_record(),
            RawRecord::new().with("Year", "1st Year"),
        ];

        let frame = pipeline.transform_batch(&header, &records);
        assert_eq!(frame.feature_names, names(&["ConfidenceLevel", "Year"]));
        assert_eq!(frame.fill_missing(MISSING_FILL), vec![vec![4.0, 2.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_encoder_replacement() {
        let pipeline = FeaturePipeline::new()
            .add_encoder(NumericEncoder::new("Year"))
            .add_encoder(OrdinalEncoder::year());
        assert_eq!(pipeline.encoded_columns().count(), 1);
        let record = RawRecord::new().with("Year", AttributeValue::from("4th Year"));
        assert_eq!(pipeline.encode_value("Year", &record), FeatureValue::Known(4.0));
    }
}
