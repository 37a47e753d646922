//! # Data Loader Crate
//!
//! This crate handles loading labeled student survey datasets and defines the
//! domain types shared by every other crate.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RawRecord, AttributeValue, Dataset, attribute enums)
//! - **parser**: Parse delimited files into labeled records
//! - **loader**: Validate and assemble a `Dataset`
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, LoadOptions};
//! use std::path::Path;
//!
//! let dataset = Dataset::load(Path::new("data/dataset.csv"), &LoadOptions::default())?;
//! for (label, count) in dataset.class_distribution() {
//!     println!("{label}: {count}");
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod loader;

// Re-export commonly used types for convenience
pub use error::{DatasetError, Result};
pub use loader::LoadOptions;
pub use types::{
    // Column names
    BLOOM_COLUMN,
    CONFIDENCE_COLUMN,
    FA_TOOLS,
    LABEL_COLUMN,
    LEARNING_STYLE_COLUMN,
    LEAST_EFFECTIVE_COLUMN,
    NON_FEATURE_COLUMNS,
    STUDENT_ID_COLUMN,
    YEAR_COLUMN,
    // Core types
    AttributeValue,
    Dataset,
    LabeledRecord,
    RawRecord,
    // Enums
    BloomLevel,
    LearningStyle,
    YearOfStudy,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RawRecord::new()
            .with(YEAR_COLUMN, "2nd Year")
            .with(CONFIDENCE_COLUMN, 4);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(YEAR_COLUMN).and_then(|v| v.as_text()), Some("2nd Year"));
        assert_eq!(record.get(CONFIDENCE_COLUMN).and_then(|v| v.as_number()), Some(4.0));
        assert!(record.get(BLOOM_COLUMN).is_none());
    }

    #[test]
    fn test_record_from_json() {
        let record: RawRecord =
            serde_json::from_str(r#"{"Year": "3rd Year", "ConfidenceLevel": 2}"#).unwrap();
        assert_eq!(record.get(YEAR_COLUMN), Some(&AttributeValue::Text("3rd Year".into())));
        assert_eq!(record.get(CONFIDENCE_COLUMN), Some(&AttributeValue::Number(2.0)));
    }

    #[test]
    fn test_enum_labels_round_trip() {
        for year in YearOfStudy::ALL {
            assert_eq!(year.label().parse::<YearOfStudy>().unwrap(), year);
        }
        for style in LearningStyle::ALL {
            assert_eq!(style.label().parse::<LearningStyle>().unwrap(), style);
        }
        for level in BloomLevel::ALL {
            assert_eq!(level.label().parse::<BloomLevel>().unwrap(), level);
        }
        assert_eq!(BloomLevel::Create.ordinal(), 6);
        assert_eq!(LearningStyle::ReadingWriting.label(), "Reading/Writing");
    }

    #[test]
    fn test_unknown_label_is_invalid_value() {
        let err = "5th Year".parse::<YearOfStudy>().unwrap_err();
        assert!(matches!(err, DatasetError::InvalidValue { .. }));
    }

    #[test]
    fn test_attribute_number_coercion() {
        assert_eq!(AttributeValue::from("4").as_number(), Some(4.0));
        assert_eq!(AttributeValue::from("high").as_number(), None);
        assert_eq!(AttributeValue::Number(f64::NAN).as_number(), None);
        assert_eq!(AttributeValue::parse_cell("  "), None);
    }

    #[test]
    fn test_fa_tool_catalogue() {
        assert_eq!(FA_TOOLS.len(), 12);
        assert!(FA_TOOLS.contains(&"Viva / Oral Test"));
    }
}
