//! Integration tests for the pipeline.
//!
//! These tests verify that batch encoding at training time and aligned
//! encoding at inference time agree on every record.

use data_loader::{Dataset, LabeledRecord, RawRecord};
use pipeline::{FeaturePipeline, MISSING_FILL};

fn create_test_dataset() -> Dataset {
    let columns = [
        "StudentID",
        "Year",
        "LearningStyle",
        "ConfidenceLevel",
        "BloomLevel",
        "PreferredTool",
        "LeastEffectiveTool",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut dataset = Dataset::new(columns, "PreferredTool");

    dataset.push(LabeledRecord {
        record: RawRecord::new()
            .with("StudentID", "S1")
            .with("Year", "1st Year")
            .with("LearningStyle", "Auditory")
            .with("ConfidenceLevel", 2)
            .with("BloomLevel", "Remember")
            .with("LeastEffectiveTool", "Project"),
        label: "Quiz".to_string(),
    });

    // Missing year, unknown learning style
    dataset.push(LabeledRecord {
        record: RawRecord::new()
            .with("StudentID", "S2")
            .with("LearningStyle", "Osmosis")
            .with("ConfidenceLevel", 5)
            .with("BloomLevel", "Create"),
        label: "Project".to_string(),
    });

    dataset.push(LabeledRecord {
        record: RawRecord::new()
            .with("StudentID", "S3")
            .with("Year", "4th Year")
            .with("LearningStyle", "Kinesthetic")
            .with("ConfidenceLevel", "3")
            .with("BloomLevel", "Analyze"),
        label: "Case Study".to_string(),
    });

    dataset
}

#[test]
fn test_batch_layout_excludes_non_features() {
    let dataset = create_test_dataset();
    let pipeline = FeaturePipeline::standard();

    let records: Vec<RawRecord> = dataset.records().cloned().collect();
    let frame = pipeline.transform_batch(&dataset.columns, &records);

    assert_eq!(
        frame.feature_names,
        vec!["Year", "LearningStyle", "ConfidenceLevel", "BloomLevel"]
    );
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.missing_counts(), vec![1, 1, 0, 0]);

    let matrix = frame.fill_missing(MISSING_FILL);
    assert_eq!(matrix[0], vec![1.0, 2.0, 2.0, 1.0]);
    assert_eq!(matrix[1], vec![0.0, 0.0, 5.0, 6.0]);
    assert_eq!(matrix[2], vec![4.0, 4.0, 3.0, 4.0]);
}

#[test]
fn test_aligned_matches_batch_for_every_record() {
    let dataset = create_test_dataset();
    let pipeline = FeaturePipeline::standard();

    let records: Vec<RawRecord> = dataset.records().cloned().collect();
    let frame = pipeline.transform_batch(&dataset.columns, &records);
    let matrix = frame.fill_missing(MISSING_FILL);

    for (record, expected) in records.iter().zip(&matrix) {
        let aligned = pipeline.transform_aligned(record, &frame.feature_names);
        assert_eq!(&aligned.values, expected);
        assert_eq!(aligned.values.len(), frame.feature_names.len());
    }
}

#[test]
fn test_alignment_ignores_extra_and_label_columns() {
    let pipeline = FeaturePipeline::standard();
    let layout: Vec<String> = ["Year", "ConfidenceLevel"].iter().map(|s| s.to_string()).collect();

    let record = RawRecord::new()
        .with("PreferredTool", "Quiz")
        .with("FavouriteColour", "green")
        .with("ConfidenceLevel", 1)
        .with("Year", "2nd Year");

    let aligned = pipeline.transform_aligned(&record, &layout);
    assert_eq!(aligned.values, vec![2.0, 1.0]);
    assert_eq!(aligned.matched, 2);
}
