//! End-to-end tests for FaRecommender: train, predict, persist and restore.

use data_loader::{DatasetError, RawRecord};
use ml_model::{FaRecommender, ForestConfig, ModelError, TrainingConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str =
    "StudentID,Year,LearningStyle,ConfidenceLevel,BloomLevel,PreferredTool,LeastEffectiveTool";

/// Quiz rows share one profile; Project and Poll rows use clearly different ones
fn write_dataset(dir: &Path) -> PathBuf {
    let mut lines = vec![HEADER.to_string()];
    for i in 0..20 {
        lines.push(format!("Q{i},2nd Year,Visual,4,Apply,Quiz,Project"));
    }
    for i in 0..10 {
        lines.push(format!("P{i},4th Year,Kinesthetic,5,Create,Project,Quiz"));
    }
    for i in 0..10 {
        lines.push(format!("L{i},1st Year,Auditory,1,Remember,Poll,Case Study"));
    }
    let path = dir.join("dataset.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn recommender_in(dir: &Path) -> FaRecommender {
    let config = TrainingConfig::default()
        .with_forest(ForestConfig::default().with_trees(25))
        .with_snapshot_path(dir.join("model").join("fa_model.json"));
    FaRecommender::new(config)
}

fn quiz_profile() -> RawRecord {
    RawRecord::new()
        .with("Year", "2nd Year")
        .with("LearningStyle", "Visual")
        .with("ConfidenceLevel", 4)
        .with("BloomLevel", "Apply")
}

#[test]
fn test_consistent_profile_predicts_quiz() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let recommender = recommender_in(dir.path());

    let accuracy = recommender.train(&dataset).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let result = recommender.predict(&quiz_profile()).unwrap();
    assert_eq!(result.predicted_tool, "Quiz");
    assert!(result.confidence > 0.5);
}

#[test]
fn test_predict_before_training_fails() {
    let dir = TempDir::new().unwrap();
    let recommender = recommender_in(dir.path());

    assert!(!recommender.is_loaded());
    assert!(matches!(
        recommender.predict(&quiz_profile()),
        Err(ModelError::ModelNotLoaded)
    ));
    assert!(matches!(
        recommender.persist(&dir.path().join("x.json")),
        Err(ModelError::ModelNotLoaded)
    ));
}

#[test]
fn test_probabilities_are_valid() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let recommender = recommender_in(dir.path());
    recommender.train(&dataset).unwrap();

    let records = [
        quiz_profile(),
        RawRecord::new().with("Year", "4th Year").with("BloomLevel", "Create"),
        RawRecord::new().with("LearningStyle", "Telepathic"),
    ];
    for record in &records {
        let result = recommender.predict(record).unwrap();
        let sum: f64 = result.all_probabilities.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(result.all_probabilities.values().all(|p| (0.0..=1.0).contains(p)));

        let max = result.all_probabilities.values().cloned().fold(f64::MIN, f64::max);
        assert_eq!(result.confidence, max);
        assert_eq!(result.all_probabilities[&result.predicted_tool], max);
    }
}

#[test]
fn test_train_writes_snapshot_and_restore_matches() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let trained = recommender_in(dir.path());
    trained.train(&dataset).unwrap();
    assert!(trained.snapshot_path().exists());

    let restored = recommender_in(dir.path());
    assert!(restored.restore(trained.snapshot_path()).unwrap());

    let records = [
        quiz_profile(),
        RawRecord::new().with("Year", "1st Year").with("ConfidenceLevel", 1),
        RawRecord::new(),
    ];
    for record in &records {
        assert_eq!(
            trained.predict(record).unwrap(),
            restored.predict(record).unwrap()
        );
    }
    assert_eq!(trained.current(), restored.current());
}

#[test]
fn test_persist_to_nested_directory() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let recommender = recommender_in(dir.path());
    recommender.train(&dataset).unwrap();

    let target = dir.path().join("deep").join("er").join("copy.json");
    recommender.persist(&target).unwrap();
    assert!(target.exists());

    // Only the snapshot is left behind
    let entries: Vec<_> = fs::read_dir(target.parent().unwrap()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_persist_under_regular_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let recommender = recommender_in(dir.path());
    recommender.train(&dataset).unwrap();

    let blocker = dir.path().join("file_not_dir");
    fs::write(&blocker, "x").unwrap();
    assert!(matches!(
        recommender.persist(&blocker.join("fa_model.json")),
        Err(ModelError::Io { .. })
    ));
}

#[test]
fn test_failed_retrain_keeps_last_good_model_and_snapshot() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let first = recommender_in(dir.path());
    first.train(&dataset).unwrap();
    let good_path = first.snapshot_path().to_path_buf();
    let good_bytes = fs::read(&good_path).unwrap();

    // Snapshot writes for this recommender can never succeed
    let blocker = dir.path().join("file_not_dir");
    fs::write(&blocker, "x").unwrap();
    let config = TrainingConfig::default()
        .with_forest(ForestConfig::default().with_trees(5))
        .with_seed(7)
        .with_snapshot_path(blocker.join("fa_model.json"));
    let second = FaRecommender::new(config);
    assert!(second.restore(&good_path).unwrap());
    let before = second.current();

    assert!(matches!(second.train(&dataset), Err(ModelError::Io { .. })));
    assert!(matches!(
        second.persist(&blocker.join("again.json")),
        Err(ModelError::Io { .. })
    ));

    // The live model is still the restored one, not the unsaved retrain
    assert_eq!(second.current(), before);
    assert_eq!(fs::read(&good_path).unwrap(), good_bytes);

    let reloaded = recommender_in(dir.path());
    assert!(reloaded.restore(&good_path).unwrap());
    assert_eq!(reloaded.current(), first.current());
}

#[test]
fn test_restore_missing_snapshot_is_false() {
    let dir = TempDir::new().unwrap();
    let recommender = recommender_in(dir.path());
    assert!(!recommender.restore(&dir.path().join("absent.json")).unwrap());
    assert!(!recommender.is_loaded());
}

#[test]
fn test_restore_incompatible_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.json");
    fs::write(&path, r#"{"model": "pickled bytes"}"#).unwrap();

    let recommender = recommender_in(dir.path());
    assert!(matches!(
        recommender.restore(&path),
        Err(ModelError::SnapshotIncompatible { .. })
    ));
    assert!(!recommender.is_loaded());
}

#[test]
fn test_missing_label_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unlabeled.csv");
    fs::write(&path, "Year,ConfidenceLevel\n1st Year,3\n2nd Year,4\n").unwrap();

    let err = recommender_in(dir.path()).train(&path).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Dataset(DatasetError::MissingLabelColumn { .. })
    ));
}

#[test]
fn test_missing_dataset_file() {
    let dir = TempDir::new().unwrap();
    let err = recommender_in(dir.path())
        .train(&dir.path().join("nope.csv"))
        .unwrap_err();
    assert!(matches!(err, ModelError::Dataset(DatasetError::FileNotFound { .. })));
}

#[test]
fn test_single_row_dataset_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.csv");
    fs::write(&path, format!("{HEADER}\nS1,1st Year,Visual,3,Apply,Quiz,Poll\n")).unwrap();

    let err = recommender_in(dir.path()).train(&path).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Dataset(DatasetError::ValidationError(_))
    ));
}

#[test]
fn test_same_seed_same_model() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());

    let a = recommender_in(dir.path());
    let b = recommender_in(dir.path());
    let (model_a, report_a) = a.fit(&dataset).unwrap();
    let (model_b, report_b) = b.fit(&dataset).unwrap();

    assert_eq!(model_a.forest, model_b.forest);
    assert_eq!(report_a.accuracy, report_b.accuracy);
    assert_eq!(model_a.feature_names, vec!["Year", "LearningStyle", "ConfidenceLevel", "BloomLevel"]);
    assert_eq!(model_a.classes, vec!["Poll", "Project", "Quiz"]);
}

#[test]
fn test_fit_leaves_live_model_alone() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let recommender = recommender_in(dir.path());

    let (_, report) = recommender.fit(&dataset).unwrap();
    assert_eq!(report.n_train + report.n_test, 40);
    assert_eq!(report.n_test, 8);
    assert!(!recommender.is_loaded());
    assert!(!recommender.snapshot_path().exists());
}

#[test]
fn test_strict_alignment_rejects_disjoint_record() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let config = TrainingConfig::default()
        .with_forest(ForestConfig::default().with_trees(10))
        .with_snapshot_path(dir.path().join("fa_model.json"))
        .with_strict_alignment(true);
    let recommender = FaRecommender::new(config);
    recommender.train(&dataset).unwrap();

    let stranger = RawRecord::new().with("FavouriteColour", "green");
    assert!(matches!(
        recommender.predict(&stranger),
        Err(ModelError::FeatureMismatch { .. })
    ));
    assert!(recommender.predict(&quiz_profile()).is_ok());
}
