//! Simple test harness for the assessment service.
//!
//! Bootstraps the model (restore, else train), then requests a recommendation
//! and rubric for a sample student.
//!
//! Usage: `server [DATASET] [SNAPSHOT]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::RawRecord;
use ml_model::{DEFAULT_DATASET_PATH, DEFAULT_SNAPSHOT_PATH, FaRecommender, TrainingConfig};
use server::{AssessmentRequest, AssessmentService, BootstrapOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,ml_model=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dataset = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()));
    let snapshot = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()));

    info!("Starting FA recommender test harness");
    let recommender = Arc::new(FaRecommender::new(
        TrainingConfig::default().with_snapshot_path(snapshot),
    ));
    let service = AssessmentService::new(recommender).with_training_budget(Duration::from_secs(300));

    match service
        .bootstrap(&dataset)
        .await
        .context("Failed to bootstrap the model")?
    {
        BootstrapOutcome::Restored => info!("Using restored model"),
        BootstrapOutcome::Trained { accuracy } => info!("Trained new model, accuracy {:.4}", accuracy),
        BootstrapOutcome::Unloaded => {
            anyhow::bail!("No model snapshot and no dataset at {}", dataset.display())
        }
    }

    let request = AssessmentRequest::new(
        RawRecord::new()
            .with("Year", "2nd Year")
            .with("LearningStyle", "Visual")
            .with("ConfidenceLevel", 4)
            .with("BloomLevel", "Apply"),
    )
    .with_assessment("Data Structures Check-in", 20);

    let response = service.recommend(&request)?;
    info!(
        "Recommended {} ({:.2}) - {}",
        response.prediction.predicted_tool, response.prediction.confidence, response.explanation
    );
    for (tool, probability) in response.prediction.ranked().iter().take(3) {
        info!("   {tool}: {probability:.3}");
    }
    if let Some(rubric) = &response.rubric {
        println!("{}", rubric.to_text());
    }

    Ok(())
}
