use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{
    AttributeValue, BloomLevel, Dataset, LearningStyle, LoadOptions, RawRecord, YearOfStudy,
    BLOOM_COLUMN, CONFIDENCE_COLUMN, LEARNING_STYLE_COLUMN, YEAR_COLUMN,
};
use ml_model::{
    FaRecommender, ForestConfig, PredictionResult, TrainingConfig, TrainingReport,
    DEFAULT_DATASET_PATH, DEFAULT_SNAPSHOT_PATH,
};
use pipeline::FeaturePipeline;
use rand::seq::IndexedRandom;
use rand::Rng;
use rubric::RubricFormat;
use server::{AssessmentRequest, AssessmentService, BootstrapOutcome, DEFAULT_TOTAL_MARKS};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// fa-recs - Formative assessment tool recommender
#[derive(Parser)]
#[command(name = "fa-recs")]
#[command(about = "Recommends formative-assessment tools and generates marking rubrics", long_about = None)]
struct Cli {
    /// Model snapshot to restore from and save to
    #[arg(long, global = true, default_value = DEFAULT_SNAPSHOT_PATH)]
    model_path: PathBuf,

    /// Labeled training dataset (CSV, or TSV by extension)
    #[arg(short, long, global = true, default_value = DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Student attributes shared by `predict` and `recommend`
#[derive(Args, Debug, Clone, Default)]
struct ProfileArgs {
    /// Year of study, e.g. "2nd Year"
    #[arg(long)]
    year: Option<String>,

    /// Learning style, e.g. "Visual"
    #[arg(long)]
    learning_style: Option<String>,

    /// Confidence level (1-5)
    #[arg(long)]
    confidence: Option<f64>,

    /// Bloom's taxonomy level, e.g. "Apply"
    #[arg(long)]
    bloom: Option<String>,

    /// Extra attribute as KEY=VALUE (repeatable)
    #[arg(long = "attr", value_parser = parse_key_val)]
    attrs: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model and save it to --model-path
    Train {
        /// Seed for the train/test split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of trees in the forest
        #[arg(long, default_value = "100")]
        trees: usize,

        /// Maximum tree depth (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Share of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,
    },

    /// Recommend a tool for one student
    Predict {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a rubric for a given tool
    Rubric {
        /// Assessment name
        #[arg(long)]
        name: String,

        /// FA tool, e.g. "Quiz" or "Lab Work"
        #[arg(long, default_value = "Quiz")]
        tool: String,

        /// Total marks to distribute
        #[arg(long, default_value_t = DEFAULT_TOTAL_MARKS)]
        marks: u32,

        /// Target Bloom's level
        #[arg(long, default_value = "Apply")]
        bloom: String,

        /// Output format: text, json or html
        #[arg(long, default_value = "text")]
        format: RubricFormat,
    },

    /// Recommend a tool and generate its rubric
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Assessment name
        #[arg(long)]
        name: String,

        /// Total marks to distribute
        #[arg(long, default_value_t = DEFAULT_TOTAL_MARKS)]
        marks: u32,

        /// Output format for the rubric: text, json or html
        #[arg(long, default_value = "text")]
        format: RubricFormat,
    },

    /// Summarize the training dataset
    Inspect,

    /// Measure prediction latency on random student profiles
    Benchmark {
        /// Number of predictions to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of predictions in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            seed,
            trees,
            max_depth,
            test_fraction,
        } => {
            let config = TrainingConfig::default()
                .with_load_options(LoadOptions::for_path(&cli.dataset))
                .with_forest(ForestConfig::default().with_trees(trees).with_max_depth(max_depth))
                .with_seed(seed)
                .with_test_fraction(test_fraction);
            handle_train(&cli.dataset, &cli.model_path, config).await?
        }
        Commands::Predict { profile, json } => {
            handle_predict(&cli.dataset, &cli.model_path, &profile, json).await?
        }
        Commands::Rubric {
            name,
            tool,
            marks,
            bloom,
            format,
        } => {
            let rubric = rubric::generate(&name, &tool, marks, &bloom);
            println!("{}", rubric.render(format)?);
        }
        Commands::Recommend {
            profile,
            name,
            marks,
            format,
        } => handle_recommend(&cli.dataset, &cli.model_path, &profile, name, marks, format).await?,
        Commands::Inspect => handle_inspect(&cli.dataset)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&cli.dataset, &cli.model_path, requests, concurrent).await?,
    }

    Ok(())
}

/// Parse a single KEY=VALUE pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' in '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

impl ProfileArgs {
    fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        if let Some(year) = &self.year {
            record.insert(YEAR_COLUMN, year.as_str());
        }
        if let Some(style) = &self.learning_style {
            record.insert(LEARNING_STYLE_COLUMN, style.as_str());
        }
        if let Some(confidence) = self.confidence {
            record.insert(CONFIDENCE_COLUMN, confidence);
        }
        if let Some(bloom) = &self.bloom {
            record.insert(BLOOM_COLUMN, bloom.as_str());
        }
        for (key, value) in &self.attrs {
            if let Some(value) = AttributeValue::parse_cell(value) {
                record.insert(key.as_str(), value);
            }
        }
        record
    }
}

/// Restore the snapshot, or train from the dataset if there is none
async fn load_service(dataset: &Path, model_path: &Path) -> Result<AssessmentService> {
    let recommender = Arc::new(FaRecommender::new(
        TrainingConfig::default()
            .with_load_options(LoadOptions::for_path(dataset))
            .with_snapshot_path(model_path),
    ));
    let service = AssessmentService::new(recommender);

    match service
        .bootstrap(dataset)
        .await
        .context("Failed to load the model")?
    {
        BootstrapOutcome::Restored => {}
        BootstrapOutcome::Trained { accuracy } => eprintln!(
            "{} No snapshot found; trained a new model (accuracy {:.2}%)",
            "✓".green(),
            accuracy * 100.0
        ),
        BootstrapOutcome::Unloaded => bail!(
            "No model at {} and no dataset at {}; run `fa-recs train` first",
            model_path.display(),
            dataset.display()
        ),
    }
    Ok(service)
}

/// Handle the 'train' command
async fn handle_train(dataset: &Path, model_path: &Path, config: TrainingConfig) -> Result<()> {
    println!("Training on {}...", dataset.display());
    let start = Instant::now();

    let recommender = Arc::new(FaRecommender::new(config.with_snapshot_path(model_path)));
    let service = AssessmentService::new(recommender);
    let report = service
        .retrain(dataset)
        .await
        .context("Failed to train the model")?;

    println!(
        "{} Trained in {:.2?}, saved to {}",
        "✓".green(),
        start.elapsed(),
        model_path.display()
    );
    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!(
        "\n{} {:.2}% ({} train / {} test rows)",
        "Model Accuracy:".bold().blue(),
        report.accuracy * 100.0,
        report.n_train,
        report.n_test
    );

    println!("\n{}", "Classification Report:".bold().blue());
    print!("{}", report.classification);

    println!("\n{}", "Confusion Matrix:".bold().blue());
    for (idx, label) in report.confusion.labels.iter().enumerate() {
        println!("  [{idx}] {label}");
    }
    print!("{}", report.confusion);

    println!("\n{}", "Feature Importance:".bold().blue());
    for (name, importance) in &report.feature_importances {
        println!("  {:<20} {:.4}", name, importance);
    }
}

/// Handle the 'predict' command
async fn handle_predict(dataset: &Path, model_path: &Path, profile: &ProfileArgs, json: bool) -> Result<()> {
    let service = load_service(dataset, model_path).await?;
    let record = profile.to_record();
    let response = service.recommend(&AssessmentRequest::new(record))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response.prediction)?);
    } else {
        print_prediction(&response.prediction);
        println!("{}", response.explanation);
    }
    Ok(())
}

fn print_prediction(prediction: &PredictionResult) {
    println!(
        "{} {} ({:.1}% confidence)",
        "Recommended tool:".bold().blue(),
        prediction.predicted_tool.green().bold(),
        prediction.confidence * 100.0
    );
    for (rank, (tool, probability)) in prediction.ranked().iter().enumerate() {
        println!("  {}. {:<22} {:.3}", (rank + 1).to_string().green(), tool, probability);
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(
    dataset: &Path,
    model_path: &Path,
    profile: &ProfileArgs,
    name: String,
    marks: u32,
    format: RubricFormat,
) -> Result<()> {
    let service = load_service(dataset, model_path).await?;
    let mut request = AssessmentRequest::new(profile.to_record()).with_assessment(name, marks);
    if let Some(bloom) = &profile.bloom {
        request = request.with_bloom_level(bloom.clone());
    }

    let response = service.recommend(&request)?;
    let rubric = response
        .rubric
        .as_ref()
        .ok_or_else(|| anyhow!("No rubric was generated"))?;

    if format == RubricFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_prediction(&response.prediction);
        println!("{}\n", response.explanation);
        println!("{}", rubric.render(format)?);
    }
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(dataset_path: &Path) -> Result<()> {
    let options = LoadOptions::for_path(dataset_path);
    let dataset = Dataset::load(dataset_path, &options)
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;

    println!("{}", format!("Dataset: {}", dataset_path.display()).bold().blue());
    println!("{}Rows: {}", "• ".green(), dataset.len());
    println!("{}Columns: {}", "• ".green(), dataset.columns.join(", "));
    println!("{}Label column: {}", "• ".green(), dataset.label_column);

    let pipeline = FeaturePipeline::standard();
    let columns = dataset.feature_columns(&options);
    let records: Vec<RawRecord> = dataset.records().cloned().collect();
    let frame = pipeline.transform_batch(&columns, &records);

    println!("\n{}", "Features (missing / rows):".bold().blue());
    for (name, missing) in frame.feature_names.iter().zip(frame.missing_counts()) {
        println!("  {:<20} {} / {}", name, missing, frame.len());
    }

    println!("\n{}", "Class distribution:".bold().blue());
    let mut distribution: Vec<(String, usize)> = dataset.class_distribution().into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (label, count) in distribution {
        let share = count as f64 / dataset.len() as f64 * 100.0;
        println!("  {:<22} {:>5} ({:.1}%)", label, count, share);
    }
    Ok(())
}

/// A random but well-formed student profile
fn random_profile(rng: &mut impl Rng) -> RawRecord {
    let mut record = RawRecord::new();
    if let Some(year) = YearOfStudy::ALL.choose(rng) {
        record.insert(YEAR_COLUMN, year.label());
    }
    if let Some(style) = LearningStyle::ALL.choose(rng) {
        record.insert(LEARNING_STYLE_COLUMN, style.label());
    }
    record.insert(CONFIDENCE_COLUMN, rng.random_range(1..=5));
    if let Some(level) = BloomLevel::ALL.choose(rng) {
        record.insert(BLOOM_COLUMN, level.label());
    }
    record
}

/// Handle the 'benchmark' command
async fn handle_benchmark(dataset: &Path, model_path: &Path, requests: usize, concurrent: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let service = Arc::new(load_service(dataset, model_path).await?);

    let mut rng = rand::rng();
    let profiles: Vec<RawRecord> = (0..requests).map(|_| random_profile(&mut rng)).collect();

    // Bound the number of predictions in flight
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for record in profiles {
        let service = service.clone();
        let permit = permits.clone().acquire_owned().await?;
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let start = Instant::now();
            service.recommend(&AssessmentRequest::new(record))?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall.elapsed();

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} predictions/second",
        requests as f64 / total_time.as_secs_f64()
    );

    Ok(())
}
