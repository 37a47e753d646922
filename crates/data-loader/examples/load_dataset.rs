use data_loader::{Dataset, LoadOptions};
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "data/dataset.csv".to_string()),
    );

    println!("Loading survey dataset from {}...\n", path.display());

    let start = Instant::now();
    let options = LoadOptions::for_path(&path);
    let dataset = Dataset::load(&path, &options).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Rows: {}", dataset.len());
    println!("Feature columns: {}", dataset.feature_columns(&options).join(", "));
    println!("\nClass distribution:");
    for (label, count) in dataset.class_distribution() {
        println!("  {:<22} {}", label, count);
    }
    println!(
        "\nPerformance: {:.0} rows/second",
        dataset.len() as f64 / elapsed.as_secs_f64()
    );
}
