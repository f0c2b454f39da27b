//! Taxi fare trainer CLI
//!
//! Trains the fare pipeline on the training file, reports its quality on the
//! test file and prints one sample prediction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use taxi_fare_trainer::{
    evaluate, load_trips, EvaluationReport, PipelineSpec, PredictionEngine, PredictionReport,
    TrainingParams, Trip,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const TRAIN_DATA_PATH: &str = "Data/Train_trip_data.csv";
const TEST_DATA_PATH: &str = "Data/Test_trip_data.csv";

#[derive(Parser, Debug)]
#[command(name = "fare-trainer")]
#[command(author = "Taxi Fare Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Boosted-tree taxi fare regression", long_about = None)]
struct Args {
    /// Training CSV (with header row)
    #[arg(long, default_value = TRAIN_DATA_PATH)]
    train: PathBuf,

    /// Test CSV (with header row)
    #[arg(long, default_value = TEST_DATA_PATH)]
    test: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Taxi fare trainer v{}", env!("CARGO_PKG_VERSION"));

    println!("Prediction of the 'FareAmount' on the basis Fast Tree Regression algorithm.");
    println!();
    println!("Start train Model:");
    println!();

    println!("- Create the Model.");
    let train = load_trips(&args.train, true).context("Failed to load training data")?;
    let spec = PipelineSpec::default();
    let params = TrainingParams::default();
    info!(
        "Training parameters: {}",
        serde_json::to_string(&params).context("Failed to serialize training parameters")?
    );

    println!("- Train the Model ...");
    let pipeline = spec
        .fit(&train, &params)
        .context("Failed to train the model")?;
    println!("- End of training.");
    println!();

    println!("Model quality metrics evaluation:");
    println!();
    let test = load_trips(&args.test, true).context("Failed to load test data")?;
    let metrics = evaluate(&pipeline, &test).context("Failed to evaluate the model")?;
    println!("{}", EvaluationReport { metrics: &metrics });
    println!();

    println!("Single prediction:");
    println!();
    let sample = Trip::unlabeled("CMT", "1", 1, 639, 4.3, "CRD");
    let prediction = PredictionEngine::new(&pipeline).predict(&sample);
    println!(
        "{}",
        PredictionReport {
            prediction,
            actual: 15.5,
        }
    );
    println!();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    println!("{}", cwd.display());

    Ok(())
}
