//! Taxi fare trainer - deterministic boosted-tree regression pipeline
//!
//! Loads trip CSV files, one-hot encodes the categorical columns, trains a
//! gradient boosted regression tree ensemble with integer arithmetic and
//! evaluates or applies the fitted pipeline.

pub mod binning;
pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod encoding;
pub mod errors;
pub mod evaluator;
pub mod metrics;
pub mod pipeline;
pub mod predictor;
pub mod report;
pub mod trainer;
pub mod trip;

use std::path::Path;

pub use dataset::{load_trips, Dataset};
pub use encoding::OneHotEncoder;
pub use errors::{Result, TrainerError};
pub use evaluator::evaluate;
pub use metrics::RegressionMetrics;
pub use pipeline::{FeatureSource, FeatureTransform, FittedPipeline, PipelineSpec};
pub use predictor::PredictionEngine;
pub use report::{format_decimal, EvaluationReport, PredictionReport};
pub use trainer::{GbdtTrainer, TrainingParams};
pub use trip::{Column, Trip, TripFarePrediction, TRIP_COLUMNS};

/// Fit the default fare pipeline directly from a CSV file with a header row.
pub fn train_pipeline_from_csv(path: &Path, params: &TrainingParams) -> Result<FittedPipeline> {
    let trips = load_trips(path, true)?;
    PipelineSpec::default().fit(&trips, params)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
