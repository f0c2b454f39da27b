//! Evaluation of a fitted pipeline on a labelled test table

use tracing::info;

use crate::errors::{Result, TrainerError};
use crate::metrics::RegressionMetrics;
use crate::pipeline::FittedPipeline;
use crate::trip::Trip;

/// Score every trip and compare against its label
pub fn evaluate(pipeline: &FittedPipeline, trips: &[Trip]) -> Result<RegressionMetrics> {
    if trips.is_empty() {
        return Err(TrainerError::Dataset(
            "cannot evaluate on an empty table".into(),
        ));
    }

    let scores = pipeline.score_batch(trips);
    let labels: Vec<i64> = trips
        .iter()
        .map(|trip| pipeline.transform().label(trip))
        .collect();

    let metrics = RegressionMetrics::compute(&labels, &scores)?;
    info!(
        "Evaluated {} trips: R² {:.4}, RMSE {:.4}, MAE {:.4}",
        trips.len(),
        metrics.r_squared,
        metrics.root_mean_squared_error,
        metrics.mean_absolute_error
    );
    Ok(metrics)
}
