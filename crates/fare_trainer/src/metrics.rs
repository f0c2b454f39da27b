//! Regression quality metrics
//!
//! Each error is taken exactly in `i128` micro-units, then scaled to real
//! units and summed in row order, so the same scores always give the same
//! report and saturated fixed-point values cannot overflow the sums.

use serde::Serialize;
use taxi_fare_core::fixed;

use crate::errors::{Result, TrainerError};

/// Aggregate error of a scored test table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    /// Mean squared-error loss, the objective the trainer minimizes
    pub loss_function: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    /// Compare fixed-point scores against fixed-point labels
    pub fn compute(labels: &[i64], scores: &[i64]) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(TrainerError::Dataset(format!(
                "{} labels but {} scores",
                labels.len(),
                scores.len()
            )));
        }
        if labels.is_empty() {
            return Err(TrainerError::Dataset(
                "cannot evaluate on an empty table".into(),
            ));
        }

        let n = labels.len() as f64;
        let label_mean = labels.iter().map(|&l| fixed::to_f64(l)).sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut total_sq = 0.0;
        for (&label, &score) in labels.iter().zip(scores) {
            // widened before subtracting; saturated labels stay finite
            let diff = (score as i128 - label as i128) as f64 / fixed::SCALE as f64;
            abs_sum += diff.abs();
            sq_sum += diff * diff;

            let deviation = fixed::to_f64(label) - label_mean;
            total_sq += deviation * deviation;
        }

        let mean_absolute_error = abs_sum / n;
        let mean_squared_error = sq_sum / n;

        let constant_labels = labels.iter().all(|&l| l == labels[0]);
        let r_squared = if constant_labels || total_sq == 0.0 {
            if labels == scores {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - sq_sum / total_sq
        };

        Ok(Self {
            mean_absolute_error,
            mean_squared_error,
            root_mean_squared_error: mean_squared_error.sqrt(),
            loss_function: mean_squared_error,
            r_squared,
        })
    }
}
