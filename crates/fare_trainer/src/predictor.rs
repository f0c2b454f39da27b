//! Single-trip prediction

use taxi_fare_core::fixed;

use crate::pipeline::FittedPipeline;
use crate::trip::{Trip, TripFarePrediction};

/// Scores trips one at a time, reusing a feature buffer between calls
pub struct PredictionEngine<'a> {
    pipeline: &'a FittedPipeline,
    buffer: Vec<i64>,
}

impl<'a> PredictionEngine<'a> {
    pub fn new(pipeline: &'a FittedPipeline) -> Self {
        Self {
            pipeline,
            buffer: Vec::with_capacity(pipeline.transform().feature_count()),
        }
    }

    /// Predict the fare of `trip`; its `fare_amount` is ignored
    pub fn predict(&mut self, trip: &Trip) -> TripFarePrediction {
        let score = self.pipeline.score_with(trip, &mut self.buffer);
        TripFarePrediction {
            fare_amount: fixed::to_f32(score),
        }
    }
}
