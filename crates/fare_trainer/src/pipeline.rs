//! Feature pipeline: label copy, one-hot encodings and concatenation
//!
//! A [`PipelineSpec`] names the stages. Fitting it learns each encoder's
//! vocabulary, featurizes the training table and trains the ensemble, giving
//! an immutable [`FittedPipeline`] that scores any number of trips.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use taxi_fare_core::fixed;
use taxi_fare_core::gbdt::Model;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::encoding::OneHotEncoder;
use crate::errors::{Result, TrainerError};
use crate::trainer::{GbdtTrainer, TrainingParams};
use crate::trip::{Column, Trip, TripFarePrediction};

/// One entry of the concatenated feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureSource {
    /// Indicator vector of a one-hot encoded column
    Encoded(Column),
    /// Raw numeric column, converted to fixed-point
    Numeric(Column),
}

impl FeatureSource {
    pub fn column(self) -> Column {
        match self {
            FeatureSource::Encoded(column) | FeatureSource::Numeric(column) => column,
        }
    }
}

/// Stages of the feature pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Column copied to the label slot
    pub label: Column,
    /// Columns to one-hot encode, in fit order
    pub encoded: Vec<Column>,
    /// Concatenation order of the feature vector
    pub features: Vec<FeatureSource>,
}

impl Default for PipelineSpec {
    fn default() -> Self {
        Self {
            label: Column::FareAmount,
            encoded: vec![Column::VendorId, Column::RateCode, Column::PaymentType],
            features: vec![
                FeatureSource::Encoded(Column::VendorId),
                FeatureSource::Encoded(Column::RateCode),
                FeatureSource::Numeric(Column::PassengerCount),
                FeatureSource::Numeric(Column::TripDistance),
                FeatureSource::Encoded(Column::PaymentType),
            ],
        }
    }
}

impl PipelineSpec {
    pub fn validate(&self) -> Result<()> {
        if self.label.is_categorical() {
            return Err(TrainerError::Pipeline(format!(
                "label column {} is not numeric",
                self.label.name()
            )));
        }

        let mut encoded = HashSet::new();
        for &column in &self.encoded {
            if !column.is_categorical() {
                return Err(TrainerError::Pipeline(format!(
                    "cannot one-hot encode numeric column {}",
                    column.name()
                )));
            }
            if !encoded.insert(column) {
                return Err(TrainerError::Pipeline(format!(
                    "column {} is encoded twice",
                    column.name()
                )));
            }
        }

        if self.features.is_empty() {
            return Err(TrainerError::Pipeline("no feature columns".into()));
        }

        let mut seen = HashSet::new();
        for &source in &self.features {
            let column = source.column();
            if column == self.label {
                return Err(TrainerError::Pipeline(format!(
                    "label column {} cannot be a feature",
                    column.name()
                )));
            }
            if !seen.insert(source) {
                return Err(TrainerError::Pipeline(format!(
                    "{source:?} is concatenated twice"
                )));
            }
            match source {
                FeatureSource::Encoded(column) if !encoded.contains(&column) => {
                    return Err(TrainerError::Pipeline(format!(
                        "column {} is concatenated as encoded but never encoded",
                        column.name()
                    )));
                }
                FeatureSource::Numeric(column) if column.is_categorical() => {
                    return Err(TrainerError::Pipeline(format!(
                        "categorical column {} must be encoded before concatenation",
                        column.name()
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Learn the encoders, featurize `trips` and train the model
    pub fn fit(&self, trips: &[Trip], params: &TrainingParams) -> Result<FittedPipeline> {
        self.validate()?;
        if trips.is_empty() {
            return Err(TrainerError::Dataset(
                "cannot fit a pipeline on an empty table".into(),
            ));
        }

        let encoders: Vec<(Column, OneHotEncoder)> = self
            .encoded
            .iter()
            .map(|&column| {
                let encoder =
                    OneHotEncoder::fit(trips.iter().filter_map(|trip| column.category(trip)));
                debug!(
                    "Encoded {} into {} slots: {:?}",
                    column.name(),
                    encoder.width(),
                    encoder.categories()
                );
                (column, encoder)
            })
            .collect();

        let transform = FeatureTransform::new(self.label, encoders, self.features.clone());
        info!(
            "Feature vector has {} slots: {}",
            transform.feature_count(),
            transform.feature_names().join(", ")
        );

        let dataset = transform.apply(trips)?;
        let model = GbdtTrainer::new(params.clone()).train(&dataset)?;
        info!("Model fingerprint: {}", model.fingerprint()?);

        Ok(FittedPipeline { transform, model })
    }
}

/// Fitted encoders plus the concatenation layout
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTransform {
    label: Column,
    encoders: Vec<(Column, OneHotEncoder)>,
    layout: Vec<FeatureSource>,
    feature_count: usize,
}

impl FeatureTransform {
    fn new(label: Column, encoders: Vec<(Column, OneHotEncoder)>, layout: Vec<FeatureSource>) -> Self {
        let mut transform = Self {
            label,
            encoders,
            layout,
            feature_count: 0,
        };
        transform.feature_count = transform
            .layout
            .iter()
            .map(|&source| match source {
                FeatureSource::Encoded(column) => transform.encoder(column).map_or(0, |e| e.width()),
                FeatureSource::Numeric(_) => 1,
            })
            .sum();
        transform
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn encoder(&self, column: Column) -> Option<&OneHotEncoder> {
        self.encoders
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, encoder)| encoder)
    }

    /// Slot names in concatenation order, e.g. `vendor_id=CMT`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.feature_count);
        for &source in &self.layout {
            match source {
                FeatureSource::Encoded(column) => {
                    if let Some(encoder) = self.encoder(column) {
                        names.extend(
                            encoder
                                .categories()
                                .iter()
                                .map(|category| format!("{}={}", column.name(), category)),
                        );
                    }
                }
                FeatureSource::Numeric(column) => names.push(column.name().to_string()),
            }
        }
        names
    }

    /// Write the feature vector of `trip` into `out`, replacing its contents
    pub fn featurize_into(&self, trip: &Trip, out: &mut Vec<i64>) {
        out.clear();
        for &source in &self.layout {
            match source {
                FeatureSource::Encoded(column) => {
                    if let Some(encoder) = self.encoder(column) {
                        encoder.encode_into(column.category(trip).unwrap_or_default(), out);
                    }
                }
                FeatureSource::Numeric(column) => out.push(column.numeric(trip).unwrap_or(0)),
            }
        }
    }

    pub fn featurize(&self, trip: &Trip) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.feature_count);
        self.featurize_into(trip, &mut out);
        out
    }

    /// Fixed-point label of `trip`
    pub fn label(&self, trip: &Trip) -> i64 {
        self.label.numeric(trip).unwrap_or(0)
    }

    /// Featurize a whole table; row order is preserved
    pub fn apply(&self, trips: &[Trip]) -> Result<Dataset> {
        let features: Vec<Vec<i64>> = trips.par_iter().map(|trip| self.featurize(trip)).collect();
        let labels = trips.iter().map(|trip| self.label(trip)).collect();
        Dataset::new(features, labels, self.feature_count)
    }
}

/// Immutable result of fitting a [`PipelineSpec`]
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    transform: FeatureTransform,
    model: Model,
}

impl FittedPipeline {
    pub fn transform(&self) -> &FeatureTransform {
        &self.transform
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Featurize into `buffer` and score; every scoring path goes through here
    pub fn score_with(&self, trip: &Trip, buffer: &mut Vec<i64>) -> i64 {
        self.transform.featurize_into(trip, buffer);
        self.model.score(buffer)
    }

    /// Fixed-point score of one trip
    pub fn score(&self, trip: &Trip) -> i64 {
        let mut buffer = Vec::with_capacity(self.transform.feature_count);
        self.score_with(trip, &mut buffer)
    }

    pub fn predict(&self, trip: &Trip) -> TripFarePrediction {
        TripFarePrediction {
            fare_amount: fixed::to_f32(self.score(trip)),
        }
    }

    /// Score a table in parallel; output order equals input order
    pub fn score_batch(&self, trips: &[Trip]) -> Vec<i64> {
        trips
            .par_iter()
            .map_init(
                || Vec::with_capacity(self.transform.feature_count),
                |buffer, trip| self.score_with(trip, buffer),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::HOT;
    use taxi_fare_core::SCALE;

    fn trips() -> Vec<Trip> {
        (0..40)
            .map(|i| {
                let vendor = if i % 2 == 0 { "CMT" } else { "VTS" };
                let rate = if i % 10 == 0 { "2" } else { "1" };
                let payment = if i % 3 == 0 { "CSH" } else { "CRD" };
                let distance = (i % 12) as f32 + 0.5;
                Trip {
                    fare_amount: 3.0 + 2.5 * distance,
                    ..Trip::unlabeled(vendor, rate, 1 + i % 4, 60 * i, distance, payment)
                }
            })
            .collect()
    }

    fn small_params() -> TrainingParams {
        TrainingParams {
            num_trees: 8,
            num_leaves: 4,
            min_samples_leaf: 2,
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_default_spec_is_valid() {
        assert!(PipelineSpec::default().validate().is_ok());
    }

    #[test]
    fn test_spec_json_roundtrip() {
        let spec = PipelineSpec::default();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains(r#"{"Encoded":"VendorId"}"#));
        assert_eq!(serde_json::from_str::<PipelineSpec>(&json).unwrap(), spec);
    }

    #[test]
    fn test_invalid_specs_are_rejected() {
        let base = PipelineSpec::default();
        let cases = [
            PipelineSpec {
                label: Column::VendorId,
                ..base.clone()
            },
            PipelineSpec {
                encoded: vec![Column::VendorId, Column::TripDistance],
                ..base.clone()
            },
            PipelineSpec {
                encoded: vec![Column::VendorId, Column::VendorId],
                ..base.clone()
            },
            PipelineSpec {
                features: vec![],
                ..base.clone()
            },
            PipelineSpec {
                features: vec![FeatureSource::Numeric(Column::FareAmount)],
                ..base.clone()
            },
            PipelineSpec {
                features: vec![FeatureSource::Numeric(Column::PaymentType)],
                ..base.clone()
            },
            PipelineSpec {
                encoded: vec![Column::VendorId],
                ..base.clone()
            },
            PipelineSpec {
                features: vec![
                    FeatureSource::Numeric(Column::TripDistance),
                    FeatureSource::Numeric(Column::TripDistance),
                ],
                ..base
            },
        ];
        for spec in cases {
            assert!(
                matches!(spec.validate(), Err(TrainerError::Pipeline(_))),
                "{spec:?}"
            );
        }
    }

    #[test]
    fn test_feature_layout() {
        let fitted = PipelineSpec::default().fit(&trips(), &small_params()).unwrap();
        let transform = fitted.transform();

        assert_eq!(
            transform.feature_names(),
            vec![
                "vendor_id=CMT",
                "vendor_id=VTS",
                "rate_code=2",
                "rate_code=1",
                "passenger_count",
                "trip_distance",
                "payment_type=CSH",
                "payment_type=CRD",
            ]
        );
        assert_eq!(transform.feature_count(), 8);

        let trip = Trip::unlabeled("VTS", "1", 3, 100, 4.3, "CRD");
        assert_eq!(
            transform.featurize(&trip),
            vec![0, HOT, 0, HOT, 3 * SCALE, 4_300_000, 0, HOT]
        );
        assert_eq!(fitted.model().feature_count, 8);
    }

    #[test]
    fn test_unseen_categories_encode_to_zero() {
        let fitted = PipelineSpec::default().fit(&trips(), &small_params()).unwrap();
        let trip = Trip::unlabeled("DDS", "5", 2, 100, 1.5, "NOC");
        let features = fitted.transform().featurize(&trip);

        assert_eq!(features, vec![0, 0, 0, 0, 2 * SCALE, 1_500_000, 0, 0]);
        // still scorable
        let _ = fitted.predict(&trip);
    }

    #[test]
    fn test_label_is_copied() {
        let fitted = PipelineSpec::default().fit(&trips(), &small_params()).unwrap();
        let trip = Trip {
            fare_amount: 14.5,
            ..Trip::unlabeled("CMT", "1", 1, 639, 4.3, "CRD")
        };
        assert_eq!(fitted.transform().label(&trip), 14_500_000);
    }

    #[test]
    fn test_batch_matches_single() {
        let data = trips();
        let fitted = PipelineSpec::default().fit(&data, &small_params()).unwrap();
        let batch = fitted.score_batch(&data);

        assert_eq!(batch.len(), data.len());
        for (trip, &score) in data.iter().zip(&batch) {
            assert_eq!(fitted.score(trip), score);
        }
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(matches!(
            PipelineSpec::default().fit(&[], &small_params()),
            Err(TrainerError::Dataset(_))
        ));
    }

    #[test]
    fn test_fitted_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FittedPipeline>();
    }
}
