//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Squared-error boosting with fixed-point arithmetic, histogram splits and
//! leaf-wise tree growth. Training residuals are updated through
//! [`Model::accumulate`], the same arithmetic used at inference.

use serde::{Deserialize, Serialize};
use taxi_fare_core::gbdt::Model;
use taxi_fare_core::SCALE;
use tracing::{debug, info, warn};

use crate::binning::BinnedMatrix;
use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{sample_features, LcgRng};
use crate::errors::{Result, TrainerError};

/// Per-row hessian of the squared-error loss
const HESSIAN_UNIT: i64 = 1;

/// Boosting configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub num_trees: usize,
    pub num_leaves: usize,
    pub min_samples_leaf: usize,
    pub learning_rate: i64, // Fixed-point, e.g., 200_000 = 0.2
    pub max_bins: usize,
    pub feature_fraction: i64, // Fixed-point, SCALE = every feature
    pub seed: i64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            num_trees: 100,
            num_leaves: 20,
            min_samples_leaf: 10,
            learning_rate: 200_000,
            max_bins: 255,
            feature_fraction: SCALE,
            seed: 0,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(TrainerError::Config("num_trees must be at least 1".into()));
        }
        if self.num_leaves < 2 {
            return Err(TrainerError::Config("num_leaves must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::Config(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if !(2..=u16::MAX as usize + 1).contains(&self.max_bins) {
            return Err(TrainerError::Config(format!(
                "max_bins must be within 2..={}, got {}",
                u16::MAX as usize + 1,
                self.max_bins
            )));
        }
        if self.learning_rate <= 0 || self.learning_rate > SCALE {
            return Err(TrainerError::Config(format!(
                "learning_rate must be within (0, {SCALE}], got {}",
                self.learning_rate
            )));
        }
        if self.feature_fraction <= 0 || self.feature_fraction > SCALE {
            return Err(TrainerError::Config(format!(
                "feature_fraction must be within (0, {SCALE}], got {}",
                self.feature_fraction
            )));
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            num_leaves: self.num_leaves,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// GBDT trainer
pub struct GbdtTrainer {
    params: TrainingParams,
}

impl GbdtTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Train a model on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<Model> {
        self.params.validate()?;
        if dataset.is_empty() {
            return Err(TrainerError::Dataset(
                "cannot train on an empty dataset".into(),
            ));
        }

        let n_samples = dataset.len();
        let bias = mean(&dataset.labels);
        if dataset.labels.iter().all(|&label| label == bias) {
            warn!("All {} labels equal {}; model will be constant", n_samples, bias);
        }

        debug!("Feature (min, max): {:?}", dataset.feature_stats());
        let matrix = BinnedMatrix::from_rows(
            &dataset.features,
            dataset.feature_count,
            self.params.max_bins,
        );
        debug!(
            "Binned {} features into {:?} bins",
            matrix.feature_count(),
            (0..matrix.feature_count())
                .map(|f| matrix.feature_bins(f).num_bins())
                .collect::<Vec<_>>()
        );

        let hessians = vec![HESSIAN_UNIT; n_samples];
        let mut scores = vec![bias; n_samples];
        let mut rng = LcgRng::new(self.params.seed);
        let mut trees = Vec::with_capacity(self.params.num_trees);

        for tree_idx in 0..self.params.num_trees {
            let gradients = calculate_gradients(&dataset.labels, &scores);
            let features =
                sample_features(&mut rng, dataset.feature_count, self.params.feature_fraction);

            let builder = CartBuilder::new(
                &matrix,
                &gradients,
                &hessians,
                &features,
                self.params.tree_config(),
            );
            let tree = builder.build(self.params.learning_rate);

            Model::accumulate(&tree, &dataset.features, &mut scores);
            debug!(
                "Tree {}/{}: {} leaves, train loss {}",
                tree_idx + 1,
                self.params.num_trees,
                tree.num_leaves(),
                mean_squared_error(&dataset.labels, &scores)
            );

            trees.push(tree);
        }

        let model = Model::new(dataset.feature_count, bias, trees);
        model.validate()?;

        info!(
            "Trained {} trees on {} samples with {} features",
            model.num_trees(),
            n_samples,
            dataset.feature_count
        );
        Ok(model)
    }
}

/// Mean label, the initial score of every row
fn mean(labels: &[i64]) -> i64 {
    if labels.is_empty() {
        return 0;
    }
    let sum: i128 = labels.iter().map(|&l| l as i128).sum();
    (sum / labels.len() as i128) as i64
}

/// Squared-error gradient: prediction - label
fn calculate_gradients(labels: &[i64], scores: &[i64]) -> Vec<i64> {
    scores
        .iter()
        .zip(labels)
        .map(|(&score, &label)| score.saturating_sub(label))
        .collect()
}

/// Training loss in squared micro-units
fn mean_squared_error(labels: &[i64], scores: &[i64]) -> i128 {
    if labels.is_empty() {
        return 0;
    }
    let total = labels
        .iter()
        .zip(scores)
        .fold(0i128, |total, (&label, &score)| {
            let diff = score as i128 - label as i128;
            total.saturating_add(diff.saturating_mul(diff))
        });
    total / labels.len() as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_simple_dataset() -> Dataset {
        let features = (0..60).map(|i| vec![i * SCALE / 10, (i % 2) * SCALE]).collect();
        let labels = (0..60).map(|i| 2 * SCALE + i * SCALE / 4).collect();
        Dataset::new(features, labels, 2).unwrap()
    }

    fn small_params() -> TrainingParams {
        TrainingParams {
            num_trees: 10,
            num_leaves: 4,
            min_samples_leaf: 3,
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_default_params_are_valid() {
        let params = TrainingParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.num_trees, 100);
        assert_eq!(params.num_leaves, 20);
        assert_eq!(params.learning_rate, 200_000);
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let cases = [
            TrainingParams { num_trees: 0, ..TrainingParams::default() },
            TrainingParams { num_leaves: 1, ..TrainingParams::default() },
            TrainingParams { min_samples_leaf: 0, ..TrainingParams::default() },
            TrainingParams { max_bins: 1, ..TrainingParams::default() },
            TrainingParams { learning_rate: 0, ..TrainingParams::default() },
            TrainingParams { learning_rate: 2 * SCALE, ..TrainingParams::default() },
            TrainingParams { feature_fraction: 0, ..TrainingParams::default() },
        ];
        for params in cases {
            assert!(matches!(params.validate(), Err(TrainerError::Config(_))), "{params:?}");
        }
    }

    #[test]
    fn test_train_simple_model() {
        let dataset = create_simple_dataset();
        let model = GbdtTrainer::new(small_params()).train(&dataset).unwrap();

        assert_eq!(model.num_trees(), 10);
        assert_eq!(model.feature_count, 2);
        assert!(model.trees.iter().all(|t| t.num_leaves() <= 4));
    }

    #[test]
    fn test_boosting_reduces_loss() {
        let dataset = create_simple_dataset();
        let model = GbdtTrainer::new(small_params()).train(&dataset).unwrap();

        let baseline = vec![model.bias; dataset.len()];
        let scores: Vec<i64> = dataset.features.iter().map(|row| model.score(row)).collect();
        assert!(
            mean_squared_error(&dataset.labels, &scores) < mean_squared_error(&dataset.labels, &baseline)
        );
    }

    #[test]
    fn test_bias_calculation() {
        assert_eq!(mean(&[1_000_000, 2_000_000, 3_000_000]), 2_000_000);
        assert_eq!(mean(&[]), 0);
    }

    #[test]
    fn test_training_loss_saturates() {
        let labels = [i64::MAX, i64::MIN];
        let scores = [i64::MIN, i64::MAX];
        assert_eq!(mean_squared_error(&labels, &scores), i128::MAX / 2);
    }

    #[test]
    fn test_extreme_labels_train() {
        let features = (0..40).map(|i| vec![i * SCALE]).collect();
        let labels = (0..40).map(|i| if i % 2 == 0 { i64::MAX } else { i64::MIN }).collect();
        let dataset = Dataset::new(features, labels, 1).unwrap();

        let model = GbdtTrainer::new(small_params()).train(&dataset).unwrap();
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let dataset = Dataset::new(Vec::new(), Vec::new(), 3).unwrap();
        assert!(matches!(
            GbdtTrainer::new(TrainingParams::default()).train(&dataset),
            Err(TrainerError::Dataset(_))
        ));
    }

    #[test]
    fn test_constant_labels_give_constant_model() {
        let features = (0..30).map(|i| vec![i * SCALE]).collect();
        let dataset = Dataset::new(features, vec![5 * SCALE; 30], 1).unwrap();
        let model = GbdtTrainer::new(small_params()).train(&dataset).unwrap();

        assert_eq!(model.score(&[0]), 5 * SCALE);
        assert_eq!(model.score(&[29 * SCALE]), 5 * SCALE);
    }

    #[test]
    fn test_determinism() {
        let dataset = create_simple_dataset();
        let params = TrainingParams {
            feature_fraction: SCALE / 2,
            ..small_params()
        };

        let model1 = GbdtTrainer::new(params.clone()).train(&dataset).unwrap();
        let model2 = GbdtTrainer::new(params).train(&dataset).unwrap();

        assert_eq!(model1, model2);
        assert_eq!(model1.fingerprint().unwrap(), model2.fingerprint().unwrap());
    }
}
