//! Boosted regression tree ensemble
//!
//! Integer-only scoring shared by the trainer (to update residuals) and by
//! inference (to produce fares), so both paths agree bit for bit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::Tree;
use crate::errors::{CoreError, Result};
use crate::fixed::{self, SCALE};
use crate::serde_canon::{hash_canonical_hex, to_canonical_json};

/// Current model format version
pub const MODEL_VERSION: i32 = 1;

/// Additive tree ensemble: `score = bias + Σ leaf(tree) * weight / SCALE`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub version: i32,

    /// Width of the feature vectors this model was trained on
    pub feature_count: usize,

    /// Initial prediction (micro-units)
    pub bias: i64,

    pub trees: Vec<Tree>,
}

impl Model {
    pub fn new(feature_count: usize, bias: i64, trees: Vec<Tree>) -> Self {
        Self {
            version: MODEL_VERSION,
            feature_count,
            bias,
            trees,
        }
    }

    /// Validate version and every tree against `feature_count`
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(CoreError::ValidationFailed(format!(
                "unsupported model version {}",
                self.version
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            if tree.weight <= 0 || tree.weight > SCALE {
                return Err(CoreError::ValidationFailed(format!(
                    "tree {i} has weight {} outside (0, {SCALE}]",
                    tree.weight
                )));
            }
            tree.validate(self.feature_count).map_err(|e| {
                CoreError::ValidationFailed(format!("tree {i}: {e}"))
            })?;
        }

        debug!(
            "Validated model: {} trees over {} features",
            self.trees.len(),
            self.feature_count
        );
        Ok(())
    }

    /// Score one feature vector (micro-units)
    pub fn score(&self, features: &[i64]) -> i64 {
        self.trees.iter().fold(self.bias, |sum, tree| {
            sum.saturating_add(fixed::mul(tree.evaluate(features), tree.weight))
        })
    }

    /// Score one feature vector as a real number
    pub fn predict(&self, features: &[i64]) -> f32 {
        fixed::to_f32(self.score(features))
    }

    /// Add one tree's contribution to running scores
    pub fn accumulate(tree: &Tree, rows: &[Vec<i64>], scores: &mut [i64]) {
        for (row, score) in rows.iter().zip(scores.iter_mut()) {
            *score = score.saturating_add(fixed::mul(tree.evaluate(row), tree.weight));
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Blake3 fingerprint of the canonical JSON form
    pub fn fingerprint(&self) -> Result<String> {
        hash_canonical_hex(self)
    }
}
