//! Regression tree structures
//!
//! Integer-only nodes and traversal. Thresholds and leaf values are
//! micro-unit integers.

use serde::{Deserialize, Serialize};

/// A tree node, either a split or a leaf.
///
/// Split nodes have `feature_idx >= 0`, valid `left`/`right` indices and
/// `leaf == None`. Leaf nodes have `feature_idx == -1` and carry a value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    /// Left child index (-1 for leaves)
    pub left: i32,

    /// Right child index (-1 for leaves)
    pub right: i32,

    /// Feature index to split on (-1 for leaves)
    pub feature_idx: i32,

    /// Rows with `feature <= threshold` go left
    pub threshold: i64,

    /// Leaf output
    pub leaf: Option<i64>,
}

impl Node {
    /// Create a split node
    pub fn internal(feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a leaf node
    pub fn leaf(value: i64) -> Self {
        Self {
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0 || self.leaf.is_some()
    }
}

/// A single regression tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    pub nodes: Vec<Node>,

    /// Shrinkage applied to every leaf output (micro-units, 1.0 == SCALE)
    pub weight: i64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: i64) -> Self {
        Self { nodes, weight }
    }

    /// Index of the leaf reached by `features`, or `None` on a malformed tree
    pub fn leaf_index(&self, features: &[i64]) -> Option<usize> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;
            if node.is_leaf() {
                return Some(idx);
            }

            let value = *features.get(node.feature_idx as usize)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };

            if next < 0 {
                return None;
            }
            idx = next as usize;
        }
    }

    /// Raw leaf value for `features` (before weighting); 0 on a malformed tree
    pub fn evaluate(&self, features: &[i64]) -> i64 {
        self.leaf_index(features)
            .and_then(|idx| self.nodes[idx].leaf)
            .unwrap_or(0)
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Check child links, feature indices and leaf values
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let len = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.leaf.is_none() {
                    return Err(format!("leaf node {i} has no value"));
                }
                continue;
            }

            if node.left <= i as i32 || node.left >= len {
                return Err(format!("node {i} has invalid left child {}", node.left));
            }
            if node.right <= i as i32 || node.right >= len {
                return Err(format!("node {i} has invalid right child {}", node.right));
            }
            if node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "node {i} splits on feature {} but the model has {feature_count}",
                    node.feature_idx
                ));
            }
        }

        Ok(())
    }
}
