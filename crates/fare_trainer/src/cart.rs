//! Regression tree builder
//!
//! Grows one tree leaf-wise (best-first) over pre-binned features. Split
//! gains are exact integer arithmetic on gradient/hessian histograms, so the
//! same inputs always yield the same tree.

use rayon::prelude::*;
use taxi_fare_core::gbdt::{Node, Tree};
use tracing::trace;

use crate::binning::BinnedMatrix;
use crate::deterministic::SplitTieBreaker;

/// Growth limits for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub num_leaves: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            num_leaves: 20,
            min_samples_leaf: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BinStat {
    gradient: i64,
    hessian: i64,
    count: usize,
}

impl BinStat {
    fn add(&mut self, other: &BinStat) {
        self.gradient = self.gradient.saturating_add(other.gradient);
        self.hessian = self.hessian.saturating_add(other.hessian);
        self.count += other.count;
    }

    fn minus(&self, other: &BinStat) -> BinStat {
        BinStat {
            gradient: self.gradient.saturating_sub(other.gradient),
            hessian: self.hessian.saturating_sub(other.hessian),
            count: self.count - other.count,
        }
    }

    /// G²/H, the loss reduction score of a node
    fn score(&self) -> i128 {
        if self.hessian <= 0 {
            return 0;
        }
        let g = self.gradient as i128;
        g * g / self.hessian as i128
    }
}

/// Best split found for a leaf
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    bin: usize,
    threshold: i64,
    gain: i128,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain || (self.gain == other.gain && self.tie_breaker < other.tie_breaker)
    }
}

/// A leaf that may still be split
struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    totals: BinStat,
    best: Option<SplitCandidate>,
}

/// Build a regression tree from binned features, gradients and hessians
pub struct CartBuilder<'a> {
    config: TreeConfig,
    matrix: &'a BinnedMatrix,
    gradients: &'a [i64],
    hessians: &'a [i64],
    features: &'a [usize],
}

impl<'a> CartBuilder<'a> {
    /// `features` lists the columns this tree may split on
    pub fn new(
        matrix: &'a BinnedMatrix,
        gradients: &'a [i64],
        hessians: &'a [i64],
        features: &'a [usize],
        config: TreeConfig,
    ) -> Self {
        assert_eq!(matrix.rows(), gradients.len());
        assert_eq!(matrix.rows(), hessians.len());

        Self {
            config,
            matrix,
            gradients,
            hessians,
            features,
        }
    }

    /// Grow the tree; every leaf output is weighted by `weight`
    pub fn build(&self, weight: i64) -> Tree {
        let mut nodes = vec![Node::leaf(0)];
        let root_rows: Vec<usize> = (0..self.matrix.rows()).collect();
        let mut leaves = vec![self.open_leaf(0, root_rows)];

        while leaves.len() < self.config.num_leaves {
            let Some(pick) = self.pick_leaf(&leaves) else {
                break;
            };
            let OpenLeaf {
                node, rows, best, ..
            } = leaves.swap_remove(pick);
            let Some(split) = best else {
                break;
            };

            let column = self.matrix.column(split.feature_idx);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .into_iter()
                .partition(|&row| column[row] as usize <= split.bin);

            let left = nodes.len();
            let right = left + 1;
            nodes[node] =
                Node::internal(split.feature_idx as i32, split.threshold, left as i32, right as i32);
            nodes.push(Node::leaf(0));
            nodes.push(Node::leaf(0));

            trace!(
                "split node {} on feature {} at {} (gain {}): {} | {} rows",
                node,
                split.feature_idx,
                split.threshold,
                split.gain,
                left_rows.len(),
                right_rows.len()
            );

            leaves.push(self.open_leaf(left, left_rows));
            leaves.push(self.open_leaf(right, right_rows));
        }

        for leaf in &leaves {
            nodes[leaf.node] = Node::leaf(leaf_value(&leaf.totals));
        }

        Tree::new(nodes, weight)
    }

    /// Leaf with the largest positive gain; ties go to the lowest node id
    fn pick_leaf(&self, leaves: &[OpenLeaf]) -> Option<usize> {
        leaves
            .iter()
            .enumerate()
            .filter_map(|(i, leaf)| leaf.best.as_ref().map(|best| (i, best.gain, leaf.node)))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
            .map(|(i, _, _)| i)
    }

    fn open_leaf(&self, node: usize, rows: Vec<usize>) -> OpenLeaf {
        let mut totals = BinStat::default();
        for &row in &rows {
            totals.add(&self.row_stat(row));
        }

        let best = if rows.len() >= 2 * self.config.min_samples_leaf {
            self.find_best_split(&rows, &totals, node)
        } else {
            None
        };

        OpenLeaf {
            node,
            rows,
            totals,
            best,
        }
    }

    fn row_stat(&self, row: usize) -> BinStat {
        BinStat {
            gradient: self.gradients[row],
            hessian: self.hessians[row],
            count: 1,
        }
    }

    /// Best split over all allowed features; histograms are built per feature
    /// in parallel and reduced in feature order
    fn find_best_split(&self, rows: &[usize], totals: &BinStat, node: usize) -> Option<SplitCandidate> {
        let candidates: Vec<Option<SplitCandidate>> = self
            .features
            .par_iter()
            .map(|&feature| self.best_split_for_feature(rows, totals, feature, node))
            .collect();

        candidates.into_iter().flatten().fold(None, |best, candidate| match best {
            Some(current) if !candidate.beats(&current) => Some(current),
            _ => Some(candidate),
        })
    }

    fn best_split_for_feature(
        &self,
        rows: &[usize],
        totals: &BinStat,
        feature: usize,
        node: usize,
    ) -> Option<SplitCandidate> {
        let bins = self.matrix.feature_bins(feature);
        if bins.num_bins() < 2 {
            return None;
        }

        let column = self.matrix.column(feature);
        let mut histogram = vec![BinStat::default(); bins.num_bins()];
        for &row in rows {
            histogram[column[row] as usize].add(&self.row_stat(row));
        }

        let parent_score = totals.score();
        let mut left = BinStat::default();
        let mut best: Option<SplitCandidate> = None;

        for (bin, stat) in histogram.iter().enumerate().take(bins.num_bins() - 1) {
            left.add(stat);
            if stat.count == 0 {
                continue;
            }
            let right = totals.minus(&left);
            if left.count < self.config.min_samples_leaf || right.count < self.config.min_samples_leaf {
                continue;
            }

            let gain = left
                .score()
                .saturating_add(right.score())
                .saturating_sub(parent_score);
            if gain <= 0 {
                continue;
            }

            let threshold = bins.threshold(bin);
            let candidate = SplitCandidate {
                feature_idx: feature,
                bin,
                threshold,
                gain,
                tie_breaker: SplitTieBreaker::new(feature, threshold, node),
            };
            if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                best = Some(candidate);
            }
        }

        best
    }
}

/// Newton step for squared error: -G/H
fn leaf_value(totals: &BinStat) -> i64 {
    if totals.hessian <= 0 {
        return 0;
    }
    let value = -(totals.gradient as i128) / totals.hessian as i128;
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
