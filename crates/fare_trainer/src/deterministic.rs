//! Deterministic utilities for reproducible training
//!
//! Seeded LCG for feature subsampling and the split tie-breaker, so that a
//! fixed seed and fixed row order always produce the same model.

use std::num::Wrapping;

use taxi_fare_core::SCALE;

/// Linear Congruential Generator (glibc constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: i64) -> Self {
        Self {
            state: Wrapping(seed.wrapping_abs() % Self::MODULUS),
        }
    }

    /// Next value in [0, MODULUS)
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0 & (Self::MODULUS - 1)
    }

    /// Next value in [0, max)
    pub fn next_range(&mut self, max: i64) -> i64 {
        if max <= 0 {
            return 0;
        }
        self.next_i64() % max
    }

    /// Next value in [0, SCALE), i.e. a fixed-point fraction in [0.0, 1.0)
    pub fn next_unit_micro(&mut self) -> i64 {
        (self.next_i64() * SCALE) / Self::MODULUS
    }
}

/// Pick the features a tree may split on.
///
/// `fraction` is fixed-point; at `SCALE` every feature is kept and the
/// generator is not advanced. At least one feature is always returned.
pub fn sample_features(rng: &mut LcgRng, feature_count: usize, fraction: i64) -> Vec<usize> {
    if fraction >= SCALE || feature_count == 0 {
        return (0..feature_count).collect();
    }

    let mut picked: Vec<usize> = (0..feature_count)
        .filter(|_| rng.next_unit_micro() < fraction)
        .collect();

    if picked.is_empty() {
        picked.push(rng.next_range(feature_count as i64) as usize);
    }
    picked
}

/// Ordering key for equal-gain splits: lower feature, then lower threshold,
/// then lower node id wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: i64,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: i64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            node_id,
        }
    }
}
