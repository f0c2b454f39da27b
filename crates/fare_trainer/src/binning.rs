//! Feature binning for histogram-based split search
//!
//! Each feature column is discretized once before boosting. A value maps to
//! the first bin whose upper bound is `>=` the value, so a split after bin `b`
//! is exactly the test `value <= upper_bound(b)` used at inference.

use rayon::prelude::*;

/// Bin boundaries for one feature column
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureBins {
    /// Ascending; the last bound is `i64::MAX`
    upper_bounds: Vec<i64>,
}

impl FeatureBins {
    /// Derive boundaries from the observed values.
    ///
    /// With at most `max_bins` distinct values every value gets its own bin
    /// and boundaries sit at integer midpoints between neighbours. Otherwise
    /// boundaries are placed at equal-frequency cut points.
    pub fn fit(values: &[i64], max_bins: usize) -> Self {
        let max_bins = max_bins.max(1);

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let mut distinct: Vec<(i64, usize)> = Vec::new();
        for value in sorted {
            match distinct.last_mut() {
                Some((last, count)) if *last == value => *count += 1,
                _ => distinct.push((value, 1)),
            }
        }

        let mut upper_bounds = Vec::new();
        if distinct.len() <= max_bins {
            for pair in distinct.windows(2) {
                upper_bounds.push(midpoint(pair[0].0, pair[1].0));
            }
        } else {
            let total = values.len();
            let mut seen = 0usize;
            for pair in distinct.windows(2) {
                seen += pair[0].1;
                let wanted = (upper_bounds.len() + 1) * total / max_bins;
                if seen >= wanted && upper_bounds.len() + 1 < max_bins {
                    upper_bounds.push(midpoint(pair[0].0, pair[1].0));
                }
            }
        }
        upper_bounds.push(i64::MAX);

        Self { upper_bounds }
    }

    pub fn num_bins(&self) -> usize {
        self.upper_bounds.len()
    }

    pub fn bin(&self, value: i64) -> u16 {
        self.upper_bounds.partition_point(|&bound| bound < value) as u16
    }

    /// Split threshold that sends bins `0..=bin` left
    pub fn threshold(&self, bin: usize) -> i64 {
        self.upper_bounds[bin]
    }
}

/// Largest integer `m` with `a <= m < b`, halfway between `a` and `b`
fn midpoint(a: i64, b: i64) -> i64 {
    (a as i128 + (b as i128 - a as i128) / 2) as i64
}

/// Column-major bin indices of a featurized table
#[derive(Clone, Debug)]
pub struct BinnedMatrix {
    bins: Vec<FeatureBins>,
    columns: Vec<Vec<u16>>,
    rows: usize,
}

impl BinnedMatrix {
    pub fn from_rows(rows: &[Vec<i64>], feature_count: usize, max_bins: usize) -> Self {
        let (bins, columns): (Vec<FeatureBins>, Vec<Vec<u16>>) = (0..feature_count)
            .into_par_iter()
            .map(|f| {
                let values: Vec<i64> = rows.iter().map(|row| row[f]).collect();
                let bins = FeatureBins::fit(&values, max_bins);
                let column: Vec<u16> = values.iter().map(|&v| bins.bin(v)).collect();
                (bins, column)
            })
            .unzip();

        Self {
            bins,
            columns,
            rows: rows.len(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn feature_count(&self) -> usize {
        self.bins.len()
    }

    pub fn feature_bins(&self, feature: usize) -> &FeatureBins {
        &self.bins[feature]
    }

    pub fn column(&self, feature: usize) -> &[u16] {
        &self.columns[feature]
    }
}
