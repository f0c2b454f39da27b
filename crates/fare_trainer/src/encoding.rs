//! One-hot encoding for categorical trip columns.
//!
//! The vocabulary is learned at fit time in order of first occurrence, so the
//! slot assigned to each category depends only on the training row order.
//! Values outside the vocabulary encode to an all-zero indicator.

use std::collections::HashMap;

use taxi_fare_core::SCALE;

/// Indicator value written to the slot of a known category
pub const HOT: i64 = SCALE;

/// Fitted one-hot encoder for a single column
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OneHotEncoder {
    categories: Vec<String>,
    slots: HashMap<String, usize>,
}

impl OneHotEncoder {
    /// Learn the vocabulary from the observed values
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut encoder = Self::default();
        for value in values {
            if !encoder.slots.contains_key(value) {
                encoder.slots.insert(value.to_string(), encoder.categories.len());
                encoder.categories.push(value.to_string());
            }
        }
        encoder
    }

    /// Categories in slot order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of indicator slots
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn slot(&self, value: &str) -> Option<usize> {
        self.slots.get(value).copied()
    }

    /// Append the indicator vector for `value` to `out`
    pub fn encode_into(&self, value: &str, out: &mut Vec<i64>) {
        let start = out.len();
        out.resize(start + self.width(), 0);
        if let Some(slot) = self.slot(value) {
            out[start + slot] = HOT;
        }
    }

    pub fn encode(&self, value: &str) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.width());
        self.encode_into(value, &mut out);
        out
    }
}
