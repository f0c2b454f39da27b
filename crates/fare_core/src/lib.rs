//! Deterministic regression tree core for taxi fare prediction
//!
//! Provides the integer-only representation of a boosted regression tree
//! ensemble and the scoring routine shared by training and inference.
//!
//! Modules:
//! - `fixed`: conversions between real values and micro-unit integers
//! - `gbdt`: tree nodes, trees, and the ensemble model
//! - `serde_canon`: canonical JSON and blake3 fingerprints
//! - `errors`: error type for model validation and fingerprinting

pub mod errors;
pub mod fixed;
pub mod gbdt;
pub mod serde_canon;

pub use errors::{CoreError, Result};
pub use fixed::SCALE;
pub use gbdt::{Model, Node, Tree};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
