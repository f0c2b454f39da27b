//! Deterministic gradient boosted regression trees
//!
//! - **Integer only**: thresholds, leaves, bias and scores are micro-units
//! - **Shared scoring**: the trainer updates residuals with the same
//!   [`Model::accumulate`] arithmetic used by [`Model::score`]
//! - **Fingerprinted**: canonical JSON + blake3 identifies a model
//!
//! # Usage
//!
//! ```rust
//! use taxi_fare_core::gbdt::{Model, Node, Tree};
//! use taxi_fare_core::SCALE;
//!
//! let tree = Tree::new(
//!     vec![
//!         Node::internal(0, 5 * SCALE, 1, 2),
//!         Node::leaf(-2 * SCALE),
//!         Node::leaf(3 * SCALE),
//!     ],
//!     SCALE,
//! );
//! let model = Model::new(1, 12 * SCALE, vec![tree]);
//!
//! assert_eq!(model.score(&[4 * SCALE]), 10 * SCALE);
//! assert_eq!(model.predict(&[6 * SCALE]), 15.0);
//! ```

pub mod model;
pub mod tree;

pub use model::{Model, MODEL_VERSION};
pub use tree::{Node, Tree};
