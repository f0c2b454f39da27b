//! Error types for the fare core crate

use thiserror::Error;

/// Errors raised while validating or fingerprinting a model
#[derive(Error, Debug)]
pub enum CoreError {
    /// Model structure is inconsistent
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// Canonical serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for fare core operations
pub type Result<T> = std::result::Result<T, CoreError>;
