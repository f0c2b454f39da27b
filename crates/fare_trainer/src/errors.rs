use std::path::PathBuf;

use taxi_fare_core::CoreError;
use thiserror::Error;

/// Errors returned by loading, fitting, and evaluation.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}{}: {message}", .path.display(), line_suffix(.line))]
    Format {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("invalid training configuration: {0}")]
    Config(String),

    #[error("invalid pipeline: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Model(#[from] CoreError),
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" line {l}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, TrainerError>;
