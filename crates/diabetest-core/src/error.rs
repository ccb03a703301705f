//! Error type shared by every diabetest crate.

use std::path::PathBuf;

/// Errors raised while loading artifacts or scoring a patient record.
#[derive(Debug, thiserror::Error)]
pub enum DiabetestError {
    #[error("Failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Request body must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' is not numeric: {value}")]
    NonNumeric { field: &'static str, value: String },

    #[error("Model produced an invalid probability: {0}")]
    InvalidProbability(f64),
}
