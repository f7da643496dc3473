//! Error taxonomy for the segmentation pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A field named in the feature order is absent from the record.
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Categorical value unseen during training and the codec has no fallback.
    #[error("Unsupported value '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No codec or normalization stats registered for field '{field}'")]
    UnregisteredField { field: String },

    #[error("Field '{field}' expects a numeric value, got '{value}'")]
    NonNumericValue { field: String, value: String },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid artifact {artifact}: {reason}")]
    InvalidArtifact { artifact: String, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid_artifact(artifact: &str, reason: impl Into<String>) -> Self {
        Error::InvalidArtifact {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors caused by the request itself rather than by the artifact set.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::MissingField { .. }
            | Error::UnknownCategory { .. }
            | Error::NonNumericValue { .. }
            | Error::MalformedRecord(_) => true,
            Error::Record { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}
