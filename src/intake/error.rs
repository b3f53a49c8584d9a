use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntakeError>;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// The session holds a stage the interview cannot continue from.
    #[error("invalid interview stage: {0}")]
    InvalidState(String),

    #[error("failed to write candidate record {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode candidate record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Structured content that could not be turned into profile updates.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("malformed structured data: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("structured data is not a JSON object")]
    NotAnObject,
}
