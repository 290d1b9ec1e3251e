use thiserror::Error;

/// Core error taxonomy shared by ingest, statistics, and the scrubber.
#[derive(Debug, Error)]
pub enum MindopsError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type MindopsResult<T> = Result<T, MindopsError>;
