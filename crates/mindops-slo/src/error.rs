use thiserror::Error;

#[derive(Debug, Error)]
pub enum SloError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unsupported comparator: {0}")]
    UnsupportedComparator(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type SloResult<T> = Result<T, SloError>;
