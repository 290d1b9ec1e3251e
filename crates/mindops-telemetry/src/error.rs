use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid input: {0}")]
    InputInvalid(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
