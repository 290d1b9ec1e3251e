use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZeroTouchError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("unsupported manifest type: {0}")]
    UnsupportedManifestType(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("kubectl exited with status {status}: {stderr}")]
    KubectlFailed { status: String, stderr: String },
}

pub type ZeroTouchResult<T> = Result<T, ZeroTouchError>;
