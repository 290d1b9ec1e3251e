use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
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
}

pub type TopologyResult<T> = Result<T, TopologyError>;
