use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error(transparent)]
    Core(#[from] mindops_core::MindopsError),

    #[error(transparent)]
    Telemetry(#[from] mindops_telemetry::TelemetryError),

    #[error(transparent)]
    Topology(#[from] mindops_topology::TopologyError),

    #[error(transparent)]
    ZeroTouch(#[from] mindops_zerotouch::ZeroTouchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
