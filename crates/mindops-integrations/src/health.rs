use serde::{Deserialize, Serialize};

/// Status probe shared by every capability adapter, grounded on the
/// teacher's `ConnectorHealth` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterHealth {
    pub ready: bool,
    pub detail: Option<String>,
}

impl AdapterHealth {
    pub fn ready() -> Self {
        Self { ready: true, detail: None }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self { ready: false, detail: Some(detail.into()) }
    }
}
