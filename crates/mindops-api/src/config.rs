//! Environment-driven configuration, loaded once at process start (§6, §10.3).

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub control_store: PathBuf,
    pub slo_store: PathBuf,
    pub audit_log: PathBuf,
    pub port: u16,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            control_store: std::env::var("CONTROL_PLANE_STORE")
                .unwrap_or_else(|_| "data/control_plane_state.json".to_string())
                .into(),
            slo_store: std::env::var("SLO_STORE_PATH")
                .unwrap_or_else(|_| "data/slo_store.json".to_string())
                .into(),
            audit_log: std::env::var("CONTROL_PLANE_AUDIT_LOG")
                .unwrap_or_else(|_| "data/audit.log".to_string())
                .into(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8088),
        }
    }
}
