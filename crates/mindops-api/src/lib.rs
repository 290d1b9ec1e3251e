//! Control-plane HTTP API (component M): sampling policy, SLO export and
//! validation, RCA query, and topology analysis, authenticated by API key
//! and audited on every call.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use audit::AuditLedger;
use axum::routing::{get, post};
use axum::Router;
use config::ApiConfig;
use mindops_integrations::{OpenSloSchemaValidator, RcaNarrator, SchemaValidatorAdapter, TemplateRcaNarrator};
use mindops_slo::SloStore;
use state::ControlPlaneState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub config: ApiConfig,
    pub control_state: ControlPlaneState,
    pub slo_store: SloStore,
    pub audit: AuditLedger,
    pub rca_narrator: Arc<dyn RcaNarrator>,
    pub schema_validator: Arc<dyn SchemaValidatorAdapter>,
}

impl AppState {
    pub fn from_config(config: ApiConfig) -> Self {
        let control_state = ControlPlaneState::new(&config.control_store);
        let slo_store = SloStore::new(&config.slo_store);
        let audit = AuditLedger::new(&config.audit_log);
        Self {
            config,
            control_state,
            slo_store,
            audit,
            rca_narrator: Arc::new(TemplateRcaNarrator),
            schema_validator: Arc::new(OpenSloSchemaValidator),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/policy/sampling",
            get(handlers::get_sampling_policy).post(handlers::set_sampling_policy),
        )
        .route("/slo/export", get(handlers::export_slos))
        .route("/slo/validate", post(handlers::validate_openslo))
        .route("/rca/query", post(handlers::rca_query))
        .route("/topology/analyze", post(handlers::topology_analyze))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
