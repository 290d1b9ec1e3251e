//! Route handlers for the control-plane HTTP surface (§4.M).

use crate::auth::{authorize, ActorContext};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use mindops_integrations::{RcaNarrator, SchemaValidatorAdapter};
use mindops_topology::TopologyAnalyzer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn get_sampling_policy(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
) -> Result<Json<Value>, ApiError> {
    authorize(&actor, "policy.read")?;
    let control_state = state.control_state.load();
    let policy = control_state.get("sampling_policy").cloned().unwrap_or(json!({}));
    state.audit.record(
        "policy.read",
        &actor,
        "ok",
        json!({ "has_policy": !policy.as_object().map(|m| m.is_empty()).unwrap_or(true) }),
    );
    Ok(Json(policy))
}

#[derive(Debug, Deserialize)]
pub struct SamplingPolicyBody {
    #[serde(default)]
    pub sampling_action: Option<String>,
    #[serde(default)]
    pub sampling_rate: Option<f64>,
}

pub async fn set_sampling_policy(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
    Json(body): Json<SamplingPolicyBody>,
) -> Result<Json<Value>, ApiError> {
    authorize(&actor, "policy.write")?;

    let mut payload = serde_json::Map::new();
    if let Some(action) = &body.sampling_action {
        payload.insert("sampling_action".to_string(), json!(action));
    }
    if let Some(rate) = body.sampling_rate {
        payload.insert("sampling_rate".to_string(), json!(rate));
    }
    if payload.is_empty() {
        state.audit.record("policy.write", &actor, "invalid", json!({ "reason": "empty_payload" }));
        return Err(ApiError::InputInvalid("Provide sampling_action or sampling_rate".to_string()));
    }

    let payload = Value::Object(payload);
    state
        .control_state
        .save_sampling_policy(payload.clone())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let keys: Vec<&str> = payload.as_object().map(|m| m.keys().map(String::as_str).collect()).unwrap_or_default();
    state.audit.record("policy.write", &actor, "ok", json!({ "payload_keys": keys }));
    Ok(Json(payload))
}

pub async fn export_slos(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
) -> Result<Json<Value>, ApiError> {
    authorize(&actor, "slo.read")?;
    let path = state.slo_store.path();
    if !path.exists() {
        state.audit.record("slo.read", &actor, "not_found", json!({ "path": path.display().to_string() }));
        return Err(ApiError::NotFound(format!("SLO store not found: {}", path.display())));
    }
    let raw = state.slo_store.load_raw().map_err(ApiError::from)?;
    state.audit.record("slo.read", &actor, "ok", json!({ "path": path.display().to_string() }));
    Ok(Json(raw))
}

#[derive(Debug, Deserialize)]
pub struct OpenSloValidateBody {
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

pub async fn validate_openslo(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
    Json(body): Json<OpenSloValidateBody>,
) -> Result<Json<ValidateResponse>, ApiError> {
    authorize(&actor, "slo.validate")?;
    let (valid, errors) = state.schema_validator.validate(&body.payload, None).await;
    state.audit.record(
        "slo.validate",
        &actor,
        "ok",
        json!({ "valid": valid, "error_count": errors.len() }),
    );
    Ok(Json(ValidateResponse { valid, errors }))
}

#[derive(Debug, Deserialize)]
pub struct TraceQuery {
    pub trace_path: String,
}

#[derive(Debug, Serialize)]
pub struct RcaQueryResponse {
    pub narrative: String,
    pub hints: Vec<mindops_topology::RcaHint>,
    pub metrics: mindops_topology::GraphMetrics,
}

pub async fn rca_query(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
    Json(query): Json<TraceQuery>,
) -> Result<Json<RcaQueryResponse>, ApiError> {
    authorize(&actor, "rca.query")?;

    let health = state.rca_narrator.probe().await;
    if !health.ready {
        let detail = health.detail.unwrap_or_else(|| "RCA narrator unavailable".to_string());
        state.audit.record("rca.query", &actor, "unavailable", json!({ "error": detail }));
        return Err(ApiError::IntegrationUnavailable(detail));
    }

    if !Path::new(&query.trace_path).exists() {
        state.audit.record("rca.query", &actor, "not_found", json!({ "trace_path": query.trace_path }));
        return Err(ApiError::NotFound("Trace path not found".to_string()));
    }

    let analyzer = TopologyAnalyzer::default();
    let empty: [&str; 0] = [];
    let report = analyzer.analyze(&empty, &[query.trace_path.as_str()]).map_err(ApiError::from)?;
    let narrative = state.rca_narrator.narrate(&report.hints).await;

    state.audit.record("rca.query", &actor, "ok", json!({ "trace_path": query.trace_path }));
    Ok(Json(RcaQueryResponse { narrative, hints: report.hints, metrics: report.metrics }))
}

#[derive(Debug, Deserialize, Default)]
pub struct TopologyQuery {
    #[serde(default)]
    pub manifest_paths: Vec<String>,
    #[serde(default)]
    pub trace_paths: Vec<String>,
}

pub async fn topology_analyze(
    State(state): State<Arc<AppState>>,
    actor: ActorContext,
    Json(query): Json<TopologyQuery>,
) -> Result<Json<mindops_topology::TopologyReport>, ApiError> {
    authorize(&actor, "topology.analyze")?;

    let analyzer = TopologyAnalyzer::default();
    let report = analyzer
        .analyze(&query.manifest_paths, &query.trace_paths)
        .map_err(ApiError::from)?;

    state.audit.record(
        "topology.analyze",
        &actor,
        "ok",
        json!({
            "manifest_count": query.manifest_paths.len(),
            "trace_count": query.trace_paths.len(),
        }),
    );
    Ok(Json(report))
}
