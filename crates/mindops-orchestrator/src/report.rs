//! The composed report object (component N).

use mindops_coverage::CoverageReport;
use mindops_gate::GateDecision;
use mindops_integrations::AdapterHealth;
use mindops_slo::{Slo, SloEvaluation, TraceTestResult};
use mindops_telemetry::TelemetryRecommendation;
use mindops_zerotouch::{ApplyOutcome, ZeroTouchPlan};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatus {
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl IntegrationStatus {
    pub fn ready(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: "ready".to_string(), detail: String::new() }
    }

    pub fn unavailable(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status: "unavailable".to_string(), detail: detail.into() }
    }

    /// Converts a capability adapter's [`AdapterHealth`] probe result into
    /// the report's status shape (§4.N is populated from these probes).
    pub fn from_health(name: impl Into<String>, health: AdapterHealth) -> Self {
        if health.ready {
            Self::ready(name)
        } else {
            Self::unavailable(name, health.detail.unwrap_or_else(|| "adapter reported not ready".to_string()))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RcaReport {
    pub narrative: String,
    pub hints: Vec<mindops_topology::RcaHint>,
    pub metrics: mindops_topology::GraphMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorReport {
    pub slo_candidates: Vec<Slo>,
    pub baseline_evaluations: Vec<SloEvaluation>,
    pub test_results: Vec<TraceTestResult>,
    pub coverage: Option<CoverageReport>,
    pub telemetry_recommendation: Option<TelemetryRecommendation>,
    pub rca: Option<RcaReport>,
    pub policy_snippets: HashMap<String, String>,
    pub gate: Option<GateDecision>,
    pub integrations_status: HashMap<String, IntegrationStatus>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_touch: Option<ZeroTouchPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_touch_apply: Option<ApplyOutcome>,
}

impl OrchestratorReport {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
