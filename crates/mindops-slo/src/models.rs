use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SloTarget {
    pub metric: String,
    pub comparator: String,
    pub threshold: f64,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_window_days() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slo {
    pub name: String,
    pub service: String,
    pub target: SloTarget,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Observed values keyed by the same metric names SLO targets reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SloMetrics {
    pub latency_p50_ms: Option<f64>,
    pub latency_p95_ms: Option<f64>,
    pub latency_p99_ms: Option<f64>,
    pub error_rate: Option<f64>,
    pub availability: Option<f64>,
    pub coverage_ratio: Option<f64>,
}

impl SloMetrics {
    pub fn get(&self, metric: &str) -> Option<f64> {
        match metric {
            "latency_p50_ms" => self.latency_p50_ms,
            "latency_p95_ms" => self.latency_p95_ms,
            "latency_p99_ms" => self.latency_p99_ms,
            "error_rate" => self.error_rate,
            "availability" => self.availability,
            "coverage_ratio" => self.coverage_ratio,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloEvaluation {
    pub slo: Slo,
    pub passed: bool,
    pub observed_value: Option<f64>,
    pub threshold: f64,
    pub comparator: String,
    pub metric: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceTestCase {
    pub name: String,
    pub description: String,
    #[serde(default = "default_multiplier")]
    pub latency_multiplier: f64,
    #[serde(default)]
    pub error_rate_delta: f64,
    #[serde(default)]
    pub availability_delta: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceTestResult {
    pub case: TraceTestCase,
    pub evaluations: Vec<SloEvaluation>,
}
