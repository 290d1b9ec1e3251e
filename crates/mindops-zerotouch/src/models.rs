use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub ports: Vec<u32>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    pub kind: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub containers: Vec<ContainerSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub selector: HashMap<String, String>,
    #[serde(default)]
    pub ports: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredService {
    pub name: String,
    pub namespace: String,
    pub workload: Option<WorkloadSpec>,
    pub service: Option<ServiceSpec>,
    pub language: String,
    pub ports: Vec<u32>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationPlan {
    pub service_name: String,
    pub namespace: String,
    pub language: String,
    pub otlp_endpoint: String,
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchInstruction {
    pub workload_name: String,
    pub namespace: String,
    pub kind: String,
    pub description: String,
    pub patch: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorPlan {
    pub mode: String,
    pub namespace: String,
    pub sampling_rate: f64,
    pub exporters: Vec<String>,
    pub config_yaml: String,
    pub manifest_yaml: String,
    pub instrumentation: Vec<InstrumentationPlan>,
    pub patches: Vec<PatchInstruction>,
    pub discovered: Vec<DiscoveredService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroTouchPlan {
    pub collector: CollectorPlan,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A command that actually ran, with enough of the process result to
/// diagnose a failure after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedCommand {
    pub argv: Vec<String>,
    pub stdout_tail: String,
    pub stderr_tail: String,
    pub exit_code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedCommand {
    pub argv: Vec<String>,
    pub stdout_tail: String,
    pub stderr_tail: String,
    pub exit_code: Option<i32>,
}

/// Outcome of an apply run (§11.1). Commands before a mid-sequence failure
/// land in `executed`, the one that failed in `failed`, and everything
/// after it — never run — in `skipped`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub executed: Vec<ExecutedCommand>,
    pub failed: Option<FailedCommand>,
    pub skipped: Vec<String>,
}

impl ApplyOutcome {
    pub fn all_commands(&self) -> Vec<String> {
        let mut out: Vec<String> = self.executed.iter().map(|c| c.argv.join(" ")).collect();
        if let Some(failed) = &self.failed {
            out.push(failed.argv.join(" "));
        }
        out.extend(self.skipped.iter().cloned());
        out
    }

    pub fn ok(&self) -> bool {
        self.failed.is_none()
    }
}
