//! Zero-touch instrumentation planner (component I).

use crate::manifests::{
    build_collector_config, build_daemonset_manifest, build_gateway_manifest, build_sidecar_patch,
    sidecar_manifest_stub,
};
use crate::models::{
    CollectorPlan, DiscoveredService, InstrumentationPlan, PatchInstruction, ZeroTouchPlan,
};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ZeroTouchPlanner {
    pub mode: String,
    pub namespace: String,
    pub exporters: Vec<String>,
    pub otlp_export_endpoint: Option<String>,
    pub sampling_rate: f64,
}

impl Default for ZeroTouchPlanner {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            namespace: "observability".to_string(),
            exporters: vec!["logging".to_string()],
            otlp_export_endpoint: None,
            sampling_rate: 1.0,
        }
    }
}

impl ZeroTouchPlanner {
    pub fn plan(&self, discovered: &[DiscoveredService]) -> ZeroTouchPlan {
        let mut warnings = Vec::new();
        let mut mode = self.resolve_mode(discovered);
        if mode == "auto" {
            warnings.push("Fell back to gateway mode due to missing workload signals.".to_string());
            mode = "gateway".to_string();
        }

        let config_yaml = build_collector_config(self.sampling_rate, &self.exporters, self.otlp_export_endpoint.as_deref());

        let (manifest_yaml, otlp_endpoint, mode) = match mode.as_str() {
            "gateway" => (
                build_gateway_manifest(&self.namespace, &config_yaml),
                format!("http://otel-collector-gateway.{}:4317", self.namespace),
                "gateway".to_string(),
            ),
            "daemonset" => (
                build_daemonset_manifest(&self.namespace, &config_yaml),
                format!("http://otel-collector-daemonset.{}:4317", self.namespace),
                "daemonset".to_string(),
            ),
            "sidecar" => (
                sidecar_manifest_stub(&self.namespace, &config_yaml),
                "http://localhost:4317".to_string(),
                "sidecar".to_string(),
            ),
            other => {
                warnings.push(format!("Unknown mode {other}, defaulting to gateway."));
                (
                    build_gateway_manifest(&self.namespace, &config_yaml),
                    format!("http://otel-collector-gateway.{}:4317", self.namespace),
                    "gateway".to_string(),
                )
            }
        };

        let instrumentation = build_instrumentation(discovered, &otlp_endpoint);
        let patches = build_patches(discovered, &otlp_endpoint, &mode);

        let collector = CollectorPlan {
            mode,
            namespace: self.namespace.clone(),
            sampling_rate: self.sampling_rate,
            exporters: self.exporters.clone(),
            config_yaml,
            manifest_yaml,
            instrumentation,
            patches,
            discovered: discovered.to_vec(),
        };

        ZeroTouchPlan { collector, warnings }
    }

    fn resolve_mode(&self, discovered: &[DiscoveredService]) -> String {
        if self.mode != "auto" {
            return self.mode.clone();
        }
        let workloads: Vec<_> = discovered.iter().filter_map(|d| d.workload.as_ref()).collect();
        if workloads.iter().any(|w| w.kind == "DaemonSet") {
            return "daemonset".to_string();
        }
        if !workloads.is_empty() && workloads.len() <= 5 {
            return "sidecar".to_string();
        }
        if !workloads.is_empty() {
            return "gateway".to_string();
        }
        "auto".to_string()
    }
}

fn build_instrumentation(discovered: &[DiscoveredService], otlp_endpoint: &str) -> Vec<InstrumentationPlan> {
    discovered
        .iter()
        .map(|item| {
            let mut env = HashMap::new();
            env.insert("OTEL_EXPORTER_OTLP_ENDPOINT".to_string(), otlp_endpoint.to_string());
            env.insert("OTEL_SERVICE_NAME".to_string(), item.name.clone());
            env.insert(
                "OTEL_RESOURCE_ATTRIBUTES".to_string(),
                format!("service.namespace={},service.name={}", item.namespace, item.name),
            );
            InstrumentationPlan {
                service_name: item.name.clone(),
                namespace: item.namespace.clone(),
                language: item.language.clone(),
                otlp_endpoint: otlp_endpoint.to_string(),
                env,
            }
        })
        .collect()
}

fn build_patches(discovered: &[DiscoveredService], otlp_endpoint: &str, mode: &str) -> Vec<PatchInstruction> {
    let mut patches: Vec<PatchInstruction> = discovered
        .iter()
        .filter_map(|item| {
            let workload = item.workload.as_ref()?;
            let (description, patch) = build_sidecar_patch(otlp_endpoint, &item.name);
            Some(PatchInstruction {
                workload_name: workload.name.clone(),
                namespace: workload.namespace.clone(),
                kind: workload.kind.clone(),
                description,
                patch: expand_patch_containers(&patch, workload),
            })
        })
        .collect();

    if mode != "sidecar" {
        for patch in &mut patches {
            patch.description =
                "Inject OTLP exporter env vars to send telemetry to collector gateway.".to_string();
        }
    }
    patches
}

fn expand_patch_containers(patch: &Value, workload: &crate::models::WorkloadSpec) -> Value {
    let env = patch
        .pointer("/spec/template/spec/containers/0/env")
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    let containers: Vec<Value> = workload
        .containers
        .iter()
        .map(|c| serde_json::json!({"name": c.name, "env": env}))
        .collect();
    serde_json::json!({
        "spec": {
            "template": {
                "spec": {
                    "containers": containers,
                }
            }
        }
    })
}
