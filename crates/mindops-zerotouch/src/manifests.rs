//! Collector config and manifest rendering.

use serde_json::{json, Value};

pub fn build_collector_config(sampling_rate: f64, exporters: &[String], otlp_export_endpoint: Option<&str>) -> String {
    let mut processor_blocks = vec!["memory_limiter".to_string(), "batch".to_string()];
    if sampling_rate < 1.0 {
        processor_blocks.insert(0, "probabilistic_sampler".to_string());
    }
    let exporters_config = exporter_config(exporters, otlp_export_endpoint);
    let exporters_list = exporters.join(", ");
    let processors_list = processor_blocks.join(", ");

    let sampler_block = if sampling_rate < 1.0 {
        format!("  probabilistic_sampler:\n    sampling_percentage: {:.1}\n", sampling_rate * 100.0)
    } else {
        String::new()
    };

    format!(
        "receivers:\n  otlp:\n    protocols:\n      grpc:\n      http:\n\nprocessors:\n  memory_limiter:\n    check_interval: 1s\n    limit_mib: 400\n  batch:\n    timeout: 1s\n    send_batch_size: 1024\n{sampler_block}\nexporters:\n{exporters_config}\n\nservice:\n  pipelines:\n    traces:\n      receivers: [otlp]\n      processors: [{processors_list}]\n      exporters: [{exporters_list}]\n    metrics:\n      receivers: [otlp]\n      processors: [{processors_list}]\n      exporters: [{exporters_list}]\n    logs:\n      receivers: [otlp]\n      processors: [{processors_list}]\n      exporters: [{exporters_list}]\n"
    )
}

fn exporter_config(exporters: &[String], otlp_export_endpoint: Option<&str>) -> String {
    let mut blocks = Vec::new();
    for exporter in exporters {
        match exporter.as_str() {
            "logging" => blocks.push("  logging:\n    loglevel: info".to_string()),
            "otlp" => {
                let endpoint = otlp_export_endpoint.unwrap_or("http://otel-collector-gateway:4317");
                blocks.push(format!("  otlp:\n    endpoint: {endpoint}\n    tls:\n      insecure: true"));
            }
            _ => {}
        }
    }
    blocks.join("\n")
}

pub fn build_gateway_manifest(namespace: &str, config_yaml: &str) -> String {
    collector_manifest("Deployment", "otel-collector-gateway", namespace, config_yaml, "otel-collector-gateway")
}

pub fn build_daemonset_manifest(namespace: &str, config_yaml: &str) -> String {
    collector_manifest("DaemonSet", "otel-collector-daemonset", namespace, config_yaml, "otel-collector-daemonset")
}

fn collector_manifest(kind: &str, name: &str, namespace: &str, config_yaml: &str, label_value: &str) -> String {
    let label_block = format!("    app: {label_value}");
    format!(
        "---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {name}-config\n  namespace: {namespace}\ndata:\n  otel-collector-config.yaml: |\n{}\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: {name}\n  namespace: {namespace}\nspec:\n  selector:\n{label_block}\n  ports:\n    - name: otlp-grpc\n      port: 4317\n      targetPort: 4317\n    - name: otlp-http\n      port: 4318\n      targetPort: 4318\n---\napiVersion: apps/v1\nkind: {kind}\nmetadata:\n  name: {name}\n  namespace: {namespace}\nspec:\n  selector:\n    matchLabels:\n{label_block}\n  template:\n    metadata:\n      labels:\n{label_block}\n    spec:\n      containers:\n        - name: otel-collector\n          image: otel/opentelemetry-collector:0.97.0\n          args: [\"--config=/etc/otel/otel-collector-config.yaml\"]\n          ports:\n            - containerPort: 4317\n            - containerPort: 4318\n          volumeMounts:\n            - name: otel-config\n              mountPath: /etc/otel\n      volumes:\n        - name: otel-config\n          configMap:\n            name: {name}-config\n",
        indent(config_yaml, 4)
    )
}

pub fn build_sidecar_patch(otlp_endpoint: &str, service_name: &str) -> (String, Value) {
    let description = "Inject OTLP exporter env vars to send telemetry to sidecar collector.".to_string();
    let patch = json!({
        "spec": {
            "template": {
                "spec": {
                    "containers": [{
                        "name": "${CONTAINER_NAME}",
                        "env": [
                            {"name": "OTEL_EXPORTER_OTLP_ENDPOINT", "value": otlp_endpoint},
                            {"name": "OTEL_SERVICE_NAME", "value": service_name},
                        ],
                    }]
                }
            }
        }
    });
    (description, patch)
}

pub fn sidecar_manifest_stub(namespace: &str, config_yaml: &str) -> String {
    format!(
        "---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: otel-collector-sidecar-config\n  namespace: {namespace}\ndata:\n  otel-collector-config.yaml: |\n{}\n# Sidecar injection required: mount the config and run otel/opentelemetry-collector in each workload.\n",
        indent(config_yaml, 4)
    )
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| if line.trim().is_empty() { pad.clone() } else { format!("{pad}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_below_one_inserts_probabilistic_sampler() {
        let config = build_collector_config(0.25, &["logging".to_string()], None);
        assert!(config.contains("probabilistic_sampler"));
        assert!(config.contains("sampling_percentage: 25.0"));
    }

    #[test]
    fn full_sampling_omits_probabilistic_sampler() {
        let config = build_collector_config(1.0, &["logging".to_string()], None);
        assert!(!config.contains("probabilistic_sampler"));
    }

    #[test]
    fn gateway_manifest_includes_three_documents() {
        let config = build_collector_config(1.0, &["logging".to_string()], None);
        let manifest = build_gateway_manifest("observability", &config);
        assert_eq!(manifest.matches("---").count(), 3);
    }
}
