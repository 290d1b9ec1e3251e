//! OpenSLO and SLO-store JSON export (component K).

use crate::models::Slo;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;

pub fn export_slo_json(slos: &[Slo]) -> Value {
    json!({
        "schema_version": "slo-copilot/v1",
        "generated_at": Utc::now().to_rfc3339(),
        "slos": slos.iter().map(|slo| json!({
            "name": slo.name,
            "service": slo.service,
            "description": slo.description,
            "labels": slo.labels,
            "target": {
                "metric": slo.target.metric,
                "comparator": slo.target.comparator,
                "threshold": slo.target.threshold,
                "window_days": slo.target.window_days,
            },
        })).collect::<Vec<_>>(),
    })
}

pub fn export_open_slo(slos: &[Slo]) -> Vec<Value> {
    let mut resources = Vec::new();
    resources.extend(service_resources(slos));
    resources.extend(sli_resources(slos));
    resources.extend(slo_resources(slos));
    resources
}

fn service_resources(slos: &[Slo]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut services = Vec::new();
    for slo in slos {
        if !seen.insert(slo.service.clone()) {
            continue;
        }
        services.push(json!({
            "apiVersion": "openslo/v1",
            "kind": "Service",
            "metadata": {"name": slo.service},
            "spec": {"description": format!("Service for {}", slo.service)},
        }));
    }
    services
}

fn sli_resources(slos: &[Slo]) -> Vec<Value> {
    slos.iter()
        .map(|slo| {
            json!({
                "apiVersion": "openslo/v1",
                "kind": "SLI",
                "metadata": {"name": format!("{}-sli", slo.name), "labels": slo.labels},
                "spec": {
                    "service": slo.service,
                    "indicator": {
                        "type": "metric",
                        "metricSource": "trace-derived",
                        "metric": slo.target.metric,
                    },
                },
            })
        })
        .collect()
}

fn slo_resources(slos: &[Slo]) -> Vec<Value> {
    slos.iter()
        .map(|slo| {
            json!({
                "apiVersion": "openslo/v1",
                "kind": "SLO",
                "metadata": {"name": slo.name, "labels": slo.labels},
                "spec": {
                    "description": slo.description,
                    "service": slo.service,
                    "indicator": {
                        "type": "metric",
                        "metricSource": "trace-derived",
                        "metric": slo.target.metric,
                    },
                    "objectives": [{
                        "displayName": slo.name,
                        "op": slo.target.comparator,
                        "value": slo.target.threshold,
                        "timeWindow": {"count": slo.target.window_days, "unit": "Day"},
                    }],
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SloTarget;
    use std::collections::HashMap;

    fn sample_slo() -> Slo {
        Slo {
            name: "latency-p95-checkout".to_string(),
            service: "checkout".to_string(),
            target: SloTarget {
                metric: "latency_p95_ms".to_string(),
                comparator: "<=".to_string(),
                threshold: 650.0,
                window_days: 30,
            },
            description: "p95 latency stays within a safe envelope.".to_string(),
            labels: HashMap::new(),
        }
    }

    #[test]
    fn open_slo_export_produces_service_sli_slo() {
        let resources = export_open_slo(&[sample_slo()]);
        let kinds: Vec<&str> = resources
            .iter()
            .map(|r| r["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["Service", "SLI", "SLO"]);
    }

    #[test]
    fn services_are_deduplicated() {
        let mut second = sample_slo();
        second.name = "error-rate-checkout".to_string();
        let resources = export_open_slo(&[sample_slo(), second]);
        let services = resources
            .iter()
            .filter(|r| r["kind"] == "Service")
            .count();
        assert_eq!(services, 1);
    }
}
