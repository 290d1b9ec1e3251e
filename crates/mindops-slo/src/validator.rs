//! OpenSLO structural validation (component K).
//!
//! A real JSON-schema validator is an optional capability behind
//! `mindops-integrations`; this is always the fallback path and is exercised
//! directly whenever that capability probes as unavailable.

use serde_json::Value;

const ALLOWED_KINDS: [&str; 3] = ["Service", "SLI", "SLO"];

pub fn validate_openslo_payload(payload: &Value) -> (bool, Vec<String>) {
    let mut errors = Vec::new();
    let Some(items) = payload.as_array() else {
        return (false, vec!["OpenSLO payload must be a list of resources.".to_string()]);
    };

    for (idx, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            errors.push(format!("Item {idx} must be an object."));
            continue;
        };

        let kind = obj.get("kind").and_then(Value::as_str);
        if !kind.map(|k| ALLOWED_KINDS.contains(&k)).unwrap_or(false) {
            errors.push(format!("Item {idx} has invalid kind: {:?}", kind));
        }

        let has_name = obj
            .get("metadata")
            .and_then(Value::as_object)
            .map(|m| m.contains_key("name"))
            .unwrap_or(false);
        if !has_name {
            errors.push(format!("Item {idx} is missing metadata.name"));
        }

        let spec = obj.get("spec").and_then(Value::as_object);
        let Some(spec) = spec else {
            errors.push(format!("Item {idx} missing spec object"));
            continue;
        };

        if kind == Some("SLO") {
            if !spec.contains_key("indicator") {
                errors.push(format!("Item {idx} SLO missing indicator"));
            }
            let objectives_ok = spec
                .get("objectives")
                .and_then(Value::as_array)
                .map(|o| !o.is_empty())
                .unwrap_or(false);
            if !objectives_ok {
                errors.push(format!("Item {idx} SLO missing objectives"));
            }
        }
    }

    (errors.is_empty(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exports::export_open_slo;
    use crate::generator::SloGenerator;
    use mindops_core::ingest_spans;
    use serde_json::json;

    #[test]
    fn s3_openslo_round_trip() {
        let payload = json!([
            {"traceId": "t1", "spanId": "p1", "startTime": 0.0, "endTime": 520.0,
             "name": "charge", "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "payment"}}]},
        ]);
        let stats = mindops_core::compute_trace_stats(&ingest_spans(&payload));
        let slos = SloGenerator::default().generate(&stats, None);
        let resources = export_open_slo(&slos);
        let (valid, errors) = validate_openslo_payload(&json!(resources));
        assert!(valid, "errors: {errors:?}");
        assert!(errors.is_empty());
    }

    #[test]
    fn rejects_non_array_payload() {
        let (valid, errors) = validate_openslo_payload(&json!({"kind": "SLO"}));
        assert!(!valid);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn slo_without_objectives_is_rejected() {
        let payload = json!([{
            "apiVersion": "openslo/v1",
            "kind": "SLO",
            "metadata": {"name": "x"},
            "spec": {"indicator": {}},
        }]);
        let (valid, errors) = validate_openslo_payload(&payload);
        assert!(!valid);
        assert!(errors.iter().any(|e| e.contains("objectives")));
    }
}
