//! Trace ingest (component B): normalize flat span arrays or nested OTLP
//! payloads into the uniform [`Span`] model.

use crate::span::{AttributeValue, Span};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Parse either a flat array of span objects or an OTLP-shaped
/// `resourceSpans[].scopeSpans[].spans[]` document.
pub fn ingest_spans(payload: &Value) -> Vec<Span> {
    let mut raw = Vec::new();
    match payload {
        Value::Array(items) => {
            for item in items {
                raw.push((item.clone(), extract_top_level_service(item)));
            }
        }
        Value::Object(_) => {
            if let Some(resource_spans) = payload.get("resourceSpans").and_then(Value::as_array) {
                for resource in resource_spans {
                    let service = resource_service_name(resource);
                    for scope in resource
                        .get("scopeSpans")
                        .and_then(Value::as_array)
                        .unwrap_or(&Vec::new())
                    {
                        for span in scope.get("spans").and_then(Value::as_array).unwrap_or(&Vec::new()) {
                            raw.push((span.clone(), Some(service.clone())));
                        }
                    }
                }
            }
        }
        _ => {}
    }

    let mut spans: Vec<Span> = raw
        .into_iter()
        .filter_map(|(value, service_hint)| match normalize_span(&value, service_hint) {
            Ok(span) => Some(span),
            Err(reason) => {
                warn!(reason, "skipping unparseable span");
                None
            }
        })
        .collect();

    attach_parent_services(&mut spans);
    spans
}

fn extract_top_level_service(span: &Value) -> Option<String> {
    attribute_list_value(span.get("attributes"), "service.name")
}

fn resource_service_name(resource: &Value) -> String {
    let attrs = resource
        .get("resource")
        .and_then(|r| r.get("attributes"))
        .or_else(|| resource.get("attributes"));
    attribute_list_value(attrs, "service.name").unwrap_or_else(|| "unknown".to_string())
}

/// OTLP attribute lists are `[{key, value: {stringValue|intValue|...: v}}]`.
fn attribute_list_value(attrs: Option<&Value>, key: &str) -> Option<String> {
    let list = attrs?.as_array()?;
    for attr in list {
        let attr_key = attr
            .get("key")
            .or_else(|| attr.get("name"))
            .and_then(Value::as_str);
        if attr_key == Some(key) {
            return unwrap_attribute_value(attr.get("value")?).as_str().map(|s| s.to_string());
        }
    }
    None
}

/// Unwrap an OTLP typed container `{stringValue|intValue|...: v}` down to `v`.
fn unwrap_attribute_value(value: &Value) -> AttributeValue {
    if let Value::Object(map) = value {
        if let Some((_, inner)) = map.iter().next() {
            return json_to_attribute(inner);
        }
    }
    json_to_attribute(value)
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::String(s.clone()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else {
                AttributeValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        other => AttributeValue::String(other.to_string()),
    }
}

fn normalize_span(value: &Value, service_hint: Option<String>) -> Result<Span, String> {
    let trace_id = first_str(value, &["traceId", "trace_id"]).unwrap_or_else(|| "unknown".to_string());
    let span_id = first_str(value, &["spanId", "span_id"]).unwrap_or_else(|| "unknown".to_string());
    let parent_id = first_str(value, &["parentSpanId", "parentSpanID", "parent_id"]);

    let mut attributes = HashMap::new();
    if let Some(list) = value.get("attributes").and_then(Value::as_array) {
        for attr in list {
            let key = attr
                .get("key")
                .or_else(|| attr.get("name"))
                .and_then(Value::as_str);
            if let Some(key) = key {
                if let Some(raw_value) = attr.get("value") {
                    attributes.insert(key.to_string(), unwrap_attribute_value(raw_value));
                }
            }
        }
    } else if let Some(map) = value.get("attributes").and_then(Value::as_object) {
        for (key, raw_value) in map {
            attributes.insert(key.clone(), json_to_attribute(raw_value));
        }
    }

    let service_name = service_hint
        .or_else(|| attribute_list_value(value.get("attributes"), "service.name"))
        .or_else(|| value.get("service_name").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| "unknown_service".to_string());

    let operation = first_str(value, &["name", "operationName", "operation"])
        .unwrap_or_else(|| "unknown_operation".to_string());

    let start_time = first_f64(value, &["startTimeUnixNano", "startTime", "start_time"])
        .ok_or_else(|| "missing start time".to_string())?;
    let end_time = first_f64(value, &["endTimeUnixNano", "endTime", "end_time"])
        .ok_or_else(|| "missing end time".to_string())?;

    let status = extract_status(value);

    Ok(Span {
        trace_id,
        span_id,
        parent_id,
        service_name,
        operation,
        start_time,
        end_time,
        attributes,
        status,
    })
}

fn extract_status(value: &Value) -> String {
    let status = value.get("status");
    if let Some(status) = status {
        if let Some(message) = status.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(code) = status.get("code") {
            if let Some(s) = code.as_str() {
                return s.to_string();
            }
            if let Some(n) = code.as_i64() {
                return n.to_string();
            }
        }
    }
    "OK".to_string()
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str).map(String::from))
}

fn first_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        value.get(*k).and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.parse::<f64>().ok()))
        })
    })
}

fn attach_parent_services(spans: &mut [Span]) {
    let index: HashMap<String, String> = spans
        .iter()
        .map(|s| (s.span_id.clone(), s.service_name.clone()))
        .collect();
    for span in spans.iter_mut() {
        if let Some(parent_id) = &span.parent_id {
            if let Some(parent_service) = index.get(parent_id) {
                span.attributes.insert(
                    "parent_service".to_string(),
                    AttributeValue::String(parent_service.clone()),
                );
            }
        }
    }
}

/// Parent-service of a span, as attached by [`ingest_spans`]; `None` for a
/// root span or one whose parent didn't resolve.
pub fn parent_service(span: &Span) -> Option<&str> {
    span.attribute_str("parent_service")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ingests_flat_span_array() {
        let payload = json!([
            {
                "traceId": "trace-1",
                "spanId": "span-1",
                "name": "checkout",
                "startTime": 0.0,
                "endTime": 420.0,
                "status": {"code": "OK"},
                "attributes": [{"key": "service.name", "value": {"stringValue": "checkout"}}],
            }
        ]);
        let spans = ingest_spans(&payload);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].service_name, "checkout");
        assert_eq!(spans[0].trace_id, "trace-1");
    }

    #[test]
    fn ingests_otlp_nested_document() {
        let payload = json!({
            "resourceSpans": [{
                "resource": {"attributes": [{"key": "service.name", "value": {"stringValue": "payment"}}]},
                "scopeSpans": [{
                    "spans": [{
                        "spanId": "s1",
                        "parentSpanId": "root",
                        "name": "charge",
                        "startTimeUnixNano": 0.0,
                        "endTimeUnixNano": 520000000.0,
                        "status": {"code": "STATUS_CODE_ERROR"},
                        "attributes": [{"key": "http.status_code", "value": {"intValue": 503}}],
                    }]
                }]
            }]
        });
        let spans = ingest_spans(&payload);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].service_name, "payment");
        assert!(spans[0].is_error());
    }

    #[test]
    fn skips_unparseable_span_without_failing() {
        let payload = json!([
            {"traceId": "t1", "spanId": "s1"},
            {"traceId": "t1", "spanId": "s2", "startTime": 0.0, "endTime": 10.0, "name": "ok"},
        ]);
        let spans = ingest_spans(&payload);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn attaches_parent_service_across_services() {
        let payload = json!([
            {"traceId": "t1", "spanId": "parent", "startTime": 0.0, "endTime": 10.0, "name": "root",
             "attributes": [{"key": "service.name", "value": {"stringValue": "web"}}]},
            {"traceId": "t1", "spanId": "child", "parentSpanId": "parent", "startTime": 1.0, "endTime": 9.0,
             "name": "call", "attributes": [{"key": "service.name", "value": {"stringValue": "api"}}]},
        ]);
        let spans = ingest_spans(&payload);
        let child = spans.iter().find(|s| s.span_id == "child").unwrap();
        assert_eq!(parent_service(child), Some("web"));
    }
}
