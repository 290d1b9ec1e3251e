//! Minimal OpenSLO YAML emitter (component K).
//!
//! A hand-rolled serializer rather than a full YAML writer: the optional
//! heavy dependency lives behind the `mindops-integrations` capability
//! interface (see that crate's `yaml` adapter) for callers that need a real
//! YAML *parser*; emission here only ever needs to round-trip the small
//! dict/list/scalar shapes `export_open_slo` produces.

use crate::exports::export_open_slo;
use crate::models::Slo;
use serde_json::Value;

pub fn export_open_slo_yaml(slos: &[Slo]) -> String {
    export_open_slo(slos)
        .iter()
        .map(|resource| to_yaml(resource, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_yaml(value: &Value, indent: usize) -> String {
    let spacer = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            let mut lines = Vec::new();
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{spacer}{key}:"));
                        lines.push(to_yaml(val, indent + 1));
                    }
                    other => lines.push(format!("{spacer}{key}: {}", scalar(other))),
                }
            }
            lines.join("\n")
        }
        Value::Array(items) => {
            let mut lines = Vec::new();
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{spacer}-"));
                        lines.push(to_yaml(item, indent + 1));
                    }
                    other => lines.push(format!("{spacer}- {}", scalar(other))),
                }
            }
            lines.join("\n")
        }
        other => format!("{spacer}{}", scalar(other)),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if needs_quotes(s) {
                serde_json::to_string(s).unwrap_or_else(|_| s.clone())
            } else {
                s.clone()
            }
        }
        _ => String::new(),
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.contains(':')
        || text.contains('#')
        || text.contains('\n')
        || matches!(text.to_lowercase().as_str(), "null" | "true" | "false")
}
