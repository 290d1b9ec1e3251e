use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A scalar attribute value attached to a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            AttributeValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }
}

/// Uniform span representation produced by ingest (component B).
///
/// Immutable once constructed; dropped at the end of analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_id: Option<String>,
    pub service_name: String,
    pub operation: String,
    pub start_time: f64,
    pub end_time: f64,
    pub attributes: HashMap<String, AttributeValue>,
    pub status: String,
}

impl Span {
    /// Raw duration in whatever unit start/end were recorded in; see
    /// `mindops_core::stats::duration_ms` for the unit-normalized form.
    pub fn raw_duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(AttributeValue::as_str)
    }

    pub fn is_error(&self) -> bool {
        const ERROR_STATUSES: [&str; 3] = ["ERROR", "STATUS_CODE_ERROR", "STATUS_CODE_UNKNOWN"];
        if ERROR_STATUSES.contains(&self.status.as_str()) {
            return true;
        }
        if let Some(code) = self
            .attributes
            .get("http.status_code")
            .and_then(AttributeValue::as_i64)
        {
            if code >= 500 {
                return true;
            }
        }
        self.attributes.keys().any(|k| k.starts_with("exception."))
    }
}
