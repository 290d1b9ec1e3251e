//! Manifest and trace ingestion feeding the topology graph (component H).

use crate::error::{TopologyError, TopologyResult};
use crate::models::{Edge, Node, NodeKind};
use mindops_core::ingest::parent_service;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

pub fn load_manifests(paths: &[impl AsRef<Path>]) -> TopologyResult<Vec<Value>> {
    let mut docs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            for entry in std::fs::read_dir(path)?.flatten() {
                let candidate = entry.path();
                if is_manifest_file(&candidate) {
                    docs.extend(load_file(&candidate)?);
                }
            }
        } else {
            docs.extend(load_file(path)?);
        }
    }
    Ok(docs.into_iter().filter(|d| !d.is_null()).collect())
}

fn is_manifest_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()),
        Some(ref ext) if ext == "yaml" || ext == "yml" || ext == "json"
    )
}

fn load_file(path: &Path) -> TopologyResult<Vec<Value>> {
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let text = std::fs::read_to_string(path)?;
    match suffix.as_str() {
        "json" => Ok(unwrap_list(serde_json::from_str(&text)?)),
        "yaml" | "yml" => {
            let mut out = Vec::new();
            for doc in serde_yaml::Deserializer::from_str(&text) {
                let value = Value::deserialize(doc)?;
                out.extend(unwrap_list(value));
            }
            Ok(out)
        }
        other => Err(TopologyError::UnsupportedManifestType(other.to_string())),
    }
}

fn unwrap_list(data: Value) -> Vec<Value> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().filter(|i| i.is_object()).collect(),
        Value::Object(ref map) if map.get("kind").and_then(Value::as_str) == Some("List") => map
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter(|i| i.is_object()).cloned().collect())
            .unwrap_or_default(),
        obj @ Value::Object(_) => vec![obj],
        _ => Vec::new(),
    }
}

pub fn nodes_from_manifests(documents: &[Value]) -> Vec<Node> {
    documents
        .iter()
        .filter_map(|doc| {
            let kind_str = doc.get("kind").and_then(Value::as_str)?;
            let kind = NodeKind::from_manifest_kind(kind_str)?;
            let metadata = doc.get("metadata");
            let name = metadata
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let namespace = metadata
                .and_then(|m| m.get("namespace"))
                .and_then(Value::as_str)
                .unwrap_or("default")
                .to_string();
            let labels = metadata
                .and_then(|m| m.get("labels"))
                .and_then(Value::as_object)
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect()
                })
                .unwrap_or_default();
            Some(Node {
                node_id: format!("{namespace}/{name}"),
                name,
                namespace,
                kind,
                labels,
            })
        })
        .collect()
}

/// Aggregates `(parent_service, service)` call counts from trace files and a
/// per-service `{total, errors}` map used to derive error rates.
pub fn edges_from_traces(trace_paths: &[impl AsRef<Path>]) -> TopologyResult<(Vec<Edge>, HashMap<String, (f64, f64)>)> {
    let mut edge_counts: HashMap<(String, String), f64> = HashMap::new();
    let mut stats: HashMap<String, (f64, f64)> = HashMap::new();

    for path in trace_paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let payload: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unparseable trace file");
                continue;
            }
        };
        let spans = mindops_core::ingest_spans(&payload);
        for span in &spans {
            let entry = stats.entry(span.service_name.clone()).or_insert((0.0, 0.0));
            entry.0 += 1.0;
            if span.is_error() {
                entry.1 += 1.0;
            }
            if let Some(parent) = parent_service(span) {
                if parent != span.service_name {
                    *edge_counts
                        .entry((parent.to_string(), span.service_name.clone()))
                        .or_insert(0.0) += 1.0;
                }
            }
        }
    }

    let edges = edge_counts
        .into_iter()
        .map(|((source, target), weight)| Edge {
            source,
            target,
            label: "calls".to_string(),
            weight,
        })
        .collect();
    Ok((edges, stats))
}
