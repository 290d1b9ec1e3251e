//! Kubernetes manifest discovery: workloads, services, and the language
//! each discovered service appears to run.

use crate::error::{ZeroTouchError, ZeroTouchResult};
use crate::language::detect_language;
use crate::models::{ContainerSpec, DiscoveredService, ServiceSpec, WorkloadSpec};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const SUPPORTED_WORKLOADS: &[&str] = &["Deployment", "StatefulSet", "DaemonSet"];

pub fn load_manifests(paths: &[impl AsRef<Path>]) -> ZeroTouchResult<Vec<Value>> {
    let mut docs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let mut entries: Vec<_> = walk_dir(path)?;
            entries.sort();
            for file_path in entries {
                if is_manifest_file(&file_path) {
                    docs.extend(load_file(&file_path)?);
                }
            }
        } else {
            docs.extend(load_file(path)?);
        }
    }
    Ok(docs.into_iter().filter(|d| !d.is_null()).collect())
}

fn walk_dir(root: &Path) -> ZeroTouchResult<Vec<std::path::PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(root)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk_dir(&path)?);
        } else {
            out.push(path);
        }
    }
    Ok(out)
}

fn is_manifest_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()),
        Some(ref ext) if ext == "yaml" || ext == "yml" || ext == "json"
    )
}

fn load_file(path: &Path) -> ZeroTouchResult<Vec<Value>> {
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
                out.extend(unwrap_list(Value::deserialize(doc)?));
            }
            Ok(out)
        }
        other => Err(ZeroTouchError::UnsupportedManifestType(other.to_string())),
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

pub fn discover_services(paths: &[impl AsRef<Path>]) -> ZeroTouchResult<Vec<DiscoveredService>> {
    let documents = load_manifests(paths)?;
    let workloads = extract_workloads(&documents);
    let services = extract_services(&documents);

    let mut discovered = Vec::new();
    let mut matched_workloads: HashSet<String> = HashSet::new();

    for service in &services {
        let matched = match_workloads(service, &workloads);
        if matched.is_empty() {
            discovered.push(make_discovered(Some(service.clone()), None));
        } else {
            for workload in matched {
                matched_workloads.insert(workload.name.clone());
                discovered.push(make_discovered(Some(service.clone()), Some(workload.clone())));
            }
        }
    }

    for workload in &workloads {
        if matched_workloads.contains(&workload.name) {
            continue;
        }
        discovered.push(make_discovered(None, Some(workload.clone())));
    }

    Ok(discovered)
}

fn extract_workloads(documents: &[Value]) -> Vec<WorkloadSpec> {
    documents
        .iter()
        .filter_map(|doc| {
            let kind = doc.get("kind").and_then(Value::as_str)?;
            if !SUPPORTED_WORKLOADS.contains(&kind) {
                return None;
            }
            let metadata = doc.get("metadata");
            let pod_spec = doc
                .get("spec")
                .and_then(|s| s.get("template"))
                .and_then(|t| t.get("spec"));
            let containers = pod_spec
                .and_then(|p| p.get("containers"))
                .and_then(Value::as_array)
                .map(|list| extract_containers(list))
                .unwrap_or_default();
            Some(WorkloadSpec {
                name: string_field(metadata, "name").unwrap_or_else(|| "unknown".to_string()),
                namespace: string_field(metadata, "namespace").unwrap_or_else(|| "default".to_string()),
                kind: kind.to_string(),
                labels: map_field(metadata, "labels"),
                annotations: map_field(metadata, "annotations"),
                containers,
            })
        })
        .collect()
}

fn extract_containers(raw: &[Value]) -> Vec<ContainerSpec> {
    raw.iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let ports = obj
                .get("ports")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|p| p.get("containerPort").and_then(Value::as_u64))
                        .map(|p| p as u32)
                        .collect()
                })
                .unwrap_or_default();
            let env = obj
                .get("env")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|e| {
                            let name = e.get("name").and_then(Value::as_str)?;
                            let value = e.get("value")?;
                            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                            Some((name.to_string(), value))
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(ContainerSpec {
                name: obj.get("name").and_then(Value::as_str).unwrap_or("unknown").to_string(),
                image: obj.get("image").and_then(Value::as_str).unwrap_or("").to_string(),
                ports,
                env,
            })
        })
        .collect()
}

fn extract_services(documents: &[Value]) -> Vec<ServiceSpec> {
    documents
        .iter()
        .filter(|doc| doc.get("kind").and_then(Value::as_str) == Some("Service"))
        .map(|doc| {
            let metadata = doc.get("metadata");
            let spec = doc.get("spec");
            let ports = spec
                .and_then(|s| s.get("ports"))
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|p| p.get("port").and_then(Value::as_u64))
                        .map(|p| p as u32)
                        .collect()
                })
                .unwrap_or_default();
            ServiceSpec {
                name: string_field(metadata, "name").unwrap_or_else(|| "unknown".to_string()),
                namespace: string_field(metadata, "namespace").unwrap_or_else(|| "default".to_string()),
                selector: spec.and_then(|s| s.get("selector")).map(value_string_map).unwrap_or_default(),
                ports,
            }
        })
        .collect()
}

fn match_workloads<'a>(service: &ServiceSpec, workloads: &'a [WorkloadSpec]) -> Vec<&'a WorkloadSpec> {
    if service.selector.is_empty() {
        return Vec::new();
    }
    workloads
        .iter()
        .filter(|w| w.namespace == service.namespace && selector_match(&service.selector, &w.labels))
        .collect()
}

fn selector_match(selector: &HashMap<String, String>, labels: &HashMap<String, String>) -> bool {
    selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

fn make_discovered(service: Option<ServiceSpec>, workload: Option<WorkloadSpec>) -> DiscoveredService {
    let name = service
        .as_ref()
        .map(|s| s.name.clone())
        .or_else(|| workload.as_ref().map(|w| w.name.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let namespace = service
        .as_ref()
        .map(|s| s.namespace.clone())
        .or_else(|| workload.as_ref().map(|w| w.namespace.clone()))
        .unwrap_or_else(|| "default".to_string());
    let labels = workload.as_ref().map(|w| w.labels.clone()).unwrap_or_default();

    let mut language = "unknown".to_string();
    let mut ports: Vec<u32> = Vec::new();
    if let Some(w) = &workload {
        if let Some(first) = w.containers.first() {
            language = detect_language(&first.image, &labels);
        }
        for container in &w.containers {
            ports.extend(container.ports.iter().copied());
        }
    }
    if let Some(s) = &service {
        ports.extend(s.ports.iter().copied());
    }
    let mut unique: Vec<u32> = ports.into_iter().filter(|p| *p != 0).collect::<HashSet<_>>().into_iter().collect();
    unique.sort_unstable();

    DiscoveredService {
        name,
        namespace,
        workload,
        service,
        language,
        ports: unique,
        labels,
    }
}

fn string_field(metadata: Option<&Value>, key: &str) -> Option<String> {
    metadata?.get(key)?.as_str().map(str::to_string)
}

fn map_field(metadata: Option<&Value>, key: &str) -> HashMap<String, String> {
    metadata
        .and_then(|m| m.get(key))
        .map(value_string_map)
        .unwrap_or_default()
}

fn value_string_map(value: &Value) -> HashMap<String, String> {
    value
        .as_object()
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
