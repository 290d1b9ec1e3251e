//! Persistent SLO store (component K): a single JSON file, merged or
//! replaced by (service, name).

use crate::error::SloResult;
use crate::exports::export_slo_json;
use crate::models::{Slo, SloTarget};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Merge,
    Replace,
}

/// Guards read-modify-write access to the store file within this process.
/// Cross-process atomicity is achieved by writing after an `mkdir -p` of the
/// parent directory, matching the source's write discipline.
pub struct SloStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SloStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn load_raw(&self) -> SloResult<Value> {
        let _guard = self.lock.lock();
        self.load_raw_locked()
    }

    fn load_raw_locked(&self) -> SloResult<Value> {
        if !self.path.exists() {
            return Ok(json!({"schema_version": "slo-store/v1", "slos": []}));
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load_slos(&self) -> SloResult<Vec<Slo>> {
        let raw = self.load_raw()?;
        Ok(slos_from_raw(&raw))
    }

    pub fn save(&self, slos: Vec<Slo>, mode: SaveMode) -> SloResult<Value> {
        let _guard = self.lock.lock();
        let merged = match mode {
            SaveMode::Merge if self.path.exists() => {
                let existing = slos_from_raw(&self.load_raw_locked()?);
                let mut by_key: HashMap<(String, String), Slo> = existing
                    .into_iter()
                    .map(|slo| ((slo.service.clone(), slo.name.clone()), slo))
                    .collect();
                for slo in slos {
                    by_key.insert((slo.service.clone(), slo.name.clone()), slo);
                }
                by_key.into_values().collect()
            }
            _ => slos,
        };

        let mut payload = export_slo_json(&merged);
        payload["store_version"] = json!("slo-store/v1");
        payload["updated_at"] = json!(Utc::now().to_rfc3339());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&payload)?)?;
        Ok(payload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn slos_from_raw(raw: &Value) -> Vec<Slo> {
    raw.get("slos")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(slo_from_value).collect())
        .unwrap_or_default()
}

fn slo_from_value(value: &Value) -> Slo {
    let target = value.get("target").cloned().unwrap_or(json!({}));
    Slo {
        name: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        service: value
            .get("service")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        target: SloTarget {
            metric: target
                .get("metric")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            comparator: target
                .get("comparator")
                .and_then(Value::as_str)
                .unwrap_or(">=")
                .to_string(),
            threshold: target.get("threshold").and_then(Value::as_f64).unwrap_or(0.0),
            window_days: target
                .get("window_days")
                .and_then(Value::as_u64)
                .unwrap_or(30) as u32,
        },
        description: value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        labels: value
            .get("labels")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn slo(service: &str, name: &str) -> Slo {
        Slo {
            name: name.to_string(),
            service: service.to_string(),
            target: SloTarget {
                metric: "error_rate".to_string(),
                comparator: "<=".to_string(),
                threshold: 0.01,
                window_days: 30,
            },
            description: String::new(),
            labels: Map::new(),
        }
    }

    #[test]
    fn merge_save_is_commutative_per_service_name() {
        let dir = tempdir();
        let path_a = dir.join("a.json");
        let path_b = dir.join("b.json");

        let store_a = SloStore::new(&path_a);
        store_a.save(vec![slo("checkout", "latency")], SaveMode::Merge).unwrap();
        store_a.save(vec![slo("payment", "errors")], SaveMode::Merge).unwrap();

        let store_b = SloStore::new(&path_b);
        store_b
            .save(
                vec![slo("checkout", "latency"), slo("payment", "errors")],
                SaveMode::Merge,
            )
            .unwrap();

        let mut a = store_a.load_slos().unwrap();
        let mut b = store_b.load_slos().unwrap();
        a.sort_by(|x, y| (x.service.clone(), x.name.clone()).cmp(&(y.service.clone(), y.name.clone())));
        b.sort_by(|x, y| (x.service.clone(), x.name.clone()).cmp(&(y.service.clone(), y.name.clone())));
        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(b.iter()) {
            assert_eq!(left.service, right.service);
            assert_eq!(left.name, right.name);
        }

        std::fs::remove_file(&path_a).ok();
        std::fs::remove_file(&path_b).ok();
    }

    #[test]
    fn replace_mode_overwrites_existing_entries() {
        let dir = tempdir();
        let path = dir.join("store.json");
        let store = SloStore::new(&path);
        store.save(vec![slo("checkout", "latency")], SaveMode::Merge).unwrap();
        store.save(vec![slo("payment", "errors")], SaveMode::Replace).unwrap();
        let slos = store.load_slos().unwrap();
        assert_eq!(slos.len(), 1);
        assert_eq!(slos[0].service, "payment");
        std::fs::remove_file(&path).ok();
    }

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mindops-slo-store-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
