//! Append-only JSON-Lines audit log plus an in-process reader.
//!
//! Writes use `O_APPEND` semantics and swallow errors (§7: audit failures
//! are never fatal to the request). The reader replays the file into a
//! `Vec<AuditRecord>` — structurally simple, not a queryable database,
//! matching the scope `agentkern-governance::audit` keeps for its ledger.

use crate::auth::ActorContext;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub action: String,
    pub actor: String,
    pub auth_mode: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub details: Value,
}

fn default_status() -> String {
    "ok".to_string()
}

pub struct AuditLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Appends one record; any I/O failure is logged and swallowed.
    pub fn record(&self, action: &str, actor: &ActorContext, status: &str, details: Value) {
        let record = AuditRecord {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            actor: actor.actor.clone(),
            auth_mode: actor.auth_mode.to_string(),
            status: status.to_string(),
            details,
        };

        let _guard = self.lock.lock();
        if let Err(err) = self.append(&record) {
            tracing::warn!(error = %err, action, "failed to write audit record");
        }
    }

    fn append(&self, record: &AuditRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        writeln!(file, "{line}")
    }

    fn replay(&self) -> Vec<AuditRecord> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        text.lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Returns the last `n` records in file order.
    pub fn tail(&self, n: usize) -> Vec<AuditRecord> {
        let records = self.replay();
        let start = records.len().saturating_sub(n);
        records[start..].to_vec()
    }

    pub fn filter_by_status(&self, status: &str) -> Vec<AuditRecord> {
        self.replay().into_iter().filter(|r| r.status == status).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn actor() -> ActorContext {
        ActorContext { actor: "svc".into(), scopes: HashSet::new(), auth_mode: "none" }
    }

    fn tempfile() -> PathBuf {
        std::env::temp_dir().join(format!("mindops-audit-test-{}.jsonl", uuid_like()))
    }

    fn uuid_like() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos() as u64
    }

    #[test]
    fn tail_returns_the_most_recent_records() {
        let path = tempfile();
        let ledger = AuditLedger::new(&path);
        for i in 0..5 {
            ledger.record("policy.read", &actor(), "ok", serde_json::json!({ "i": i }));
        }
        let last_two = ledger.tail(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].details["i"], 3);
        assert_eq!(last_two[1].details["i"], 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn filter_by_status_only_returns_matching_records() {
        let path = tempfile();
        let ledger = AuditLedger::new(&path);
        ledger.record("slo.read", &actor(), "ok", serde_json::json!({}));
        ledger.record("slo.read", &actor(), "not_found", serde_json::json!({}));
        let not_found = ledger.filter_by_status("not_found");
        assert_eq!(not_found.len(), 1);
        std::fs::remove_file(&path).ok();
    }
}
