//! Control-plane state file: currently just the sampling policy, read with
//! a last-writer-wins overwrite and guarded by a per-file lock (§5).

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub struct ControlPlaneState {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ControlPlaneState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_state() -> Value {
        json!({ "sampling_policy": { "sampling_action": "maintain_sampling" } })
    }

    pub fn load(&self) -> Value {
        let _guard = self.lock.lock();
        self.load_locked()
    }

    fn load_locked(&self) -> Value {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|_| Self::default_state()),
            Err(_) => Self::default_state(),
        }
    }

    /// Merges `patch` into the stored `sampling_policy` object and persists.
    pub fn save_sampling_policy(&self, patch: Value) -> std::io::Result<Value> {
        let _guard = self.lock.lock();
        let mut state = self.load_locked();
        state["sampling_policy"] = patch;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&state)?)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempfile() -> PathBuf {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("mindops-state-test-{nanos}.json"))
    }

    #[test]
    fn missing_file_yields_default_maintain_sampling() {
        let path = tempfile();
        let state = ControlPlaneState::new(&path);
        let loaded = state.load();
        assert_eq!(loaded["sampling_policy"]["sampling_action"], "maintain_sampling");
    }

    #[test]
    fn saved_policy_round_trips() {
        let path = tempfile();
        let state = ControlPlaneState::new(&path);
        state.save_sampling_policy(json!({ "sampling_rate": 0.5 })).unwrap();
        let loaded = state.load();
        assert_eq!(loaded["sampling_policy"]["sampling_rate"], 0.5);
        std::fs::remove_file(&path).ok();
    }
}
