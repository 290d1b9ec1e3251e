//! Full YAML parsing/emission capability. `mindops-slo::yaml` carries a
//! hand-rolled emitter for its own narrow dict/list/scalar shape; this
//! adapter wraps `serde_yaml` for callers that need to round-trip
//! arbitrary YAML documents (manifest loading, multi-document streams).

use crate::health::AdapterHealth;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait YamlAdapter: Send + Sync {
    fn name(&self) -> &str;
    async fn probe(&self) -> AdapterHealth;
    async fn parse(&self, text: &str) -> Result<Vec<Value>, String>;
    async fn to_yaml(&self, value: &Value) -> Result<String, String>;
}

#[derive(Debug, Default)]
pub struct SerdeYamlAdapter;

#[async_trait]
impl YamlAdapter for SerdeYamlAdapter {
    fn name(&self) -> &str {
        "serde_yaml"
    }

    async fn probe(&self) -> AdapterHealth {
        AdapterHealth::ready()
    }

    async fn parse(&self, text: &str) -> Result<Vec<Value>, String> {
        let mut documents = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(text) {
            let value: Value = serde::Deserialize::deserialize(doc).map_err(|e| e.to_string())?;
            if !value.is_null() {
                documents.push(value);
            }
        }
        Ok(documents)
    }

    async fn to_yaml(&self, value: &Value) -> Result<String, String> {
        serde_yaml::to_string(value).map_err(|e| e.to_string())
    }
}
