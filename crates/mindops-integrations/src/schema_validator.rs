//! JSON-schema validation capability. When a schema document is supplied,
//! the `jsonschema` crate performs real schema validation; otherwise (or if
//! the schema fails to compile) this falls back to the structural OpenSLO
//! check in `mindops-slo`.

use crate::health::AdapterHealth;
use async_trait::async_trait;
use mindops_slo::validate_openslo_payload;
use serde_json::Value;

#[async_trait]
pub trait SchemaValidatorAdapter: Send + Sync {
    fn name(&self) -> &str;
    async fn probe(&self, schema: Option<&Value>) -> AdapterHealth;
    async fn validate(&self, payload: &Value, schema: Option<&Value>) -> (bool, Vec<String>);
}

#[derive(Debug, Default)]
pub struct OpenSloSchemaValidator;

#[async_trait]
impl SchemaValidatorAdapter for OpenSloSchemaValidator {
    fn name(&self) -> &str {
        "openslo-validator"
    }

    async fn probe(&self, schema: Option<&Value>) -> AdapterHealth {
        match schema {
            None => AdapterHealth::unavailable("no JSON schema supplied; using structural fallback"),
            Some(schema) => match jsonschema::validator_for(schema) {
                Ok(_) => AdapterHealth::ready(),
                Err(e) => AdapterHealth::unavailable(format!("schema failed to compile: {e}")),
            },
        }
    }

    async fn validate(&self, payload: &Value, schema: Option<&Value>) -> (bool, Vec<String>) {
        if let Some(schema) = schema {
            match jsonschema::validator_for(schema) {
                Ok(compiled) => {
                    let errors: Vec<String> = compiled.iter_errors(payload).map(|e| e.to_string()).collect();
                    return (errors.is_empty(), errors);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "falling back to structural OpenSLO validation");
                }
            }
        }
        validate_openslo_payload(payload)
    }
}
