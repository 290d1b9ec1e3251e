//! Capability-interface adapters for optional heavy dependencies (§11.4):
//! LLM-backed RCA narration, statistical forecasting, JSON-schema
//! validation, and full YAML parsing. Each is a trait with exactly one
//! always-present fallback implementation and a `probe()` status method.

pub mod forecast_adapter;
pub mod health;
pub mod rca_narrator;
pub mod schema_validator;
pub mod yaml_adapter;

pub use forecast_adapter::{BudgetForecastAdapter, ForecastAdapter};
pub use health::AdapterHealth;
pub use rca_narrator::{RcaNarrator, TemplateRcaNarrator};
pub use schema_validator::{OpenSloSchemaValidator, SchemaValidatorAdapter};
pub use yaml_adapter::{SerdeYamlAdapter, YamlAdapter};
