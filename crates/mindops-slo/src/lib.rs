//! SLO generation, evaluation, fault-injection testing, OpenSLO export,
//! structural validation, and the persistent SLO store (components D, K).

pub mod error;
pub mod evaluator;
pub mod exports;
pub mod generator;
pub mod models;
pub mod store;
pub mod validator;
pub mod yaml;

pub use error::{SloError, SloResult};
pub use evaluator::{evaluate_slo, evaluate_slos};
pub use exports::{export_open_slo, export_slo_json};
pub use fault_tests::{apply_faults, default_cases, metrics_from_stats, TraceTestRunner};
pub use generator::SloGenerator;
pub use models::{Slo, SloEvaluation, SloMetrics, SloTarget, TraceTestCase, TraceTestResult};
pub use store::{SaveMode, SloStore};
pub use validator::validate_openslo_payload;
pub use yaml::export_open_slo_yaml;
