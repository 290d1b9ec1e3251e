//! Telemetry budget forecasting (component F) and sampling policy advice
//! (component G).

pub mod advisor;
pub mod error;
pub mod forecaster;
pub mod recommend;
#[cfg(feature = "training")]
pub mod training;

pub use advisor::{SamplingAction, SamplingAdvisor, SamplingState};
pub use error::{TelemetryError, TelemetryResult};
pub use forecaster::{BudgetConfig, BudgetForecaster};
pub use recommend::{recommend, TelemetryRecommendation};
