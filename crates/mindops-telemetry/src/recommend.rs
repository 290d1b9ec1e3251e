//! Combines the budget forecaster and the sampling advisor into a single
//! recommendation, the way `CAATAdapter.recommend` composes them for a
//! caller that only wants one sampling decision per trace run.

use crate::advisor::{SamplingAction, SamplingAdvisor, SamplingState};
use crate::error::TelemetryResult;
use crate::forecaster::{BudgetConfig, BudgetForecaster};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecommendation {
    pub sampling_action: SamplingAction,
    pub budget_alert: bool,
    pub forecast: Vec<f64>,
    pub notes: Vec<String>,
}

/// `telemetry_volumes` feeds the forecaster window; `current_relative_cost`
/// overrides the advisor's cost signal when the caller already knows it,
/// otherwise it falls back to the last observed volume over budget, or 1.0
/// with no volumes at all.
pub fn recommend(
    advisor: &SamplingAdvisor,
    telemetry_volumes: &[f64],
    anomaly_flag: bool,
    current_relative_cost: Option<f64>,
) -> TelemetryResult<TelemetryRecommendation> {
    let target_budget = BudgetConfig::default().target_budget;
    let mut forecaster = BudgetForecaster::new(BudgetConfig::default())?;
    for volume in telemetry_volumes {
        forecaster.update(*volume);
    }
    let forecast: Vec<f64> = forecaster.forecast_next(7).into_iter().map(round4).collect();
    let budget_alert = forecaster.needs_action();

    let relative_cost = current_relative_cost.unwrap_or_else(|| match telemetry_volumes.last() {
        Some(last) => last / target_budget,
        None => 1.0,
    });

    let action = advisor.act(SamplingState { relative_cost, anomaly_flag });

    let mut notes = Vec::new();
    if budget_alert {
        notes.push("Telemetry forecast exceeds budget threshold.".to_string());
    }

    Ok(TelemetryRecommendation { sampling_action: action, budget_alert, forecast, notes })
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_volumes_below_budget_do_not_alert() {
        let advisor = SamplingAdvisor::new();
        let volumes = vec![0.2, 0.21, 0.19, 0.2, 0.2];
        let recommendation = recommend(&advisor, &volumes, false, None).unwrap();
        assert!(!recommendation.budget_alert);
        assert!(recommendation.notes.is_empty());
    }

    #[test]
    fn no_volumes_defaults_relative_cost_to_one() {
        let advisor = SamplingAdvisor::new();
        let recommendation = recommend(&advisor, &[], true, None).unwrap();
        assert_eq!(recommendation.sampling_action, SamplingAction::MaintainSampling);
    }
}
