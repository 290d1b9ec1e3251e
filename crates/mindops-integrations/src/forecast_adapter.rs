//! Statistical forecasting capability. The source prefers a full
//! `statsmodels` ARIMA fit when available, falling back to exponential
//! smoothing otherwise; here the always-present fallback already covers
//! both paths internally (see [`mindops_telemetry::BudgetForecaster`]),
//! so the adapter boundary exists for interface parity and so a future
//! dedicated ARIMA backend can slot in beside it.

use crate::health::AdapterHealth;
use async_trait::async_trait;
use mindops_telemetry::{BudgetConfig, BudgetForecaster};

#[async_trait]
pub trait ForecastAdapter: Send + Sync {
    fn name(&self) -> &str;
    async fn probe(&self) -> AdapterHealth;
    async fn forecast(&self, history: &[f64], steps: usize, target_budget: f64) -> Vec<f64>;
}

#[derive(Debug, Default)]
pub struct BudgetForecastAdapter;

#[async_trait]
impl ForecastAdapter for BudgetForecastAdapter {
    fn name(&self) -> &str {
        "budget-forecaster"
    }

    async fn probe(&self) -> AdapterHealth {
        AdapterHealth::ready()
    }

    async fn forecast(&self, history: &[f64], steps: usize, target_budget: f64) -> Vec<f64> {
        let mut forecaster = BudgetForecaster::new(BudgetConfig {
            target_budget,
            window_size: history.len().max(1),
        })
        .expect("window_size is clamped to at least 1 above");
        for volume in history {
            forecaster.update(*volume);
        }
        forecaster.forecast_next(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forecast_returns_requested_horizon() {
        let adapter = BudgetForecastAdapter;
        let history = vec![0.2, 0.3, 0.25, 0.4];
        let forecast = adapter.forecast(&history, 5, 1.0).await;
        assert_eq!(forecast.len(), 5);
        assert!(adapter.probe().await.ready);
    }
}
