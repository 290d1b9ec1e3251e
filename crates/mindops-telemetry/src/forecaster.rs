//! Telemetry budget forecaster (component F).
//!
//! A sliding window of daily telemetry volumes (normalised against a
//! monthly budget, 1.0 == 100%) feeds an AR(1) fit once the window holds
//! at least three points; below that it falls back to exponential
//! smoothing.

use crate::error::{TelemetryError, TelemetryResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub target_budget: f64,
    pub window_size: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            target_budget: 1.0,
            window_size: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BudgetForecaster {
    config: BudgetConfig,
    history: Vec<f64>,
}

impl BudgetForecaster {
    /// Rejects a zero `window_size`: the sliding window would never hold a
    /// point and `needs_action`'s forecast would be meaningless.
    pub fn new(config: BudgetConfig) -> TelemetryResult<Self> {
        if config.window_size == 0 {
            return Err(TelemetryError::InputInvalid("window_size must be at least 1".to_string()));
        }
        Ok(Self {
            config,
            history: Vec::new(),
        })
    }

    pub fn update(&mut self, volume: f64) {
        self.history.push(volume);
        if self.history.len() > self.config.window_size {
            self.history.remove(0);
        }
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn forecast_next(&self, steps: usize) -> Vec<f64> {
        if self.history.is_empty() {
            return vec![0.0; steps];
        }
        if self.history.len() >= 3 {
            ar1_forecast(&self.history, steps)
        } else {
            exponential_smoothing_forecast(&self.history, steps, 0.5)
        }
    }

    pub fn needs_action(&self) -> bool {
        let forecasts = self.forecast_next(14);
        forecasts.into_iter().fold(f64::MIN, f64::max) > self.config.target_budget
    }
}

/// Closed-form least-squares AR(1) fit: `x_t = c + phi * x_{t-1}`.
fn ar1_forecast(data: &[f64], steps: usize) -> Vec<f64> {
    let lagged: Vec<(f64, f64)> = data.windows(2).map(|w| (w[0], w[1])).collect();
    let n = lagged.len() as f64;
    let mean_prev = lagged.iter().map(|(p, _)| p).sum::<f64>() / n;
    let mean_curr = lagged.iter().map(|(_, c)| c).sum::<f64>() / n;

    let covariance: f64 = lagged
        .iter()
        .map(|(p, c)| (p - mean_prev) * (c - mean_curr))
        .sum();
    let variance: f64 = lagged.iter().map(|(p, _)| (p - mean_prev).powi(2)).sum();

    let phi = if variance.abs() > f64::EPSILON {
        covariance / variance
    } else {
        0.0
    };
    let intercept = mean_curr - phi * mean_prev;

    let mut last = *data.last().unwrap();
    let mut forecasts = Vec::with_capacity(steps);
    for _ in 0..steps {
        last = intercept + phi * last;
        forecasts.push(last);
    }
    forecasts
}

fn exponential_smoothing_forecast(data: &[f64], steps: usize, alpha: f64) -> Vec<f64> {
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let mut level = *data.last().unwrap();
    let mut forecasts = Vec::with_capacity(steps);
    for _ in 0..steps {
        level = alpha * level + (1.0 - alpha) * mean;
        forecasts.push(level);
    }
    forecasts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_forecasts_zero() {
        let forecaster = BudgetForecaster::new(BudgetConfig::default()).unwrap();
        assert_eq!(forecaster.forecast_next(7), vec![0.0; 7]);
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let err = BudgetForecaster::new(BudgetConfig { target_budget: 1.0, window_size: 0 }).unwrap_err();
        assert!(matches!(err, TelemetryError::InputInvalid(_)));
    }

    #[test]
    fn small_window_uses_exponential_smoothing() {
        let mut forecaster = BudgetForecaster::new(BudgetConfig::default()).unwrap();
        forecaster.update(0.5);
        let forecasts = forecaster.forecast_next(3);
        assert_eq!(forecasts.len(), 3);
        assert!(forecasts.iter().all(|v| (*v - 0.5).abs() < 1e-9));
    }

    #[test]
    fn needs_action_flags_trend_exceeding_budget() {
        let mut forecaster = BudgetForecaster::new(BudgetConfig {
            target_budget: 1.0,
            window_size: 30,
        })
        .unwrap();
        for day in 0..10 {
            forecaster.update(0.5 + day as f64 * 0.1);
        }
        assert!(forecaster.needs_action());
    }

    #[test]
    fn stable_window_does_not_need_action() {
        let mut forecaster = BudgetForecaster::new(BudgetConfig::default()).unwrap();
        for _ in 0..10 {
            forecaster.update(0.3);
        }
        assert!(!forecaster.needs_action());
    }
}
