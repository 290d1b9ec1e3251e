//! SLO evaluation against observed metrics.

use crate::error::{SloError, SloResult};
use crate::models::{Slo, SloEvaluation, SloMetrics};

fn compare(observed: f64, comparator: &str, threshold: f64) -> SloResult<bool> {
    match comparator {
        "<=" => Ok(observed <= threshold),
        "<" => Ok(observed < threshold),
        ">=" => Ok(observed >= threshold),
        ">" => Ok(observed > threshold),
        "==" => Ok((observed - threshold).abs() < f64::EPSILON),
        other => Err(SloError::UnsupportedComparator(other.to_string())),
    }
}

pub fn evaluate_slo(slo: &Slo, metrics: &SloMetrics) -> SloEvaluation {
    let observed = metrics.get(&slo.target.metric);
    let Some(observed) = observed else {
        return SloEvaluation {
            slo: slo.clone(),
            passed: false,
            observed_value: None,
            threshold: slo.target.threshold,
            comparator: slo.target.comparator.clone(),
            metric: slo.target.metric.clone(),
            details: "Metric missing from evaluation context.".to_string(),
        };
    };

    let passed = compare(observed, &slo.target.comparator, slo.target.threshold).unwrap_or(false);
    let details = if passed {
        "meets objective"
    } else {
        "violates objective"
    };

    SloEvaluation {
        slo: slo.clone(),
        passed,
        observed_value: Some(round4(observed)),
        threshold: slo.target.threshold,
        comparator: slo.target.comparator.clone(),
        metric: slo.target.metric.clone(),
        details: details.to_string(),
    }
}

pub fn evaluate_slos(slos: &[Slo], metrics: &SloMetrics) -> Vec<SloEvaluation> {
    slos.iter().map(|slo| evaluate_slo(slo, metrics)).collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SloTarget;
    use std::collections::HashMap;

    fn slo(metric: &str, comparator: &str, threshold: f64) -> Slo {
        Slo {
            name: "test".to_string(),
            service: "svc".to_string(),
            target: SloTarget {
                metric: metric.to_string(),
                comparator: comparator.to_string(),
                threshold,
                window_days: 30,
            },
            description: String::new(),
            labels: HashMap::new(),
        }
    }

    #[test]
    fn missing_metric_fails_with_detail() {
        let evaluation = evaluate_slo(&slo("coverage_ratio", ">=", 0.9), &SloMetrics::default());
        assert!(!evaluation.passed);
        assert_eq!(evaluation.details, "Metric missing from evaluation context.");
    }

    #[test]
    fn passes_when_threshold_satisfied() {
        let metrics = SloMetrics {
            error_rate: Some(0.0005),
            ..Default::default()
        };
        let evaluation = evaluate_slo(&slo("error_rate", "<=", 0.001), &metrics);
        assert!(evaluation.passed);
    }
}
