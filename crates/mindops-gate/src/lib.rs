//! Deployment gate (component L).
//!
//! The source evaluates guardrails by executing emitted Python snippets
//! against a metrics dict. Target-language implementations must not run
//! untrusted code, so each guardrail is carried as a structured
//! `{metric, comparator, threshold}` predicate alongside its human-readable
//! snippet and evaluated as a pure function.

pub mod snippet;

pub use snippet::{emit_policy_bundle, emit_policy_snippet, guardrails_from_slos};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("unknown comparator: {0}")]
    UnknownComparator(String),
}

pub type GateResult<T> = Result<T, GateError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Comparator {
    pub fn parse(token: &str) -> GateResult<Self> {
        match token {
            ">" | "gt" => Ok(Self::Gt),
            ">=" | "ge" => Ok(Self::Ge),
            "<" | "lt" => Ok(Self::Lt),
            "<=" | "le" => Ok(Self::Le),
            "==" | "eq" => Ok(Self::Eq),
            "!=" | "ne" => Ok(Self::Ne),
            other => Err(GateError::UnknownComparator(other.to_string())),
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => (lhs - rhs).abs() < f64::EPSILON,
            Self::Ne => (lhs - rhs).abs() >= f64::EPSILON,
        }
    }
}

/// A structured guardrail predicate, carried alongside the original
/// human-readable snippet for display purposes only — the snippet is
/// never evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailPredicate {
    pub metric: String,
    pub comparator: Comparator,
    pub threshold: f64,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuardrailOutcome {
    Pass,
    Fail { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    pub passed: bool,
    pub results: HashMap<String, GuardrailOutcome>,
    pub failures: Vec<String>,
}

/// Evaluates every named guardrail predicate against a metric map,
/// producing a per-name pass/fail result plus the aggregate verdict.
pub fn evaluate_guardrails(
    predicates: &HashMap<String, GuardrailPredicate>,
    metrics: &HashMap<String, f64>,
) -> GateDecision {
    let mut results = HashMap::new();
    let mut failures = Vec::new();

    for (name, predicate) in predicates {
        let outcome = match metrics.get(&predicate.metric) {
            Some(value) if predicate.comparator.apply(*value, predicate.threshold) => GuardrailOutcome::Pass,
            Some(value) => GuardrailOutcome::Fail {
                reason: format!(
                    "{} = {} does not satisfy {:?} {}",
                    predicate.metric, value, predicate.comparator, predicate.threshold
                ),
            },
            None => GuardrailOutcome::Fail {
                reason: format!("metric '{}' not found", predicate.metric),
            },
        };
        if matches!(outcome, GuardrailOutcome::Fail { .. }) {
            failures.push(name.clone());
        }
        results.insert(name.clone(), outcome);
    }

    GateDecision {
        passed: failures.is_empty(),
        results,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(metric: &str, comparator: Comparator, threshold: f64) -> GuardrailPredicate {
        GuardrailPredicate {
            metric: metric.to_string(),
            comparator,
            threshold,
            snippet: None,
        }
    }

    #[test]
    fn all_guardrails_passing_yields_passed_true() {
        let mut predicates = HashMap::new();
        predicates.insert("latency".to_string(), predicate("latency_p95_ms", Comparator::Le, 200.0));
        let mut metrics = HashMap::new();
        metrics.insert("latency_p95_ms".to_string(), 150.0);

        let decision = evaluate_guardrails(&predicates, &metrics);
        assert!(decision.passed);
        assert!(decision.failures.is_empty());
    }

    #[test]
    fn failing_guardrail_is_recorded_with_reason() {
        let mut predicates = HashMap::new();
        predicates.insert("error_rate".to_string(), predicate("error_rate", Comparator::Le, 0.01));
        let mut metrics = HashMap::new();
        metrics.insert("error_rate".to_string(), 0.05);

        let decision = evaluate_guardrails(&predicates, &metrics);
        assert!(!decision.passed);
        assert_eq!(decision.failures, vec!["error_rate".to_string()]);
        match &decision.results["error_rate"] {
            GuardrailOutcome::Fail { reason } => assert!(reason.contains("error_rate")),
            GuardrailOutcome::Pass => panic!("expected failure"),
        }
    }

    #[test]
    fn missing_metric_fails_the_guardrail() {
        let mut predicates = HashMap::new();
        predicates.insert("missing".to_string(), predicate("nonexistent", Comparator::Gt, 0.0));
        let decision = evaluate_guardrails(&predicates, &HashMap::new());
        assert!(!decision.passed);
    }

    #[test]
    fn comparator_parses_symbolic_and_named_tokens() {
        assert_eq!(Comparator::parse(">=").unwrap(), Comparator::Ge);
        assert_eq!(Comparator::parse("eq").unwrap(), Comparator::Eq);
        assert!(Comparator::parse("~=").is_err());
    }
}
