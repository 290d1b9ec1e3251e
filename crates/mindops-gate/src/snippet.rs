//! Human-readable guardrail snippets for display and documentation.
//!
//! The source emits a Python `if/else` block and relies on `exec` to run
//! it; here the snippet is text only, never evaluated — `evaluate_guardrails`
//! is the thing that actually decides pass/fail.

use crate::{Comparator, GuardrailPredicate};
use mindops_slo::Slo;
use std::collections::HashMap;

pub fn emit_policy_snippet(slo: &Slo) -> String {
    format!(
        "# Guardrail for {} / {}\nif metrics['{}'] {} {}:\n    pass\nelse:\n    raise RuntimeError('SLO violation: {}')\n",
        slo.service, slo.name, slo.target.metric, slo.target.comparator, slo.target.threshold, slo.name,
    )
}

pub fn emit_policy_bundle(slos: &[Slo]) -> HashMap<String, String> {
    slos.iter().map(|slo| (slo.name.clone(), emit_policy_snippet(slo))).collect()
}

/// Structured counterpart of [`emit_policy_bundle`], one guardrail per SLO,
/// carrying the snippet only for display.
pub fn guardrails_from_slos(slos: &[Slo]) -> HashMap<String, GuardrailPredicate> {
    slos.iter()
        .filter_map(|slo| {
            let comparator = Comparator::parse(&slo.target.comparator).ok()?;
            let predicate = GuardrailPredicate {
                metric: slo.target.metric.clone(),
                comparator,
                threshold: slo.target.threshold,
                snippet: Some(emit_policy_snippet(slo)),
            };
            Some((slo.name.clone(), predicate))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindops_slo::SloTarget;

    fn slo() -> Slo {
        Slo {
            name: "latency-p95-checkout".to_string(),
            service: "checkout".to_string(),
            target: SloTarget { metric: "latency_p95_ms".to_string(), comparator: "<=".to_string(), threshold: 200.0, window_days: 30 },
            description: String::new(),
            labels: HashMap::new(),
        }
    }

    #[test]
    fn snippet_references_the_slo_metric_and_threshold() {
        let text = emit_policy_snippet(&slo());
        assert!(text.contains("latency_p95_ms"));
        assert!(text.contains("200"));
    }

    #[test]
    fn bundle_is_keyed_by_slo_name() {
        let bundle = emit_policy_bundle(&[slo()]);
        assert!(bundle.contains_key("latency-p95-checkout"));
    }

    #[test]
    fn guardrails_from_slos_parses_the_target_comparator() {
        let guardrails = guardrails_from_slos(&[slo()]);
        let predicate = &guardrails["latency-p95-checkout"];
        assert_eq!(predicate.comparator, Comparator::Le);
        assert_eq!(predicate.metric, "latency_p95_ms");
        assert!(predicate.snippet.is_some());
    }
}
