//! Standalone CI gate subcommand: evaluate a guardrail file against a
//! metrics file, independent of the full report pipeline.
//!
//! Grounded on `gate_cli.py` / `ci_gate.py`, but those read guardrails off
//! a freshly-run [`crate::report::OrchestratorReport`]; this subcommand
//! instead takes the guardrail/metrics pair directly from disk so it can
//! run as a lightweight CI step with no trace required.

use crate::error::OrchestratorResult;
use mindops_gate::{evaluate_guardrails, GateDecision, GuardrailPredicate};
use std::collections::HashMap;
use std::path::Path;

pub fn run_gate(guardrails_path: &Path, metrics_path: &Path) -> OrchestratorResult<GateDecision> {
    let guardrails: HashMap<String, GuardrailPredicate> =
        serde_json::from_str(&std::fs::read_to_string(guardrails_path)?)?;
    let metrics: HashMap<String, f64> = serde_json::from_str(&std::fs::read_to_string(metrics_path)?)?;
    Ok(evaluate_guardrails(&guardrails, &metrics))
}

/// Renders a human-readable pass/fail table for the decision.
pub fn render_table(decision: &GateDecision) -> String {
    let mut names: Vec<&String> = decision.results.keys().collect();
    names.sort();

    let mut out = String::new();
    out.push_str("GUARDRAIL            STATUS  DETAIL\n");
    for name in names {
        let outcome = &decision.results[name];
        match outcome {
            mindops_gate::GuardrailOutcome::Pass => {
                out.push_str(&format!("{:<20}  pass\n", name));
            }
            mindops_gate::GuardrailOutcome::Fail { reason } => {
                out.push_str(&format!("{:<20}  fail    {}\n", name, reason));
            }
        }
    }
    out.push_str(if decision.passed { "\nGATE: PASSED\n" } else { "\nGATE: FAILED\n" });
    out
}
