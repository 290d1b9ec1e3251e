//! Coverage analyzer (component E): compares expected telemetry signals
//! against what was actually observed and suggests the next probe target.
//!
//! The original implementation picks the next probe at random among the
//! missing signals; this rewrite picks deterministically (first missing, by
//! insertion order) for reproducibility, per the design notes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub expected_signals: Vec<String>,
    pub observed_signals: Vec<String>,
    pub coverage_map: HashMap<String, bool>,
    pub coverage_ratio: f64,
    pub missing_signals: Vec<String>,
    pub next_probe: Option<String>,
    pub suggestions: Vec<String>,
}

pub fn analyze_coverage(expected_signals: &[String], observed_signals: &[String]) -> CoverageReport {
    let observed: std::collections::HashSet<&String> = observed_signals.iter().collect();
    let mut coverage_map = HashMap::with_capacity(expected_signals.len());
    let mut missing = Vec::new();

    for signal in expected_signals {
        let covered = observed.contains(signal);
        coverage_map.insert(signal.clone(), covered);
        if !covered {
            missing.push(signal.clone());
        }
    }

    let total = expected_signals.len();
    let coverage_ratio = if total == 0 {
        0.0
    } else {
        (total - missing.len()) as f64 / total as f64
    };

    let next_probe = missing
        .first()
        .cloned()
        .or_else(|| expected_signals.first().cloned());

    let suggestions = missing
        .iter()
        .map(|signal| format!("Instrument a probe for '{signal}' to close the coverage gap."))
        .collect();

    CoverageReport {
        expected_signals: expected_signals.to_vec(),
        observed_signals: observed_signals.to_vec(),
        coverage_map,
        coverage_ratio,
        missing_signals: missing,
        next_probe,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_ratio_counts_matched_signals() {
        let report = analyze_coverage(
            &["probe_a".into(), "probe_b".into(), "probe_c".into()],
            &["probe_a".into()],
        );
        assert!((report.coverage_ratio - (1.0 / 3.0)).abs() < 1e-9);
        assert_eq!(report.missing_signals, vec!["probe_b", "probe_c"]);
        assert_eq!(report.next_probe, Some("probe_b".to_string()));
    }

    #[test]
    fn empty_expected_signals_yield_zero_ratio() {
        let report = analyze_coverage(&[], &[]);
        assert_eq!(report.coverage_ratio, 0.0);
        assert_eq!(report.next_probe, None);
    }

    #[test]
    fn full_coverage_has_no_missing_signals() {
        let report = analyze_coverage(&["probe_a".into()], &["probe_a".into()]);
        assert_eq!(report.coverage_ratio, 1.0);
        assert!(report.missing_signals.is_empty());
        assert_eq!(report.next_probe, Some("probe_a".to_string()));
    }
}
