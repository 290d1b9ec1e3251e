//! SLO generation heuristics (component D).

use crate::models::{Slo, SloTarget};
use mindops_coverage::CoverageReport;
use mindops_core::{ServiceStats, TraceStats};
use std::collections::HashMap;

pub struct SloGenerator {
    window_days: u32,
}

impl Default for SloGenerator {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SloGenerator {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    pub fn generate(&self, stats: &TraceStats, coverage: Option<&CoverageReport>) -> Vec<Slo> {
        let mut slos = Vec::new();
        for (service_name, service_stats) in &stats.service_stats {
            slos.extend(self.slos_for_service(service_name, service_stats));
        }

        if let Some(coverage) = coverage {
            let name_suffix = coverage
                .expected_signals
                .first()
                .cloned()
                .unwrap_or_else(|| "signals".to_string());
            slos.push(Slo {
                name: format!("telemetry-coverage-{name_suffix}"),
                service: "telemetry".to_string(),
                target: SloTarget {
                    metric: "coverage_ratio".to_string(),
                    comparator: ">=".to_string(),
                    threshold: round4(coverage.coverage_ratio.max(0.9)),
                    window_days: self.window_days,
                },
                description: "Maintain high coverage of expected probes for trace-based testing."
                    .to_string(),
                labels: HashMap::from([("source".to_string(), "ebpf-bot".to_string())]),
            });
        }

        slos
    }

    fn slos_for_service(&self, service_name: &str, stats: &ServiceStats) -> Vec<Slo> {
        let mut slos = Vec::new();

        if let Some(p95) = stats.latency_p95_ms {
            let threshold = (150.0_f64).max(p95 * 1.25);
            slos.push(Slo {
                name: format!("latency-p95-{service_name}"),
                service: service_name.to_string(),
                target: SloTarget {
                    metric: "latency_p95_ms".to_string(),
                    comparator: "<=".to_string(),
                    threshold: round2(threshold),
                    window_days: self.window_days,
                },
                description: "p95 latency stays within a safe envelope.".to_string(),
                labels: HashMap::from([("sli".to_string(), "latency".to_string())]),
            });
        }

        let error_budget = (0.001_f64).max(stats.error_rate * 0.5);
        slos.push(Slo {
            name: format!("error-rate-{service_name}"),
            service: service_name.to_string(),
            target: SloTarget {
                metric: "error_rate".to_string(),
                comparator: "<=".to_string(),
                threshold: round4(error_budget),
                window_days: self.window_days,
            },
            description: "Error rate remains within the allocated error budget.".to_string(),
            labels: HashMap::from([("sli".to_string(), "errors".to_string())]),
        });

        let availability_target = (0.99_f64).max(1.0 - error_budget);
        slos.push(Slo {
            name: format!("availability-{service_name}"),
            service: service_name.to_string(),
            target: SloTarget {
                metric: "availability".to_string(),
                comparator: ">=".to_string(),
                threshold: round4(availability_target),
                window_days: self.window_days,
            },
            description: "Availability stays above the reliability target.".to_string(),
            labels: HashMap::from([("sli".to_string(), "availability".to_string())]),
        });

        slos
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindops_core::ingest_spans;

    fn s2_payment_stats() -> TraceStats {
        let payload = serde_json::json!([
            {"traceId": "t1", "spanId": "p1", "startTime": 0.0, "endTime": 520.0,
             "name": "charge", "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "payment"}}]},
        ]);
        mindops_core::compute_trace_stats(&ingest_spans(&payload))
    }

    #[test]
    fn s2_slo_synthesis_thresholds() {
        let stats = s2_payment_stats();
        let generator = SloGenerator::default();
        let slos = generator.generate(&stats, None);

        let latency = slos
            .iter()
            .find(|s| s.name == "latency-p95-payment")
            .unwrap();
        assert_eq!(latency.target.threshold, 650.0);

        let names: Vec<&str> = slos.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"error-rate-payment"));
        assert!(names.contains(&"availability-payment"));
    }

    #[test]
    fn coverage_adds_a_telemetry_slo() {
        let stats = s2_payment_stats();
        let coverage = mindops_coverage::analyze_coverage(&["probe_a".into()], &["probe_a".into()]);
        let generator = SloGenerator::default();
        let slos = generator.generate(&stats, Some(&coverage));
        assert!(slos.iter().any(|s| s.service == "telemetry"));
    }
}
