//! Trace statistics (component C): per-service and global latency
//! percentiles, error rate, and availability.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub span_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub latency_p50_ms: Option<f64>,
    pub latency_p95_ms: Option<f64>,
    pub latency_p99_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStats {
    pub span_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub availability: f64,
    pub latency_p50_ms: Option<f64>,
    pub latency_p95_ms: Option<f64>,
    pub latency_p99_ms: Option<f64>,
    pub service_stats: HashMap<String, ServiceStats>,
}

/// Unit-autodetecting duration in milliseconds. Thresholds are load-bearing:
/// >1e15 treats the timestamps as nanoseconds, >1e12 as microseconds, >1e9 as
/// seconds (scaled up, not down), otherwise already-milliseconds.
pub fn duration_ms(start: f64, end: f64) -> f64 {
    if start > 1e15 || end > 1e15 {
        return (end - start).max(0.0) / 1e6;
    }
    if start > 1e12 || end > 1e12 {
        return (end - start).max(0.0) / 1e3;
    }
    if start > 1e9 || end > 1e9 {
        return ((end - start) * 1000.0).max(0.0);
    }
    (end - start).max(0.0)
}

fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut ordered = values.to_vec();
    ordered.sort_by(|a, b| a.partial_cmp(b).unwrap());
    if ordered.len() == 1 {
        return Some(ordered[0]);
    }
    let k = (ordered.len() - 1) as f64 * pct;
    let f = k.floor();
    let c = k.ceil();
    if f == c {
        return Some(ordered[k as usize]);
    }
    let lo = ordered[f as usize];
    let hi = ordered[c as usize];
    Some(lo * (c - k) + hi * (k - f))
}

pub fn compute_trace_stats(spans: &[Span]) -> TraceStats {
    let mut latencies = Vec::new();
    let mut error_count = 0u64;
    let mut service_latencies: HashMap<String, Vec<f64>> = HashMap::new();
    let mut service_errors: HashMap<String, u64> = HashMap::new();
    let mut service_counts: HashMap<String, u64> = HashMap::new();

    for span in spans {
        let duration = duration_ms(span.start_time, span.end_time);
        latencies.push(duration);
        service_latencies
            .entry(span.service_name.clone())
            .or_default()
            .push(duration);
        *service_counts.entry(span.service_name.clone()).or_insert(0) += 1;
        if span.is_error() {
            error_count += 1;
            *service_errors.entry(span.service_name.clone()).or_insert(0) += 1;
        }
    }

    let span_count = spans.len() as u64;
    let error_rate = if span_count > 0 {
        error_count as f64 / span_count as f64
    } else {
        0.0
    };
    let availability = 1.0 - error_rate;

    let mut service_stats = HashMap::new();
    for (service, count) in &service_counts {
        let latencies = service_latencies.get(service).cloned().unwrap_or_default();
        let errors = *service_errors.get(service).unwrap_or(&0);
        let service_error_rate = if *count > 0 {
            errors as f64 / *count as f64
        } else {
            0.0
        };
        service_stats.insert(
            service.clone(),
            ServiceStats {
                span_count: *count,
                error_count: errors,
                error_rate: service_error_rate,
                latency_p50_ms: percentile(&latencies, 0.50),
                latency_p95_ms: percentile(&latencies, 0.95),
                latency_p99_ms: percentile(&latencies, 0.99),
            },
        );
    }

    TraceStats {
        span_count,
        error_count,
        error_rate,
        availability,
        latency_p50_ms: percentile(&latencies, 0.50),
        latency_p95_ms: percentile(&latencies, 0.95),
        latency_p99_ms: percentile(&latencies, 0.99),
        service_stats,
    }
}

/// Distinct operation names (falling back to service name), in first-seen
/// order; used as a default observed-signal list for coverage analysis.
pub fn extract_observed_signals(spans: &[Span]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut observed = Vec::new();
    for span in spans {
        let op = if span.operation.is_empty() {
            &span.service_name
        } else {
            &span.operation
        };
        if seen.insert(op.clone()) {
            observed.push(op.clone());
        }
    }
    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::AttributeValue;
    use std::collections::HashMap as Map;

    fn span(service: &str, start: f64, end: f64, status: &str, http_code: Option<i64>) -> Span {
        let mut attributes = Map::new();
        if let Some(code) = http_code {
            attributes.insert("http.status_code".to_string(), AttributeValue::Int(code));
        }
        Span {
            trace_id: "t1".to_string(),
            span_id: format!("{service}-span"),
            parent_id: None,
            service_name: service.to_string(),
            operation: "op".to_string(),
            start_time: start,
            end_time: end,
            attributes,
            status: status.to_string(),
        }
    }

    #[test]
    fn duration_ms_scales_by_magnitude() {
        assert_eq!(duration_ms(0.0, 10.0), 10.0);
        assert_eq!(duration_ms(0.0, 10e9), 10.0);
        assert_eq!(duration_ms(0.0, 10e12), 10.0);
        assert_eq!(duration_ms(0.0, 10e15), 10.0);
    }

    #[test]
    fn s1_mixed_outcomes_scenario() {
        let spans = vec![
            span("checkout", 0.0, 420.0, "OK", None),
            span("payment", 0.0, 520.0, "ERROR", Some(503)),
            span("fraud", 0.0, 180.0, "OK", None),
            span("checkout", 0.0, 260.0, "OK", None),
            span("payment", 0.0, 240.0, "OK", None),
        ];
        let stats = compute_trace_stats(&spans);
        assert_eq!(stats.span_count, 5);
        assert_eq!(stats.error_count, 1);
        assert!((stats.error_rate - 0.2).abs() < 1e-9);
        assert!((stats.availability - 0.8).abs() < 1e-9);
    }

    #[test]
    fn percentiles_are_monotonic() {
        let spans = (0..20)
            .map(|i| span("svc", 0.0, i as f64 * 7.0, "OK", None))
            .collect::<Vec<_>>();
        let stats = compute_trace_stats(&spans);
        let p50 = stats.latency_p50_ms.unwrap();
        let p95 = stats.latency_p95_ms.unwrap();
        let p99 = stats.latency_p99_ms.unwrap();
        assert!(p50 <= p95);
        assert!(p95 <= p99);
    }

    #[test]
    fn empty_input_yields_null_percentiles() {
        let stats = compute_trace_stats(&[]);
        assert_eq!(stats.span_count, 0);
        assert!(stats.latency_p50_ms.is_none());
        assert_eq!(stats.error_rate, 0.0);
    }
}
