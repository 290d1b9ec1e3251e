//! Composes trace ingest/scrub/stats, SLO generation/evaluation/fault
//! tests, coverage, telemetry recommendation, topology RCA, and the
//! zero-touch planner/applier into one report, mirroring `SLOCopilot.run`
//! and the orchestrator CLI's zero-touch branch.

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::report::{IntegrationStatus, OrchestratorReport, RcaReport};
use mindops_core::{compute_trace_stats, extract_observed_signals, ingest_spans, PiiScrubber};
use mindops_coverage::analyze_coverage;
use mindops_gate::{emit_policy_bundle, evaluate_guardrails, guardrails_from_slos};
use mindops_integrations::{
    BudgetForecastAdapter, ForecastAdapter, OpenSloSchemaValidator, RcaNarrator, SchemaValidatorAdapter,
    SerdeYamlAdapter, TemplateRcaNarrator, YamlAdapter,
};
use mindops_slo::{evaluate_slos, metrics_from_stats, SloGenerator, SloMetrics, TraceTestRunner};
use mindops_telemetry::{recommend, SamplingAdvisor};
use mindops_topology::TopologyAnalyzer;
use mindops_zerotouch::{apply_plan, discover_services, ApplyOptions, ZeroTouchPlanner};
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_EXPECTED_SIGNALS: [&str; 3] = ["probe_a", "probe_b", "probe_c"];

#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub trace_path: Option<String>,
    pub manifest_paths: Vec<String>,
    pub telemetry_volumes: Vec<f64>,
    pub expected_signals: Vec<String>,
    pub observed_signals: Vec<String>,
    pub zero_touch_mode: String,
    pub zero_touch_namespace: String,
    pub zero_touch_exporters: Vec<String>,
    pub zero_touch_otlp_endpoint: Option<String>,
    pub zero_touch_apply: bool,
    pub zero_touch_diff_only: bool,
    pub zero_touch_dry_run: bool,
    pub kubectl: String,
    pub export_dir: Option<PathBuf>,
}

pub async fn run(input: &PipelineInput) -> OrchestratorResult<OrchestratorReport> {
    let mut warnings = Vec::new();

    let mut report = OrchestratorReport {
        slo_candidates: Vec::new(),
        baseline_evaluations: Vec::new(),
        test_results: Vec::new(),
        coverage: None,
        telemetry_recommendation: None,
        rca: None,
        policy_snippets: HashMap::new(),
        gate: None,
        integrations_status: integrations_status().await,
        warnings: Vec::new(),
        zero_touch: None,
        zero_touch_apply: None,
    };

    if let Some(trace_path) = &input.trace_path {
        run_trace_pipeline(input, trace_path, &mut report).await?;
    } else {
        warnings.push("No trace provided; SLO/coverage/telemetry sections are empty.".to_string());
    }

    if !input.manifest_paths.is_empty() {
        run_zero_touch(input, &mut report)?;
    }

    report.warnings = warnings;
    Ok(report)
}

async fn run_trace_pipeline(
    input: &PipelineInput,
    trace_path: &str,
    report: &mut OrchestratorReport,
) -> OrchestratorResult<()> {
    let text = std::fs::read_to_string(trace_path)?;
    let payload: serde_json::Value = serde_json::from_str(&text)?;
    let spans = ingest_spans(&payload);

    let scrubber = PiiScrubber::default();
    let records: Vec<serde_json::Value> = spans
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    let (scrubbed, _scrub_report) = scrubber.scrub_records(&records);
    let spans: Vec<mindops_core::Span> = scrubbed
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()?;

    let stats = compute_trace_stats(&spans);

    let expected_signals = if input.expected_signals.is_empty() {
        DEFAULT_EXPECTED_SIGNALS.iter().map(|s| s.to_string()).collect()
    } else {
        input.expected_signals.clone()
    };
    let observed_signals = if input.observed_signals.is_empty() {
        extract_observed_signals(&spans)
    } else {
        input.observed_signals.clone()
    };
    let coverage = analyze_coverage(&expected_signals, &observed_signals);

    let slos = SloGenerator::default().generate(&stats, Some(&coverage));
    let base_metrics = metrics_from_stats(&stats, Some(coverage.coverage_ratio));
    let baseline_evaluations = evaluate_slos(&slos, &base_metrics);
    let test_results = TraceTestRunner::default().run(&slos, &stats, Some(coverage.coverage_ratio));

    let violation = baseline_evaluations.iter().any(|e| !e.passed)
        || test_results.iter().any(|r| r.evaluations.iter().any(|e| !e.passed));
    report.rca = if violation {
        Some(topology_rca(trace_path).await?)
    } else {
        None
    };

    let advisor = SamplingAdvisor::new();
    report.telemetry_recommendation = Some(recommend(
        &advisor,
        &input.telemetry_volumes,
        stats.error_rate > 0.0,
        None,
    )?);

    let guardrails = guardrails_from_slos(&slos);
    let metrics_map = slo_metrics_to_map(&base_metrics);
    report.gate = Some(evaluate_guardrails(&guardrails, &metrics_map));

    report.policy_snippets = emit_policy_bundle(&slos);
    report.slo_candidates = slos;
    report.baseline_evaluations = baseline_evaluations;
    report.test_results = test_results;
    report.coverage = Some(coverage);
    Ok(())
}

fn slo_metrics_to_map(metrics: &SloMetrics) -> HashMap<String, f64> {
    let mut map = HashMap::new();
    let entries = [
        ("latency_p50_ms", metrics.latency_p50_ms),
        ("latency_p95_ms", metrics.latency_p95_ms),
        ("latency_p99_ms", metrics.latency_p99_ms),
        ("error_rate", metrics.error_rate),
        ("availability", metrics.availability),
        ("coverage_ratio", metrics.coverage_ratio),
    ];
    for (name, value) in entries {
        if let Some(value) = value {
            map.insert(name.to_string(), value);
        }
    }
    map
}

async fn topology_rca(trace_path: &str) -> OrchestratorResult<RcaReport> {
    let analyzer = TopologyAnalyzer::default();
    let empty: [&str; 0] = [];
    let topology_report = analyzer.analyze(&empty, &[trace_path])?;
    let narrator = TemplateRcaNarrator;
    let narrative = narrator.narrate(&topology_report.hints).await;
    Ok(RcaReport { narrative, hints: topology_report.hints, metrics: topology_report.metrics })
}

fn run_zero_touch(input: &PipelineInput, report: &mut OrchestratorReport) -> OrchestratorResult<()> {
    let discovered = discover_services(&input.manifest_paths)?;
    let planner = ZeroTouchPlanner {
        mode: input.zero_touch_mode.clone(),
        namespace: input.zero_touch_namespace.clone(),
        exporters: if input.zero_touch_exporters.is_empty() {
            vec!["logging".to_string()]
        } else {
            input.zero_touch_exporters.clone()
        },
        otlp_export_endpoint: input.zero_touch_otlp_endpoint.clone(),
        sampling_rate: 1.0,
    };
    let plan = planner.plan(&discovered);

    if input.zero_touch_apply || input.zero_touch_diff_only || input.zero_touch_dry_run {
        let options = ApplyOptions {
            kubectl: input.kubectl.clone(),
            diff: true,
            diff_only: input.zero_touch_diff_only,
            dry_run: input.zero_touch_dry_run,
            output_dir: input.export_dir.clone(),
        };
        let outcome = apply_plan(&plan, &options)?;
        report.zero_touch_apply = Some(outcome);
    }

    report.zero_touch = Some(plan);
    Ok(())
}

/// Probes every capability adapter in `mindops-integrations` and reports
/// its real readiness, keyed by the adapter's own name. The schema
/// validator legitimately comes back `unavailable` here: the pipeline has
/// no JSON schema document to hand it, so it's probed with `None` and
/// falls back to the structural OpenSLO check at validation time.
async fn integrations_status() -> HashMap<String, IntegrationStatus> {
    let rca = TemplateRcaNarrator;
    let forecast = BudgetForecastAdapter;
    let validator = OpenSloSchemaValidator;
    let yaml = SerdeYamlAdapter;

    let mut status = HashMap::new();
    status.insert(rca.name().to_string(), IntegrationStatus::from_health(rca.name(), rca.probe().await));
    status.insert(
        forecast.name().to_string(),
        IntegrationStatus::from_health(forecast.name(), forecast.probe().await),
    );
    status.insert(
        validator.name().to_string(),
        IntegrationStatus::from_health(validator.name(), validator.probe(None).await),
    );
    status.insert(yaml.name().to_string(), IntegrationStatus::from_health(yaml.name(), yaml.probe().await));
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_trace(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("trace.json");
        let payload = json!([
            {
                "traceId": "t1", "spanId": "s1", "name": "checkout",
                "startTime": 0.0, "endTime": 120.0, "status": {"code": "OK"},
                "attributes": [{"key": "service.name", "value": {"stringValue": "checkout"}}],
            }
        ]);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", payload).unwrap();
        path
    }

    #[tokio::test]
    async fn pipeline_without_trace_or_manifests_only_warns() {
        let input = PipelineInput::default();
        let report = run(&input).await.unwrap();
        assert!(report.slo_candidates.is_empty());
        assert!(!report.warnings.is_empty());
    }

    #[tokio::test]
    async fn integrations_status_is_keyed_by_real_adapter_names() {
        let status = integrations_status().await;
        assert!(status.contains_key("template"));
        assert!(status.contains_key("budget-forecaster"));
        assert!(status.contains_key("serde_yaml"));
        assert_eq!(status["template"].status, "ready");
        assert_eq!(status["openslo-validator"].status, "unavailable");
    }

    #[tokio::test]
    async fn pipeline_with_a_clean_trace_generates_slos_without_rca() {
        let dir = std::env::temp_dir().join(format!("mindops-orchestrator-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let trace_path = write_trace(&dir);

        let mut input = PipelineInput::default();
        input.trace_path = Some(trace_path.to_string_lossy().to_string());
        let report = run(&input).await.unwrap();

        assert!(!report.slo_candidates.is_empty());
        assert!(report.rca.is_none());
        assert!(report.coverage.is_some());
        std::fs::remove_file(&trace_path).ok();
    }
}
