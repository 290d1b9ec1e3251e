//! Command-line surface, mirroring `mindops_orchestrator.cli` plus the
//! `--fail-on` exit-code semantics from `ci_gate.py` and the `gate`
//! subcommand from §11.2.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mindops-orchestrator", about = "MindOps orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a guardrail file against a metrics file for CI use.
    Gate(GateArgs),
}

#[derive(Debug, Args, Default)]
pub struct RunArgs {
    /// Trace JSON for SLO generation / coverage / telemetry recommendation.
    #[arg(long)]
    pub trace: Option<String>,

    /// K8s manifest path(s) for the zero-touch planner (repeatable).
    #[arg(long = "manifests")]
    pub manifests: Vec<String>,

    /// Telemetry volume sample(s) (repeatable).
    #[arg(long = "telemetry-volume")]
    pub telemetry_volume: Vec<f64>,

    /// Expected eBPF signal name (repeatable).
    #[arg(long = "expected-signal")]
    pub expected_signal: Vec<String>,

    /// Observed signal name (repeatable).
    #[arg(long = "observed-signal")]
    pub observed_signal: Vec<String>,

    #[arg(long = "zero-touch-mode", default_value = "auto")]
    pub zero_touch_mode: String,

    #[arg(long = "zero-touch-namespace", default_value = "observability")]
    pub zero_touch_namespace: String,

    /// `logging`, `otlp`, or `otlp=<endpoint>` (repeatable).
    #[arg(long = "zero-touch-exporter")]
    pub zero_touch_exporter: Vec<String>,

    #[arg(long = "zero-touch-apply")]
    pub zero_touch_apply: bool,

    #[arg(long = "zero-touch-diff-only")]
    pub zero_touch_diff_only: bool,

    #[arg(long = "zero-touch-dry-run")]
    pub zero_touch_dry_run: bool,

    #[arg(long, default_value = "kubectl")]
    pub kubectl: String,

    /// Write structured report artifacts to this directory.
    #[arg(long = "export-dir")]
    pub export_dir: Option<PathBuf>,

    /// Write the orchestrator report JSON to this path (always also printed).
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long = "fail-on", value_enum, default_value_t = FailOn::Any)]
    pub fail_on: FailOn,

    /// Raise the log level (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum FailOn {
    #[default]
    Any,
    Baseline,
    Tests,
    Guardrail,
}

#[derive(Debug, Args)]
pub struct GateArgs {
    /// Path to a guardrail file (`name -> {metric, comparator, threshold}`).
    #[arg(long)]
    pub guardrails: PathBuf,

    /// Path to a metrics file (`name -> value`).
    #[arg(long)]
    pub metrics: PathBuf,
}

/// `otlp=<endpoint>` syntax: collects exporter names and an optional OTLP
/// endpoint, defaulting to `["logging"]` when nothing was passed.
pub fn parse_exporters(values: &[String]) -> (Vec<String>, Option<String>) {
    let mut exporters = Vec::new();
    let mut otlp_endpoint = None;
    for value in values {
        if let Some(endpoint) = value.strip_prefix("otlp=") {
            exporters.push("otlp".to_string());
            otlp_endpoint = Some(endpoint.to_string());
        } else {
            exporters.push(value.clone());
        }
    }
    if exporters.is_empty() {
        exporters.push("logging".to_string());
    }
    (exporters, otlp_endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otlp_exporter_splits_into_name_and_endpoint() {
        let (exporters, endpoint) = parse_exporters(&["otlp=http://collector:4317".to_string()]);
        assert_eq!(exporters, vec!["otlp".to_string()]);
        assert_eq!(endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn no_exporters_defaults_to_logging() {
        let (exporters, endpoint) = parse_exporters(&[]);
        assert_eq!(exporters, vec!["logging".to_string()]);
        assert!(endpoint.is_none());
    }

    #[test]
    fn mixed_exporters_are_preserved_in_order() {
        let (exporters, _) = parse_exporters(&["logging".to_string(), "otlp=http://x:4317".to_string()]);
        assert_eq!(exporters, vec!["logging".to_string(), "otlp".to_string()]);
    }
}
