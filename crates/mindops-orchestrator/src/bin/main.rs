use anyhow::Context;
use clap::Parser;
use mindops_orchestrator::cli::{parse_exporters, Cli, Command, RunArgs};
use mindops_orchestrator::gate_cli::{render_table, run_gate};
use mindops_orchestrator::pipeline::{run, PipelineInput};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.run.verbose);

    match cli.command {
        Some(Command::Gate(args)) => run_gate_subcommand(&args.guardrails, &args.metrics),
        None => run_report(&cli.run).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)))
        .with(fmt::layer())
        .init();
}

fn run_gate_subcommand(guardrails_path: &Path, metrics_path: &Path) -> anyhow::Result<()> {
    let decision = run_gate(guardrails_path, metrics_path)?;
    print!("{}", render_table(&decision));
    if !decision.passed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_report(args: &RunArgs) -> anyhow::Result<()> {
    let (exporters, otlp_endpoint) = parse_exporters(&args.zero_touch_exporter);

    let input = PipelineInput {
        trace_path: args.trace.clone(),
        manifest_paths: args.manifests.clone(),
        telemetry_volumes: args.telemetry_volume.clone(),
        expected_signals: args.expected_signal.clone(),
        observed_signals: args.observed_signal.clone(),
        zero_touch_mode: args.zero_touch_mode.clone(),
        zero_touch_namespace: args.zero_touch_namespace.clone(),
        zero_touch_exporters: exporters,
        zero_touch_otlp_endpoint: otlp_endpoint,
        zero_touch_apply: args.zero_touch_apply,
        zero_touch_diff_only: args.zero_touch_diff_only,
        zero_touch_dry_run: args.zero_touch_dry_run,
        kubectl: args.kubectl.clone(),
        export_dir: args.export_dir.clone(),
    };

    let report = run(&input).await.context("orchestrator pipeline failed")?;
    let payload = serde_json::to_string_pretty(&report.to_value())?;

    if let Some(export_dir) = &args.export_dir {
        export_structured(export_dir, &report)?;
    }
    if let Some(output) = &args.output {
        std::fs::write(output, &payload).context("writing --output report")?;
    }
    println!("{}", payload);

    if should_fail(args.fail_on, &report) {
        std::process::exit(1);
    }
    Ok(())
}

fn export_structured(
    base: &Path,
    report: &mindops_orchestrator::report::OrchestratorReport,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(base)?;
    std::fs::write(base.join("orchestrator_report.json"), serde_json::to_string_pretty(&report.to_value())?)?;

    if let Some(plan) = &report.zero_touch {
        let zt_dir = base.join("zero_touch");
        std::fs::create_dir_all(&zt_dir)?;
        std::fs::write(zt_dir.join("plan.json"), serde_json::to_string_pretty(plan)?)?;
        if !plan.collector.manifest_yaml.is_empty() {
            std::fs::write(zt_dir.join("collector-manifest.yaml"), &plan.collector.manifest_yaml)?;
        }
        if !plan.collector.config_yaml.is_empty() {
            std::fs::write(zt_dir.join("collector-config.yaml"), &plan.collector.config_yaml)?;
        }
    }

    if !report.slo_candidates.is_empty() {
        let slo_dir = base.join("slo_copilot");
        std::fs::create_dir_all(&slo_dir)?;
        std::fs::write(slo_dir.join("report.json"), serde_json::to_string_pretty(&report.to_value())?)?;
    }
    Ok(())
}

fn should_fail(
    fail_on: mindops_orchestrator::cli::FailOn,
    report: &mindops_orchestrator::report::OrchestratorReport,
) -> bool {
    use mindops_orchestrator::cli::FailOn;

    let baseline_failed = report.baseline_evaluations.iter().any(|e| !e.passed);
    let tests_failed = report.test_results.iter().any(|r| r.evaluations.iter().any(|e| !e.passed));
    let guardrail_passed = report.gate.as_ref().map(|g| g.passed).unwrap_or(true);

    match fail_on {
        FailOn::Baseline => baseline_failed,
        FailOn::Tests => tests_failed,
        FailOn::Guardrail => !guardrail_passed,
        FailOn::Any => baseline_failed || tests_failed || !guardrail_passed,
    }
}
