//! Plan applier (component J): drives external `kubectl` to realize a
//! [`ZeroTouchPlan`](crate::models::ZeroTouchPlan).

use crate::error::ZeroTouchResult;
use crate::models::{ApplyOutcome, ExecutedCommand, FailedCommand, PatchInstruction, ZeroTouchPlan};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// `--diff`, `--diff-only`, and `--dry-run` are independent toggles on the
/// CLI, so they're independent fields here rather than a single mode enum.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub kubectl: String,
    pub diff: bool,
    pub diff_only: bool,
    pub dry_run: bool,
    pub output_dir: Option<PathBuf>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            diff: false,
            diff_only: false,
            dry_run: false,
            output_dir: None,
        }
    }
}

pub fn apply_plan(plan: &ZeroTouchPlan, options: &ApplyOptions) -> ZeroTouchResult<ApplyOutcome> {
    let mut outcome = ApplyOutcome::default();
    let collector = &plan.collector;

    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("collector-manifest.yaml"), &collector.manifest_yaml)?;
        std::fs::write(dir.join("collector-config.yaml"), &collector.config_yaml)?;
        std::fs::write(dir.join("plan.json"), serde_json::to_string_pretty(plan)?)?;
    }

    let manifest_path = write_manifest(collector, options.output_dir.as_deref())?;

    let mut pending: Vec<(Vec<String>, Option<String>)> = Vec::new();
    if options.diff || options.diff_only {
        pending.push((
            vec![options.kubectl.clone(), "diff".to_string(), "-f".to_string(), manifest_path.display().to_string()],
            None,
        ));
        for patch in &collector.patches {
            let payload = patch_diff_payload(patch)?;
            pending.push((
                vec![options.kubectl.clone(), "diff".to_string(), "-f".to_string(), "-".to_string()],
                Some(payload),
            ));
        }
    }
    if !options.diff_only {
        pending.push((
            vec![options.kubectl.clone(), "apply".to_string(), "-f".to_string(), manifest_path.display().to_string()],
            None,
        ));
        for patch in &collector.patches {
            let payload = serde_json::to_string(&patch.patch)?;
            pending.push((
                vec![
                    options.kubectl.clone(),
                    "patch".to_string(),
                    patch.kind.to_lowercase(),
                    patch.workload_name.clone(),
                    "-n".to_string(),
                    patch.namespace.clone(),
                    "--type".to_string(),
                    "merge".to_string(),
                    "-p".to_string(),
                    payload,
                ],
                None,
            ));
        }
    }

    if options.dry_run {
        outcome.skipped = pending.into_iter().map(|(argv, _)| argv.join(" ")).collect();
        return Ok(outcome);
    }

    let mut iter = pending.into_iter();
    while let Some((argv, stdin)) = iter.by_ref().next() {
        match run(&argv, stdin.as_deref()) {
            Ok(executed) => outcome.executed.push(executed),
            Err(failed) => {
                warn!(command = %argv.join(" "), "kubectl command failed");
                outcome.failed = Some(failed);
                outcome.skipped = iter.map(|(rest, _)| rest.join(" ")).collect();
                return Ok(outcome);
            }
        }
    }
    Ok(outcome)
}

/// A partial manifest document for `kind metadata` plus whatever top-level
/// fields the merge patch touches (typically `spec`), rendered as YAML so
/// `kubectl diff -f -` has something coherent to compare against the live
/// object. Grounded on the same JSON-merge-patch shape `apply_plan` already
/// sends to `kubectl patch`.
fn patch_diff_payload(patch: &PatchInstruction) -> ZeroTouchResult<String> {
    let mut doc = serde_json::Map::new();
    doc.insert("apiVersion".to_string(), serde_json::Value::String("apps/v1".to_string()));
    doc.insert("kind".to_string(), serde_json::Value::String(patch.kind.clone()));
    doc.insert(
        "metadata".to_string(),
        serde_json::json!({"name": patch.workload_name, "namespace": patch.namespace}),
    );
    if let serde_json::Value::Object(fields) = &patch.patch {
        for (key, value) in fields {
            doc.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_yaml::to_string(&serde_json::Value::Object(doc))?)
}

fn write_manifest(collector: &crate::models::CollectorPlan, output_dir: Option<&Path>) -> ZeroTouchResult<PathBuf> {
    if let Some(dir) = output_dir {
        Ok(dir.join("collector-manifest.yaml"))
    } else {
        let path = std::env::temp_dir().join(format!("mindops-collector-manifest-{}.yaml", std::process::id()));
        std::fs::write(&path, &collector.manifest_yaml)?;
        Ok(path)
    }
}

fn run(argv: &[String], stdin: Option<&str>) -> Result<ExecutedCommand, FailedCommand> {
    info!(command = %argv.join(" "), "running kubectl command");
    let output = match stdin {
        None => Command::new(&argv[0]).args(&argv[1..]).output(),
        Some(payload) => run_with_stdin(&argv[0], &argv[1..], payload),
    };
    match output {
        Ok(output) => {
            let stdout_tail = tail(&output.stdout);
            let stderr_tail = tail(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            if output.status.success() {
                Ok(ExecutedCommand {
                    argv: argv.to_vec(),
                    stdout_tail,
                    stderr_tail,
                    exit_code,
                })
            } else {
                Err(FailedCommand {
                    argv: argv.to_vec(),
                    stdout_tail,
                    stderr_tail,
                    exit_code: Some(exit_code),
                })
            }
        }
        Err(e) => Err(FailedCommand {
            argv: argv.to_vec(),
            stdout_tail: String::new(),
            stderr_tail: e.to_string(),
            exit_code: None,
        }),
    }
}

fn run_with_stdin(program: &str, args: &[String], payload: &str) -> std::io::Result<std::process::Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child.stdin.take().expect("piped stdin").write_all(payload.as_bytes())?;
    child.wait_with_output()
}

fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(20);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectorPlan, ZeroTouchPlan};

    fn empty_plan() -> ZeroTouchPlan {
        ZeroTouchPlan {
            collector: CollectorPlan {
                mode: "gateway".to_string(),
                namespace: "observability".to_string(),
                sampling_rate: 1.0,
                exporters: vec!["logging".to_string()],
                config_yaml: "receivers: {}".to_string(),
                manifest_yaml: "kind: Deployment".to_string(),
                instrumentation: Vec::new(),
                patches: Vec::new(),
                discovered: Vec::new(),
            },
            warnings: Vec::new(),
        }
    }

    fn plan_with_patch() -> ZeroTouchPlan {
        let mut plan = empty_plan();
        plan.collector.patches.push(PatchInstruction {
            workload_name: "checkout".to_string(),
            namespace: "observability".to_string(),
            kind: "Deployment".to_string(),
            description: "inject OTEL env".to_string(),
            patch: serde_json::json!({"spec": {"template": {"spec": {"containers": []}}}}),
        });
        plan
    }

    #[test]
    fn dry_run_collects_commands_without_executing() {
        let plan = empty_plan();
        let options = ApplyOptions {
            dry_run: true,
            ..ApplyOptions::default()
        };
        let outcome = apply_plan(&plan, &options).unwrap();
        assert!(outcome.executed.is_empty());
        assert!(outcome.failed.is_none());
        assert!(!outcome.skipped.is_empty());
        assert!(outcome.skipped[0].contains("kubectl apply"));
    }

    #[test]
    fn diff_only_mode_omits_apply_command() {
        let plan = empty_plan();
        let options = ApplyOptions {
            diff_only: true,
            dry_run: true,
            ..ApplyOptions::default()
        };
        let outcome = apply_plan(&plan, &options).unwrap();
        let commands = outcome.all_commands();
        assert!(commands.iter().any(|c| c.contains("kubectl diff")));
        assert!(!commands.iter().any(|c| c.contains("kubectl apply")));
    }

    #[test]
    fn diff_mode_includes_both_diff_and_apply() {
        let plan = empty_plan();
        let options = ApplyOptions {
            diff: true,
            dry_run: true,
            ..ApplyOptions::default()
        };
        let outcome = apply_plan(&plan, &options).unwrap();
        let commands = outcome.all_commands();
        assert!(commands.iter().any(|c| c.contains("kubectl diff")));
        assert!(commands.iter().any(|c| c.contains("kubectl apply")));
    }

    #[test]
    fn diff_mode_adds_a_per_patch_diff_command() {
        let plan = plan_with_patch();
        let options = ApplyOptions {
            diff: true,
            dry_run: true,
            ..ApplyOptions::default()
        };
        let outcome = apply_plan(&plan, &options).unwrap();
        let commands = outcome.all_commands();
        let manifest_diffs = commands.iter().filter(|c| c.contains("kubectl diff") && c.contains("-f -")).count();
        assert_eq!(manifest_diffs, 1, "expected exactly one stdin-fed diff command for the single patch");
        assert!(commands.iter().any(|c| c.contains("kubectl patch")));
    }

    #[test]
    fn patch_diff_payload_renders_kind_and_metadata() {
        let patch = PatchInstruction {
            workload_name: "checkout".to_string(),
            namespace: "observability".to_string(),
            kind: "Deployment".to_string(),
            description: "inject OTEL env".to_string(),
            patch: serde_json::json!({"spec": {"template": {"spec": {"containers": []}}}}),
        };
        let payload = patch_diff_payload(&patch).unwrap();
        assert!(payload.contains("checkout"));
        assert!(payload.contains("kind: Deployment"));
        assert!(payload.contains("spec:"));
    }
}
