//! The `check` use case: load every stack under a root, evaluate it, and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use stackguard_domain::policy::EffectivePolicy;
use stackguard_domain::rules::builtin_catalog;
use stackguard_domain::{evaluate_with, CancelToken, EvalOptions, RuleCatalog};
use stackguard_settings::{Overrides, ResolvedConfig};
use stackguard_stack::{discover_stacks, load_stack, stack_name, AdapterRegistry, MalformedResourceError};
use stackguard_types::{
    ids, Gate, GateStatus, ReportEnvelope, Severity, StackPath, StackResult, StackStatus,
    StackguardData, StackguardReportV1, Summary, ToolMeta, SCHEMA_REPORT_V1,
};
use time::OffsetDateTime;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// A stack directory, or a directory whose subdirectories are stacks.
    pub root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    pub cancel: Option<CancelToken>,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: StackguardReportV1,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: resolve config, discover and load stacks, evaluate, build the gate.
///
/// A malformed stack is reported with [`StackStatus::Error`] and the remaining stacks are still
/// evaluated. I/O failures, bad config, and cancellation abort the run.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Empty config is allowed; defaults apply.
    let cfg = if input.config_text.trim().is_empty() {
        stackguard_settings::StackguardConfigV1::default()
    } else {
        stackguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        stackguard_settings::resolve_config(cfg, input.overrides.clone()).context("resolve config")?;
    let policy = &resolved.effective;

    let catalog = builtin_catalog(policy).context("build rule catalog")?;
    let registry = AdapterRegistry::builtin();
    let options = EvalOptions {
        workers: policy.workers,
        cancel: input.cancel.clone(),
    };

    if !input.root.is_dir() {
        anyhow::bail!("stack root is not a directory: {}", input.root);
    }
    let dirs = discover_stacks(input.root).context("discover stacks")?;
    if dirs.is_empty() {
        tracing::warn!(root = %input.root, "no stacks found");
    }

    let mut stacks = Vec::with_capacity(dirs.len());
    for dir in &dirs {
        stacks.push(check_stack(input.root, dir, &registry, &catalog, policy, &options)?);
    }

    let gate = gate_for(&stacks, policy.fail_on);
    let data = StackguardData {
        profile: policy.profile.clone(),
        stacks_evaluated: u32::try_from(stacks.len()).unwrap_or(u32::MAX),
        resources_evaluated: stacks.iter().map(|s| s.summary.resources_evaluated).sum(),
        rules_in_catalog: u32::try_from(catalog.len()).unwrap_or(u32::MAX),
        violations_total: stacks.iter().map(|s| s.summary.violation_count).sum(),
        violations_gating: gating_violations(&stacks, policy.fail_on),
    };

    tracing::info!(
        stacks = data.stacks_evaluated,
        violations = data.violations_total,
        gating = data.violations_gating,
        gate = ?gate.status,
        "check finished"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "stackguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        gate,
        stacks,
        data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

fn check_stack(
    root: &Utf8Path,
    dir: &Utf8Path,
    registry: &AdapterRegistry,
    catalog: &RuleCatalog,
    policy: &EffectivePolicy,
    options: &EvalOptions,
) -> anyhow::Result<StackResult> {
    let name = stack_name(dir);
    let path = StackPath::relative_to(root, dir);

    let loaded = match load_stack(dir, registry, policy.unknown_kinds) {
        Ok(loaded) => loaded,
        Err(err) => {
            let Some(malformed) = err.downcast_ref::<MalformedResourceError>() else {
                return Err(err);
            };
            tracing::error!(stack = %name, error = %malformed, "malformed stack");
            return Ok(StackResult {
                name,
                path,
                status: StackStatus::Error,
                summary: Summary::default(),
                error: Some(malformed.to_string()),
                verdicts: Vec::new(),
            });
        }
    };

    let report = evaluate_with(&loaded.graph, catalog, options)
        .with_context(|| format!("evaluate stack {name}"))?;
    let (verdicts, summary) = report.into_parts();
    tracing::debug!(stack = %name, violations = summary.violation_count, "stack evaluated");

    let status = if summary.violation_count == 0 {
        StackStatus::Compliant
    } else {
        StackStatus::NonCompliant
    };

    Ok(StackResult {
        name,
        path,
        status,
        summary,
        error: None,
        verdicts,
    })
}

fn gating_violations(stacks: &[StackResult], fail_on: Severity) -> u32 {
    stacks
        .iter()
        .map(|s| s.summary.violations.at_or_above(fail_on))
        .sum()
}

fn gate_for(stacks: &[StackResult], fail_on: Severity) -> Gate {
    let mut reasons = Vec::new();
    let malformed = stacks.iter().any(|s| s.status == StackStatus::Error);
    let gating = gating_violations(stacks, fail_on);

    if malformed {
        reasons.push(ids::REASON_MALFORMED_STACK.to_string());
    }
    if gating > 0 {
        reasons.push(ids::REASON_VIOLATIONS_AT_THRESHOLD.to_string());
    }

    let status = if malformed {
        GateStatus::Error
    } else if gating > 0 {
        GateStatus::Fail
    } else {
        GateStatus::Pass
    };

    Gate {
        status,
        fail_on,
        reasons,
        error: None,
    }
}

/// Map the gate to an exit code: 0 = pass, 2 = violations at or above the threshold,
/// 1 = the checker could not evaluate everything.
pub fn gate_exit_code(status: GateStatus) -> i32 {
    match status {
        GateStatus::Pass => 0,
        GateStatus::Fail => 2,
        GateStatus::Error => 1,
    }
}
