use crate::{model::StackguardConfigV1, presets};
use anyhow::Context;
use globset::Glob;
use stackguard_domain::policy::{EffectivePolicy, RulePolicy, UnknownKinds};
use stackguard_types::explain::all_rule_keys;
use stackguard_types::Severity;

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub fail_on: Option<String>,
    pub workers: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectivePolicy,
}

pub fn resolve_config(
    cfg: StackguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile);

    if let Some(fail_on) = overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        effective.fail_on = parse_severity(fail_on).context("invalid fail_on")?;
    }

    if let Some(workers) = overrides.workers.or(cfg.workers) {
        if workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        effective.workers = Some(workers);
    }

    if let Some(mode) = cfg.unknown_kinds.as_deref() {
        effective.unknown_kinds = parse_unknown_kinds(mode)?;
    }

    if let Some(labels) = cfg.required_labels.clone() {
        effective.required_labels = labels;
    }

    // per-rule overrides
    for (rule_key, rc) in cfg.rules.iter() {
        if !all_rule_keys().contains(&rule_key.as_str()) {
            anyhow::bail!(
                "unknown rule key in [rules]: {rule_key} (known: {})",
                all_rule_keys().join(", ")
            );
        }

        let entry = effective
            .rules
            .entry(rule_key.clone())
            .or_insert_with(RulePolicy::enabled);

        if let Some(enabled) = rc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = rc.severity.as_deref() {
            entry.severity =
                Some(parse_severity(sev).with_context(|| format!("invalid severity for {rule_key}"))?);
        }
        if !rc.allow.is_empty() {
            validate_allowlist(rule_key, &rc.allow)?;
            entry.allow = rc.allow.clone();
        }
    }

    Ok(ResolvedConfig { effective })
}

fn validate_allowlist(rule_key: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern)
            .with_context(|| format!("invalid allow glob for {rule_key}: {pattern}"))?;
    }
    Ok(())
}

pub fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v.to_ascii_lowercase().as_str() {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => anyhow::bail!("unknown severity: {other} (expected low|medium|high|critical)"),
    }
}

pub fn parse_unknown_kinds(v: &str) -> anyhow::Result<UnknownKinds> {
    match v {
        "reject" => Ok(UnknownKinds::Reject),
        "passthrough" => Ok(UnknownKinds::Passthrough),
        other => anyhow::bail!("unknown unknown_kinds: {other} (expected 'reject' or 'passthrough')"),
    }
}
