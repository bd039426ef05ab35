//! `stackguard explain <rule-key>`: what a rule checks, which resource kinds it
//! targets, and how a violating declaration is fixed.

use stackguard_domain::policy::EffectivePolicy;
use stackguard_domain::rules::builtin_rules;
use stackguard_types::explain::{self, Explanation};
use stackguard_types::Severity;

/// Documentation for one built-in rule, joined with its catalog defaults.
#[derive(Clone, Debug)]
pub struct RuleHelp {
    pub key: String,
    pub severity: Severity,
    pub kinds: Vec<String>,
    pub explanation: Explanation,
}

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(RuleHelp),
    NotFound {
        identifier: String,
        /// Known keys sharing a word with the identifier.
        suggestions: Vec<&'static str>,
        available_rule_keys: &'static [&'static str],
    },
}

pub fn run_explain(rule_key: &str) -> ExplainOutput {
    let rule_key = rule_key.trim();
    let rule = builtin_rules(&EffectivePolicy::default())
        .into_iter()
        .find(|r| r.key() == rule_key);

    match (rule, explain::lookup_explanation(rule_key)) {
        (Some(rule), Some(explanation)) => ExplainOutput::Found(RuleHelp {
            key: rule.key().to_string(),
            severity: rule.severity(),
            kinds: rule
                .applies_to()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            explanation,
        }),
        _ => ExplainOutput::NotFound {
            identifier: rule_key.to_string(),
            suggestions: suggest(rule_key, explain::all_rule_keys()),
            available_rule_keys: explain::all_rule_keys(),
        },
    }
}

fn suggest(identifier: &str, keys: &[&'static str]) -> Vec<&'static str> {
    let wanted: Vec<&str> = identifier
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 2)
        .collect();
    keys.iter()
        .copied()
        .filter(|key| key.split('-').any(|word| wanted.contains(&word)))
        .collect()
}

/// Terminal layout:
///
/// ```text
/// no-public-acl (critical) on ObjectStorageBucket
/// <title>
///
/// <description>
///
/// How to fix:
///   <remediation>
///
/// Violating declaration:
///     <yaml>
///
/// Compliant declaration:
///     <yaml>
/// ```
pub fn format_explanation(help: &RuleHelp) -> String {
    let exp = &help.explanation;
    let mut out = format!(
        "{} ({}) on {}\n{}\n\n{}\n\nHow to fix:\n",
        help.key,
        help.severity,
        help.kinds.join(", "),
        exp.title,
        exp.description.trim_end(),
    );
    push_indented(&mut out, exp.remediation, 2);
    out.push_str("\nViolating declaration:\n");
    push_indented(&mut out, exp.examples.before, 4);
    out.push_str("\nCompliant declaration:\n");
    push_indented(&mut out, exp.examples.after, 4);
    out
}

fn push_indented(out: &mut String, text: &str, width: usize) {
    for line in text.trim_end().lines() {
        if !line.is_empty() {
            out.push_str(&" ".repeat(width));
            out.push_str(line);
        }
        out.push('\n');
    }
}

pub fn format_not_found(
    identifier: &str,
    suggestions: &[&'static str],
    rule_keys: &[&'static str],
) -> String {
    let mut out = format!("Unknown rule key: {identifier}\n");
    if !suggestions.is_empty() {
        out.push_str(&format!("Did you mean: {}?\n", suggestions.join(", ")));
    }
    out.push_str("\nAvailable rule keys:\n");
    for key in rule_keys {
        out.push_str(&format!("  - {key}\n"));
    }
    out
}
