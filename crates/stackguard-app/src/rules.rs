//! The `rules` use case: list the built-in catalog as configured by the effective policy.

use serde::Serialize;
use stackguard_domain::policy::EffectivePolicy;
use stackguard_domain::rules::builtin_rules;
use stackguard_types::Severity;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleListing {
    pub key: String,
    pub kinds: Vec<String>,
    /// Effective severity, after overrides.
    pub severity: Severity,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,
}

/// Every built-in rule, including disabled ones, in descending severity then key order.
pub fn list_rules(policy: &EffectivePolicy) -> Vec<RuleListing> {
    let mut out: Vec<RuleListing> = builtin_rules(policy)
        .iter()
        .map(|rule| {
            let rule_policy = policy.rule_policy(rule.key());
            RuleListing {
                key: rule.key().to_string(),
                kinds: rule
                    .applies_to()
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
                severity: rule_policy
                    .and_then(|p| p.severity)
                    .unwrap_or_else(|| rule.severity()),
                enabled: policy.rule_enabled(rule.key()),
                allow: rule_policy.map(|p| p.allow.clone()).unwrap_or_default(),
            }
        })
        .collect();
    out.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.key.cmp(&b.key)));
    out
}

/// One line per rule: `{key} {severity} {enabled|disabled} [{kinds}]`.
pub fn format_rules(rules: &[RuleListing]) -> String {
    let width = rules.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for r in rules {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {:<8}  {}\n",
            r.key,
            r.severity.as_str(),
            if r.enabled { "enabled" } else { "disabled" },
            r.kinds.join(", "),
            width = width,
        ));
    }
    out
}
