use stackguard_types::Severity;
use std::collections::BTreeMap;

/// What to do with documents whose type has no registered adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnknownKinds {
    Reject,
    Passthrough,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulePolicy {
    pub enabled: bool,
    /// Overrides the rule's built-in severity.
    pub severity: Option<Severity>,
    /// Resource id globs exempted from the rule.
    pub allow: Vec<String>,
}

impl RulePolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            severity: None,
            allow: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: None,
            allow: Vec::new(),
        }
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self {
            severity: Some(severity),
            ..Self::enabled()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectivePolicy {
    pub profile: String,
    /// Violations at or above this severity fail the gate.
    pub fail_on: Severity,
    /// Evaluation pool size; `None` uses the shared pool.
    pub workers: Option<usize>,
    pub unknown_kinds: UnknownKinds,
    pub required_labels: Vec<String>,
    pub rules: BTreeMap<String, RulePolicy>,
}

impl EffectivePolicy {
    /// Rules absent from the map are enabled with their defaults.
    pub fn rule_policy(&self, rule_key: &str) -> Option<&RulePolicy> {
        self.rules.get(rule_key)
    }

    pub fn rule_enabled(&self, rule_key: &str) -> bool {
        self.rule_policy(rule_key).is_none_or(|p| p.enabled)
    }
}

/// The `app.kubernetes.io/*` recommended label keys.
pub fn recommended_labels() -> Vec<String> {
    [
        "app.kubernetes.io/name",
        "app.kubernetes.io/instance",
        "app.kubernetes.io/version",
        "app.kubernetes.io/component",
        "app.kubernetes.io/part-of",
        "app.kubernetes.io/managed-by",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            profile: "strict".to_string(),
            fail_on: Severity::Low,
            workers: None,
            unknown_kinds: UnknownKinds::Reject,
            required_labels: recommended_labels(),
            rules: BTreeMap::new(),
        }
    }
}
