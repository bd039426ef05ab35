use stackguard_domain::policy::{EffectivePolicy, RulePolicy};
use stackguard_types::{ids, Severity};

pub const PROFILES: &[&str] = &["strict", "baseline"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into stack config.
pub fn preset(profile: &str) -> EffectivePolicy {
    match profile {
        "baseline" => baseline_profile(),
        "strict" => strict_profile(),
        // custom names start from strict
        other => EffectivePolicy {
            profile: other.to_string(),
            ..strict_profile()
        },
    }
}

fn strict_profile() -> EffectivePolicy {
    EffectivePolicy::default()
}

/// Adoption profile: only high and critical violations gate, and access logging is
/// downgraded to an advisory nudge.
fn baseline_profile() -> EffectivePolicy {
    let mut policy = EffectivePolicy {
        profile: "baseline".to_string(),
        fail_on: Severity::High,
        ..EffectivePolicy::default()
    };
    policy.rules.insert(
        ids::RULE_ACCESS_LOGGING_RECOMMENDED.to_string(),
        RulePolicy::with_severity(Severity::Low),
    );
    policy
}
