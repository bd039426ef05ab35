use crate::{
    RenderableGate, RenderableLocation, RenderableReport, RenderableStack, RenderableVerdict,
};
use stackguard_types::{GateStatus, Outcome, Severity, StackStatus};

fn bucket_verdict(
    rule_key: &str,
    severity: Severity,
    outcome: Outcome,
    message: &str,
    help: Option<&str>,
) -> RenderableVerdict {
    RenderableVerdict {
        resource_id: "insecure-bucket".to_string(),
        resource_kind: "ObjectStorageBucket".to_string(),
        rule_key: rule_key.to_string(),
        severity,
        outcome,
        message: message.to_string(),
        location: Some(RenderableLocation {
            path: "stacks/s3-insecure/Pulumi.yaml".to_string(),
            document: Some(0),
        }),
        help: help.map(str::to_string),
        fingerprint: (outcome == Outcome::Violation).then(|| format!("fp-{rule_key}")),
    }
}

pub(crate) fn empty_report() -> RenderableReport {
    RenderableReport {
        profile: "strict".to_string(),
        gate: RenderableGate {
            status: GateStatus::Pass,
            fail_on: Severity::Low,
            reasons: Vec::new(),
        },
        stacks: Vec::new(),
    }
}

/// One non-compliant stack with two violations and a pass, plus one malformed stack.
pub(crate) fn report() -> RenderableReport {
    RenderableReport {
        profile: "strict".to_string(),
        gate: RenderableGate {
            status: GateStatus::Fail,
            fail_on: Severity::Low,
            reasons: vec![
                "violations_at_or_above_threshold".to_string(),
                "malformed_stack".to_string(),
            ],
        },
        stacks: vec![
            RenderableStack {
                name: "s3-insecure".to_string(),
                status: StackStatus::NonCompliant,
                error: None,
                resources_evaluated: 1,
                violation_count: 2,
                pass_count: 1,
                worst_severity: Some(Severity::Critical),
                verdicts: vec![
                    bucket_verdict(
                        "no-public-acl",
                        Severity::Critical,
                        Outcome::Violation,
                        "acl 'public-read' grants public access",
                        Some("Set acl to private."),
                    ),
                    bucket_verdict(
                        "encryption-required",
                        Severity::High,
                        Outcome::Violation,
                        "no server-side encryption algorithm configured",
                        None,
                    ),
                    bucket_verdict(
                        "versioning-required",
                        Severity::Medium,
                        Outcome::Pass,
                        "versioning is enabled",
                        None,
                    ),
                ],
            },
            RenderableStack {
                name: "broken".to_string(),
                status: StackStatus::Error,
                error: Some("main.yaml#0: document has no recognizable kind".to_string()),
                resources_evaluated: 0,
                violation_count: 0,
                pass_count: 0,
                worst_severity: None,
                verdicts: Vec::new(),
            },
        ],
    }
}
