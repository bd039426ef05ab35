use stackguard_types::{GateStatus, Outcome, Severity, StackStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableLocation {
    /// Path relative to the checked root.
    pub path: String,
    pub document: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableVerdict {
    pub resource_id: String,
    pub resource_kind: String,
    pub rule_key: String,
    pub severity: Severity,
    pub outcome: Outcome,
    pub message: String,
    pub location: Option<RenderableLocation>,
    pub help: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableStack {
    pub name: String,
    pub status: StackStatus,
    pub error: Option<String>,
    pub resources_evaluated: u32,
    pub violation_count: u32,
    pub pass_count: u32,
    pub worst_severity: Option<Severity>,
    pub verdicts: Vec<RenderableVerdict>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableGate {
    pub status: GateStatus,
    pub fail_on: Severity,
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub profile: String,
    pub gate: RenderableGate,
    pub stacks: Vec<RenderableStack>,
}

impl RenderableReport {
    pub fn violation_total(&self) -> u32 {
        self.stacks.iter().map(|s| s.violation_count).sum()
    }

    pub fn pass_total(&self) -> u32 {
        self.stacks.iter().map(|s| s.pass_count).sum()
    }

    pub fn resource_total(&self) -> u32 {
        self.stacks.iter().map(|s| s.resources_evaluated).sum()
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.stacks.iter().filter_map(|s| s.worst_severity).max()
    }

    /// Violations paired with the stack they came from, in report order.
    pub fn violations(&self) -> impl Iterator<Item = (&RenderableStack, &RenderableVerdict)> {
        self.stacks.iter().flat_map(|s| {
            s.verdicts
                .iter()
                .filter(|v| v.outcome == Outcome::Violation)
                .map(move |v| (s, v))
        })
    }
}

pub(crate) fn gate_label(status: GateStatus) -> &'static str {
    match status {
        GateStatus::Pass => "pass",
        GateStatus::Fail => "fail",
        GateStatus::Error => "error",
    }
}

pub(crate) fn stack_status_label(status: StackStatus) -> &'static str {
    match status {
        StackStatus::Compliant => "compliant",
        StackStatus::NonCompliant => "non_compliant",
        StackStatus::Error => "error",
    }
}
