use crate::StackPath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for stackguard reports.
pub const SCHEMA_REPORT_V1: &str = "stackguard.report.v1";

/// Ordinal rule severity. Declaration order is the ordering: `Low < Medium < High < Critical`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Highest first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Violation,
    NotApplicable,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Violation => "violation",
            Outcome::NotApplicable => "not_applicable",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resource was declared: the stack-relative file and the document index inside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub path: StackPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<u32>,
}

/// The outcome of one rule against one resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub resource_id: String,
    pub resource_kind: String,
    pub rule_key: String,
    pub severity: Severity,
    pub outcome: Outcome,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Remediation hint, attached to violations only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Stable identifier intended for dedup and trending:
    /// a hash of `rule_key + resource_kind + resource_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Verdict {
    pub fn is_violation(&self) -> bool {
        self.outcome == Outcome::Violation
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    /// Number of violations whose severity is at or above `threshold`.
    pub fn at_or_above(&self, threshold: Severity) -> u32 {
        Severity::ALL
            .iter()
            .filter(|s| **s >= threshold)
            .map(|s| self.get(*s))
            .sum()
    }
}

/// Aggregate over a stack's verdicts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub resources_evaluated: u32,
    pub verdicts_total: u32,
    pub violation_count: u32,
    pub pass_count: u32,
    pub not_applicable_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_severity: Option<Severity>,
    /// Violations per severity.
    pub violations: SeverityCounts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StackStatus {
    Compliant,
    NonCompliant,
    /// The checker could not evaluate the stack (malformed input, cancellation).
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StackResult {
    pub name: String,
    /// Stack directory relative to the checked root (`.` when the root is the stack).
    pub path: StackPath,
    pub status: StackStatus,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub verdicts: Vec<Verdict>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Gate {
    pub status: GateStatus,
    /// Violations at or above this severity fail the gate; lower ones are advisory.
    pub fail_on: Severity,
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Fatal checker error that stopped the run before any stack was reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Run-level summary payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct StackguardData {
    pub profile: String,
    pub stacks_evaluated: u32,
    pub resources_evaluated: u32,
    pub rules_in_catalog: u32,
    pub violations_total: u32,
    pub violations_gating: u32,
}

/// The report envelope written by `stackguard check`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = StackguardData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub gate: Gate,
    pub stacks: Vec<StackResult>,
    pub data: TData,
}

pub type StackguardReportV1 = ReportEnvelope<StackguardData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Critical));
    }

    #[test]
    fn severity_and_outcome_serialize_as_stable_strings() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).expect("serialize"),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&Outcome::NotApplicable).expect("serialize"),
            "\"not_applicable\""
        );
    }

    #[test]
    fn counts_at_or_above_threshold() {
        let mut counts = SeverityCounts::default();
        counts.bump(Severity::Low);
        counts.bump(Severity::High);
        counts.bump(Severity::Critical);
        assert_eq!(counts.at_or_above(Severity::Low), 3);
        assert_eq!(counts.at_or_above(Severity::High), 2);
        assert_eq!(counts.at_or_above(Severity::Critical), 1);
    }

    #[test]
    fn verdict_omits_empty_optionals() {
        let v = Verdict {
            resource_id: "b".to_string(),
            resource_kind: "ObjectStorageBucket".to_string(),
            rule_key: "no-public-acl".to_string(),
            severity: Severity::Critical,
            outcome: Outcome::Pass,
            message: "ok".to_string(),
            location: None,
            help: None,
            fingerprint: None,
        };
        let json = serde_json::to_value(&v).expect("serialize");
        assert!(json.get("help").is_none());
        assert!(json.get("location").is_none());
        assert_eq!(json["outcome"], "pass");
    }
}
