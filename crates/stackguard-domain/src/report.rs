use stackguard_types::{Outcome, Severity, SeverityCounts, Summary, Verdict};

/// Frozen outcome of one evaluation run: verdicts in deterministic order plus
/// their summary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    verdicts: Vec<Verdict>,
    summary: Summary,
}

impl Report {
    /// Fold `verdicts` into a report. The order of `verdicts` is kept as given.
    pub fn from_verdicts(verdicts: Vec<Verdict>, resources_evaluated: usize) -> Self {
        let mut summary = Summary {
            resources_evaluated: saturating_u32(resources_evaluated),
            verdicts_total: saturating_u32(verdicts.len()),
            ..Summary::default()
        };
        let mut violations = SeverityCounts::default();

        for v in &verdicts {
            match v.outcome {
                Outcome::Pass => summary.pass_count += 1,
                Outcome::NotApplicable => summary.not_applicable_count += 1,
                Outcome::Violation => {
                    summary.violation_count += 1;
                    violations.bump(v.severity);
                    summary.worst_severity = summary.worst_severity.max(Some(v.severity));
                }
            }
        }
        summary.violations = violations;

        Self { verdicts, summary }
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn violation_count(&self) -> u32 {
        self.summary.violation_count
    }

    pub fn pass_count(&self) -> u32 {
        self.summary.pass_count
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.summary.worst_severity
    }

    /// A stack is compliant iff it has no violations at all.
    pub fn is_compliant(&self) -> bool {
        self.summary.violation_count == 0
    }

    pub fn violations(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.is_violation())
    }

    pub fn violations_for<'a>(&'a self, resource_id: &'a str) -> Vec<&'a Verdict> {
        self.violations()
            .filter(|v| v.resource_id == resource_id)
            .collect()
    }

    pub fn violations_of_severity(&self, severity: Severity) -> Vec<&Verdict> {
        self.violations().filter(|v| v.severity == severity).collect()
    }

    /// Violations that would trip a gate set at `threshold`.
    pub fn violations_at_or_above(&self, threshold: Severity) -> Vec<&Verdict> {
        self.violations().filter(|v| v.severity >= threshold).collect()
    }

    pub fn into_parts(self) -> (Vec<Verdict>, Summary) {
        (self.verdicts, self.summary)
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
