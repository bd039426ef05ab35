use crate::model::{Resource, ResourceGraph, ResourceKind};
use stackguard_types::{Outcome, Severity};

/// What a rule concluded about one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub message: String,
}

impl Evaluation {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Pass,
            message: message.into(),
        }
    }

    pub fn violation(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Violation,
            message: message.into(),
        }
    }

    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::NotApplicable,
            message: message.into(),
        }
    }
}

/// A rule body could not reach a conclusion (unexpected property shape, internal fault).
///
/// The evaluator records this as a violation; it never aborts the run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleEvaluationError {
    message: String,
}

impl RuleEvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The property at `path` exists but does not have the expected shape.
    pub fn unexpected_shape(path: &str, expected: &str) -> Self {
        Self::new(format!("property '{path}' is not {expected}"))
    }
}

pub type RuleResult = Result<Evaluation, RuleEvaluationError>;

/// A pure predicate over one resource and read-only access to its graph.
///
/// Implementations must be deterministic and free of I/O; the evaluator calls them
/// concurrently from a worker pool.
pub trait Rule: Send + Sync {
    /// Stable, unique key (e.g. `no-public-acl`).
    fn key(&self) -> &str;

    /// Resource kinds this rule is evaluated against. It is never invoked for others.
    fn applies_to(&self) -> &[ResourceKind];

    fn severity(&self) -> Severity;

    fn evaluate(&self, resource: &Resource, graph: &ResourceGraph) -> RuleResult;
}
