use super::utils::STORAGE_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleEvaluationError, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

#[derive(Clone, Copy, Debug, Default)]
pub struct AccessLoggingRecommended;

impl Rule for AccessLoggingRecommended {
    fn key(&self) -> &str {
        ids::RULE_ACCESS_LOGGING_RECOMMENDED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        STORAGE_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let targets = match resource.property(props::BUCKET_LOGGING_TARGETS) {
            None | Some(Value::Null) => &[][..],
            Some(v) => v.as_seq().ok_or_else(|| {
                RuleEvaluationError::unexpected_shape(props::BUCKET_LOGGING_TARGETS, "a sequence")
            })?,
        };

        let target = targets
            .iter()
            .find_map(|t| t.get(props::LOGGING_TARGET_BUCKET).and_then(Value::non_empty_str));

        match target {
            Some(bucket) => Ok(Evaluation::pass(format!(
                "access logs are delivered to '{bucket}'"
            ))),
            None => Ok(Evaluation::violation(format!(
                "bucket '{}' has no access logging target",
                resource.display_name()
            ))),
        }
    }
}
