use super::utils::WORKLOAD_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleEvaluationError, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

/// Workload metadata must carry every configured label key.
#[derive(Clone, Debug, Default)]
pub struct RequiredLabels {
    required: Vec<String>,
}

impl RequiredLabels {
    pub fn new(required: Vec<String>) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl Rule for RequiredLabels {
    fn key(&self) -> &str {
        ids::RULE_REQUIRED_LABELS
    }

    fn applies_to(&self) -> &[ResourceKind] {
        WORKLOAD_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        if self.required.is_empty() {
            return Ok(Evaluation::not_applicable("no required labels configured"));
        }

        let labels = match resource.property(props::METADATA_LABELS) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_map().ok_or_else(|| {
                RuleEvaluationError::unexpected_shape(props::METADATA_LABELS, "a mapping")
            })?),
        };

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|key| {
                labels
                    .and_then(|m| m.get(key.as_str()))
                    .and_then(Value::non_empty_str)
                    .is_none()
            })
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            Ok(Evaluation::pass("all required labels are present"))
        } else {
            Ok(Evaluation::violation(format!(
                "'{}' is missing required labels: {}",
                resource.display_name(),
                missing.join(", ")
            )))
        }
    }
}
