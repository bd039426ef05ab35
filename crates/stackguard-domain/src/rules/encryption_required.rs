use super::utils::STORAGE_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleEvaluationError, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

#[derive(Clone, Copy, Debug, Default)]
pub struct EncryptionRequired;

impl Rule for EncryptionRequired {
    fn key(&self) -> &str {
        ids::RULE_ENCRYPTION_REQUIRED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        STORAGE_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let rules = match resource.property(props::BUCKET_ENCRYPTION_RULES) {
            None | Some(Value::Null) => &[][..],
            Some(v) => v.as_seq().ok_or_else(|| {
                RuleEvaluationError::unexpected_shape(props::BUCKET_ENCRYPTION_RULES, "a sequence")
            })?,
        };

        let algorithm = rules
            .iter()
            .find_map(|r| r.get(props::ENCRYPTION_ALGORITHM).and_then(Value::non_empty_str));

        match algorithm {
            Some(alg) => Ok(Evaluation::pass(format!(
                "default server-side encryption uses {alg}"
            ))),
            None => Ok(Evaluation::violation(format!(
                "bucket '{}' has no default server-side encryption rule",
                resource.display_name()
            ))),
        }
    }
}
