use super::utils::STORAGE_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleEvaluationError, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

const PUBLIC_ACLS: &[&str] = &["public-read", "public-read-write"];

#[derive(Clone, Copy, Debug, Default)]
pub struct NoPublicAcl;

impl Rule for NoPublicAcl {
    fn key(&self) -> &str {
        ids::RULE_NO_PUBLIC_ACL
    }

    fn applies_to(&self) -> &[ResourceKind] {
        STORAGE_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let acl = match resource.property(props::BUCKET_ACL) {
            None | Some(Value::Null) => return Ok(Evaluation::pass("no canned ACL set")),
            Some(v) => v
                .as_str()
                .ok_or_else(|| RuleEvaluationError::unexpected_shape(props::BUCKET_ACL, "a string"))?,
        };

        if PUBLIC_ACLS.contains(&acl) {
            Ok(Evaluation::violation(format!(
                "bucket '{}' grants public access through canned ACL '{acl}'",
                resource.display_name()
            )))
        } else {
            Ok(Evaluation::pass(format!("canned ACL '{acl}' is not public")))
        }
    }
}
