use crate::model::{Resource, ResourceKind};
use crate::props;
use crate::rule::RuleEvaluationError;
use crate::value::Value;
use std::borrow::Cow;

pub const STORAGE_KINDS: &[ResourceKind] = &[ResourceKind::OBJECT_STORAGE_BUCKET];
pub const WORKLOAD_KINDS: &[ResourceKind] = &[ResourceKind::WORKLOAD_DEPLOYMENT];
pub const CONTAINER_KINDS: &[ResourceKind] =
    &[ResourceKind::WORKLOAD_DEPLOYMENT, ResourceKind::CONTAINER];

/// One container spec, borrowed from a workload or built from a standalone container.
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub value: Cow<'a, Value>,
}

impl ContainerSpec<'_> {
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.value.lookup(path)
    }

    pub fn security_context(&self, field: &str) -> Option<&Value> {
        self.get(props::CONTAINER_SECURITY_CONTEXT)
            .and_then(|sc| sc.get(field))
    }
}

/// Containers and init containers of a workload, or the resource itself for `Container`.
///
/// A `spec.containers` present with the wrong shape is an evaluation error.
pub fn containers(resource: &Resource) -> Result<Vec<ContainerSpec<'_>>, RuleEvaluationError> {
    if resource.kind == ResourceKind::CONTAINER {
        let name = resource
            .properties
            .get(props::CONTAINER_NAME)
            .and_then(Value::non_empty_str)
            .unwrap_or(&resource.id);
        return Ok(vec![ContainerSpec {
            name,
            value: Cow::Owned(Value::Map(resource.properties.clone())),
        }]);
    }

    let mut out = Vec::new();
    for path in [props::SPEC_CONTAINERS, props::SPEC_INIT_CONTAINERS] {
        let Some(list) = resource.property(path) else {
            continue;
        };
        if list.is_null() {
            continue;
        }
        let items = list
            .as_seq()
            .ok_or_else(|| RuleEvaluationError::unexpected_shape(path, "a sequence"))?;
        for (idx, item) in items.iter().enumerate() {
            if item.as_map().is_none() {
                return Err(RuleEvaluationError::unexpected_shape(
                    &format!("{path}.{idx}"),
                    "a mapping",
                ));
            }
            let name = item
                .get(props::CONTAINER_NAME)
                .and_then(Value::non_empty_str)
                .unwrap_or("<unnamed>");
            out.push(ContainerSpec {
                name,
                value: Cow::Borrowed(item),
            });
        }
    }
    Ok(out)
}

/// Container-level rules have nothing to say about a workload without containers.
pub fn no_containers(resource: &Resource) -> String {
    format!("'{}' declares no containers", resource.display_name())
}

pub fn join_issues(issues: &[String]) -> String {
    issues.join("; ")
}
