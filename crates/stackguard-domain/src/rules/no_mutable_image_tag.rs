use super::utils::{containers, join_issues, no_containers, CONTAINER_KINDS};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

#[derive(Clone, Copy, Debug, Default)]
pub struct NoMutableImageTag;

impl Rule for NoMutableImageTag {
    fn key(&self) -> &str {
        ids::RULE_NO_MUTABLE_IMAGE_TAG
    }

    fn applies_to(&self) -> &[ResourceKind] {
        CONTAINER_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let specs = containers(resource)?;
        if specs.is_empty() {
            return Ok(Evaluation::not_applicable(no_containers(resource)));
        }

        let mut issues = Vec::new();
        for c in &specs {
            match c.get(props::CONTAINER_IMAGE).and_then(Value::non_empty_str) {
                None => issues.push(format!("container '{}' has no image", c.name)),
                Some(image) => match image_tag(image) {
                    ImageRef::Digest => {}
                    ImageRef::Tag(tag) if tag != "latest" => {}
                    ImageRef::Tag(_) => issues.push(format!(
                        "container '{}' uses mutable tag 'latest' ({image})",
                        c.name
                    )),
                    ImageRef::Untagged => issues.push(format!(
                        "container '{}' image '{image}' has no explicit tag",
                        c.name
                    )),
                },
            }
        }

        if issues.is_empty() {
            Ok(Evaluation::pass("all images are pinned"))
        } else {
            Ok(Evaluation::violation(join_issues(&issues)))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ImageRef<'a> {
    Digest,
    Tag(&'a str),
    Untagged,
}

/// The tag is whatever follows `:` in the last path segment, so registry ports
/// (`registry:5000/app`) are not mistaken for tags.
fn image_tag(image: &str) -> ImageRef<'_> {
    if image.contains('@') {
        return ImageRef::Digest;
    }
    let last = image.rsplit('/').next().unwrap_or(image);
    match last.split_once(':') {
        Some((_, tag)) if !tag.is_empty() => ImageRef::Tag(tag),
        _ => ImageRef::Untagged,
    }
}
