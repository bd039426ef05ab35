use crate::adapters::{passthrough, Adapted, AdapterRegistry, Declared};
use crate::document::RawDocument;
use crate::error::{DocumentRef, MalformedResourceError};
use serde_json::{Map, Value as Json};
use stackguard_domain::policy::UnknownKinds;
use stackguard_domain::ResourceGraph;
use stackguard_types::Location;
use std::collections::{BTreeMap, BTreeSet};

/// Build a validated resource graph from the raw documents of one stack.
///
/// Resources keep document order. Engine-internal Pulumi documents (`pulumi:*` types
/// such as providers and the stack itself) are skipped.
pub fn parse_graph(
    docs: Vec<RawDocument>,
    registry: &AdapterRegistry,
    unknown_kinds: UnknownKinds,
) -> Result<ResourceGraph, MalformedResourceError> {
    let mut adapted: Vec<(DocumentRef, Adapted)> = Vec::new();
    let mut ids: BTreeSet<String> = BTreeSet::new();

    for raw in docs {
        let Some(decl) = declare(raw)? else {
            continue;
        };
        if !ids.insert(decl.id.clone()) {
            return Err(MalformedResourceError::DuplicateId {
                id: decl.id.clone(),
                doc: decl.doc,
            });
        }

        let result = match registry.get(&decl.type_token) {
            Some(adapter) => adapter(&decl)?,
            None => match unknown_kinds {
                UnknownKinds::Passthrough => {
                    tracing::debug!(
                        type_token = %decl.type_token,
                        doc = %decl.doc,
                        "keeping undeclared type as custom kind"
                    );
                    passthrough(&decl)
                }
                UnknownKinds::Reject => {
                    return Err(MalformedResourceError::UnknownKind {
                        type_token: decl.type_token.clone(),
                        doc: decl.doc,
                    });
                }
            },
        };
        adapted.push((decl.doc, result));
    }

    // Aliases only resolve when they are unambiguous and do not shadow an id.
    let mut aliases: BTreeMap<String, Option<String>> = BTreeMap::new();
    for (_, a) in &adapted {
        for alias in &a.aliases {
            if ids.contains(alias) {
                continue;
            }
            aliases
                .entry(alias.clone())
                .and_modify(|owner| *owner = None)
                .or_insert_with(|| Some(a.resource.id.clone()));
        }
    }

    let mut resources = Vec::with_capacity(adapted.len());
    for (doc, a) in adapted {
        let mut resource = a.resource;
        for reference in &a.references {
            let key = reference_key(reference);
            let target = if ids.contains(key) {
                Some(key.to_string())
            } else {
                aliases.get(key).cloned().flatten()
            };
            match target {
                Some(id) if id != resource.id => {
                    resource.relations.insert(id);
                }
                Some(_) => {}
                None => {
                    return Err(MalformedResourceError::DanglingRelation {
                        doc,
                        reference: reference.clone(),
                    });
                }
            }
        }
        resource.location = Some(Location {
            path: doc.source.clone(),
            document: Some(doc.index),
        });
        resources.push(resource);
    }

    Ok(ResourceGraph::new(resources)?)
}

/// Read the type token and identity of a document. `Ok(None)` means "skip".
fn declare(raw: RawDocument) -> Result<Option<Declared>, MalformedResourceError> {
    let RawDocument { doc, body } = raw;
    let Json::Object(mut obj) = body else {
        return Err(MalformedResourceError::MissingKind { doc });
    };

    let doc = match display_name(&obj) {
        Some(name) => doc.named(name),
        None => doc,
    };

    if let Some(token) = non_empty(obj.get("type")) {
        if token.starts_with("pulumi:") {
            return Ok(None);
        }
        let token = token.to_string();
        let physical_id = non_empty(obj.get("id")).map(str::to_string);
        let id = non_empty(obj.get("name"))
            .map(str::to_string)
            .or_else(|| non_empty(obj.get("urn")).map(|u| urn_name(u).to_string()))
            .or_else(|| physical_id.clone())
            .ok_or_else(|| MalformedResourceError::MissingIdentity { doc: doc.clone() })?;
        let outputs = match obj.get("outputs") {
            Some(v @ Json::Object(_)) => v.clone(),
            _ => Json::Object(Map::new()),
        };
        let properties = ["properties", "inputs", "outputs"]
            .iter()
            .find_map(|k| match obj.remove(*k) {
                Some(v @ Json::Object(_)) => Some(v),
                _ => None,
            })
            .unwrap_or_else(|| Json::Object(Map::new()));
        return Ok(Some(Declared {
            doc,
            type_token: token,
            id,
            properties,
            physical_id,
            outputs,
        }));
    }

    let (Some(api_version), Some(kind)) = (non_empty(obj.get("apiVersion")), non_empty(obj.get("kind")))
    else {
        return Err(MalformedResourceError::MissingKind { doc });
    };
    let type_token = format!("{api_version}/{kind}");
    let id = obj
        .get("metadata")
        .and_then(|m| non_empty(m.get("name")))
        .map(str::to_string)
        .ok_or_else(|| MalformedResourceError::MissingIdentity { doc: doc.clone() })?;
    obj.remove("apiVersion");
    obj.remove("kind");
    Ok(Some(Declared {
        doc,
        type_token,
        id,
        properties: Json::Object(obj),
        physical_id: None,
        outputs: Json::Object(Map::new()),
    }))
}

fn display_name(obj: &Map<String, Json>) -> Option<String> {
    non_empty(obj.get("name"))
        .or_else(|| obj.get("metadata").and_then(|m| non_empty(m.get("name"))))
        .or_else(|| non_empty(obj.get("urn")).map(urn_name))
        .map(str::to_string)
}

fn non_empty(v: Option<&Json>) -> Option<&str> {
    v.and_then(Json::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// Resource name from a Pulumi URN (`urn:pulumi:stack::project::type::name`).
fn urn_name(urn: &str) -> &str {
    urn.rsplit("::").next().unwrap_or(urn)
}

/// Reduce a reference to the id or alias it names.
///
/// Accepts plain ids, URNs, and `${name}` / `${name.id}` interpolations.
fn reference_key(reference: &str) -> &str {
    let mut key = reference.trim();
    if let Some(inner) = key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
        key = inner.trim();
        for attr in [".id", ".bucket", ".arn", ".name"] {
            if let Some(stripped) = key.strip_suffix(attr) {
                key = stripped;
                break;
            }
        }
    }
    if key.starts_with("urn:") {
        key = urn_name(key);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackguard_domain::ResourceKind;
    use stackguard_types::StackPath;

    fn docs(bodies: Vec<Json>) -> Vec<RawDocument> {
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| RawDocument {
                doc: DocumentRef::new(StackPath::new("stack.yaml"), i as u32),
                body,
            })
            .collect()
    }

    fn parse(bodies: Vec<Json>) -> Result<ResourceGraph, MalformedResourceError> {
        parse_graph(docs(bodies), &AdapterRegistry::builtin(), UnknownKinds::Reject)
    }

    fn bucket(name: &str) -> Json {
        json!({ "type": "aws:s3/bucket:Bucket", "name": name, "properties": { "acl": "private" } })
    }

    fn block(name: &str, bucket_ref: &str) -> Json {
        json!({
            "type": "aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock",
            "name": name,
            "properties": { "bucket": bucket_ref }
        })
    }

    #[test]
    fn interpolated_reference_becomes_a_relation() {
        let g = parse(vec![bucket("secure-bucket"), block("pab", "${secure-bucket.id}")]).expect("graph");
        let pab = g.get("pab").expect("pab");
        assert!(pab.relations.contains("secure-bucket"));
        let b = g.get("secure-bucket").expect("bucket");
        assert_eq!(g.related(b, &ResourceKind::PUBLIC_ACCESS_BLOCK).len(), 1);
        assert_eq!(
            b.location,
            Some(Location {
                path: StackPath::new("stack.yaml"),
                document: Some(0)
            })
        );
    }

    #[test]
    fn physical_bucket_name_resolves_through_alias() {
        let mut b = bucket("logical");
        b["properties"]["bucket"] = json!("physical-name");
        let g = parse(vec![b, block("pab", "physical-name")]).expect("graph");
        assert!(g.get("pab").expect("pab").relations.contains("logical"));
    }

    #[test]
    fn urn_reference_and_identity_are_reduced_to_names() {
        let g = parse(vec![
            json!({ "type": "aws:s3/bucket:Bucket", "urn": "urn:pulumi:dev::proj::aws:s3/bucket:Bucket::data" }),
            block("pab", "urn:pulumi:dev::proj::aws:s3/bucket:Bucket::data"),
        ])
        .expect("graph");
        assert!(g.get("data").is_some());
        assert!(g.get("pab").expect("pab").relations.contains("data"));
    }

    #[test]
    fn exported_block_resolves_the_bucket_physical_id() {
        let g = parse(vec![
            json!({
                "urn": "urn:pulumi:dev::s3::aws:s3/bucket:Bucket::secure-bucket",
                "type": "aws:s3/bucket:Bucket",
                "id": "secure-bucket-4f2a1c9",
                "inputs": { "acl": "private" },
                "outputs": { "id": "secure-bucket-4f2a1c9", "bucket": "secure-bucket-4f2a1c9" }
            }),
            json!({
                "urn": "urn:pulumi:dev::s3::aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock::secure-bucket-public-access",
                "type": "aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock",
                "id": "secure-bucket-4f2a1c9",
                "inputs": { "bucket": "secure-bucket-4f2a1c9", "blockPublicAcls": true },
                "outputs": { "id": "secure-bucket-4f2a1c9", "bucket": "secure-bucket-4f2a1c9" }
            }),
        ])
        .expect("graph");
        let pab = g.get("secure-bucket-public-access").expect("block");
        assert!(pab.relations.contains("secure-bucket"));
        // Inputs win over outputs as the property source.
        assert_eq!(
            g.get("secure-bucket").and_then(|r| r.property("acl")).and_then(|v| v.as_str()),
            Some("private")
        );
    }

    #[test]
    fn dangling_reference_is_malformed() {
        let err = parse(vec![block("pab", "${missing.id}")]).expect_err("dangling");
        assert!(matches!(
            err,
            MalformedResourceError::DanglingRelation { ref reference, .. } if reference == "${missing.id}"
        ));
        assert_eq!(err.document().and_then(|d| d.name.as_deref()), Some("pab"));
    }

    #[test]
    fn duplicate_names_are_malformed() {
        let err = parse(vec![bucket("a"), bucket("a")]).expect_err("duplicate");
        assert!(matches!(err, MalformedResourceError::DuplicateId { ref id, .. } if id == "a"));
        assert_eq!(err.document().map(|d| d.index), Some(1));
    }

    #[test]
    fn documents_without_kind_or_identity_are_malformed() {
        let err = parse(vec![json!({ "name": "x" })]).expect_err("kind");
        assert!(matches!(err, MalformedResourceError::MissingKind { .. }));

        let err = parse(vec![json!({ "type": "aws:s3/bucket:Bucket" })]).expect_err("identity");
        assert!(matches!(err, MalformedResourceError::MissingIdentity { .. }));

        let err = parse(vec![json!({ "apiVersion": "apps/v1", "kind": "Deployment", "metadata": {} })])
            .expect_err("identity");
        assert!(matches!(err, MalformedResourceError::MissingIdentity { .. }));

        let err = parse(vec![json!("scalar")]).expect_err("scalar");
        assert!(matches!(err, MalformedResourceError::MissingKind { .. }));
    }

    #[test]
    fn unknown_kinds_follow_policy() {
        let queue = json!({ "type": "aws:sqs/queue:Queue", "name": "q" });
        let err = parse(vec![queue.clone()]).expect_err("unknown");
        assert!(matches!(err, MalformedResourceError::UnknownKind { ref type_token, .. } if type_token == "aws:sqs/queue:Queue"));

        let g = parse_graph(docs(vec![queue]), &AdapterRegistry::builtin(), UnknownKinds::Passthrough)
            .expect("passthrough");
        assert_eq!(g.get("q").map(|r| r.kind.as_str()), Some("aws:sqs/queue:Queue"));
    }

    #[test]
    fn raw_kubernetes_documents_are_adapted() {
        let g = parse(vec![json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "web" },
            "spec": { "template": { "spec": { "containers": [{ "name": "c", "image": "nginx:1" }] } } }
        })])
        .expect("graph");
        let web = g.get("web").expect("web");
        assert_eq!(web.kind, ResourceKind::WORKLOAD_DEPLOYMENT);
        assert_eq!(web.type_token, "apps/v1/Deployment");
    }

    #[test]
    fn docker_container_is_checked_by_container_rules() {
        use stackguard_domain::policy::EffectivePolicy;
        use stackguard_domain::rules::builtin_catalog;
        use stackguard_types::ids;

        let g = parse(vec![json!({
            "type": "docker:index/container:Container",
            "name": "debug-shell",
            "properties": { "image": "busybox", "privileged": true }
        })])
        .expect("graph");
        assert_eq!(g.get("debug-shell").map(|r| r.kind.clone()), Some(ResourceKind::CONTAINER));

        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let report = stackguard_domain::evaluate(&g, &catalog);
        let violated: BTreeSet<&str> = report.violations().map(|v| v.rule_key.as_str()).collect();
        for rule in [
            ids::RULE_NO_PRIVILEGED_CONTAINERS,
            ids::RULE_NO_MUTABLE_IMAGE_TAG,
            ids::RULE_NON_ROOT_REQUIRED,
            ids::RULE_RESOURCE_LIMITS_REQUIRED,
        ] {
            assert!(violated.contains(rule), "{rule} should flag the container");
        }
        assert!(!violated.contains(ids::RULE_REQUIRED_LABELS));
    }

    #[test]
    fn pulumi_internal_documents_are_skipped() {
        let g = parse(vec![
            json!({ "type": "pulumi:pulumi:Stack", "urn": "urn:pulumi:dev::p::pulumi:pulumi:Stack::p-dev" }),
            json!({ "type": "pulumi:providers:aws", "urn": "urn:pulumi:dev::p::pulumi:providers:aws::default" }),
            bucket("b"),
        ])
        .expect("graph");
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn inputs_are_read_when_properties_are_absent() {
        let g = parse(vec![json!({
            "type": "aws:s3/bucket:Bucket",
            "name": "b",
            "inputs": { "acl": "public-read" }
        })])
        .expect("graph");
        assert_eq!(
            g.get("b").and_then(|r| r.property("acl")).and_then(|v| v.as_str()),
            Some("public-read")
        );
    }

    #[test]
    fn reference_key_strips_interpolation_and_attributes() {
        assert_eq!(reference_key("${bucket.id}"), "bucket");
        assert_eq!(reference_key(" ${ bucket } "), "bucket");
        assert_eq!(reference_key("plain"), "plain");
        assert_eq!(reference_key("urn:pulumi:s::p::t::n"), "n");
    }
}
