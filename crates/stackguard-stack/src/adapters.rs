//! Per-type adapters: provider-specific declarations into the uniform resource model.
//!
//! Adapters are plain functions keyed by type token in an [`AdapterRegistry`]. Each
//! one writes the normalized property paths from `stackguard_domain::props` and
//! reports the references it found; references are resolved once the whole stack is
//! known.

use crate::error::{DocumentRef, MalformedResourceError};
use serde_json::{Map, Value as Json};
use stackguard_domain::props;
use stackguard_domain::{Resource, ResourceKind, Value};
use std::collections::BTreeMap;

/// A document whose type token and identity have been read.
#[derive(Clone, Debug, PartialEq)]
pub struct Declared {
    pub doc: DocumentRef,
    pub type_token: String,
    pub id: String,
    /// Always a JSON object.
    pub properties: Json,
    /// Provider-assigned id of an exported resource (the top-level `id` of a state entry).
    pub physical_id: Option<String>,
    /// Exported `outputs`, or an empty object.
    pub outputs: Json,
}

/// Result of adapting one declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Adapted {
    /// Resource with normalized properties and no relations yet.
    pub resource: Resource,
    /// Raw references to other resources: ids, `${name.id}` interpolations, or URNs.
    pub references: Vec<String>,
    /// Other names this resource may be referred to by (e.g. a bucket's physical name).
    pub aliases: Vec<String>,
}

impl Adapted {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            references: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

pub type Adapter = fn(&Declared) -> Result<Adapted, MalformedResourceError>;

/// Lookup table from type token to adapter.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Adapter>,
}

pub const BUCKET_TOKENS: &[&str] = &["aws:s3/bucket:Bucket", "aws:s3/bucketV2:BucketV2"];
pub const ACCESS_BLOCK_TOKENS: &[&str] =
    &["aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock"];

/// Standalone containers (Pulumi Docker provider).
pub const CONTAINER_TOKENS: &[&str] = &["docker:index/container:Container"];

/// Workload tokens and where the pod spec sits inside the workload spec.
const WORKLOAD_TOKENS: &[(&str, &str)] = &[
    ("kubernetes:apps/v1:Deployment", "spec.template.spec"),
    ("kubernetes:apps/v1:StatefulSet", "spec.template.spec"),
    ("kubernetes:apps/v1:DaemonSet", "spec.template.spec"),
    ("kubernetes:apps/v1:ReplicaSet", "spec.template.spec"),
    ("kubernetes:batch/v1:Job", "spec.template.spec"),
    ("kubernetes:batch/v1:CronJob", "spec.jobTemplate.spec.template.spec"),
    ("kubernetes:core/v1:Pod", "spec"),
    ("apps/v1/Deployment", "spec.template.spec"),
    ("apps/v1/StatefulSet", "spec.template.spec"),
    ("apps/v1/DaemonSet", "spec.template.spec"),
    ("apps/v1/ReplicaSet", "spec.template.spec"),
    ("batch/v1/Job", "spec.template.spec"),
    ("batch/v1/CronJob", "spec.jobTemplate.spec.template.spec"),
    ("v1/Pod", "spec"),
];

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registry with every built-in adapter.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for token in BUCKET_TOKENS {
            registry.register(*token, adapt_bucket);
        }
        for token in ACCESS_BLOCK_TOKENS {
            registry.register(*token, adapt_access_block);
        }
        for (token, _) in WORKLOAD_TOKENS {
            registry.register(*token, adapt_workload);
        }
        for token in CONTAINER_TOKENS {
            registry.register(*token, adapt_container);
        }
        registry
    }

    /// Register `adapter` for `token`, returning the adapter it replaced.
    pub fn register(&mut self, token: impl Into<String>, adapter: Adapter) -> Option<Adapter> {
        self.adapters.insert(token.into(), adapter)
    }

    pub fn get(&self, token: &str) -> Option<Adapter> {
        self.adapters.get(token).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("tokens", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Keep an undeclared type as a resource of a custom kind named after its token.
pub fn passthrough(decl: &Declared) -> Adapted {
    let mut resource = Resource::new(decl.id.clone(), ResourceKind::custom(decl.type_token.clone()));
    resource.type_token = decl.type_token.clone();
    resource.properties = to_map(&decl.properties);
    Adapted::new(resource)
}

// ============================================================================
// Object storage
// ============================================================================

fn adapt_bucket(decl: &Declared) -> Result<Adapted, MalformedResourceError> {
    let src = object(decl)?;
    let mut resource = base(decl, ResourceKind::OBJECT_STORAGE_BUCKET);
    let mut properties = to_map(&decl.properties);

    if let Some(acl) = first(src, &["acl"]) {
        properties.insert(props::BUCKET_ACL.to_string(), Value::from(acl.clone()));
    }

    if let Some(sse) = first(
        src,
        &[
            "serverSideEncryptionConfiguration",
            "server_side_encryption_configuration",
        ],
    ) {
        let rules = encryption_rules(decl, sse)?;
        let mut block = Value::map();
        block.insert("rules", Value::Seq(rules));
        properties.insert("serverSideEncryption".to_string(), block);
    }

    if let Some(versioning) = first(src, &["versioning", "versioningConfiguration"]) {
        properties.insert("versioning".to_string(), normalize_versioning(decl, versioning)?);
    }

    if let Some(logging) = first(src, &["loggings", "logging"]) {
        let targets = logging_targets(decl, logging)?;
        let mut block = Value::map();
        block.insert("targets", Value::Seq(targets));
        properties.insert("logging".to_string(), block);
    }

    resource.properties = properties;
    let mut adapted = Adapted::new(resource);
    adapted.aliases = bucket_aliases(decl, src);
    Ok(adapted)
}

/// Physical names a bucket can be referenced by: the declared bucket name, and for
/// exported state the provider id and the `bucket` / `id` outputs.
fn bucket_aliases(decl: &Declared, src: &Map<String, Json>) -> Vec<String> {
    let declared = first(src, &["bucket", "bucketName"]).and_then(Json::as_str);
    let exported = decl.outputs.as_object().into_iter().flat_map(|outputs| {
        ["bucket", "id"]
            .into_iter()
            .filter_map(move |k| outputs.get(k).and_then(Json::as_str))
    });

    let mut aliases: Vec<String> = Vec::new();
    for name in declared
        .into_iter()
        .chain(decl.physical_id.as_deref())
        .chain(exported)
    {
        let name = name.trim();
        if !name.is_empty() && name != decl.id && !aliases.iter().any(|a| a == name) {
            aliases.push(name.to_string());
        }
    }
    aliases
}

fn encryption_rules(decl: &Declared, sse: &Json) -> Result<Vec<Value>, MalformedResourceError> {
    let sse = sse
        .as_object()
        .ok_or_else(|| invalid(decl, "serverSideEncryptionConfiguration", "a mapping"))?;
    let Some(rules) = first(sse, &["rules", "rule"]) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for rule in one_or_many(rules) {
        let rule = rule
            .as_object()
            .ok_or_else(|| invalid(decl, "serverSideEncryptionConfiguration.rule", "a mapping"))?;
        let Some(default) = first(
            rule,
            &[
                "applyServerSideEncryptionByDefault",
                "apply_server_side_encryption_by_default",
            ],
        ) else {
            continue;
        };
        let default = default.as_object().ok_or_else(|| {
            invalid(
                decl,
                "serverSideEncryptionConfiguration.rule.applyServerSideEncryptionByDefault",
                "a mapping",
            )
        })?;

        let mut normalized = Value::map();
        if let Some(alg) = first(default, &["sseAlgorithm", "sse_algorithm"]) {
            normalized.insert(props::ENCRYPTION_ALGORITHM, Value::from(alg.clone()));
        }
        if let Some(key) = first(default, &["kmsMasterKeyId", "kms_master_key_id"]) {
            normalized.insert("kmsMasterKeyId", Value::from(key.clone()));
        }
        if let Some(flag) = first(rule, &["bucketKeyEnabled", "bucket_key_enabled"]) {
            normalized.insert("bucketKeyEnabled", Value::from(flag.clone()));
        }
        out.push(normalized);
    }
    Ok(out)
}

fn normalize_versioning(decl: &Declared, versioning: &Json) -> Result<Value, MalformedResourceError> {
    let v = versioning
        .as_object()
        .ok_or_else(|| invalid(decl, "versioning", "a mapping"))?;
    let enabled = match (v.get("enabled"), v.get("status")) {
        (Some(Json::Bool(b)), _) => *b,
        (_, Some(Json::String(status))) => status.eq_ignore_ascii_case("enabled"),
        _ => false,
    };
    let mut out = Value::from(versioning.clone());
    out.insert("enabled", Value::Bool(enabled));
    Ok(out)
}

fn logging_targets(decl: &Declared, logging: &Json) -> Result<Vec<Value>, MalformedResourceError> {
    let mut out = Vec::new();
    for entry in one_or_many(logging) {
        let entry = entry
            .as_object()
            .ok_or_else(|| invalid(decl, "loggings", "a mapping or a sequence of mappings"))?;
        let mut target = Value::map();
        if let Some(bucket) = first(entry, &["targetBucket", "target_bucket"]) {
            target.insert(props::LOGGING_TARGET_BUCKET, Value::from(bucket.clone()));
        }
        if let Some(prefix) = first(entry, &["targetPrefix", "target_prefix"]) {
            target.insert("targetPrefix", Value::from(prefix.clone()));
        }
        out.push(target);
    }
    Ok(out)
}

fn adapt_access_block(decl: &Declared) -> Result<Adapted, MalformedResourceError> {
    let src = object(decl)?;
    let mut resource = base(decl, ResourceKind::PUBLIC_ACCESS_BLOCK);
    let mut properties = to_map(&decl.properties);

    for flag in props::PAB_FLAGS {
        let snake = camel_to_snake(flag);
        if let Some(v) = first(src, &[flag, snake.as_str()]) {
            properties.insert(flag.to_string(), Value::from(v.clone()));
        }
    }

    let bucket = match src.get(props::PAB_BUCKET) {
        Some(Json::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(invalid(decl, props::PAB_BUCKET, "a bucket reference")),
    };
    properties.insert(props::PAB_BUCKET.to_string(), Value::from(bucket.as_str()));
    resource.properties = properties;

    let mut adapted = Adapted::new(resource);
    adapted.references.push(bucket);
    Ok(adapted)
}

// ============================================================================
// Workloads
// ============================================================================

fn adapt_workload(decl: &Declared) -> Result<Adapted, MalformedResourceError> {
    object(decl)?;
    let pod_path = WORKLOAD_TOKENS
        .iter()
        .find(|(token, _)| *token == decl.type_token)
        .map_or("spec.template.spec", |(_, path)| *path);

    let mut resource = base(decl, ResourceKind::WORKLOAD_DEPLOYMENT);
    let mut properties = BTreeMap::new();

    let metadata = decl.properties.get("metadata").cloned().unwrap_or(Json::Null);
    if !metadata.is_null() && !metadata.is_object() {
        return Err(invalid(decl, "metadata", "a mapping"));
    }
    properties.insert("metadata".to_string(), Value::from(metadata));

    let pod_spec = match lookup(&decl.properties, pod_path) {
        None | Some(Json::Null) => Json::Object(Map::new()),
        Some(spec @ Json::Object(_)) => spec.clone(),
        Some(_) => return Err(invalid(decl, pod_path, "a mapping")),
    };
    properties.insert("spec".to_string(), Value::from(pod_spec));

    resource.properties = properties;
    Ok(Adapted::new(resource))
}

/// Docker's flat container flags mapped onto the Kubernetes container shape the
/// container rules read. Kubernetes-style fields already present are kept.
fn adapt_container(decl: &Declared) -> Result<Adapted, MalformedResourceError> {
    let src = object(decl)?;
    let mut resource = base(decl, ResourceKind::CONTAINER);
    let mut properties = to_map(&decl.properties);

    let mut security = match properties.remove(props::CONTAINER_SECURITY_CONTEXT) {
        None | Some(Value::Null) => Value::map(),
        Some(sc @ Value::Map(_)) => sc,
        Some(_) => return Err(invalid(decl, props::CONTAINER_SECURITY_CONTEXT, "a mapping")),
    };
    if let Some(flag) = first(src, &["privileged"]) {
        security.insert("privileged", Value::from(flag.clone()));
    }
    if security.get("runAsNonRoot").is_none()
        && let Some(user) = first(src, &["user"]).and_then(Json::as_str)
    {
        security.insert("runAsNonRoot", Value::Bool(!runs_as_root(user)));
    }
    if let Some(opts) = first(src, &["securityOpts", "security_opts"]) {
        let opts = opts
            .as_array()
            .ok_or_else(|| invalid(decl, "securityOpts", "a sequence of strings"))?;
        if opts.iter().filter_map(Json::as_str).any(forbids_new_privileges) {
            security.insert("allowPrivilegeEscalation", Value::Bool(false));
        }
    }
    properties.insert(props::CONTAINER_SECURITY_CONTEXT.to_string(), security);

    if !properties.contains_key("resources") {
        let mut limits = Value::map();
        if let Some(memory) = first(src, &["memory"]) {
            limits.insert("memory", quantity(memory, "Mi"));
        }
        if let Some(cpu) = first(src, &["cpus", "cpuShares", "cpu_shares"]) {
            limits.insert("cpu", quantity(cpu, ""));
        }
        if limits.as_map().is_some_and(|m| !m.is_empty()) {
            let mut resources = Value::map();
            resources.insert("limits", limits);
            properties.insert("resources".to_string(), resources);
        }
    }

    resource.properties = properties;
    Ok(Adapted::new(resource))
}

fn runs_as_root(user: &str) -> bool {
    let name = user.split(':').next().unwrap_or(user).trim();
    name.is_empty() || name == "root" || name == "0"
}

fn forbids_new_privileges(opt: &str) -> bool {
    matches!(
        opt.trim(),
        "no-new-privileges" | "no-new-privileges:true" | "no-new-privileges=true"
    )
}

/// Docker sizes are bare numbers; limits are quantity strings.
fn quantity(v: &Json, unit: &str) -> Value {
    match v {
        Json::Number(n) => Value::from(format!("{n}{unit}")),
        other => Value::from(other.clone()),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn base(decl: &Declared, kind: ResourceKind) -> Resource {
    let mut resource = Resource::new(decl.id.clone(), kind);
    resource.type_token = decl.type_token.clone();
    resource
}

fn object(decl: &Declared) -> Result<&Map<String, Json>, MalformedResourceError> {
    decl.properties
        .as_object()
        .ok_or_else(|| invalid(decl, "properties", "a mapping"))
}

fn invalid(decl: &Declared, path: &str, expected: &'static str) -> MalformedResourceError {
    MalformedResourceError::InvalidShape {
        doc: decl.doc.clone(),
        path: path.to_string(),
        expected,
    }
}

fn to_map(properties: &Json) -> BTreeMap<String, Value> {
    match Value::from(properties.clone()) {
        Value::Map(m) => m,
        _ => BTreeMap::new(),
    }
}

/// First present, non-null value among `keys`.
fn first<'a>(obj: &'a Map<String, Json>, keys: &[&str]) -> Option<&'a Json> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn one_or_many(v: &Json) -> Vec<&Json> {
    match v {
        Json::Array(items) => items.iter().collect(),
        Json::Null => Vec::new(),
        other => vec![other],
    }
}

fn lookup<'a>(v: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.').try_fold(v, |cur, seg| cur.get(seg))
}

fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
