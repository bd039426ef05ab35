use crate::value::Value;
use stackguard_types::Location;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Provider-independent resource tag.
///
/// The built-in kinds are associated constants; adapters may introduce further kinds
/// with [`ResourceKind::custom`]. Kinds compare by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    pub const OBJECT_STORAGE_BUCKET: ResourceKind =
        ResourceKind(Cow::Borrowed("ObjectStorageBucket"));
    pub const PUBLIC_ACCESS_BLOCK: ResourceKind = ResourceKind(Cow::Borrowed("PublicAccessBlock"));
    pub const WORKLOAD_DEPLOYMENT: ResourceKind =
        ResourceKind(Cow::Borrowed("WorkloadDeployment"));
    pub const CONTAINER: ResourceKind = ResourceKind(Cow::Borrowed("Container"));

    pub fn custom(name: impl Into<String>) -> Self {
        ResourceKind(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    /// Unique within a graph.
    pub id: String,
    pub kind: ResourceKind,
    /// Provider type token the resource was declared with (e.g. `aws:s3/bucket:Bucket`).
    pub type_token: String,
    pub properties: BTreeMap<String, Value>,
    /// Ids of other resources in the same graph this resource refers to.
    pub relations: BTreeSet<String>,
    pub location: Option<Location>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        let kind_name = kind.as_str().to_string();
        Self {
            id: id.into(),
            kind,
            type_token: kind_name,
            properties: BTreeMap::new(),
            relations: BTreeSet::new(),
            location: None,
        }
    }

    /// Follow a dotted path from the property root. See [`Value::lookup`].
    pub fn property(&self, path: &str) -> Option<&Value> {
        let (head, rest) = split_head(path);
        let v = self.properties.get(head)?;
        match rest {
            Some(rest) => v.lookup(rest),
            None => Some(v),
        }
    }

    /// Follow a dotted path with `*` fan-out. See [`Value::select`].
    pub fn select(&self, path: &str) -> Vec<&Value> {
        let (head, rest) = split_head(path);
        if head == "*" {
            return match rest {
                Some(rest) => self.properties.values().flat_map(|v| v.select(rest)).collect(),
                None => self.properties.values().collect(),
            };
        }
        let Some(v) = self.properties.get(head) else {
            return Vec::new();
        };
        match rest {
            Some(rest) => v.select(rest),
            None => vec![v],
        }
    }

    /// Name from `metadata.name`, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.property("metadata.name")
            .and_then(Value::non_empty_str)
            .unwrap_or(&self.id)
    }
}

fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate resource id '{id}'")]
    DuplicateId { id: String },
    #[error("resource '{from}' refers to unknown resource '{to}'")]
    DanglingRelation { from: String, to: String },
}

/// Ordered resources of one stack, with id and reverse-relation indices.
///
/// Construction validates the graph invariants; there is no way to mutate it afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
    by_id: BTreeMap<String, usize>,
    /// id -> positions of resources whose relations name that id.
    referrers: BTreeMap<String, Vec<usize>>,
}

impl ResourceGraph {
    pub fn new(resources: Vec<Resource>) -> Result<Self, GraphError> {
        let mut by_id = BTreeMap::new();
        for (pos, r) in resources.iter().enumerate() {
            if by_id.insert(r.id.clone(), pos).is_some() {
                return Err(GraphError::DuplicateId { id: r.id.clone() });
            }
        }

        let mut referrers: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (pos, r) in resources.iter().enumerate() {
            for target in &r.relations {
                if !by_id.contains_key(target) {
                    return Err(GraphError::DanglingRelation {
                        from: r.id.clone(),
                        to: target.clone(),
                    });
                }
                referrers.entry(target.clone()).or_default().push(pos);
            }
        }

        Ok(Self {
            resources,
            by_id,
            referrers,
        })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.by_id.get(id).map(|&pos| &self.resources[pos])
    }

    pub fn by_kind<'a>(&'a self, kind: &'a ResourceKind) -> impl Iterator<Item = &'a Resource> {
        self.resources.iter().filter(move |r| &r.kind == kind)
    }

    /// Resources of `kind` related to `resource` in either direction, in declared order.
    pub fn related(&self, resource: &Resource, kind: &ResourceKind) -> Vec<&Resource> {
        let mut positions: BTreeSet<usize> = resource
            .relations
            .iter()
            .filter_map(|id| self.by_id.get(id).copied())
            .collect();
        if let Some(incoming) = self.referrers.get(&resource.id) {
            positions.extend(incoming.iter().copied());
        }
        positions
            .into_iter()
            .map(|pos| &self.resources[pos])
            .filter(|r| &r.kind == kind)
            .collect()
    }
}
