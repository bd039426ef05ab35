//! Normalized property paths.
//!
//! Adapters write resource properties in this shape and rules read them back. Paths are
//! relative to the resource property root (see [`crate::model::Resource::property`]).

// Object storage bucket
pub const BUCKET_ACL: &str = "acl";
/// Sequence of `{ algorithm, kmsMasterKeyId?, bucketKeyEnabled? }`.
pub const BUCKET_ENCRYPTION_RULES: &str = "serverSideEncryption.rules";
pub const ENCRYPTION_ALGORITHM: &str = "algorithm";
pub const BUCKET_VERSIONING_ENABLED: &str = "versioning.enabled";
/// Sequence of `{ targetBucket, targetPrefix? }`.
pub const BUCKET_LOGGING_TARGETS: &str = "logging.targets";
pub const LOGGING_TARGET_BUCKET: &str = "targetBucket";

// Public access block
pub const PAB_BUCKET: &str = "bucket";
pub const PAB_FLAGS: [&str; 4] = [
    "blockPublicAcls",
    "blockPublicPolicy",
    "ignorePublicAcls",
    "restrictPublicBuckets",
];

// Workloads
pub const METADATA_NAME: &str = "metadata.name";
pub const METADATA_LABELS: &str = "metadata.labels";
pub const SPEC_CONTAINERS: &str = "spec.containers";
pub const SPEC_INIT_CONTAINERS: &str = "spec.initContainers";
pub const POD_SECURITY_CONTEXT: &str = "spec.securityContext";

// Containers (relative to a container value)
pub const CONTAINER_NAME: &str = "name";
pub const CONTAINER_IMAGE: &str = "image";
pub const CONTAINER_SECURITY_CONTEXT: &str = "securityContext";
pub const CONTAINER_LIMITS: &str = "resources.limits";
