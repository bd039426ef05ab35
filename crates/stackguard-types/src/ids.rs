//! Stable identifiers for rules and gate reasons.
//!
//! Rule keys are kebab-case and grouped by the resource family they target.

// Rules: object storage
pub const RULE_NO_PUBLIC_ACL: &str = "no-public-acl";
pub const RULE_ENCRYPTION_REQUIRED: &str = "encryption-required";
pub const RULE_VERSIONING_REQUIRED: &str = "versioning-required";
pub const RULE_ACCESS_LOGGING_RECOMMENDED: &str = "access-logging-recommended";
pub const RULE_PUBLIC_ACCESS_BLOCK_REQUIRED: &str = "public-access-block-required";

// Rules: workloads and containers
pub const RULE_REQUIRED_LABELS: &str = "required-labels";
pub const RULE_NO_MUTABLE_IMAGE_TAG: &str = "no-mutable-image-tag";
pub const RULE_NO_PRIVILEGED_CONTAINERS: &str = "no-privileged-containers";
pub const RULE_RESOURCE_LIMITS_REQUIRED: &str = "resource-limits-required";
pub const RULE_NON_ROOT_REQUIRED: &str = "non-root-required";

// Gate reasons
pub const REASON_VIOLATIONS_AT_THRESHOLD: &str = "violations_at_or_above_threshold";
pub const REASON_MALFORMED_STACK: &str = "malformed_stack";
pub const REASON_RUNTIME_ERROR: &str = "tool_runtime_error";
