use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - rule_key
/// - resource_kind
/// - resource_id
///
/// The message is not part of the identity.
pub fn fingerprint_for_verdict(rule_key: &str, resource_kind: &str, resource_id: &str) -> String {
    let canonical = [rule_key, resource_kind, resource_id].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
