use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical stack-relative path of the document a resource was declared in.
///
/// Normalization is deterministic so reports are byte-stable across platforms:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - empty input becomes `.`
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct StackPath(String);

impl Default for StackPath {
    fn default() -> Self {
        StackPath::new(".")
    }
}

impl StackPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while let Some(rest) = v.strip_prefix("./") {
            v = rest.to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of `abs` relative to `root`, falling back to `abs` itself when it is not below `root`.
    pub fn relative_to(root: &Utf8Path, abs: &Utf8Path) -> StackPath {
        StackPath::new(abs.strip_prefix(root).unwrap_or(abs).as_str())
    }

    /// `self/other`, where `.` on either side is the identity.
    pub fn join(&self, other: &StackPath) -> StackPath {
        match (self.as_str(), other.as_str()) {
            (".", _) => other.clone(),
            (_, ".") => self.clone(),
            (a, b) => StackPath::new(format!("{}/{}", a.trim_end_matches('/'), b)),
        }
    }
}

impl std::fmt::Display for StackPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for StackPath {
    fn from(value: &Utf8Path) -> Self {
        StackPath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for StackPath {
    fn from(value: Utf8PathBuf) -> Self {
        StackPath::new(value.as_str())
    }
}
