use stackguard_domain::GraphError;
use stackguard_types::StackPath;

/// Identity of one decoded document: source file, position in that file, and the
/// declared name when one could be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRef {
    pub source: StackPath,
    pub index: u32,
    pub name: Option<String>,
}

impl DocumentRef {
    pub fn new(source: StackPath, index: u32) -> Self {
        Self {
            source,
            index,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.source, self.index)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Input that cannot be turned into a resource graph. Aborts the stack it belongs to.
#[derive(Debug, thiserror::Error)]
pub enum MalformedResourceError {
    #[error("{doc}: invalid {format} syntax: {message}")]
    Syntax {
        doc: DocumentRef,
        format: &'static str,
        message: String,
    },

    #[error("{doc}: document has no recognizable kind (expected `type` or `apiVersion` + `kind`)")]
    MissingKind { doc: DocumentRef },

    #[error("{doc}: no adapter registered for type '{type_token}'")]
    UnknownKind { doc: DocumentRef, type_token: String },

    #[error("{doc}: document has no identity (expected `name`, `urn`, or `metadata.name`)")]
    MissingIdentity { doc: DocumentRef },

    #[error("{doc}: duplicate resource id '{id}'")]
    DuplicateId { doc: DocumentRef, id: String },

    #[error("{doc}: reference '{reference}' does not name a resource in this stack")]
    DanglingRelation { doc: DocumentRef, reference: String },

    #[error("{doc}: property '{path}' is not {expected}")]
    InvalidShape {
        doc: DocumentRef,
        path: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl MalformedResourceError {
    /// The offending document, when the error is tied to one.
    pub fn document(&self) -> Option<&DocumentRef> {
        match self {
            Self::Syntax { doc, .. }
            | Self::MissingKind { doc }
            | Self::UnknownKind { doc, .. }
            | Self::MissingIdentity { doc }
            | Self::DuplicateId { doc, .. }
            | Self::DanglingRelation { doc, .. }
            | Self::InvalidShape { doc, .. } => Some(doc),
            Self::Graph(_) => None,
        }
    }
}
