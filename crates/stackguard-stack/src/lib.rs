//! Stack adapters: discover stack directories, decode resource documents, and
//! normalize them into a [`stackguard_domain::ResourceGraph`].
//!
//! This crate is allowed to do filesystem IO. Everything after decoding is a pure
//! transformation.

#![forbid(unsafe_code)]

pub mod adapters;
mod document;
mod error;
mod graph;
mod load;

pub use adapters::{Adapted, Adapter, AdapterRegistry, Declared};
pub use document::{decode, DocumentFormat, RawDocument};
pub use error::{DocumentRef, MalformedResourceError};
pub use graph::parse_graph;
pub use load::{
    discover_stacks, load_stack, read_stack_documents, stack_files, stack_name, LoadedStack,
};

/// Fuzz-friendly API for testing decoding and adaptation without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;
    use stackguard_domain::policy::UnknownKinds;
    use stackguard_types::StackPath;

    /// Decode arbitrary text as a YAML stack file and build a graph from it.
    ///
    /// Returns the resource count on success. **Never panics** on any input.
    pub fn parse_yaml_stack(text: &str) -> Result<usize, MalformedResourceError> {
        parse(text, DocumentFormat::Yaml)
    }

    /// Decode arbitrary text as a JSON stack file and build a graph from it.
    ///
    /// Returns the resource count on success. **Never panics** on any input.
    pub fn parse_json_stack(text: &str) -> Result<usize, MalformedResourceError> {
        parse(text, DocumentFormat::Json)
    }

    fn parse(text: &str, format: DocumentFormat) -> Result<usize, MalformedResourceError> {
        let docs = decode(&StackPath::new("fuzz"), text, format)?;
        let graph = parse_graph(docs, &AdapterRegistry::builtin(), UnknownKinds::Passthrough)?;
        Ok(graph.len())
    }
}
