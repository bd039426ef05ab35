//! Decoding stack files into raw documents.
//!
//! A file holds one document, a JSON array of documents, a multi-document YAML
//! stream, or a container object: a stack export (`deployment.resources`), a plain
//! `resources` list, or a program-style `resources` mapping keyed by resource name.

use crate::error::{DocumentRef, MalformedResourceError};
use serde::Deserialize;
use serde_json::Value as Json;
use stackguard_types::StackPath;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format implied by a file extension (`json`, `yaml`, `yml`), if any.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// One resource declaration before adaptation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDocument {
    pub doc: DocumentRef,
    pub body: Json,
}

/// Decode the text of one stack file.
///
/// Documents are numbered from 0 in file order; empty YAML documents are skipped
/// without consuming an index.
pub fn decode(
    source: &StackPath,
    text: &str,
    format: DocumentFormat,
) -> Result<Vec<RawDocument>, MalformedResourceError> {
    let syntax = |message: String| MalformedResourceError::Syntax {
        doc: DocumentRef::new(source.clone(), 0),
        format: format.as_str(),
        message,
    };

    let roots: Vec<Json> = match format {
        DocumentFormat::Json => {
            vec![serde_json::from_str(text).map_err(|e| syntax(e.to_string()))?]
        }
        DocumentFormat::Yaml => {
            let mut roots = Vec::new();
            for de in serde_yaml::Deserializer::from_str(text) {
                let v = Json::deserialize(de).map_err(|e| syntax(e.to_string()))?;
                if !v.is_null() {
                    roots.push(v);
                }
            }
            roots
        }
    };

    let mut out = Vec::new();
    for root in roots {
        flatten(root, &mut |body| {
            let index = u32::try_from(out.len()).unwrap_or(u32::MAX);
            out.push(RawDocument {
                doc: DocumentRef::new(source.clone(), index),
                body,
            });
        });
    }
    Ok(out)
}

fn flatten(root: Json, emit: &mut impl FnMut(Json)) {
    match root {
        Json::Array(items) => items.into_iter().for_each(|item| flatten(item, emit)),
        Json::Object(mut obj) if is_container(&obj) => {
            let resources = match obj.remove("deployment") {
                Some(Json::Object(mut deployment)) => deployment.remove("resources"),
                _ => obj.remove("resources"),
            };
            match resources {
                Some(Json::Array(items)) => items.into_iter().for_each(emit),
                Some(Json::Object(named)) => {
                    for (name, body) in named {
                        emit(with_name(name, body));
                    }
                }
                _ => {}
            }
        }
        Json::Null => {}
        other => emit(other),
    }
}

/// Objects that wrap resources rather than being one.
fn is_container(obj: &serde_json::Map<String, Json>) -> bool {
    if obj.contains_key("type") || obj.contains_key("kind") {
        return false;
    }
    let export = obj
        .get("deployment")
        .and_then(|d| d.get("resources"))
        .is_some_and(Json::is_array);
    let listed = obj
        .get("resources")
        .is_some_and(|r| r.is_array() || r.is_object());
    export || listed
}

/// Program-style entries carry their name as the mapping key.
fn with_name(name: String, body: Json) -> Json {
    match body {
        Json::Object(mut obj) => {
            obj.entry("name").or_insert(Json::String(name));
            Json::Object(obj)
        }
        other => other,
    }
}
