//! Rendering utilities for terminals and CI surfaces (text, Markdown, GitHub annotations, JSONL).

#![forbid(unsafe_code)]

mod gha;
mod jsonl;
mod markdown;
mod model;
mod text;

pub use gha::render_github_annotations;
pub use jsonl::render_jsonl;
pub use markdown::render_markdown;
pub use model::{
    RenderableGate, RenderableLocation, RenderableReport, RenderableStack, RenderableVerdict,
};
pub use text::render_text;

#[cfg(test)]
pub(crate) mod sample;
