//! The boundary between Astrolabe and a layout engine.

use thiserror::Error;

use crate::model::FrozenGraph;

use super::OutputFormat;

/// Abstraction for layout/rendering backends.
///
/// A backend receives the frozen graph together with its DOT translation and
/// returns the artifact bytes. Backends never write files; the
/// [`Renderer`](super::Renderer) owns the filesystem.
pub trait Backend {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Whether this backend can produce `format`.
    fn supports(&self, format: OutputFormat) -> bool;

    /// Produces the artifact bytes for one diagram.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] carrying the engine's diagnostic text.
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, BackendError>;
}

/// Everything a backend needs to render one diagram.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    graph: &'a FrozenGraph,
    dot: &'a str,
    format: OutputFormat,
}

impl<'a> RenderRequest<'a> {
    pub fn new(graph: &'a FrozenGraph, dot: &'a str, format: OutputFormat) -> Self {
        Self { graph, dot, format }
    }

    pub fn graph(&self) -> &'a FrozenGraph {
        self.graph
    }

    /// The DOT translation of [`graph`](Self::graph).
    pub fn dot(&self) -> &'a str {
        self.dot
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Diagnostic reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
