//! Error types for Astrolabe operations.
//!
//! This module provides the main error type [`AstrolabeError`] and the three
//! structural error families it wraps:
//!
//! - [`StateError`] - the declaration sequence misused the scope stack
//! - [`ReferenceError`] - an edge endpoint does not belong to the open diagram
//! - [`RenderError`] - the backend or the filesystem failed to produce an artifact
//!
//! Every variant that concerns a particular diagram carries its title, so a
//! failure in a multi-diagram build can be traced back to its definition.

use std::{io, ops::Range, path::PathBuf};

use thiserror::Error;

use crate::render::OutputFormat;

/// The main error type for Astrolabe operations.
#[derive(Debug, Error)]
pub enum AstrolabeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {message}")]
    Manifest {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },
}

impl AstrolabeError {
    /// Create a new `Manifest` error with the associated source text.
    pub fn new_manifest_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::Manifest {
            message: message.into(),
            span,
            src: src.into(),
        }
    }

    /// Title of the diagram this error occurred in, when known.
    pub fn diagram_title(&self) -> Option<&str> {
        match self {
            Self::State(err) => err.diagram_title(),
            Self::Reference(err) => Some(err.diagram_title()),
            Self::Render(err) => Some(err.diagram_title()),
            Self::Io(_) | Self::Config(_) | Self::Manifest { .. } => None,
        }
    }
}

/// Misuse of the diagram/cluster scope stack.
///
/// These always indicate a defect in the declaration sequence and are fatal to
/// the diagram being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot {operation}: no diagram is open")]
    NoDiagramOpen { operation: &'static str },

    #[error("cannot open diagram `{requested}` while diagram `{open}` is still open")]
    DiagramAlreadyOpen { open: String, requested: String },

    #[error("diagram `{diagram}`: close_cluster called with no cluster open")]
    NoClusterOpen { diagram: String },

    #[error("diagram `{diagram}`: {} cluster(s) left open: {}", .open.len(), .open.join(" > "))]
    UnclosedClusters { diagram: String, open: Vec<String> },
}

impl StateError {
    /// Title of the affected diagram, if one was open.
    pub fn diagram_title(&self) -> Option<&str> {
        match self {
            Self::NoDiagramOpen { .. } => None,
            Self::DiagramAlreadyOpen { open, .. } => Some(open),
            Self::NoClusterOpen { diagram } | Self::UnclosedClusters { diagram, .. } => {
                Some(diagram)
            }
        }
    }
}

/// An edge endpoint that does not resolve inside the open diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("diagram `{diagram}`: {entity} was declared in a different diagram")]
    ForeignEntity { diagram: String, entity: String },

    #[error("diagram `{diagram}`: node {node} has not been declared")]
    UnknownNode { diagram: String, node: String },

    #[error("diagram `{diagram}`: cluster {cluster} has not been declared")]
    UnknownCluster { diagram: String, cluster: String },

    #[error("diagram `{diagram}`: edge endpoint is an empty node set")]
    EmptyEndpoint { diagram: String },

    #[error("diagram `{diagram}`: no node or cluster is named `{name}`")]
    UnknownName { diagram: String, name: String },

    #[error("diagram `{diagram}`: the name `{name}` is declared more than once")]
    DuplicateName { diagram: String, name: String },

    #[error("diagram `{diagram}`: `{name}` is a cluster and cannot be part of a node list")]
    ClusterInNodeSet { diagram: String, name: String },
}

impl ReferenceError {
    /// Title of the affected diagram.
    pub fn diagram_title(&self) -> &str {
        match self {
            Self::ForeignEntity { diagram, .. }
            | Self::UnknownNode { diagram, .. }
            | Self::UnknownCluster { diagram, .. }
            | Self::EmptyEndpoint { diagram }
            | Self::UnknownName { diagram, .. }
            | Self::DuplicateName { diagram, .. }
            | Self::ClusterInNodeSet { diagram, .. } => diagram,
        }
    }
}

/// Failure to turn a frozen graph into an artifact on disk.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("diagram `{diagram}`: {backend} backend failed: {message}")]
    Backend {
        diagram: String,
        backend: &'static str,
        message: String,
    },

    #[error("diagram `{diagram}`: {backend} backend cannot produce {format} output")]
    UnsupportedFormat {
        diagram: String,
        backend: &'static str,
        format: OutputFormat,
    },

    #[error("diagram `{diagram}`: output path `{path}` must stay inside the output directory")]
    InvalidOutputPath { diagram: String, path: String },

    #[error("diagram `{diagram}`: failed to write {}: {source}", .path.display())]
    Write {
        diagram: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    /// Title of the affected diagram.
    pub fn diagram_title(&self) -> &str {
        match self {
            Self::Backend { diagram, .. }
            | Self::UnsupportedFormat { diagram, .. }
            | Self::InvalidOutputPath { diagram, .. }
            | Self::Write { diagram, .. } => diagram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_clusters_message() {
        let err = StateError::UnclosedClusters {
            diagram: "Shop".to_string(),
            open: vec!["AWS".to_string(), "EKS".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "diagram `Shop`: 2 cluster(s) left open: AWS > EKS"
        );
    }

    #[test]
    fn test_diagram_title_propagates() {
        let err: AstrolabeError = ReferenceError::UnknownNode {
            diagram: "Shop".to_string(),
            node: "n4".to_string(),
        }
        .into();
        assert_eq!(err.diagram_title(), Some("Shop"));

        let err: AstrolabeError = StateError::NoDiagramOpen {
            operation: "declare a node",
        }
        .into();
        assert_eq!(err.diagram_title(), None);
        assert_eq!(err.to_string(), "cannot declare a node: no diagram is open");
    }

    #[test]
    fn test_render_error_keeps_source() {
        use std::error::Error as _;

        let err = RenderError::Write {
            diagram: "Shop".to_string(),
            path: PathBuf::from("/nowhere/shop.png"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nowhere/shop.png"));
        assert!(err.source().is_some());
    }
}
