//! Astrolabe - architecture diagrams as code
//!
//! This library assembles system topologies (nodes, nested clusters and
//! labeled edges, including fan-out to many targets) into frozen graphs,
//! translates them to Graphviz DOT and renders one artifact per diagram. A
//! single [`BuildRun`] produces any number of independent diagrams.
//!
//! Diagrams are declared either in code through [`DiagramScope`] or in a TOML
//! [`Manifest`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use astrolabe::{BuildRun, DiagramConfig, EdgeAttrs, Renderer, config::AppConfig};
//!
//! let renderer = Renderer::from_config(&AppConfig::default())?;
//! BuildRun::new()
//!     .diagram(DiagramConfig::new("Event Processing"), |scope| {
//!         let source = scope.node("k8s source", "eks")?;
//!         let workers = scope.cluster("Event Workers", |scope| {
//!             (1..=3)
//!                 .map(|i| scope.node(format!("worker{i}"), "pod"))
//!                 .collect::<Result<Vec<_>, _>>()
//!         })?;
//!         let queue = scope.node("event queue", "redis")?;
//!         scope.link(source, workers.clone())?;
//!         scope.edge(workers, queue, EdgeAttrs::directed().with_label("publish"))?;
//!         Ok(())
//!     })
//!     .execute(&renderer)?
//!     .into_result()?;
//! # Ok::<(), astrolabe::AstrolabeError>(())
//! ```

pub mod config;
pub mod manifest;
pub mod render;

mod assembler;
mod error;
mod model;
mod runner;

pub use astrolabe_core::{attributes, catalog, color, identifier};

pub use assembler::{
    ClusterHandle, DiagramHandle, DiagramScope, EdgeEndpoint, EdgeRef, GraphAssembler, NodeRef,
};
pub use error::{AstrolabeError, ReferenceError, RenderError, StateError};
pub use manifest::Manifest;
pub use model::{
    Cluster, DiagramConfig, Edge, EdgeAttrs, Endpoint, ExpandedEdge, FrozenGraph, Member, Node,
};
#[cfg(feature = "graphviz")]
pub use render::GraphvizBackend;
pub use render::{
    Artifact, Backend, BackendError, BuiltinBackend, OutputFormat, RenderRequest, Renderer,
};
pub use runner::{BuildReport, BuildRun, DiagramDefinition, DiagramFailure, FailurePolicy};
