//! Declarative TOML build manifests.
//!
//! A manifest lists one or more diagrams. Each diagram declares named nodes,
//! nested clusters and edges between names:
//!
//! ```toml
//! [[diagram]]
//! title = "Web Service"
//! direction = "left-to-right"
//!
//! [[diagram.node]]
//! name = "lb"
//! label = "Load Balancer"
//! kind = "elb"
//!
//! [[diagram.cluster]]
//! name = "web"
//! label = "Web Tier"
//!
//!   [[diagram.cluster.node]]
//!   name = "web1"
//!   kind = "server"
//!
//! [[diagram.edge]]
//! from = "lb"
//! to = ["web1"]
//! label = "HTTP"
//! ```
//!
//! Within a scope, nodes are declared before nested clusters. Name resolution
//! happens while the diagram is built, so an unknown name fails that diagram
//! only and the run's [`FailurePolicy`] applies.

use std::{fs, path::Path};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use astrolabe_core::{
    attributes::{Direction, EdgeDirection, LineStyle},
    color::Color,
};

use crate::{
    assembler::{ClusterHandle, DiagramScope, EdgeEndpoint, NodeRef},
    error::{AstrolabeError, ReferenceError},
    model::{DiagramConfig, EdgeAttrs},
    render::OutputFormat,
    runner::{BuildRun, DiagramDefinition, FailurePolicy},
};

/// A parsed build manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "diagram")]
    diagrams: Vec<DiagramSpec>,
}

/// One `[[diagram]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramSpec {
    title: String,
    #[serde(default)]
    direction: Direction,
    /// Output name relative to the output directory
    filename: Option<String>,
    background_color: Option<Color>,
    font_size: Option<u32>,
    format: Option<OutputFormat>,
    #[serde(default)]
    graph_attr: IndexMap<String, String>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeSpec>,
    #[serde(default, rename = "cluster")]
    clusters: Vec<ClusterSpec>,
    #[serde(default, rename = "edge")]
    edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSpec {
    name: String,
    /// Defaults to the name
    label: Option<String>,
    #[serde(default)]
    kind: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterSpec {
    label: String,
    /// Makes the cluster usable as an edge endpoint
    name: Option<String>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeSpec>,
    #[serde(default, rename = "cluster")]
    clusters: Vec<ClusterSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeSpec {
    from: EndpointSpec,
    to: EndpointSpec,
    label: Option<String>,
    #[serde(default)]
    direction: EdgeDirection,
    color: Option<Color>,
    style: Option<LineStyle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EndpointSpec {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy)]
enum Named {
    Node(NodeRef),
    Cluster(ClusterHandle),
}

impl Manifest {
    /// Parses manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Manifest`] with the offending span for
    /// malformed TOML, unknown keys or invalid values, and when the manifest
    /// declares no diagram at all.
    pub fn parse(src: &str) -> Result<Self, AstrolabeError> {
        let manifest: Self = toml::from_str(src).map_err(|err| {
            AstrolabeError::new_manifest_error(err.message(), err.span(), src)
        })?;

        if manifest.diagrams.is_empty() {
            return Err(AstrolabeError::new_manifest_error(
                "manifest declares no [[diagram]]",
                None,
                src,
            ));
        }

        debug!(diagrams = manifest.diagrams.len(); "Parsed manifest");
        Ok(manifest)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Io`] if the file cannot be read, otherwise as
    /// [`parse`](Self::parse).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AstrolabeError> {
        let src = fs::read_to_string(path.as_ref())?;
        Self::parse(&src)
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    pub fn diagrams(&self) -> &[DiagramSpec] {
        &self.diagrams
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.diagrams.iter().map(DiagramSpec::title)
    }

    /// One definition per `[[diagram]]`, in file order.
    pub fn into_build_run(self, policy: FailurePolicy) -> BuildRun {
        self.diagrams
            .into_iter()
            .map(DiagramSpec::into_definition)
            .fold(BuildRun::new().with_policy(policy), BuildRun::push)
    }
}

impl DiagramSpec {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The diagram-level settings of this table.
    pub fn config(&self) -> DiagramConfig {
        let mut config = DiagramConfig::new(&self.title).with_direction(self.direction);
        if let Some(filename) = &self.filename {
            config = config.with_output_path_override(filename);
        }
        if let Some(color) = &self.background_color {
            config = config.with_background_color(color.clone());
        }
        if let Some(size) = self.font_size {
            config = config.with_font_size(size);
        }
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        for (key, value) in &self.graph_attr {
            config = config.with_graph_attr(key, value);
        }
        config
    }

    pub fn into_definition(self) -> DiagramDefinition {
        DiagramDefinition::new(self.config(), move |scope| self.declare(scope))
    }

    fn declare(self, scope: &mut DiagramScope<'_>) -> Result<(), AstrolabeError> {
        let mut names = IndexMap::new();
        declare_members(&self.title, &self.nodes, &self.clusters, scope, &mut names)?;

        for edge in &self.edges {
            let source = resolve(&self.title, &edge.from, &names)?;
            let target = resolve(&self.title, &edge.to, &names)?;

            let mut attrs = EdgeAttrs::directed().with_direction(edge.direction);
            if let Some(label) = &edge.label {
                attrs = attrs.with_label(label);
            }
            if let Some(color) = &edge.color {
                attrs = attrs.with_color(color.clone());
            }
            if let Some(style) = edge.style {
                attrs = attrs.with_style(style);
            }
            scope.edge(source, target, attrs)?;
        }
        Ok(())
    }
}

fn register(
    diagram: &str,
    names: &mut IndexMap<String, Named>,
    name: &str,
    entity: Named,
) -> Result<(), ReferenceError> {
    if names.insert(name.to_string(), entity).is_some() {
        return Err(ReferenceError::DuplicateName {
            diagram: diagram.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn declare_members(
    diagram: &str,
    nodes: &[NodeSpec],
    clusters: &[ClusterSpec],
    scope: &mut DiagramScope<'_>,
    names: &mut IndexMap<String, Named>,
) -> Result<(), AstrolabeError> {
    for node in nodes {
        let label = node.label.as_deref().unwrap_or(&node.name);
        let node_ref = scope.node(label, node.kind.as_str())?;
        register(diagram, names, &node.name, Named::Node(node_ref))?;
    }

    for cluster in clusters {
        let (handle, ()) = scope.cluster_with_handle(cluster.label.as_str(), |inner| {
            declare_members(diagram, &cluster.nodes, &cluster.clusters, inner, names)
        })?;
        if let Some(name) = &cluster.name {
            register(diagram, names, name, Named::Cluster(handle))?;
        }
    }
    Ok(())
}

fn lookup(
    diagram: &str,
    name: &str,
    names: &IndexMap<String, Named>,
) -> Result<Named, ReferenceError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| ReferenceError::UnknownName {
            diagram: diagram.to_string(),
            name: name.to_string(),
        })
}

fn resolve(
    diagram: &str,
    endpoint: &EndpointSpec,
    names: &IndexMap<String, Named>,
) -> Result<EdgeEndpoint, ReferenceError> {
    match endpoint {
        EndpointSpec::One(name) => Ok(match lookup(diagram, name, names)? {
            Named::Node(node) => EdgeEndpoint::Node(node),
            Named::Cluster(cluster) => EdgeEndpoint::Cluster(cluster),
        }),
        EndpointSpec::Many(list) => list
            .iter()
            .map(|name| match lookup(diagram, name, names)? {
                Named::Node(node) => Ok(node),
                Named::Cluster(_) => Err(ReferenceError::ClusterInNodeSet {
                    diagram: diagram.to_string(),
                    name: name.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(EdgeEndpoint::NodeSet),
    }
}
