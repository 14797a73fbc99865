//! Diagram graph model.
//!
//! This module contains the data types a diagram is made of and the immutable
//! [`FrozenGraph`] produced when a diagram's build scope closes.
//!
//! # Pipeline Position
//!
//! ```text
//! Declarations (GraphAssembler / DiagramScope / Manifest)
//!     ↓ close_diagram
//! FrozenGraph (this module)
//!     ↓ render::dot
//! DOT source
//!     ↓ Backend
//! Artifact on disk
//! ```
//!
//! Nodes, clusters and edges are stored in declaration order and addressed by
//! the typed indices from [`crate::identifier`]. Clusters only group nodes
//! visually; edges that name a cluster are expanded to the cluster's member
//! nodes by [`FrozenGraph::expanded_edges`].

use indexmap::IndexMap;

use astrolabe_core::{
    attributes::{Direction, EdgeDirection, LineStyle},
    color::Color,
    identifier::{ClusterId, DiagramId, EdgeId, NodeId},
};

use crate::render::OutputFormat;

/// A leaf vertex: one labeled system entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: String,
    kind: String,
    owner: Option<ClusterId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, label: String, kind: String, owner: Option<ClusterId>) -> Self {
        Self {
            id,
            label,
            kind,
            owner,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display label; may contain `\n` line breaks.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Free-form category used for style lookup.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The innermost cluster owning this node, `None` for the diagram root.
    pub fn owner(&self) -> Option<ClusterId> {
        self.owner
    }
}

/// A child of the diagram root or of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Node(NodeId),
    Cluster(ClusterId),
}

/// A nestable visual grouping of nodes and clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    label: String,
    parent: Option<ClusterId>,
    depth: usize,
    members: Vec<Member>,
}

impl Cluster {
    pub(crate) fn new(
        id: ClusterId,
        label: String,
        parent: Option<ClusterId>,
        depth: usize,
    ) -> Self {
        Self {
            id,
            label,
            parent,
            depth,
            members: Vec::new(),
        }
    }

    pub(crate) fn push_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enclosing cluster, `None` when the cluster sits directly under the root.
    pub fn parent(&self) -> Option<ClusterId> {
        self.parent
    }

    /// Nesting depth; top-level clusters have depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Direct children in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// One side of an edge, resolved to entities of the owning diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A single node.
    Node(NodeId),
    /// Several nodes (fan-out when used as source, fan-in as target).
    NodeSet(Vec<NodeId>),
    /// Every node transitively contained in the cluster.
    Cluster(ClusterId),
}

/// Label and styling of an edge.
///
/// # Examples
///
/// ```
/// use astrolabe::EdgeAttrs;
///
/// let attrs = EdgeAttrs::directed().with_label("HTTPS");
/// assert!(attrs.is_directed());
/// assert_eq!(attrs.label(), Some("HTTPS"));
/// assert!(!EdgeAttrs::undirected().is_directed());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeAttrs {
    direction: EdgeDirection,
    label: Option<String>,
    color: Option<Color>,
    style: Option<LineStyle>,
}

impl EdgeAttrs {
    /// An arrow from source to target.
    pub fn directed() -> Self {
        Self::default()
    }

    /// A plain line without arrowheads.
    pub fn undirected() -> Self {
        Self::default().with_direction(EdgeDirection::None)
    }

    pub fn with_direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn is_directed(&self) -> bool {
        self.direction.is_directed()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn style(&self) -> Option<LineStyle> {
        self.style
    }
}

/// A declared connection between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    source: Endpoint,
    target: Endpoint,
    attrs: EdgeAttrs,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, source: Endpoint, target: Endpoint, attrs: EdgeAttrs) -> Self {
        Self {
            id,
            source,
            target,
            attrs,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    pub fn attrs(&self) -> &EdgeAttrs {
        &self.attrs
    }
}

/// A single node-to-node edge produced by expanding an [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandedEdge<'a> {
    /// The declaration this pair came from.
    pub edge: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub attrs: &'a EdgeAttrs,
}

/// Diagram-level settings: title, direction, styling and output naming.
///
/// # Examples
///
/// ```
/// use astrolabe::{DiagramConfig, attributes::Direction};
///
/// let config = DiagramConfig::new("MERN eCommerce Kubernetes Architecture")
///     .with_direction(Direction::TopToBottom)
///     .with_font_size(16);
/// assert_eq!(config.output_identifier(), "mern_ecommerce_kubernetes_architecture");
///
/// let config = config.with_output_path_override("mern_k8s");
/// assert_eq!(config.output_identifier(), "mern_k8s");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramConfig {
    title: String,
    direction: Direction,
    background_color: Option<Color>,
    font_size: Option<u32>,
    output_path_override: Option<String>,
    format: Option<OutputFormat>,
    graph_attrs: IndexMap<String, String>,
}

impl DiagramConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            direction: Direction::default(),
            background_color: None,
            font_size: None,
            output_path_override: None,
            format: None,
            graph_attrs: IndexMap::new(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Replaces the title-derived output name.
    ///
    /// The value is a path relative to the output directory; an extension is
    /// appended unless it already ends in a known output format extension.
    pub fn with_output_path_override(mut self, path: impl Into<String>) -> Self {
        self.output_path_override = Some(path.into());
        self
    }

    /// Overrides the run-wide output format for this diagram only.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Adds a raw Graphviz graph attribute such as `pad` or `splines`.
    ///
    /// Raw attributes are emitted after the built-in ones and therefore win.
    pub fn with_graph_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.graph_attrs.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn background_color(&self) -> Option<&Color> {
        self.background_color.as_ref()
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn output_path_override(&self) -> Option<&str> {
        self.output_path_override.as_deref()
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn graph_attrs(&self) -> &IndexMap<String, String> {
        &self.graph_attrs
    }

    /// Name the artifact is written under, without extension.
    ///
    /// The override when set, otherwise the title's whitespace-separated words
    /// joined with `_` and lowercased. Path separators in the title become `_`,
    /// so a title-derived name is always a single file name.
    pub fn output_identifier(&self) -> String {
        match &self.output_path_override {
            Some(path) => path.clone(),
            None => self
                .title
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .replace(['/', '\\'], "_")
                .to_lowercase(),
        }
    }
}

/// The immutable, fully assembled graph of one diagram.
#[derive(Debug, Clone)]
pub struct FrozenGraph {
    diagram: DiagramId,
    config: DiagramConfig,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    root: Vec<Member>,
    edges: Vec<Edge>,
}

impl FrozenGraph {
    pub(crate) fn new(
        diagram: DiagramId,
        config: DiagramConfig,
        nodes: Vec<Node>,
        clusters: Vec<Cluster>,
        root: Vec<Member>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            diagram,
            config,
            nodes,
            clusters,
            root,
            edges,
        }
    }

    pub fn diagram_id(&self) -> DiagramId {
        self.diagram
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of edge declarations, before fan-out expansion.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Top-level members of the implicit root cluster.
    pub fn root_members(&self) -> &[Member] {
        &self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.index())
    }

    /// Direct children of `cluster`; empty for an unknown id.
    pub fn members(&self, cluster: ClusterId) -> &[Member] {
        self.cluster(cluster).map_or(&[], Cluster::members)
    }

    /// The innermost cluster owning `node`.
    pub fn owner(&self, node: NodeId) -> Option<ClusterId> {
        self.node(node).and_then(Node::owner)
    }

    /// Clusters enclosing `node`, outermost first.
    pub fn cluster_path(&self, node: NodeId) -> Vec<ClusterId> {
        let mut path = Vec::new();
        let mut current = self.owner(node);
        while let Some(id) = current {
            path.push(id);
            current = self.cluster(id).and_then(Cluster::parent);
        }
        path.reverse();
        path
    }

    /// Every node contained in `cluster` at any depth, in declaration order.
    pub fn descendant_nodes(&self, cluster: ClusterId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        if let Some(cluster) = self.cluster(cluster) {
            self.collect_nodes(cluster.members(), &mut nodes);
        }
        nodes
    }

    fn collect_nodes(&self, members: &[Member], out: &mut Vec<NodeId>) {
        for member in members {
            match *member {
                Member::Node(id) => out.push(id),
                Member::Cluster(id) => {
                    if let Some(cluster) = self.cluster(id) {
                        self.collect_nodes(cluster.members(), out);
                    }
                }
            }
        }
    }

    /// Resolves an endpoint to the concrete nodes it stands for.
    pub fn resolve(&self, endpoint: &Endpoint) -> Vec<NodeId> {
        match endpoint {
            Endpoint::Node(id) => vec![*id],
            Endpoint::NodeSet(ids) => ids.clone(),
            Endpoint::Cluster(id) => self.descendant_nodes(*id),
        }
    }

    /// All edges as node-to-node pairs.
    ///
    /// Declarations are visited in order; within one declaration the pairs
    /// are enumerated source-major, then target-minor.
    pub fn expanded_edges(&self) -> Vec<ExpandedEdge<'_>> {
        let mut expanded = Vec::new();
        for edge in &self.edges {
            let sources = self.resolve(edge.source());
            let targets = self.resolve(edge.target());
            for &source in &sources {
                for &target in &targets {
                    expanded.push(ExpandedEdge {
                        edge: edge.id(),
                        source,
                        target,
                        attrs: edge.attrs(),
                    });
                }
            }
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_identifier_from_title() {
        let cases = [
            (
                "MERN eCommerce Kubernetes Architecture",
                "mern_ecommerce_kubernetes_architecture",
            ),
            (
                "MERN eCommerce - Component Architecture",
                "mern_ecommerce_-_component_architecture",
            ),
            ("  Spaced   Out  ", "spaced_out"),
            (
                "MERN eCommerce - CI/CD Pipeline",
                "mern_ecommerce_-_ci_cd_pipeline",
            ),
            ("/etc/passwd", "_etc_passwd"),
            ("..\\up", ".._up"),
        ];
        for (title, expected) in cases {
            assert_eq!(DiagramConfig::new(title).output_identifier(), expected);
        }
    }

    #[test]
    fn test_output_identifier_override() {
        let config = DiagramConfig::new("MERN eCommerce - CI/CD Pipeline")
            .with_output_path_override("mern_cicd");
        assert_eq!(config.output_identifier(), "mern_cicd");
    }

    #[test]
    fn test_graph_attrs_keep_insertion_order() {
        let config = DiagramConfig::new("t")
            .with_graph_attr("pad", "0.5")
            .with_graph_attr("splines", "spline")
            .with_graph_attr("pad", "1.0");
        let attrs: Vec<_> = config.graph_attrs().iter().collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0], (&"pad".to_string(), &"1.0".to_string()));
        assert_eq!(attrs[1].0, "splines");
    }

    #[test]
    fn test_edge_attrs_builder() {
        let attrs = EdgeAttrs::directed()
            .with_label("API Calls")
            .with_style(LineStyle::Dashed)
            .with_color(Color::new("firebrick").unwrap());
        assert_eq!(attrs.direction(), EdgeDirection::Forward);
        assert_eq!(attrs.label(), Some("API Calls"));
        assert_eq!(attrs.style(), Some(LineStyle::Dashed));
        assert_eq!(attrs.color().map(Color::as_str), Some("firebrick"));
    }
}
