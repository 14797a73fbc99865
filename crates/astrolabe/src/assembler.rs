//! Graph assembly under an explicit scope stack.
//!
//! [`GraphAssembler`] accumulates the nodes, clusters and edges of the one
//! diagram that is currently open. Nesting is tracked with a stack of open
//! clusters on top of the diagram's implicit root:
//!
//! ```text
//! Empty ──open_diagram──▶ DiagramOpen ──open_cluster──▶ ClusterOpen (any depth)
//!   ▲                        │   ▲                          │
//!   └──────close_diagram─────┘   └───────close_cluster──────┘
//! ```
//!
//! Every declaration is owned by whatever is on top of the stack. Misuse of the
//! stack is reported as a [`StateError`]; endpoints that do not belong to the
//! open diagram are reported as a [`ReferenceError`].
//!
//! [`DiagramScope`] is the closure-based façade used by diagram definitions:
//! [`DiagramScope::cluster`] opens and closes a cluster around a closure, so
//! balanced scopes come for free.

use log::{debug, trace, warn};

use astrolabe_core::identifier::{ClusterId, DiagramId, EdgeId, NodeId};

use crate::{
    error::{AstrolabeError, ReferenceError, StateError},
    model::{Cluster, DiagramConfig, Edge, EdgeAttrs, Endpoint, FrozenGraph, Member, Node},
};

/// Handle to the diagram opened by [`GraphAssembler::open_diagram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramHandle {
    diagram: DiagramId,
}

impl DiagramHandle {
    pub fn id(&self) -> DiagramId {
        self.diagram
    }
}

/// Reference to a declared node, valid only within its own diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    diagram: DiagramId,
    node: NodeId,
}

impl NodeRef {
    pub(crate) fn new(diagram: DiagramId, node: NodeId) -> Self {
        Self { diagram, node }
    }

    pub fn id(&self) -> NodeId {
        self.node
    }

    pub fn diagram(&self) -> DiagramId {
        self.diagram
    }
}

/// Reference to a declared cluster, usable as an edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterHandle {
    diagram: DiagramId,
    cluster: ClusterId,
}

impl ClusterHandle {
    pub fn id(&self) -> ClusterId {
        self.cluster
    }

    pub fn diagram(&self) -> DiagramId {
        self.diagram
    }
}

/// Reference to a recorded edge declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    diagram: DiagramId,
    edge: EdgeId,
}

impl EdgeRef {
    pub fn id(&self) -> EdgeId {
        self.edge
    }

    pub fn diagram(&self) -> DiagramId {
        self.diagram
    }
}

/// An unresolved edge endpoint as passed to [`GraphAssembler::declare_edge`].
///
/// Usually built implicitly through the `From` conversions: a [`NodeRef`], a
/// slice, array or `Vec` of them, or a [`ClusterHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeEndpoint {
    Node(NodeRef),
    NodeSet(Vec<NodeRef>),
    Cluster(ClusterHandle),
}

impl From<NodeRef> for EdgeEndpoint {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<&NodeRef> for EdgeEndpoint {
    fn from(node: &NodeRef) -> Self {
        Self::Node(*node)
    }
}

impl From<Vec<NodeRef>> for EdgeEndpoint {
    fn from(nodes: Vec<NodeRef>) -> Self {
        Self::NodeSet(nodes)
    }
}

impl From<&Vec<NodeRef>> for EdgeEndpoint {
    fn from(nodes: &Vec<NodeRef>) -> Self {
        Self::NodeSet(nodes.clone())
    }
}

impl From<&[NodeRef]> for EdgeEndpoint {
    fn from(nodes: &[NodeRef]) -> Self {
        Self::NodeSet(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeRef; N]> for EdgeEndpoint {
    fn from(nodes: [NodeRef; N]) -> Self {
        Self::NodeSet(nodes.to_vec())
    }
}

impl From<ClusterHandle> for EdgeEndpoint {
    fn from(cluster: ClusterHandle) -> Self {
        Self::Cluster(cluster)
    }
}

impl From<&ClusterHandle> for EdgeEndpoint {
    fn from(cluster: &ClusterHandle) -> Self {
        Self::Cluster(*cluster)
    }
}

/// Mutable state of the diagram currently being declared.
#[derive(Debug)]
struct Session {
    id: DiagramId,
    config: DiagramConfig,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    root: Vec<Member>,
    edges: Vec<Edge>,
    stack: Vec<ClusterId>,
}

impl Session {
    fn new(config: DiagramConfig) -> Self {
        Self {
            id: DiagramId::fresh(),
            config,
            nodes: Vec::new(),
            clusters: Vec::new(),
            root: Vec::new(),
            edges: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn title(&self) -> String {
        self.config.title().to_string()
    }

    /// Adds `member` to the cluster on top of the stack, or to the root.
    fn attach(&mut self, member: Member) {
        match self.stack.last() {
            Some(top) => self.clusters[top.index()].push_member(member),
            None => self.root.push(member),
        }
    }

    fn check_node(&self, node: NodeRef) -> Result<NodeId, ReferenceError> {
        if node.diagram != self.id {
            return Err(ReferenceError::ForeignEntity {
                diagram: self.title(),
                entity: format!("node {} of {}", node.node, node.diagram),
            });
        }
        if node.node.index() >= self.nodes.len() {
            return Err(ReferenceError::UnknownNode {
                diagram: self.title(),
                node: node.node.to_string(),
            });
        }
        Ok(node.node)
    }

    fn check_cluster(&self, cluster: ClusterHandle) -> Result<ClusterId, ReferenceError> {
        if cluster.diagram != self.id {
            return Err(ReferenceError::ForeignEntity {
                diagram: self.title(),
                entity: format!("cluster {} of {}", cluster.cluster, cluster.diagram),
            });
        }
        if cluster.cluster.index() >= self.clusters.len() {
            return Err(ReferenceError::UnknownCluster {
                diagram: self.title(),
                cluster: cluster.cluster.to_string(),
            });
        }
        Ok(cluster.cluster)
    }

    fn resolve(&self, endpoint: EdgeEndpoint) -> Result<Endpoint, ReferenceError> {
        match endpoint {
            EdgeEndpoint::Node(node) => self.check_node(node).map(Endpoint::Node),
            EdgeEndpoint::NodeSet(nodes) => {
                if nodes.is_empty() {
                    return Err(ReferenceError::EmptyEndpoint {
                        diagram: self.title(),
                    });
                }
                nodes
                    .into_iter()
                    .map(|node| self.check_node(node))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Endpoint::NodeSet)
            }
            EdgeEndpoint::Cluster(cluster) => self.check_cluster(cluster).map(Endpoint::Cluster),
        }
    }
}

/// Builds one diagram at a time from a linear sequence of declarations.
///
/// # Examples
///
/// ```
/// use astrolabe::{DiagramConfig, EdgeAttrs, GraphAssembler};
///
/// let mut assembler = GraphAssembler::new();
/// assembler.open_diagram(DiagramConfig::new("Shop"))?;
/// let users = assembler.declare_node("End Users", "users")?;
/// assembler.open_cluster("AWS Cloud")?;
/// let lb = assembler.declare_node("Load Balancer", "elb")?;
/// assembler.close_cluster()?;
/// assembler.declare_edge(users, lb, EdgeAttrs::directed().with_label("HTTPS"))?;
///
/// let graph = assembler.close_diagram()?;
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.cluster_count(), 1);
/// assert_eq!(graph.edge_count(), 1);
/// # Ok::<(), astrolabe::AstrolabeError>(())
/// ```
#[derive(Debug, Default)]
pub struct GraphAssembler {
    session: Option<Session>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a diagram is currently open.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Number of clusters currently open above the diagram root.
    pub fn depth(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.stack.len())
    }

    fn session_mut(&mut self, operation: &'static str) -> Result<&mut Session, StateError> {
        self.session
            .as_mut()
            .ok_or(StateError::NoDiagramOpen { operation })
    }

    /// Begins a new diagram.
    ///
    /// # Errors
    ///
    /// [`StateError::DiagramAlreadyOpen`] if another diagram has not been
    /// closed yet; diagrams never nest.
    pub fn open_diagram(&mut self, config: DiagramConfig) -> Result<DiagramHandle, StateError> {
        if let Some(open) = &self.session {
            return Err(StateError::DiagramAlreadyOpen {
                open: open.title(),
                requested: config.title().to_string(),
            });
        }

        let session = Session::new(config);
        let handle = DiagramHandle {
            diagram: session.id,
        };
        debug!(title = session.config.title(), diagram:% = session.id; "Diagram opened");
        self.session = Some(session);
        Ok(handle)
    }

    /// Opens a cluster nested in whatever is on top of the scope stack.
    ///
    /// # Errors
    ///
    /// [`StateError::NoDiagramOpen`] if no diagram is open.
    pub fn open_cluster(&mut self, label: impl Into<String>) -> Result<ClusterHandle, StateError> {
        let session = self.session_mut("open a cluster")?;

        let id = ClusterId::new(session.clusters.len());
        let parent = session.stack.last().copied();
        let depth = session.stack.len();
        let label = label.into();
        trace!(cluster:% = id, label, depth; "Cluster opened");

        session.clusters.push(Cluster::new(id, label, parent, depth));
        session.attach(Member::Cluster(id));
        session.stack.push(id);

        Ok(ClusterHandle {
            diagram: session.id,
            cluster: id,
        })
    }

    /// Closes the innermost open cluster.
    ///
    /// # Errors
    ///
    /// [`StateError::NoDiagramOpen`] if no diagram is open,
    /// [`StateError::NoClusterOpen`] if only the diagram root is on the stack.
    pub fn close_cluster(&mut self) -> Result<ClusterHandle, StateError> {
        let session = self.session_mut("close a cluster")?;
        match session.stack.pop() {
            Some(id) => {
                trace!(cluster:% = id; "Cluster closed");
                Ok(ClusterHandle {
                    diagram: session.id,
                    cluster: id,
                })
            }
            None => Err(StateError::NoClusterOpen {
                diagram: session.title(),
            }),
        }
    }

    /// Declares a node owned by the cluster on top of the stack (or the root).
    ///
    /// # Errors
    ///
    /// [`StateError::NoDiagramOpen`] if no diagram is open.
    pub fn declare_node(
        &mut self,
        label: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<NodeRef, StateError> {
        let session = self.session_mut("declare a node")?;

        let id = NodeId::new(session.nodes.len());
        let owner = session.stack.last().copied();
        session
            .nodes
            .push(Node::new(id, label.into(), kind.into(), owner));
        session.attach(Member::Node(id));

        Ok(NodeRef::new(session.id, id))
    }

    /// Records an edge between two endpoints of the open diagram.
    ///
    /// # Errors
    ///
    /// [`StateError::NoDiagramOpen`] if no diagram is open; a
    /// [`ReferenceError`] if either endpoint was not declared in this diagram
    /// or is an empty node set.
    pub fn declare_edge(
        &mut self,
        source: impl Into<EdgeEndpoint>,
        target: impl Into<EdgeEndpoint>,
        attrs: EdgeAttrs,
    ) -> Result<EdgeRef, AstrolabeError> {
        let session = self.session_mut("declare an edge")?;

        let source = session.resolve(source.into())?;
        let target = session.resolve(target.into())?;

        let id = EdgeId::new(session.edges.len());
        session.edges.push(Edge::new(id, source, target, attrs));

        Ok(EdgeRef {
            diagram: session.id,
            edge: id,
        })
    }

    /// Freezes the open diagram and returns its graph.
    ///
    /// # Errors
    ///
    /// [`StateError::NoDiagramOpen`] if no diagram is open,
    /// [`StateError::UnclosedClusters`] if clusters are still open. The
    /// diagram stays open in the latter case; call [`abandon`](Self::abandon)
    /// to discard it.
    pub fn close_diagram(&mut self) -> Result<FrozenGraph, StateError> {
        let session = self.session.take().ok_or(StateError::NoDiagramOpen {
            operation: "close a diagram",
        })?;

        if !session.stack.is_empty() {
            let err = StateError::UnclosedClusters {
                diagram: session.title(),
                open: session
                    .stack
                    .iter()
                    .map(|id| session.clusters[id.index()].label().to_string())
                    .collect(),
            };
            self.session = Some(session);
            return Err(err);
        }

        let graph = FrozenGraph::new(
            session.id,
            session.config,
            session.nodes,
            session.clusters,
            session.root,
            session.edges,
        );

        for edge in graph.edges() {
            for endpoint in [edge.source(), edge.target()] {
                let Endpoint::Cluster(id) = endpoint else {
                    continue;
                };
                if graph.descendant_nodes(*id).is_empty() {
                    warn!(
                        title = graph.title(),
                        cluster:% = id;
                        "Edge endpoint is an empty cluster and will not be drawn"
                    );
                }
            }
        }

        debug!(
            title = graph.title(),
            nodes = graph.node_count(),
            clusters = graph.cluster_count(),
            edges = graph.edge_count();
            "Diagram frozen"
        );

        Ok(graph)
    }

    /// Discards the open diagram, if any, without producing a graph.
    ///
    /// Returns the id of the discarded diagram.
    pub fn abandon(&mut self) -> Option<DiagramId> {
        self.session.take().map(|session| {
            debug!(title = session.config.title(); "Diagram abandoned");
            session.id
        })
    }
}

/// Declaration façade handed to diagram definitions.
///
/// All methods forward to the underlying [`GraphAssembler`];
/// [`cluster`](Self::cluster) keeps the scope stack balanced.
pub struct DiagramScope<'a> {
    assembler: &'a mut GraphAssembler,
}

impl<'a> DiagramScope<'a> {
    pub fn new(assembler: &'a mut GraphAssembler) -> Self {
        Self { assembler }
    }

    /// Declares a node in the current scope.
    pub fn node(
        &mut self,
        label: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<NodeRef, AstrolabeError> {
        Ok(self.assembler.declare_node(label, kind)?)
    }

    /// Declares an edge with explicit attributes.
    pub fn edge(
        &mut self,
        source: impl Into<EdgeEndpoint>,
        target: impl Into<EdgeEndpoint>,
        attrs: EdgeAttrs,
    ) -> Result<EdgeRef, AstrolabeError> {
        self.assembler.declare_edge(source, target, attrs)
    }

    /// Declares an unlabeled directed edge.
    pub fn link(
        &mut self,
        source: impl Into<EdgeEndpoint>,
        target: impl Into<EdgeEndpoint>,
    ) -> Result<EdgeRef, AstrolabeError> {
        self.assembler
            .declare_edge(source, target, EdgeAttrs::directed())
    }

    /// Runs `f` inside a new cluster and closes the cluster afterwards.
    ///
    /// If `f` fails the cluster is left open; the error is fatal to the
    /// diagram anyway.
    pub fn cluster<T, F>(&mut self, label: impl Into<String>, f: F) -> Result<T, AstrolabeError>
    where
        F: FnOnce(&mut DiagramScope<'_>) -> Result<T, AstrolabeError>,
    {
        self.assembler.open_cluster(label)?;
        let value = f(&mut DiagramScope::new(self.assembler))?;
        self.assembler.close_cluster()?;
        Ok(value)
    }

    /// Like [`cluster`](Self::cluster), also returning the cluster's handle
    /// so it can be used as an edge endpoint.
    pub fn cluster_with_handle<T, F>(
        &mut self,
        label: impl Into<String>,
        f: F,
    ) -> Result<(ClusterHandle, T), AstrolabeError>
    where
        F: FnOnce(&mut DiagramScope<'_>) -> Result<T, AstrolabeError>,
    {
        let handle = self.assembler.open_cluster(label)?;
        let value = f(&mut DiagramScope::new(self.assembler))?;
        self.assembler.close_cluster()?;
        Ok((handle, value))
    }

    /// Direct access to the scope stack for definitions that manage
    /// cluster scopes by hand.
    pub fn assembler(&mut self) -> &mut GraphAssembler {
        self.assembler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(title: &str) -> GraphAssembler {
        let mut assembler = GraphAssembler::new();
        assembler
            .open_diagram(DiagramConfig::new(title))
            .expect("fresh assembler accepts a diagram");
        assembler
    }

    #[test]
    fn test_empty_diagram_freezes() {
        let mut assembler = open("Empty");
        let graph = assembler.close_diagram().unwrap();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.cluster_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!assembler.is_open());
    }

    #[test]
    fn test_operations_require_open_diagram() {
        let mut assembler = GraphAssembler::new();
        assert_eq!(
            assembler.open_cluster("c").unwrap_err(),
            StateError::NoDiagramOpen {
                operation: "open a cluster"
            }
        );
        assert!(matches!(
            assembler.close_cluster(),
            Err(StateError::NoDiagramOpen { .. })
        ));
        assert!(matches!(
            assembler.declare_node("a", "server"),
            Err(StateError::NoDiagramOpen { .. })
        ));
        assert!(matches!(
            assembler.close_diagram(),
            Err(StateError::NoDiagramOpen { .. })
        ));
    }

    #[test]
    fn test_diagrams_do_not_nest() {
        let mut assembler = open("First");
        let err = assembler
            .open_diagram(DiagramConfig::new("Second"))
            .unwrap_err();
        assert_eq!(
            err,
            StateError::DiagramAlreadyOpen {
                open: "First".to_string(),
                requested: "Second".to_string(),
            }
        );
        // The first diagram is still usable.
        assert!(assembler.declare_node("a", "server").is_ok());
    }

    #[test]
    fn test_close_cluster_at_root_fails() {
        let mut assembler = open("Root");
        assert_eq!(
            assembler.close_cluster().unwrap_err(),
            StateError::NoClusterOpen {
                diagram: "Root".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_clusters_are_listed() {
        let mut assembler = open("Shop");
        assembler.open_cluster("AWS Cloud").unwrap();
        assembler.open_cluster("EKS Cluster").unwrap();
        assembler.open_cluster("Frontend").unwrap();
        assembler.close_cluster().unwrap();

        let err = assembler.close_diagram().unwrap_err();
        assert_eq!(
            err,
            StateError::UnclosedClusters {
                diagram: "Shop".to_string(),
                open: vec!["AWS Cloud".to_string(), "EKS Cluster".to_string()],
            }
        );
        assert!(assembler.is_open());
        assert_eq!(assembler.depth(), 2);
    }

    #[test]
    fn test_abandon_returns_to_empty() {
        let mut assembler = open("Scratch");
        assembler.open_cluster("half").unwrap();
        assert!(assembler.abandon().is_some());
        assert!(!assembler.is_open());
        assert_eq!(assembler.depth(), 0);
        assert!(assembler.abandon().is_none());
        assert!(assembler.open_diagram(DiagramConfig::new("Next")).is_ok());
    }

    #[test]
    fn test_ownership_follows_scope() {
        let mut assembler = open("Nesting");
        let top = assembler.declare_node("top", "users").unwrap();
        let outer = assembler.open_cluster("A").unwrap();
        let in_a = assembler.declare_node("in A", "server").unwrap();
        let inner = assembler.open_cluster("B").unwrap();
        let in_b = assembler.declare_node("in B", "pod").unwrap();
        assembler.close_cluster().unwrap();
        assembler.close_cluster().unwrap();
        let graph = assembler.close_diagram().unwrap();

        assert_eq!(graph.owner(top.id()), None);
        assert_eq!(graph.owner(in_a.id()), Some(outer.id()));
        assert_eq!(graph.owner(in_b.id()), Some(inner.id()));
        assert_eq!(graph.cluster_path(in_b.id()), vec![outer.id(), inner.id()]);
        assert_eq!(
            graph.root_members(),
            &[Member::Node(top.id()), Member::Cluster(outer.id())]
        );
        assert_eq!(graph.cluster(inner.id()).unwrap().parent(), Some(outer.id()));
        assert_eq!(graph.cluster(inner.id()).unwrap().depth(), 1);
    }

    #[test]
    fn test_undeclared_node_is_rejected() {
        let mut assembler = open("Refs");
        let a = assembler.declare_node("a", "server").unwrap();
        let ghost = NodeRef::new(a.diagram(), NodeId::new(5));

        let err = assembler
            .declare_edge(a, ghost, EdgeAttrs::directed())
            .unwrap_err();
        assert!(matches!(
            err,
            AstrolabeError::Reference(ReferenceError::UnknownNode { ref node, .. }) if node == "n5"
        ));
    }

    #[test]
    fn test_foreign_node_is_rejected() {
        let mut assembler = open("One");
        let stale = assembler.declare_node("a", "server").unwrap();
        assembler.close_diagram().unwrap();

        assembler.open_diagram(DiagramConfig::new("Two")).unwrap();
        let fresh = assembler.declare_node("b", "server").unwrap();
        // Same index, different diagram.
        assert_eq!(stale.id(), fresh.id());

        let err = assembler
            .declare_edge(fresh, stale, EdgeAttrs::directed())
            .unwrap_err();
        assert!(matches!(
            err,
            AstrolabeError::Reference(ReferenceError::ForeignEntity { .. })
        ));
    }

    #[test]
    fn test_edge_after_close_is_state_error() {
        let mut assembler = open("Closed");
        let a = assembler.declare_node("a", "server").unwrap();
        assembler.close_diagram().unwrap();
        let err = assembler
            .declare_edge(a, a, EdgeAttrs::directed())
            .unwrap_err();
        assert!(matches!(
            err,
            AstrolabeError::State(StateError::NoDiagramOpen { .. })
        ));
    }

    #[test]
    fn test_empty_node_set_is_rejected() {
        let mut assembler = open("Empty set");
        let a = assembler.declare_node("a", "server").unwrap();
        let err = assembler
            .declare_edge(Vec::<NodeRef>::new(), a, EdgeAttrs::directed())
            .unwrap_err();
        assert!(matches!(
            err,
            AstrolabeError::Reference(ReferenceError::EmptyEndpoint { .. })
        ));
    }

    #[test]
    fn test_cluster_endpoint_sees_later_members() {
        let mut assembler = open("Late");
        let db = assembler.declare_node("db", "mongodb").unwrap();
        let backend = assembler.open_cluster("Backend").unwrap();
        let first = assembler.declare_node("api 1", "pod").unwrap();
        assembler
            .declare_edge(backend, db, EdgeAttrs::directed())
            .unwrap();
        let second = assembler.declare_node("api 2", "pod").unwrap();
        assembler.close_cluster().unwrap();
        let graph = assembler.close_diagram().unwrap();

        let pairs: Vec<_> = graph
            .expanded_edges()
            .iter()
            .map(|e| (e.source, e.target))
            .collect();
        assert_eq!(pairs, vec![(first.id(), db.id()), (second.id(), db.id())]);
    }

    #[test]
    fn test_scope_cluster_is_balanced() {
        let mut assembler = open("Scoped");
        let mut scope = DiagramScope::new(&mut assembler);
        let (handle, pods) = scope
            .cluster_with_handle("Frontend", |scope| {
                let pods = (0..3)
                    .map(|_| scope.node("Nginx +\nReact App", "pod"))
                    .collect::<Result<Vec<_>, _>>()?;
                scope.cluster("Inner", |scope| scope.node("x", "server"))?;
                Ok(pods)
            })
            .unwrap();
        let svc = scope.node("Backend\nService", "service").unwrap();
        scope.link(&pods, svc).unwrap();
        assert_eq!(assembler.depth(), 0);

        let graph = assembler.close_diagram().unwrap();
        assert_eq!(graph.descendant_nodes(handle.id()).len(), 4);
        assert_eq!(graph.expanded_edges().len(), 3);
    }

    #[test]
    fn test_scope_cluster_error_propagates() {
        let mut assembler = open("Failing");
        let mut scope = DiagramScope::new(&mut assembler);
        let result: Result<(), _> = scope.cluster("Broken", |scope| {
            scope.assembler().close_cluster()?;
            scope.assembler().close_cluster()?;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(AstrolabeError::State(StateError::NoClusterOpen { .. }))
        ));
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        OpenCluster,
        CloseCluster,
        Node,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::OpenCluster),
            Just(Op::CloseCluster),
            Just(Op::Node),
        ]
    }

    proptest! {
        #[test]
        fn fan_out_is_complete_and_source_major(sources in 1usize..6, targets in 1usize..6) {
            let mut assembler = GraphAssembler::new();
            assembler.open_diagram(DiagramConfig::new("Fan")).unwrap();
            let from: Vec<_> = (0..sources)
                .map(|i| assembler.declare_node(format!("s{i}"), "server").unwrap())
                .collect();
            let to: Vec<_> = (0..targets)
                .map(|i| assembler.declare_node(format!("t{i}"), "database").unwrap())
                .collect();
            assembler.declare_edge(&from, &to, EdgeAttrs::directed()).unwrap();
            let graph = assembler.close_diagram().unwrap();

            let expanded = graph.expanded_edges();
            prop_assert_eq!(graph.edge_count(), 1);
            prop_assert_eq!(expanded.len(), sources * targets);
            for (k, edge) in expanded.iter().enumerate() {
                prop_assert_eq!(edge.source, from[k / targets].id());
                prop_assert_eq!(edge.target, to[k % targets].id());
            }
        }

        #[test]
        fn well_formed_sequences_freeze_into_a_tree(ops in prop::collection::vec(op(), 0..40)) {
            let mut assembler = GraphAssembler::new();
            assembler.open_diagram(DiagramConfig::new("Tree")).unwrap();

            let mut expected_depths = Vec::new();
            for op in ops {
                match op {
                    Op::OpenCluster => {
                        assembler.open_cluster("c").unwrap();
                    }
                    Op::CloseCluster => {
                        if assembler.depth() > 0 {
                            assembler.close_cluster().unwrap();
                        } else {
                            prop_assert!(assembler.close_cluster().is_err());
                        }
                    }
                    Op::Node => {
                        let node = assembler.declare_node("n", "server").unwrap();
                        expected_depths.push((node.id(), assembler.depth()));
                    }
                }
            }
            while assembler.depth() > 0 {
                assembler.close_cluster().unwrap();
            }
            let graph = assembler.close_diagram().unwrap();

            prop_assert_eq!(graph.node_count(), expected_depths.len());
            for (node, depth) in expected_depths {
                let path = graph.cluster_path(node);
                prop_assert_eq!(path.len(), depth);
                prop_assert_eq!(path.last().copied(), graph.owner(node));
                for cluster in path {
                    prop_assert!(graph.descendant_nodes(cluster).contains(&node));
                }
            }
            for cluster in graph.clusters() {
                let parent_depth = cluster
                    .parent()
                    .and_then(|parent| graph.cluster(parent))
                    .map_or(0, |parent| parent.depth() + 1);
                prop_assert_eq!(cluster.depth(), parent_depth);
            }
        }
    }
}
