//! Translation of a [`FrozenGraph`] into Graphviz DOT.
//!
//! Cluster containment becomes nested `subgraph cluster_N` blocks, node kinds
//! are styled through the catalog and every edge declaration is expanded to
//! its node-to-node pairs before translation. Node and cluster ids are the
//! typed indices (`n3`, `cluster_1`), so two nodes with the same label never
//! collide.

use std::fmt::Display;

use dot_generator::id;
use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};

use astrolabe_core::{catalog, identifier::NodeId as GraphNodeId};

use crate::{
    config::StyleConfig,
    model::{Cluster, DiagramConfig, ExpandedEdge, FrozenGraph, Member},
};

/// Background colors of nested clusters, cycling with depth.
const CLUSTER_BACKGROUNDS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];
const CLUSTER_PEN_COLOR: &str = "#AEB6BE";
const CLUSTER_FONT_SIZE: u32 = 12;
const NODE_FONT_SIZE: u32 = 13;

/// Escapes a string for use inside a quoted DOT id.
///
/// Quotes and backslashes are backslash-escaped; line breaks become DOT's
/// `\n` centered-line escape.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn quoted(key: &str, value: &str) -> Attribute {
    let value = escape(value);
    Attribute(id!(key), id!(esc value))
}

fn plain(key: &str, value: impl Display) -> Attribute {
    let value = value.to_string();
    Attribute(id!(key), id!(value))
}

fn node_id(node: GraphNodeId) -> NodeId {
    NodeId(id!(node), None)
}

/// Builds the DOT graph for `graph`.
///
/// Diagram-level settings take precedence over `style`; raw graph attributes
/// from [`DiagramConfig::graph_attrs`] are emitted last.
pub fn translate(graph: &FrozenGraph, style: &StyleConfig) -> Graph {
    let config = graph.config();

    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(graph_attributes(config, style))),
        Stmt::GAttribute(GraphAttributes::Node(vec![
            plain("shape", "box"),
            quoted("style", "rounded,filled"),
            quoted("fontname", style.font_name()),
            plain("fontsize", NODE_FONT_SIZE),
            quoted("fontcolor", &style.font_color().graphviz_value()),
        ])),
        Stmt::GAttribute(GraphAttributes::Edge(vec![quoted(
            "color",
            &style.edge_color().graphviz_value(),
        )])),
    ];

    push_members(graph, graph.root_members(), style, &mut stmts);

    stmts.extend(
        graph
            .expanded_edges()
            .iter()
            .map(|edge| Stmt::Edge(edge_stmt(edge))),
    );

    let title = escape(config.title());
    Graph::DiGraph {
        id: id!(esc title),
        strict: false,
        stmts,
    }
}

/// Renders the DOT text for `graph`.
pub fn to_dot_string(graph: &FrozenGraph, style: &StyleConfig) -> String {
    translate(graph, style).print(&mut PrinterContext::default())
}

fn graph_attributes(config: &DiagramConfig, style: &StyleConfig) -> Vec<Attribute> {
    let mut attributes = vec![
        plain("pad", "2.0"),
        plain("splines", "ortho"),
        plain("nodesep", "0.60"),
        plain("ranksep", "0.75"),
        quoted("fontname", style.font_name()),
        plain("fontsize", config.font_size().unwrap_or(style.font_size())),
        quoted("fontcolor", &style.font_color().graphviz_value()),
        quoted("label", config.title()),
        plain("rankdir", config.direction().rankdir()),
    ];

    if let Some(color) = config.background_color().or(style.background_color()) {
        attributes.push(quoted("bgcolor", &color.graphviz_value()));
    }

    attributes.extend(
        config
            .graph_attrs()
            .iter()
            .map(|(key, value)| quoted(key, value)),
    );
    attributes
}

fn push_members(graph: &FrozenGraph, members: &[Member], style: &StyleConfig, out: &mut Vec<Stmt>) {
    for member in members {
        match *member {
            Member::Node(id) => {
                if let Some(node) = graph.node(id) {
                    let descriptor = catalog::lookup(node.kind());
                    out.push(Stmt::Node(Node {
                        id: node_id(id),
                        attributes: vec![
                            quoted("label", node.label()),
                            plain("shape", descriptor.shape()),
                            quoted("fillcolor", descriptor.fill_color()),
                            quoted("fontcolor", descriptor.font_color()),
                            plain("class", descriptor.category().as_str()),
                        ],
                    }));
                }
            }
            Member::Cluster(id) => {
                if let Some(cluster) = graph.cluster(id) {
                    out.push(Stmt::Subgraph(subgraph(graph, cluster, style)));
                }
            }
        }
    }
}

fn subgraph(graph: &FrozenGraph, cluster: &Cluster, style: &StyleConfig) -> Subgraph {
    let background = CLUSTER_BACKGROUNDS[cluster.depth() % CLUSTER_BACKGROUNDS.len()];

    let mut stmts: Vec<Stmt> = [
        quoted("label", cluster.label()),
        plain("labeljust", "l"),
        plain("style", "rounded"),
        quoted("pencolor", CLUSTER_PEN_COLOR),
        quoted("bgcolor", background),
        quoted("fontname", style.font_name()),
        plain("fontsize", CLUSTER_FONT_SIZE),
    ]
    .into_iter()
    .map(Stmt::Attribute)
    .collect();

    push_members(graph, cluster.members(), style, &mut stmts);

    let cluster_id = cluster.id();
    Subgraph {
        id: id!(cluster_id),
        stmts,
    }
}

fn edge_stmt(edge: &ExpandedEdge<'_>) -> Edge {
    let attrs = edge.attrs;

    let mut attributes = vec![plain("dir", attrs.direction().dir())];
    if let Some(color) = attrs.color() {
        attributes.push(quoted("color", &color.graphviz_value()));
    }
    if let Some(line) = attrs.style() {
        attributes.push(plain("style", line.as_str()));
    }
    if let Some(label) = attrs.label() {
        attributes.push(quoted("label", label));
    }

    Edge {
        ty: EdgeTy::Pair(
            Vertex::N(node_id(edge.source)),
            Vertex::N(node_id(edge.target)),
        ),
        attributes,
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{GraphAssembler, model::EdgeAttrs};

    proptest! {
        #[test]
        fn fan_out_emits_every_pair(sources in 1usize..5, targets in 1usize..5) {
            let mut assembler = GraphAssembler::new();
            assembler.open_diagram(DiagramConfig::new("Fan")).unwrap();
            let from: Vec<_> = (0..sources)
                .map(|i| assembler.declare_node(format!("s{i}"), "server").unwrap())
                .collect();
            let to: Vec<_> = (0..targets)
                .map(|i| assembler.declare_node(format!("t{i}"), "database").unwrap())
                .collect();
            assembler.declare_edge(from, to, EdgeAttrs::directed()).unwrap();
            let graph = assembler.close_diagram().unwrap();

            let Graph::DiGraph { stmts, .. } = translate(&graph, &StyleConfig::default()) else {
                panic!("expected a digraph");
            };
            let edges = stmts.iter().filter(|stmt| matches!(stmt, Stmt::Edge(_))).count();
            prop_assert_eq!(edges, sources * targets);
        }

        #[test]
        fn escaped_labels_have_no_raw_quotes(label in ".*") {
            let escaped = escape(&label);
            prop_assert!(!escaped.contains('\n'));
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    prop_assert!(chars.next().is_some());
                } else {
                    prop_assert_ne!(c, '"');
                }
            }
        }
    }
}
