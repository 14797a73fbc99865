//! Pure-Rust rendering through the `layout-rs` engine.
//!
//! Needs no external executable but only produces SVG. Clusters are flattened
//! (their nodes are drawn, their boxes are not) and self-loops are skipped.

use std::collections::HashMap;

use layout::{
    backends::svg::SVGWriter,
    core::{base::Orientation, geometry::Point, style::StyleAttr},
    std_shapes::shapes::{Arrow, Element, ShapeKind},
    topo::layout::VisualGraph,
};
use log::{debug, warn};

use astrolabe_core::attributes::{Direction, EdgeDirection};

use super::{
    OutputFormat,
    backend::{Backend, BackendError, RenderRequest},
};

const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;
const PADDING: f64 = 24.0;

const EMPTY_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="0" height="0"></svg>"#;

/// Backend laying out diagrams in-process with `layout-rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinBackend;

impl BuiltinBackend {
    pub fn new() -> Self {
        Self
    }
}

fn orientation(direction: Direction) -> Orientation {
    if direction.is_horizontal() {
        Orientation::LeftToRight
    } else {
        Orientation::TopToBottom
    }
}

/// Box size fitting every line of `label`.
fn label_size(label: &str) -> Point {
    let lines: Vec<&str> = label.lines().collect();
    let widest = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    Point::new(
        widest as f64 * CHAR_WIDTH + PADDING,
        lines.len().max(1) as f64 * LINE_HEIGHT + PADDING,
    )
}

impl Backend for BuiltinBackend {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn supports(&self, format: OutputFormat) -> bool {
        format == OutputFormat::Svg
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, BackendError> {
        let format = request.format();
        if !self.supports(format) {
            return Err(BackendError::new(format!(
                "cannot produce {format}, only svg is supported"
            )));
        }

        let graph = request.graph();
        if graph.node_count() == 0 {
            return Ok(EMPTY_SVG.as_bytes().to_vec());
        }

        let orientation = orientation(graph.config().direction());
        let mut visual = VisualGraph::new(orientation);

        let handles: HashMap<_, _> = graph
            .nodes()
            .iter()
            .map(|node| {
                let shape = ShapeKind::new_box(node.label());
                let element = Element::create(
                    shape,
                    StyleAttr::simple(),
                    orientation,
                    label_size(node.label()),
                );
                (node.id(), visual.add_node(element))
            })
            .collect();

        for edge in graph.expanded_edges() {
            if edge.source == edge.target {
                warn!(title = graph.title(), node:% = edge.source; "Skipping self-loop");
                continue;
            }

            let (from, to) = match edge.attrs.direction() {
                EdgeDirection::Back => (edge.target, edge.source),
                _ => (edge.source, edge.target),
            };
            let arrow = Arrow::simple(edge.attrs.label().unwrap_or(""));
            visual.add_edge(arrow, handles[&from], handles[&to]);
        }

        debug!(
            title = graph.title(),
            nodes = graph.node_count(),
            clusters = graph.cluster_count();
            "Laying out diagram with builtin engine"
        );

        let mut writer = SVGWriter::new();
        visual.do_it(false, false, false, &mut writer);
        Ok(writer.finalize().into_bytes())
    }
}
