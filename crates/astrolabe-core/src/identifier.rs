//! Typed identifiers for diagram entities.
//!
//! Entities are addressed by dense indices that are only meaningful inside the
//! diagram that created them. Every diagram session additionally receives a
//! process-unique [`DiagramId`] so that a handle leaking from one diagram into
//! another can be detected instead of silently aliasing a different entity.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Source of fresh [`DiagramId`] values.
static NEXT_DIAGRAM: AtomicU64 = AtomicU64::new(1);

/// Identity of one diagram build session.
///
/// Two sessions never share an id within a process, even when they declare
/// diagrams with the same title.
///
/// # Examples
///
/// ```
/// use astrolabe_core::identifier::DiagramId;
///
/// let first = DiagramId::fresh();
/// let second = DiagramId::fresh();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(u64);

impl DiagramId {
    /// Allocates a new, never before returned session id.
    pub fn fresh() -> Self {
        Self(NEXT_DIAGRAM.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram#{}", self.0)
    }
}

/// Index of a node within its diagram.
///
/// The [`Display`](fmt::Display) form (`n0`, `n1`, ...) is used verbatim as the
/// node identifier in the emitted DOT source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Wraps a raw node index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index into the diagram's node table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Index of a cluster within its diagram.
///
/// Displays as `cluster_<index>`; Graphviz only draws a boundary around
/// subgraphs whose name starts with `cluster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// Wraps a raw cluster index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index into the diagram's cluster table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}", self.0)
    }
}

/// Index of an edge declaration within its diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Wraps a raw edge index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index into the diagram's edge list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_diagram_ids_are_unique() {
        let ids: HashSet<DiagramId> = (0..64).map(|_| DiagramId::fresh()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(NodeId::new(3).to_string(), "n3");
        assert_eq!(ClusterId::new(0).to_string(), "cluster_0");
        assert_eq!(EdgeId::new(12).to_string(), "e12");
    }

    #[test]
    fn test_index_round_trip() {
        assert_eq!(NodeId::new(7).index(), 7);
        assert_eq!(ClusterId::new(2).index(), 2);
        assert_eq!(EdgeId::new(9).index(), 9);
    }

    #[test]
    fn test_ordering_follows_index() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert!(ClusterId::new(4) > ClusterId::new(0));
    }
}
