//! # Graph Source Contract
//!
//! The boundary between the clustering engine and whatever hosts the graph.
//! The engine only ever *reads* through these traits, and only during the
//! setup phase of a run; the graph must not change while a run is in flight.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`GraphSource`] | Enumerates nodes, edges and adjacency |
//! | [`DimensionResolver`] | Maps an edge to its dimension names |
//! | [`SeparatedLabels`] | Resolver splitting the edge label on a separator |
//! | [`MemoryGraph`] | In-memory multigraph, the reference `GraphSource` |

pub mod memory;

use crate::model::{Edge, EdgeId, NodeId};
use crate::Result;

pub use memory::MemoryGraph;

// ============================================================================
// GraphSource Trait
// ============================================================================

/// Read-only view of the host graph.
///
/// Traversal is undirected. Implementations report failures as
/// [`Error::Source`](crate::Error::Source) or [`Error::UnknownNode`](crate::Error::UnknownNode).
pub trait GraphSource {
    /// All nodes, in a stable order. The order fixes cluster naming.
    fn nodes(&self) -> Result<Vec<NodeId>>;

    /// All edges, in a stable order. The order fixes dimension ids.
    fn edges(&self) -> Result<Vec<Edge>>;

    /// Distinct neighbors of `node`, excluding `node` itself.
    fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>>;

    /// Every edge connecting `a` and `b`, in either direction.
    fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<EdgeId>>;
}

impl<G: GraphSource + ?Sized> GraphSource for &G {
    fn nodes(&self) -> Result<Vec<NodeId>> { (**self).nodes() }
    fn edges(&self) -> Result<Vec<Edge>> { (**self).edges() }
    fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> { (**self).neighbors(node) }
    fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<EdgeId>> { (**self).edges_between(a, b) }
}

// ============================================================================
// Dimension resolution
// ============================================================================

/// Yields the dimension names an edge belongs to.
///
/// An empty result, or a blank name, fails the run.
pub trait DimensionResolver {
    fn dimensions(&self, edge: &Edge) -> Vec<String>;
}

impl<F> DimensionResolver for F
where
    F: Fn(&Edge) -> Vec<String>,
{
    fn dimensions(&self, edge: &Edge) -> Vec<String> {
        self(edge)
    }
}

/// Splits `Edge::label` on a separator: `"d0,d2,d5"` → `["d0", "d2", "d5"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatedLabels {
    separator: String,
    trim: bool,
}

impl SeparatedLabels {
    pub fn new(separator: impl Into<String>) -> Self {
        Self { separator: separator.into(), trim: true }
    }

    /// Keep whitespace around names as-is.
    pub fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for SeparatedLabels {
    fn default() -> Self {
        Self::new(",")
    }
}

impl DimensionResolver for SeparatedLabels {
    fn dimensions(&self, edge: &Edge) -> Vec<String> {
        if edge.label.trim().is_empty() {
            return Vec::new();
        }
        edge.label
            .split(self.separator.as_str())
            .map(|name| if self.trim { name.trim() } else { name })
            .map(str::to_string)
            .collect()
    }
}
