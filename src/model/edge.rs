//! Edge between two nodes, carrying the raw dimension label.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An edge of the host graph. Undirected for traversal purposes.
///
/// `label` is the raw dimension string (e.g. `"work,family"`). How it maps to
/// dimension names is up to the [`DimensionResolver`](crate::source::DimensionResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub src: NodeId,
    pub dst: NodeId,
    pub label: String,
}

impl Edge {
    pub fn new(id: EdgeId, src: NodeId, dst: NodeId, label: impl Into<String>) -> Self {
        Self { id, src, dst, label: label.into() }
    }

    /// The "other" end of the edge from the given node.
    pub fn other_node(&self, from: NodeId) -> Option<NodeId> {
        if from == self.src { Some(self.dst) }
        else if from == self.dst { Some(self.src) }
        else { None }
    }

    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }
}
