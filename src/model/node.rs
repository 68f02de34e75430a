//! Node in the host graph.

use serde::{Deserialize, Serialize};

/// Opaque, stable node identifier supplied by the host graph.
///
/// Used both to seed the node's initial cluster label and to correlate
/// results back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as held by [`MemoryGraph`](crate::source::MemoryGraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Display name; defaults to the id.
    pub name: String,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self { id, name: id.to_string() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
