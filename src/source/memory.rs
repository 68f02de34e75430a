//! In-memory multigraph.
//!
//! This is the reference implementation of `GraphSource`. Parallel edges
//! between the same pair are kept as separate edges; the encoder collapses
//! them into one dimension set per pair.
//!
//! ## Limitations
//!
//! - **Append-only**: nodes and edges cannot be removed.
//! - **Self-loops are stored but invisible to traversal**: `neighbors()`
//!   never reports a node as its own neighbor.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::model::*;
use crate::{Error, Result};
use super::GraphSource;

// ============================================================================
// MemoryGraph
// ============================================================================

/// In-memory undirected multigraph with labelled edges.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    nodes: Vec<Node>,
    /// node_id → position in `nodes`
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    /// node_id → incident edge ids (a self-loop is listed once)
    adjacency: HashMap<NodeId, SmallVec<[EdgeId; 4]>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns false if it already existed.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        self.insert_node(Node::new(id))
    }

    /// Add a node with a display name. Returns false if it already existed.
    pub fn add_named_node(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        self.insert_node(Node::new(id).with_name(name))
    }

    fn insert_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id, self.nodes.len());
        self.adjacency.insert(node.id, SmallVec::new());
        self.nodes.push(node);
        true
    }

    /// Add an edge labelled with its dimensions. Missing endpoints are created.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, label: impl Into<String>) -> EdgeId {
        self.add_node(src);
        self.add_node(dst);

        let id = EdgeId(self.edges.len() as u64);
        self.edges.push(Edge::new(id, src, dst, label));

        self.adjacency.entry(src).or_default().push(id);
        if src != dst {
            self.adjacency.entry(dst).or_default().push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn incident(&self, node: NodeId) -> Result<&SmallVec<[EdgeId; 4]>> {
        self.adjacency.get(&node).ok_or(Error::UnknownNode(node))
    }
}

// ============================================================================
// GraphSource impl
// ============================================================================

impl GraphSource for MemoryGraph {
    fn nodes(&self) -> Result<Vec<NodeId>> {
        Ok(self.nodes.iter().map(|n| n.id).collect())
    }

    fn edges(&self) -> Result<Vec<Edge>> {
        Ok(self.edges.clone())
    }

    fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut result: Vec<NodeId> = Vec::new();
        for eid in self.incident(node)? {
            let edge = &self.edges[eid.0 as usize];
            if edge.is_self_loop() {
                continue;
            }
            if let Some(other) = edge.other_node(node) {
                if !result.contains(&other) {
                    result.push(other);
                }
            }
        }
        Ok(result)
    }

    fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<EdgeId>> {
        if !self.node_index.contains_key(&b) {
            return Err(Error::UnknownNode(b));
        }
        Ok(self.incident(a)?
            .iter()
            .copied()
            .filter(|eid| self.edges[eid.0 as usize].other_node(a) == Some(b))
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
