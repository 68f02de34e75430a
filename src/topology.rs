//! Encoded graph snapshot.
//!
//! Nodes are mapped to dense indices in `GraphSource::nodes()` order and every
//! adjacent pair carries exactly one dimension set `D(v,u)`. Each adjacency
//! entry also records where the reverse entry lives, so `w(u, v)` can be
//! reached from `v` without a search.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::cancel::CancellationToken;
use crate::dimension::{EdgeDimensions, pair_dimensions};
use crate::model::{DimensionSet, Edge, NodeId};
use crate::source::GraphSource;
use crate::{Error, Result};

/// One directed view of an undirected adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Dense index of the neighbor `u`.
    pub node: usize,
    /// Index into [`Topology::pair`].
    pub pair: usize,
    /// Position of `v` in `u`'s adjacency list.
    pub mirror: usize,
}

pub type Adjacency = SmallVec<[Neighbor; 8]>;

/// Immutable, index-based view of the graph for one run.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    node_ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Adjacency>,
    pairs: Vec<DimensionSet>,
}

impl Topology {
    /// Build the snapshot from the host graph and the encoded edges.
    ///
    /// Fails if an edge or a neighbor references a node `nodes()` did not
    /// list, if an adjacency has no connecting edge, or if the source reports
    /// an asymmetric adjacency.
    pub fn build<G>(
        source: &G,
        node_ids: Vec<NodeId>,
        edges: &[Edge],
        encoded: &EdgeDimensions,
        cancel: &CancellationToken,
    ) -> Result<Self>
    where
        G: GraphSource + ?Sized,
    {
        let mut index = HashMap::with_capacity(node_ids.len());
        for (i, &id) in node_ids.iter().enumerate() {
            if index.insert(id, i).is_some() {
                return Err(Error::Source(format!("node {id} listed twice")));
            }
        }
        for edge in edges {
            for end in [edge.src, edge.dst] {
                if !index.contains_key(&end) {
                    return Err(Error::UnknownNode(end));
                }
            }
        }

        let mut adjacency: Vec<Adjacency> = vec![Adjacency::new(); node_ids.len()];
        let mut pairs = Vec::new();
        let mut pair_index: HashMap<(usize, usize), usize> = HashMap::new();
        // (v, u) → position of u in v's adjacency
        let mut position: HashMap<(usize, usize), usize> = HashMap::new();

        for (v, &vid) in node_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            for uid in source.neighbors(vid)? {
                if uid == vid {
                    continue;
                }
                let u = *index.get(&uid).ok_or(Error::UnknownNode(uid))?;
                if position.contains_key(&(v, u)) {
                    continue;
                }

                let key = (v.min(u), v.max(u));
                let pair = match pair_index.get(&key) {
                    Some(&p) => p,
                    None => {
                        let edge_ids = source.edges_between(vid, uid)?;
                        pairs.push(pair_dimensions(vid, uid, &edge_ids, encoded)?);
                        pair_index.insert(key, pairs.len() - 1);
                        pairs.len() - 1
                    }
                };

                position.insert((v, u), adjacency[v].len());
                adjacency[v].push(Neighbor { node: u, pair, mirror: usize::MAX });
            }
        }

        if cancel.is_cancelled() {
            // Partial snapshot; the caller discards it.
            return Ok(Self { node_ids, index, adjacency, pairs });
        }

        for v in 0..adjacency.len() {
            for k in 0..adjacency[v].len() {
                let u = adjacency[v][k].node;
                let mirror = *position.get(&(u, v)).ok_or_else(|| {
                    Error::InvariantViolation(format!(
                        "{} lists {} as a neighbor but not the reverse",
                        node_ids[v], node_ids[u]
                    ))
                })?;
                adjacency[v][k].mirror = mirror;
            }
        }

        Ok(Self { node_ids, index, adjacency, pairs })
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Number of distinct adjacent pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn node_id(&self, v: usize) -> NodeId {
        self.node_ids[v]
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn neighbors(&self, v: usize) -> &[Neighbor] {
        &self.adjacency[v]
    }

    pub fn pair(&self, pair: usize) -> &DimensionSet {
        &self.pairs[pair]
    }

    /// `D(v, u)` for the `k`-th neighbor of `v`.
    pub fn dimensions_to(&self, v: usize, k: usize) -> &DimensionSet {
        &self.pairs[self.adjacency[v][k].pair]
    }

    /// Position of `u` in `v`'s adjacency, if adjacent.
    pub fn position_of(&self, v: usize, u: usize) -> Option<usize> {
        self.adjacency[v].iter().position(|n| n.node == u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionRegistry, encode_edges};
    use crate::source::{MemoryGraph, SeparatedLabels};

    fn build(g: &MemoryGraph) -> Topology {
        let token = CancellationToken::new();
        let edges = g.edges().unwrap();
        let mut reg = DimensionRegistry::new();
        let enc = encode_edges(&edges, &SeparatedLabels::default(), &mut reg, &token).unwrap();
        Topology::build(g, g.nodes().unwrap(), &edges, &enc, &token).unwrap()
    }

    #[test]
    fn test_pairs_are_shared_and_mirrored() {
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(10), NodeId(20), "x");
        g.add_edge(NodeId(20), NodeId(10), "y");
        g.add_edge(NodeId(20), NodeId(30), "x");
        let t = build(&g);

        assert_eq!(t.len(), 3);
        assert_eq!(t.pair_count(), 2);
        assert_eq!(*t.dimensions_to(0, 0), DimensionSet::from_ids([0, 1]));

        for v in 0..t.len() {
            for (k, n) in t.neighbors(v).iter().enumerate() {
                let back = t.neighbors(n.node)[n.mirror];
                assert_eq!(back.node, v);
                assert_eq!(back.pair, n.pair);
                assert_eq!(t.position_of(v, n.node), Some(k));
            }
        }
    }

    #[test]
    fn test_isolated_node_has_no_neighbors() {
        let mut g = MemoryGraph::new();
        g.add_node(NodeId(1));
        let t = build(&g);
        assert!(t.neighbors(0).is_empty());
        assert_eq!(t.index_of(NodeId(1)), Some(0));
    }
}
