//! Run-scoped state.
//!
//! Everything a run reads or mutates lives in one [`RunContext`]: the frozen
//! registry and topology, the weight model, and the per-node labels and
//! relevant dimensions. Dropping the context discards the run.

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::dimension::{DimensionRegistry, encode_edges};
use crate::model::{ClusterLabel, DimensionSet, NodeId};
use crate::relevance::WeightModel;
use crate::selector;
use crate::source::{DimensionResolver, GraphSource};
use crate::topology::Topology;
use crate::{Error, Result};

/// State of one clustering run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub(crate) topology: Topology,
    pub(crate) registry: DimensionRegistry,
    pub(crate) weights: WeightModel,
    pub(crate) labels: Vec<ClusterLabel>,
    pub(crate) relevant: Vec<DimensionSet>,
}

impl RunContext {
    /// Run every setup stage: encode edges, build the topology, compute
    /// `w0`/`w` and select `Dv0`. Each node starts in its own cluster.
    ///
    /// Returns `Ok(None)` if `cancel` fired along the way.
    pub fn prepare<G, R>(
        source: &G,
        resolver: &R,
        cancel: &CancellationToken,
    ) -> Result<Option<Self>>
    where
        G: GraphSource + ?Sized,
        R: DimensionResolver + ?Sized,
    {
        let node_ids = source.nodes()?;
        let edges = source.edges()?;

        let mut registry = DimensionRegistry::new();
        let encoded = encode_edges(&edges, resolver, &mut registry, cancel)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }
        debug!(edges = encoded.len(), dimensions = registry.len(), "edge dimensions encoded");

        let topology = Topology::build(source, node_ids, &edges, &encoded, cancel)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let weights = WeightModel::initialize(&topology, cancel);
        if cancel.is_cancelled() {
            return Ok(None);
        }
        if !weights.is_complete(&topology) {
            return Err(Error::InvariantViolation("weight model does not cover the topology".into()));
        }
        debug!(pairs = topology.pair_count(), "initial attraction weights computed");

        let labels = topology.node_ids().iter().map(|&id| ClusterLabel::seeded(id)).collect();
        let relevant = vec![DimensionSet::new(); topology.len()];
        let mut ctx = Self { topology, registry, weights, labels, relevant };

        selector::initialize(&mut ctx, cancel)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }
        debug!("initial relevant dimensions selected");

        Ok(Some(ctx))
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &WeightModel {
        &self.weights
    }

    /// Current label of every node, in topology order.
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Current `Dv` of every node, in topology order.
    pub fn relevant(&self) -> &[DimensionSet] {
        &self.relevant
    }

    pub fn label_of(&self, node: NodeId) -> Option<ClusterLabel> {
        self.topology.index_of(node).map(|v| self.labels[v])
    }

    pub fn relevant_dimensions_of(&self, node: NodeId) -> Option<&DimensionSet> {
        self.topology.index_of(node).map(|v| &self.relevant[v])
    }

    /// `w(from, to)`; `None` unless the nodes are adjacent.
    pub fn attraction(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let (v, k) = self.locate(from, to)?;
        Some(self.weights.w(v, k))
    }

    /// `w0(from, to)`; `None` unless the nodes are adjacent.
    pub fn initial_attraction(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let (v, k) = self.locate(from, to)?;
        Some(self.weights.w0(v, k))
    }

    fn locate(&self, from: NodeId, to: NodeId) -> Option<(usize, usize)> {
        let v = self.topology.index_of(from)?;
        let u = self.topology.index_of(to)?;
        Some((v, self.topology.position_of(v, u)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryGraph, SeparatedLabels};

    /// A–B {x}, B–C {x}, C–D {y}, A–C {x}
    fn four_nodes() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        g.add_edge(NodeId(2), NodeId(3), "x");
        g.add_edge(NodeId(3), NodeId(4), "y");
        g.add_edge(NodeId(1), NodeId(3), "x");
        g
    }

    #[test]
    fn test_initial_weights_match_drxor() {
        let g = four_nodes();
        let ctx = RunContext::prepare(&g, &SeparatedLabels::default(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        let (a, b, c, d) = (NodeId(1), NodeId(2), NodeId(3), NodeId(4));

        // A, B, D see a single pattern; C sees {x} and {y}.
        assert_eq!(ctx.initial_attraction(a, b), Some(1.0));
        assert_eq!(ctx.initial_attraction(a, c), Some(1.0));
        assert_eq!(ctx.initial_attraction(b, c), Some(1.0));
        assert_eq!(ctx.initial_attraction(d, c), Some(1.0));
        assert_eq!(ctx.initial_attraction(c, a), Some(0.5));
        assert_eq!(ctx.initial_attraction(c, b), Some(0.5));
        assert_eq!(ctx.initial_attraction(c, d), Some(0.5));
        assert_eq!(ctx.initial_attraction(a, d), None);
    }

    #[test]
    fn test_initial_state() {
        let g = four_nodes();
        let ctx = RunContext::prepare(&g, &SeparatedLabels::default(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        let x = ctx.registry().set_of(["x"]).unwrap();
        let y = ctx.registry().set_of(["y"]).unwrap();
        let (a, c, d) = (NodeId(1), NodeId(3), NodeId(4));

        assert_eq!(ctx.label_of(a), Some(ClusterLabel::seeded(a)));
        assert_eq!(ctx.relevant_dimensions_of(c), Some(&x));
        assert_eq!(ctx.relevant_dimensions_of(d), Some(&y));

        // C became relevant for {x}, so D no longer feels any pull toward it.
        assert_eq!(ctx.attraction(d, c), Some(0.0));
        assert_eq!(ctx.attraction(a, c), Some(1.0));
        assert_eq!(ctx.attraction(c, d), Some(0.5));
    }

    #[test]
    fn test_cancelled_prepare_yields_nothing() {
        let g = four_nodes();
        let token = CancellationToken::new();
        token.cancel();
        assert!(RunContext::prepare(&g, &SeparatedLabels::default(), &token).unwrap().is_none());
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        struct Broken;
        impl GraphSource for Broken {
            fn nodes(&self) -> Result<Vec<NodeId>> { Ok(vec![NodeId(1)]) }
            fn edges(&self) -> Result<Vec<crate::model::Edge>> {
                Ok(vec![crate::model::Edge::new(crate::model::EdgeId(0), NodeId(1), NodeId(2), "x")])
            }
            fn neighbors(&self, _node: NodeId) -> Result<Vec<NodeId>> { Ok(vec![]) }
            fn edges_between(&self, _a: NodeId, _b: NodeId) -> Result<Vec<crate::model::EdgeId>> { Ok(vec![]) }
        }
        let err = RunContext::prepare(&Broken, &SeparatedLabels::default(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownNode(NodeId(2))));
    }
}
