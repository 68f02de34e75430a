//! Relevant-dimension selection.
//!
//! `Dv` is the set of dimensions node `v`'s community membership currently
//! depends on. It is chosen once from the static `w0` structure and then
//! refined after every propagation step from the winning neighbors.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::cancel::CancellationToken;
use crate::engine::RunContext;
use crate::model::DimensionSet;
use crate::relevance::WeightModel;
use crate::topology::Topology;
use crate::Result;

/// `Dv0`: union of the neighborhood patterns `D(v, u)` whose summed `w0(v, u)`
/// is maximal. `∅` for a node without neighbors.
pub fn initial_relevant_dimensions(topology: &Topology, weights: &WeightModel, v: usize) -> DimensionSet {
    let neighbors = topology.neighbors(v);
    if neighbors.is_empty() {
        return DimensionSet::new();
    }

    let mut order: SmallVec<[&DimensionSet; 8]> = SmallVec::new();
    let mut sums: HashMap<&DimensionSet, f64> = HashMap::new();
    for (k, n) in neighbors.iter().enumerate() {
        let dims = topology.pair(n.pair);
        let sum = sums.entry(dims).or_insert_with(|| {
            order.push(dims);
            0.0
        });
        *sum += weights.w0(v, k);
    }

    let max = sums.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut dv = DimensionSet::new();
    for dims in order {
        if sums[dims] == max {
            dv.union_with(dims);
        }
    }
    dv
}

/// Select `Dv0` for every node and revise the weights toward it.
pub fn initialize(ctx: &mut RunContext, cancel: &CancellationToken) -> Result<()> {
    for v in 0..ctx.topology.len() {
        if cancel.is_cancelled() {
            break;
        }
        ctx.relevant[v] = initial_relevant_dimensions(&ctx.topology, &ctx.weights, v);
        ctx.weights.revise(&ctx.topology, v, &ctx.relevant[v])?;
    }
    Ok(())
}

/// Candidate `Dv` given the winning neighbors (positions in `v`'s adjacency):
/// `(∪ Du) ∩ (∪ D(v, u))`. `None` when there are no winners.
pub fn candidate(
    topology: &Topology,
    relevant: &[DimensionSet],
    v: usize,
    winners: &[usize],
) -> Option<DimensionSet> {
    if winners.is_empty() {
        return None;
    }
    let mut du = DimensionSet::new();
    let mut connecting = DimensionSet::new();
    for &k in winners {
        let n = topology.neighbors(v)[k];
        du.union_with(&relevant[n.node]);
        connecting.union_with(topology.pair(n.pair));
    }
    du.intersect_with(&connecting);
    Some(du)
}

/// Refine `Dv` from the winning neighbors. Weights toward `v` are revised only
/// if `Dv` actually changed. Returns whether it did.
pub fn update(ctx: &mut RunContext, v: usize, winners: &[usize]) -> Result<bool> {
    let Some(next) = candidate(&ctx.topology, &ctx.relevant, v, winners) else {
        return Ok(false);
    };
    if next.symmetric_difference_len(&ctx.relevant[v]) == 0 {
        return Ok(false);
    }
    ctx.relevant[v] = next;
    ctx.weights.revise(&ctx.topology, v, &ctx.relevant[v])?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;
    use crate::source::{MemoryGraph, SeparatedLabels};

    fn prepare(g: &MemoryGraph) -> RunContext {
        RunContext::prepare(g, &SeparatedLabels::default(), &CancellationToken::new())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_initial_dv_takes_heaviest_pattern() {
        // Hub 1: {x} to 2 and 3, {y} to 4.
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        g.add_edge(NodeId(1), NodeId(3), "x");
        g.add_edge(NodeId(1), NodeId(4), "y");
        let ctx = prepare(&g);

        let x = ctx.registry.set_of(["x"]).unwrap();
        assert_eq!(ctx.relevant_dimensions_of(NodeId(1)), Some(&x));
    }

    #[test]
    fn test_initial_dv_unions_ties() {
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        g.add_edge(NodeId(1), NodeId(3), "y");
        let ctx = prepare(&g);

        let xy = ctx.registry.set_of(["x", "y"]).unwrap();
        assert_eq!(ctx.relevant_dimensions_of(NodeId(1)), Some(&xy));
    }

    #[test]
    fn test_isolated_node_has_empty_dv() {
        let mut g = MemoryGraph::new();
        g.add_node(NodeId(1));
        let ctx = prepare(&g);
        assert_eq!(ctx.relevant_dimensions_of(NodeId(1)), Some(&DimensionSet::new()));
    }

    #[test]
    fn test_candidate_filters_unconnected_dimensions() {
        // 1 -x- 2, 2 -y- 3: node 2 starts relevant for {x,y}, but only x connects it to 1.
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        g.add_edge(NodeId(2), NodeId(3), "y");
        let ctx = prepare(&g);

        let v = ctx.topology.index_of(NodeId(1)).unwrap();
        let c = candidate(&ctx.topology, &ctx.relevant, v, &[0]).unwrap();
        assert_eq!(c, ctx.registry.set_of(["x"]).unwrap());
        assert!(candidate(&ctx.topology, &ctx.relevant, v, &[]).is_none());
    }

    #[test]
    fn test_update_without_winners_is_noop() {
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        let mut ctx = prepare(&g);
        let before = ctx.weights.clone();
        assert!(!update(&mut ctx, 0, &[]).unwrap());
        assert_eq!(ctx.weights, before);
    }

    #[test]
    fn test_update_revises_only_incoming_weights() {
        let mut g = MemoryGraph::new();
        g.add_edge(NodeId(1), NodeId(2), "x");
        g.add_edge(NodeId(2), NodeId(3), "y");
        let mut ctx = prepare(&g);

        let v = ctx.topology.index_of(NodeId(2)).unwrap();
        let outgoing = ctx.weights.row(v).to_vec();
        let k = ctx.topology.position_of(v, ctx.topology.index_of(NodeId(1)).unwrap()).unwrap();

        // Node 2 starts with {x,y}; winning neighbor 1 narrows it to {x}.
        assert!(update(&mut ctx, v, &[k]).unwrap());
        assert_eq!(ctx.weights.row(v), outgoing.as_slice());
        assert_eq!(ctx.attraction(NodeId(1), NodeId(2)), Some(1.0));
        assert_eq!(ctx.attraction(NodeId(3), NodeId(2)), Some(0.0));
    }
}
