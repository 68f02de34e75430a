//! # Relevance & Attraction Weights
//!
//! - **DRxOR** scores how much of a node's neighborhood diversity a candidate
//!   dimension set subsumes.
//! - **w0(v, u)** is the DRxOR of `D(v, u)` within `v`'s neighborhood,
//!   computed once.
//! - **w(v, u)** starts as `w0(v, u)` and is revised whenever `u`'s relevant
//!   dimensions change: `w(v, u) = w0(v, u) · J(Du, D(v, u))`.
//!
//! Weights are directed. `w(v, u)` is the pull `v` feels toward `u`.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::trace;

use crate::cancel::CancellationToken;
use crate::model::DimensionSet;
use crate::topology::Topology;
use crate::{Error, Result};

// ============================================================================
// Metrics
// ============================================================================

/// DRxOR of `candidate` over the distinct neighborhood patterns `neighborhood`.
///
/// With at most one distinct pattern nothing can be discriminated and the
/// result is 1. Otherwise it is the fraction of patterns `s` with
/// `s ⊆ candidate`.
pub fn drxor(candidate: &DimensionSet, neighborhood: &[&DimensionSet]) -> f64 {
    if neighborhood.len() <= 1 {
        return 1.0;
    }
    let subsumed = neighborhood.iter().filter(|s| s.is_subset(candidate)).count();
    subsumed as f64 / neighborhood.len() as f64
}

/// Jaccard coefficient `|a ∩ b| / |a ∪ b|`, with `J(∅, ∅) = 0`.
pub fn jaccard(a: &DimensionSet, b: &DimensionSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    a.intersection_len(b) as f64 / union as f64
}

/// Distinct `D(v, u)` over all neighbors of `v`, in first-seen order.
pub fn neighborhood_patterns(topology: &Topology, v: usize) -> Vec<&DimensionSet> {
    let mut seen: HashSet<&DimensionSet> = HashSet::new();
    topology
        .neighbors(v)
        .iter()
        .map(|n| topology.pair(n.pair))
        .filter(|dims| seen.insert(*dims))
        .collect()
}

// ============================================================================
// WeightModel
// ============================================================================

type Row = SmallVec<[f64; 8]>;

/// `w0` and `w` for every directed adjacency, aligned with
/// [`Topology::neighbors`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightModel {
    w0: Vec<Row>,
    w: Vec<Row>,
}

impl WeightModel {
    /// Compute `w0` for every node and seed `w` from it.
    ///
    /// Stops early once `cancel` fires; the partial model must then be
    /// discarded.
    pub fn initialize(topology: &Topology, cancel: &CancellationToken) -> Self {
        let mut w0 = Vec::with_capacity(topology.len());

        for v in 0..topology.len() {
            if cancel.is_cancelled() {
                break;
            }
            let patterns = neighborhood_patterns(topology, v);
            let mut cache: HashMap<&DimensionSet, f64> = HashMap::with_capacity(patterns.len());

            let row: Row = topology
                .neighbors(v)
                .iter()
                .map(|n| {
                    let dims = topology.pair(n.pair);
                    *cache.entry(dims).or_insert_with(|| drxor(dims, &patterns))
                })
                .collect();
            w0.push(row);
        }

        let w = w0.clone();
        Self { w0, w }
    }

    /// `w0(v, u)` where `u` is the `k`-th neighbor of `v`.
    pub fn w0(&self, v: usize, k: usize) -> f64 {
        self.w0[v][k]
    }

    /// `w(v, u)` where `u` is the `k`-th neighbor of `v`.
    pub fn w(&self, v: usize, k: usize) -> f64 {
        self.w[v][k]
    }

    /// Current `w(v, ·)` aligned with `v`'s adjacency.
    pub fn row(&self, v: usize) -> &[f64] {
        &self.w[v]
    }

    pub fn initial_row(&self, v: usize) -> &[f64] {
        &self.w0[v]
    }

    /// Every node has a row matching its adjacency.
    pub fn is_complete(&self, topology: &Topology) -> bool {
        self.w0.len() == topology.len()
            && (0..topology.len()).all(|v| {
                let deg = topology.neighbors(v).len();
                self.w0[v].len() == deg && self.w[v].len() == deg
            })
    }

    /// `v`'s relevant dimensions became `dv`: set `w(u, v) = w0(u, v) · J(dv, D(v, u))`
    /// for every neighbor `u`. `w(v, ·)` is left untouched.
    pub fn revise(&mut self, topology: &Topology, v: usize, dv: &DimensionSet) -> Result<()> {
        for n in topology.neighbors(v) {
            let similarity = jaccard(dv, topology.pair(n.pair));
            let base = self.w0.get(n.node).and_then(|row| row.get(n.mirror)).copied().ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "no w0 entry for {} toward {}",
                    topology.node_id(n.node),
                    topology.node_id(v)
                ))
            })?;
            let slot = self.w.get_mut(n.node).and_then(|row| row.get_mut(n.mirror)).ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "no w entry for {} toward {}",
                    topology.node_id(n.node),
                    topology.node_id(v)
                ))
            })?;
            *slot = base * similarity;
            trace!(from = %topology.node_id(n.node), to = %topology.node_id(v), w = *slot, "revised attraction");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(ids: &[u32]) -> DimensionSet {
        DimensionSet::from_ids(ids.iter().copied())
    }

    #[test]
    fn test_drxor_single_pattern_is_one() {
        let x = set(&[0]);
        assert_eq!(drxor(&set(&[5]), &[&x]), 1.0);
        assert_eq!(drxor(&set(&[]), &[]), 1.0);
    }

    #[test]
    fn test_drxor_fraction_subsumed() {
        let x = set(&[0]);
        let y = set(&[1]);
        let xy = set(&[0, 1]);
        let n = [&x, &y, &xy];
        assert!((drxor(&x, &n) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(drxor(&xy, &n), 1.0);
        assert_eq!(drxor(&set(&[2]), &n), 0.0);
    }

    #[test]
    fn test_jaccard_values() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&[0, 1]), &set(&[0, 1])), 1.0);
        assert_eq!(jaccard(&set(&[0, 1]), &set(&[1, 2])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&[0]), &set(&[])), 0.0);
    }

    fn arb_set() -> impl Strategy<Value = DimensionSet> {
        proptest::collection::vec(0u32..130, 0..8).prop_map(DimensionSet::from_ids)
    }

    proptest! {
        #[test]
        fn prop_jaccard_symmetric_and_bounded(a in arb_set(), b in arb_set()) {
            let j = jaccard(&a, &b);
            prop_assert_eq!(j, jaccard(&b, &a));
            prop_assert!((0.0..=1.0).contains(&j));
        }

        #[test]
        fn prop_jaccard_self_is_one(a in arb_set()) {
            prop_assume!(!a.is_empty());
            prop_assert_eq!(jaccard(&a, &a), 1.0);
        }

        #[test]
        fn prop_drxor_bounded(d in arb_set(), s in proptest::collection::vec(arb_set(), 1..6)) {
            let mut distinct: Vec<&DimensionSet> = Vec::new();
            for p in &s {
                if !distinct.contains(&p) {
                    distinct.push(p);
                }
            }
            let r = drxor(&d, &distinct);
            prop_assert!((0.0..=1.0).contains(&r));
            if distinct.len() <= 1 {
                prop_assert_eq!(r, 1.0);
            }
        }
    }
}
