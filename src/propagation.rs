//! # Label Propagation Loop
//!
//! Asynchronous, randomized sweeps over all nodes. Each pass visits the nodes
//! in a fresh uniform permutation; every node adopts the label with the
//! highest combined attraction among its neighbors, and its update is visible
//! to the nodes visited after it in the same pass.
//!
//! ```text
//!   ┌──────────────┐   shuffle   ┌──────────────────────────────┐
//!   │  unstable    │────────────►│ for v: dominant → Dv → label │
//!   └──────────────┘             └──────────────┬───────────────┘
//!          ▲          not stable                │
//!          └────────────────────── convergence test
//!                                               │ stable
//!                                               ▼
//!                                         fixed point
//! ```

use hashbrown::HashMap;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::engine::RunContext;
use crate::model::ClusterLabel;
use crate::selector;
use crate::{Error, Result};

// ============================================================================
// Dominant cluster
// ============================================================================

/// The label a node should adopt, with the neighbors carrying it.
#[derive(Debug, Clone, PartialEq)]
pub struct DominantCluster {
    pub label: ClusterLabel,
    /// Positions in the node's adjacency of the neighbors labelled `label`.
    pub winners: SmallVec<[usize; 8]>,
}

/// Summed `w(v, u)` per neighbor label, in first-seen neighbor order.
pub fn combined_weights(ctx: &RunContext, v: usize) -> SmallVec<[(ClusterLabel, f64); 8]> {
    let mut sums: SmallVec<[(ClusterLabel, f64); 8]> = SmallVec::new();
    let mut slot: HashMap<ClusterLabel, usize> = HashMap::new();
    let row = ctx.weights.row(v);

    for (k, n) in ctx.topology.neighbors(v).iter().enumerate() {
        let label = ctx.labels[n.node];
        match slot.get(&label) {
            Some(&i) => sums[i].1 += row[k],
            None => {
                slot.insert(label, sums.len());
                sums.push((label, row[k]));
            }
        }
    }
    sums
}

fn winners_for(ctx: &RunContext, v: usize, label: ClusterLabel) -> SmallVec<[usize; 8]> {
    ctx.topology
        .neighbors(v)
        .iter()
        .enumerate()
        .filter(|(_, n)| ctx.labels[n.node] == label)
        .map(|(k, _)| k)
        .collect()
}

fn max_weight(sums: &[(ClusterLabel, f64)]) -> f64 {
    sums.iter().map(|&(_, w)| w).fold(f64::NEG_INFINITY, f64::max)
}

/// Dominant cluster of `v` under the current labels and weights.
///
/// Exact ties are broken uniformly at random. A node without neighbors, or
/// whose neighbors exert no positive attraction, keeps its own label with no
/// winners.
pub fn dominant_cluster<R>(ctx: &RunContext, v: usize, rng: &mut R) -> DominantCluster
where
    R: Rng + ?Sized,
{
    let own = DominantCluster { label: ctx.labels[v], winners: SmallVec::new() };

    let sums = combined_weights(ctx, v);
    let max = max_weight(&sums);
    if sums.is_empty() || max <= 0.0 {
        return own;
    }

    let tied: SmallVec<[ClusterLabel; 4]> = sums
        .iter()
        .filter(|&&(_, w)| w == max)
        .map(|&(label, _)| label)
        .collect();
    let label = match tied.as_slice() {
        [only] => *only,
        many => match many.choose(rng) {
            Some(&label) => label,
            None => return own,
        },
    };

    DominantCluster { label, winners: winners_for(ctx, v, label) }
}

/// `v` already holds a maximal label and its `Dv` would not change.
///
/// Ties are tolerated and no randomness is drawn. A tied node is stable but
/// not fixed: a later pass may still move it to another maximal label.
pub fn is_stable(ctx: &RunContext, v: usize) -> bool {
    let sums = combined_weights(ctx, v);
    let max = max_weight(&sums);
    if sums.is_empty() || max <= 0.0 {
        return true;
    }

    let own = ctx.labels[v];
    if !sums.iter().any(|&(label, w)| label == own && w == max) {
        return false;
    }

    let winners = winners_for(ctx, v, own);
    match selector::candidate(&ctx.topology, &ctx.relevant, v, &winners) {
        Some(next) => next == ctx.relevant[v],
        None => true,
    }
}

/// Every node is stable. `None` if `cancel` fired during the sweep.
pub fn is_converged(ctx: &RunContext, cancel: &CancellationToken) -> Option<bool> {
    for v in 0..ctx.topology.len() {
        if cancel.is_cancelled() {
            return None;
        }
        if !is_stable(ctx, v) {
            return Some(false);
        }
    }
    Some(true)
}

// ============================================================================
// Passes
// ============================================================================

/// What one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub labels_changed: usize,
    pub dimension_updates: usize,
    /// False if cancellation cut the pass short.
    pub completed: bool,
}

/// One asynchronous sweep in a fresh random order.
pub fn run_pass<R>(ctx: &mut RunContext, rng: &mut R, cancel: &CancellationToken) -> Result<PassReport>
where
    R: Rng + ?Sized,
{
    let mut order: Vec<usize> = (0..ctx.topology.len()).collect();
    order.shuffle(rng);

    let mut report = PassReport::default();
    for v in order {
        if cancel.is_cancelled() {
            return Ok(report);
        }
        let dominant = dominant_cluster(ctx, v, rng);
        if selector::update(ctx, v, &dominant.winners)? {
            report.dimension_updates += 1;
        }
        if ctx.labels[v] != dominant.label {
            ctx.labels[v] = dominant.label;
            report.labels_changed += 1;
        }
    }
    report.completed = true;
    Ok(report)
}

/// How propagation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Converged { passes: usize },
    Cancelled { passes: usize },
}

/// Run passes until the convergence test passes.
///
/// The first pass always runs. There is no cap unless `max_passes` is set,
/// in which case exceeding it fails with [`Error::PassLimitExceeded`].
pub fn propagate<R>(
    ctx: &mut RunContext,
    rng: &mut R,
    cancel: &CancellationToken,
    max_passes: Option<usize>,
) -> Result<Propagation>
where
    R: Rng + ?Sized,
{
    let mut passes = 0;
    loop {
        if cancel.is_cancelled() {
            info!(passes, "propagation cancelled");
            return Ok(Propagation::Cancelled { passes });
        }
        if max_passes.is_some_and(|max| passes >= max) {
            return Err(Error::PassLimitExceeded { passes });
        }

        let report = run_pass(ctx, rng, cancel)?;
        passes += 1;
        debug!(
            pass = passes,
            labels_changed = report.labels_changed,
            dimension_updates = report.dimension_updates,
            "propagation pass finished"
        );
        if !report.completed {
            info!(passes, "propagation cancelled mid-pass");
            return Ok(Propagation::Cancelled { passes });
        }

        match is_converged(ctx, cancel) {
            Some(true) => return Ok(Propagation::Converged { passes }),
            Some(false) => {}
            None => {
                info!(passes, "propagation cancelled during convergence check");
                return Ok(Propagation::Cancelled { passes });
            }
        }
    }
}
