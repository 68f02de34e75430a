//! Edge dimension encoding.
//!
//! Turns every edge's dimension-name list into a [`DimensionSet`], registering
//! names on first sight, and collapses parallel edges into one set per pair.

use hashbrown::HashMap;
use tracing::warn;

use crate::cancel::CancellationToken;
use crate::model::{DimensionSet, Edge, EdgeId, NodeId};
use crate::source::DimensionResolver;
use crate::{Error, Result};
use super::DimensionRegistry;

/// Encoded dimension set of every non-loop edge.
pub type EdgeDimensions = HashMap<EdgeId, DimensionSet>;

/// Encode `edges` in the given order.
///
/// Self-loops are skipped: they never take part in traversal, so their
/// dimensions are not registered. An edge with no dimension names, or with a
/// blank name, fails the whole encoding.
///
/// Stops early (returning what was encoded so far) once `cancel` fires.
pub fn encode_edges<R>(
    edges: &[Edge],
    resolver: &R,
    registry: &mut DimensionRegistry,
    cancel: &CancellationToken,
) -> Result<EdgeDimensions>
where
    R: DimensionResolver + ?Sized,
{
    let mut encoded = EdgeDimensions::with_capacity(edges.len());

    for edge in edges {
        if cancel.is_cancelled() {
            break;
        }
        if edge.is_self_loop() {
            warn!(edge = %edge.id, node = %edge.src, "skipping self-loop");
            continue;
        }

        let names = resolver.dimensions(edge);
        if names.is_empty() {
            return Err(Error::EmptyDimensions { edge: edge.id });
        }

        let mut set = DimensionSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(Error::InvalidDimension { edge: edge.id, name: name.clone() });
            }
            set.insert(registry.register(name));
        }
        encoded.insert(edge.id, set);
    }

    Ok(encoded)
}

/// `D(a, b)`: union of the encoded sets of every edge between `a` and `b`.
pub fn pair_dimensions(
    a: NodeId,
    b: NodeId,
    edge_ids: &[EdgeId],
    encoded: &EdgeDimensions,
) -> Result<DimensionSet> {
    if edge_ids.is_empty() {
        return Err(Error::MissingEdge { from: a, to: b });
    }
    let mut set = DimensionSet::new();
    for eid in edge_ids {
        let dims = encoded.get(eid).ok_or_else(|| {
            Error::InvariantViolation(format!("edge {eid} between {a} and {b} was never encoded"))
        })?;
        set.union_with(dims);
    }
    Ok(set)
}
