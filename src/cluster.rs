//! Cluster assembly.
//!
//! After propagation, nodes sharing a label form one cluster. A cluster's
//! relevant dimensions are the union of its members' `Dv`. A single-member
//! cluster has none, even when its node has edges and a non-empty `Dv`: a
//! lone node has no community to characterize.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::engine::RunContext;
use crate::model::{ClusterLabel, DimensionSet, NodeId};

/// A detected community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// `"0"`, `"1"`, … in order of discovery.
    pub name: String,
    /// The label every member ended with.
    pub label: ClusterLabel,
    /// Members in `GraphSource::nodes()` order.
    pub members: Vec<NodeId>,
    /// Relevant dimension names, in dimension-id order.
    pub relevant_dimensions: Vec<String>,
    /// Relevant dimensions as ids.
    pub dimension_set: DimensionSet,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// `"<name> [(<dimensions sorted by name>)]"`, e.g. `"0 [(family,work)]"`.
    pub fn display_name(&self) -> String {
        let mut dims = self.relevant_dimensions.clone();
        dims.sort();
        format!("{} [({})]", self.name, dims.join(","))
    }
}

/// The result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    /// `(node, index into clusters)` in `GraphSource::nodes()` order.
    pub assignments: Vec<(NodeId, usize)>,
}

impl Clustering {
    /// Cluster containing `node`. Linear in the number of nodes.
    pub fn cluster_of(&self, node: NodeId) -> Option<&Cluster> {
        self.assignments
            .iter()
            .find(|(n, _)| *n == node)
            .map(|&(_, c)| &self.clusters[c])
    }

    pub fn label_of(&self, node: NodeId) -> Option<ClusterLabel> {
        self.cluster_of(node).map(|c| c.label)
    }

    pub fn same_cluster(&self, a: NodeId, b: NodeId) -> bool {
        match (self.label_of(a), self.label_of(b)) {
            (Some(la), Some(lb)) => la == lb,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Group nodes by final label.
pub fn assemble(ctx: &RunContext) -> Clustering {
    let topology = ctx.topology();
    let mut slot: HashMap<ClusterLabel, usize> = HashMap::new();
    let mut groups: Vec<(ClusterLabel, Vec<usize>)> = Vec::new();
    let mut assignments = Vec::with_capacity(topology.len());

    for (v, &label) in ctx.labels().iter().enumerate() {
        let c = *slot.entry(label).or_insert_with(|| {
            groups.push((label, Vec::new()));
            groups.len() - 1
        });
        groups[c].1.push(v);
        assignments.push((topology.node_id(v), c));
    }

    let clusters = groups
        .into_iter()
        .enumerate()
        .map(|(i, (label, members))| {
            let mut dims = DimensionSet::new();
            if members.len() > 1 {
                for &v in &members {
                    dims.union_with(&ctx.relevant()[v]);
                }
            }
            Cluster {
                name: i.to_string(),
                label,
                members: members.iter().map(|&v| topology.node_id(v)).collect(),
                relevant_dimensions: ctx.registry().names_of(&dims),
                dimension_set: dims,
            }
        })
        .collect();

    Clustering { clusters, assignments }
}
