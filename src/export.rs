//! Clustering export: render a finished clustering for other tools.
//!
//! ```text
//! Clustering → write_memberships()     → one 1-based cluster index per node
//!            → write_cluster_summary() → clusters = {...}; relevantDimensions = {...};
//!            → to_json()               → serde_json document
//! ```
//!
//! The two text formats are MATLAB cell-array compatible, so results can be
//! compared against other community-detection toolchains.

use std::io::Write;

use crate::cluster::Clustering;
use crate::Result;

/// One line per node, nodes by ascending id, each line the 1-based index of
/// the node's cluster.
pub fn write_memberships(clustering: &Clustering, writer: &mut dyn Write) -> Result<()> {
    let mut rows = clustering.assignments.clone();
    rows.sort_by_key(|&(node, _)| node);
    for (_, cluster) in rows {
        writeln!(writer, "{}", cluster + 1)?;
    }
    Ok(())
}

/// Cluster members and relevant dimensions as two cell arrays.
pub fn write_cluster_summary(clustering: &Clustering, writer: &mut dyn Write) -> Result<()> {
    let members: Vec<String> = clustering
        .clusters
        .iter()
        .map(|c| {
            let ids: Vec<String> = c.members.iter().map(|n| n.0.to_string()).collect();
            format!("[{}]", ids.join(","))
        })
        .collect();
    writeln!(writer, "clusters = {{{}}};", members.join(","))?;

    let dims: Vec<String> = clustering
        .clusters
        .iter()
        .map(|c| format!("[{}]", c.relevant_dimensions.join(",")))
        .collect();
    writeln!(writer, "relevantDimensions = {{{}}};", dims.join(","))?;
    Ok(())
}

/// The whole clustering as pretty-printed JSON.
pub fn to_json(clustering: &Clustering) -> Result<String> {
    Ok(serde_json::to_string_pretty(clustering)?)
}

/// Inverse of [`to_json`].
pub fn from_json(json: &str) -> Result<Clustering> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::model::{ClusterLabel, DimensionSet, NodeId};

    fn sample() -> Clustering {
        Clustering {
            clusters: vec![
                Cluster {
                    name: "0".into(),
                    label: ClusterLabel::seeded(NodeId(3)),
                    members: vec![NodeId(3), NodeId(1)],
                    relevant_dimensions: vec!["work".into(), "family".into()],
                    dimension_set: DimensionSet::from_ids([0, 1]),
                },
                Cluster {
                    name: "1".into(),
                    label: ClusterLabel::seeded(NodeId(2)),
                    members: vec![NodeId(2)],
                    relevant_dimensions: vec![],
                    dimension_set: DimensionSet::new(),
                },
            ],
            assignments: vec![(NodeId(3), 0), (NodeId(2), 1), (NodeId(1), 0)],
        }
    }

    #[test]
    fn test_memberships_sorted_by_node_id() {
        let mut out = Vec::new();
        write_memberships(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n1\n");
    }

    #[test]
    fn test_cluster_summary() {
        let mut out = Vec::new();
        write_cluster_summary(&sample(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "clusters = {[3,1],[2]};\nrelevantDimensions = {[work,family],[]};\n"
        );
    }

    #[test]
    fn test_empty_clustering_summary() {
        let empty = Clustering { clusters: vec![], assignments: vec![] };
        let mut out = Vec::new();
        write_cluster_summary(&empty, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "clusters = {};\nrelevantDimensions = {};\n");
    }

    #[test]
    fn test_json_roundtrip() {
        let clustering = sample();
        let json = to_json(&clustering).unwrap();
        assert!(json.contains("\"relevant_dimensions\""));
        assert_eq!(from_json(&json).unwrap(), clustering);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        assert!(matches!(from_json("{"), Err(crate::Error::Serialization(_))));
    }
}
