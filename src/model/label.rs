//! Cluster labels.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Identity of a cluster during propagation.
///
/// Every node starts in its own cluster whose label is seeded from the node's
/// id, so labels are unique per initial cluster and reproducible across runs
/// over the same node-id set. Ordering follows the seed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterLabel(NodeId);

impl ClusterLabel {
    /// The initial label of `node`.
    pub fn seeded(node: NodeId) -> Self {
        Self(node)
    }

    /// The node whose initial cluster this label was.
    pub fn seed(&self) -> NodeId {
        self.0
    }

    /// 24-bit RGB colour for hosts that render clusters by colour.
    ///
    /// splitmix64 finalizer over the seed id, folded to three bytes.
    /// Distinct labels may collide on colour; they never collide as labels.
    pub fn rgb(&self) -> u32 {
        let mut z = self.0.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        ((z ^ (z >> 24) ^ (z >> 48)) & 0x00FF_FFFF) as u32
    }

    /// `(r, g, b)` components of [`rgb`](Self::rgb).
    pub fn rgb_components(&self) -> (u8, u8, u8) {
        let c = self.rgb();
        ((c >> 16) as u8, (c >> 8) as u8, c as u8)
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}@{}", self.rgb(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_reproducible() {
        let a = ClusterLabel::seeded(NodeId(7));
        let b = ClusterLabel::seeded(NodeId(7));
        assert_eq!(a, b);
        assert_eq!(a.rgb(), b.rgb());
        assert!(a.rgb() <= 0x00FF_FFFF);
    }

    #[test]
    fn test_labels_unique_per_seed() {
        assert_ne!(ClusterLabel::seeded(NodeId(1)), ClusterLabel::seeded(NodeId(2)));
        assert!(ClusterLabel::seeded(NodeId(1)) < ClusterLabel::seeded(NodeId(2)));
    }

    #[test]
    fn test_rgb_components() {
        let l = ClusterLabel::seeded(NodeId(42));
        let (r, g, b) = l.rgb_components();
        assert_eq!(((r as u32) << 16) | ((g as u32) << 8) | b as u32, l.rgb());
    }
}
