//! # Graph Model
//!
//! Pure data shared by every stage of a run: node and edge identities,
//! cluster labels and bit-encoded dimension sets.
//! No I/O, no state, no randomness.

pub mod node;
pub mod edge;
pub mod label;
pub mod dimension_set;

pub use node::{Node, NodeId};
pub use edge::{Edge, EdgeId};
pub use label::ClusterLabel;
pub use dimension_set::{DimensionId, DimensionSet};
