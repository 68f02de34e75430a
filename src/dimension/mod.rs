//! Dimension registry and edge encoding.

pub mod registry;
pub mod encoder;

pub use registry::DimensionRegistry;
pub use encoder::{EdgeDimensions, encode_edges, pair_dimensions};
