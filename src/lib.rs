//! # mdlpa-rs: Multi-Dimensional Label Propagation
//!
//! Community detection for graphs whose edges belong to one or more named
//! *dimensions* (relationship types between the same pair of entities).
//! Every node ends up in a cluster, and every cluster reports the dimensions
//! that are structurally relevant to it.
//!
//! ## Pipeline
//!
//! ```text
//! GraphSource ──► DimensionRegistry ──► encoded pairs ──► w0 (DRxOR)
//!      │                                                   │
//!      │              relevant dimensions Dv ◄─────────────┘
//!      │                      │
//!      └────────► asynchronous propagation (w revised via Jaccard)
//!                             │
//!                             ▼
//!                     Cluster assembly
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mdlpa::{Mdlpa, MdlpaConfig, MemoryGraph, NodeId};
//!
//! # fn example() -> mdlpa::Result<()> {
//! let mut graph = MemoryGraph::new();
//! let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));
//! graph.add_edge(a, b, "work");
//! graph.add_edge(b, c, "work,family");
//! graph.add_edge(a, c, "work");
//!
//! let outcome = Mdlpa::new(MdlpaConfig::default().with_seed(7)).run(&graph)?;
//! let clustering = outcome.into_clustering().expect("not cancelled");
//! assert_eq!(clustering.clusters.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod source;
pub mod dimension;
pub mod topology;
pub mod relevance;
pub mod selector;
pub mod propagation;
pub mod cluster;
pub mod engine;
pub mod cancel;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Node, NodeId, Edge, EdgeId, ClusterLabel,
    DimensionId, DimensionSet,
};

// ============================================================================
// Re-exports: Host surfaces
// ============================================================================

pub use source::{GraphSource, DimensionResolver, SeparatedLabels, MemoryGraph};
pub use cancel::CancellationToken;

// ============================================================================
// Re-exports: Engine + results
// ============================================================================

pub use dimension::DimensionRegistry;
pub use cluster::{Cluster, Clustering};
pub use engine::{Mdlpa, MdlpaConfig, RunOutcome, RunStats, run};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Edge {edge} has no dimensions")]
    EmptyDimensions { edge: EdgeId },

    #[error("Edge {edge} has an invalid dimension name {name:?}")]
    InvalidDimension { edge: EdgeId, name: String },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Nodes {from} and {to} are adjacent but no edge connects them")]
    MissingEdge { from: NodeId, to: NodeId },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("No stable state after {passes} propagation passes")]
    PassLimitExceeded { passes: usize },

    #[error("Graph source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
