//! # Clustering Engine
//!
//! Drives one run end to end:
//!
//! 1. encode edge dimensions and build the topology
//! 2. compute `w0`, seed `w`, select `Dv0`
//! 3. propagate until stable
//! 4. assemble clusters
//!
//! Cancellation is polled at every stage and inside every loop. A cancelled
//! run yields [`RunOutcome::Cancelled`]; all state built so far is dropped.

pub mod context;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cancel::CancellationToken;
use crate::cluster::{Clustering, assemble};
use crate::propagation::{Propagation, propagate};
use crate::source::{DimensionResolver, GraphSource, SeparatedLabels};
use crate::{Error, Result};

pub use context::RunContext;

// ============================================================================
// Configuration
// ============================================================================

/// Settings for [`Mdlpa`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdlpaConfig {
    /// Separator between dimension names in an edge label.
    pub dimension_separator: String,
    /// Trim whitespace around dimension names.
    pub trim_dimension_names: bool,
    /// RNG seed. Drawn at random (and logged) when absent.
    pub seed: Option<u64>,
    /// Fail with [`Error::PassLimitExceeded`] after this many passes.
    pub max_passes: Option<usize>,
}

impl Default for MdlpaConfig {
    fn default() -> Self {
        Self {
            dimension_separator: ",".into(),
            trim_dimension_names: true,
            seed: None,
            max_passes: None,
        }
    }
}

impl MdlpaConfig {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.dimension_separator = separator.into();
        self
    }

    pub fn with_trimming(mut self, trim: bool) -> Self {
        self.trim_dimension_names = trim;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension_separator.is_empty() {
            return Err(Error::Config("dimension separator must not be empty".into()));
        }
        if self.max_passes == Some(0) {
            return Err(Error::Config("max_passes must be at least 1".into()));
        }
        Ok(())
    }

    /// The label resolver this configuration describes.
    pub fn resolver(&self) -> SeparatedLabels {
        let resolver = SeparatedLabels::new(self.dimension_separator.clone());
        if self.trim_dimension_names { resolver } else { resolver.untrimmed() }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Bookkeeping for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub nodes: usize,
    pub pairs: usize,
    pub dimensions: usize,
    pub passes: usize,
    /// Seed the RNG was built from, when the engine built it.
    pub seed: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl RunStats {
    fn started() -> Self {
        Self {
            nodes: 0,
            pairs: 0,
            dimensions: 0,
            passes: 0,
            seed: None,
            started_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    fn finish(mut self) -> Self {
        self.elapsed_ms = (Utc::now() - self.started_at).num_milliseconds();
        self
    }
}

/// How a run ended. Cancellation is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Clustered { clustering: Clustering, stats: RunStats },
    Cancelled { stats: RunStats },
}

impl RunOutcome {
    pub fn stats(&self) -> &RunStats {
        match self {
            Self::Clustered { stats, .. } | Self::Cancelled { stats } => stats,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn clustering(&self) -> Option<&Clustering> {
        match self {
            Self::Clustered { clustering, .. } => Some(clustering),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn into_clustering(self) -> Option<Clustering> {
        match self {
            Self::Clustered { clustering, .. } => Some(clustering),
            Self::Cancelled { .. } => None,
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Cluster `graph` once.
///
/// `rng` drives the per-pass permutations and tie-breaks; the same graph,
/// resolver and RNG state always produce the same clustering.
pub fn run<G, D, R>(
    graph: &G,
    resolver: &D,
    cancel: &CancellationToken,
    rng: &mut R,
) -> Result<RunOutcome>
where
    G: GraphSource + ?Sized,
    D: DimensionResolver + ?Sized,
    R: Rng + ?Sized,
{
    execute(graph, resolver, cancel, rng, None, RunStats::started())
}

fn execute<G, D, R>(
    graph: &G,
    resolver: &D,
    cancel: &CancellationToken,
    rng: &mut R,
    max_passes: Option<usize>,
    mut stats: RunStats,
) -> Result<RunOutcome>
where
    G: GraphSource + ?Sized,
    D: DimensionResolver + ?Sized,
    R: Rng + ?Sized,
{
    let Some(mut ctx) = RunContext::prepare(graph, resolver, cancel)? else {
        info!("clustering cancelled during setup");
        return Ok(RunOutcome::Cancelled { stats: stats.finish() });
    };
    stats.nodes = ctx.topology().len();
    stats.pairs = ctx.topology().pair_count();
    stats.dimensions = ctx.registry().len();
    info!(
        nodes = stats.nodes,
        pairs = stats.pairs,
        dimensions = stats.dimensions,
        "initialization completed, starting propagation"
    );

    match propagate(&mut ctx, rng, cancel, max_passes)? {
        Propagation::Cancelled { passes } => {
            stats.passes = passes;
            Ok(RunOutcome::Cancelled { stats: stats.finish() })
        }
        Propagation::Converged { passes } => {
            stats.passes = passes;
            let clustering = assemble(&ctx);
            let stats = stats.finish();
            info!(
                clusters = clustering.len(),
                passes,
                elapsed_ms = stats.elapsed_ms,
                "clustering finished"
            );
            Ok(RunOutcome::Clustered { clustering, stats })
        }
    }
}

/// Configured clustering runner with its own cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct Mdlpa {
    config: MdlpaConfig,
    cancel: CancellationToken,
}

impl Mdlpa {
    pub fn new(config: MdlpaConfig) -> Self {
        Self { config, cancel: CancellationToken::new() }
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &MdlpaConfig {
        &self.config
    }

    /// A handle that cancels this runner's runs.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request early termination. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cluster `graph`, resolving dimensions from edge labels with the
    /// configured separator.
    pub fn run<G>(&self, graph: &G) -> Result<RunOutcome>
    where
        G: GraphSource + ?Sized,
    {
        self.run_with(graph, &self.config.resolver())
    }

    /// Cluster `graph` with a custom dimension resolver.
    pub fn run_with<G, D>(&self, graph: &G, resolver: &D) -> Result<RunOutcome>
    where
        G: GraphSource + ?Sized,
        D: DimensionResolver + ?Sized,
    {
        self.config.validate()?;
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, "starting clustering run");

        let mut rng = StdRng::seed_from_u64(seed);
        let mut stats = RunStats::started();
        stats.seed = Some(seed);
        execute(graph, resolver, &self.cancel, &mut rng, self.config.max_passes, stats)
    }
}
