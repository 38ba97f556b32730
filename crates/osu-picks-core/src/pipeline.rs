//! End-to-end run: aggregate picks, enrich them, write the report, compute stats

use crate::api::Catalog;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::report::write_report;
use crate::resolver::{
    EnrichedRecord, MetadataResolver, ProgressCallback, ResolveSummary, Throttle, TokioThrottle,
};
use crate::snapshot::SnapshotCache;
use crate::stats::{PickStats, StatsAnalyzer};
use crate::store::PickStore;

/// Phase of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Opening the pick log and aggregating picks
    Scanning,
    /// Aggregation finished
    Scanned { aggregates: usize },
    /// Snapshot parsed and used as a cache
    SnapshotLoaded { entries: usize },
    /// A snapshot was configured but could not be parsed
    SnapshotUnavailable,
    /// Resolving metadata for every aggregate
    Resolving { total: usize },
    /// Writing the CSV report
    WritingReport,
    /// Computing summary statistics
    ComputingStats,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scanning => write!(f, "Scanning"),
            Self::Scanned { aggregates } => write!(f, "Scanned {} beatmap sets", aggregates),
            Self::SnapshotLoaded { entries } => write!(f, "Snapshot loaded ({} entries)", entries),
            Self::SnapshotUnavailable => write!(f, "Snapshot unavailable"),
            Self::Resolving { total } => write!(f, "Resolving {} beatmap sets", total),
            Self::WritingReport => write!(f, "Writing report"),
            Self::ComputingStats => write!(f, "Computing statistics"),
        }
    }
}

/// Phase callback type
pub type PhaseCallback = Box<dyn Fn(PipelinePhase) + Send + Sync>;

/// Result of a completed run
///
/// Only failures of the pick store abort a run. Report and statistics
/// failures are kept here so the caller can surface them.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// One record per aggregate, in aggregate order
    pub records: Vec<EnrichedRecord>,
    pub summary: ResolveSummary,
    /// Whether a snapshot was used as a cache
    pub snapshot_loaded: bool,
    pub report: Result<()>,
    pub stats: Result<PickStats>,
}

impl PipelineOutcome {
    /// Report written and statistics computed
    pub fn is_success(&self) -> bool {
        self.report.is_ok() && self.stats.is_ok()
    }
}

/// Drives a single run against one pick log
pub struct Pipeline<'a> {
    config: RunConfig,
    catalog: &'a dyn Catalog,
    throttle: &'a dyn Throttle,
    progress_callback: Option<ProgressCallback>,
    phase_callback: Option<PhaseCallback>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: RunConfig, catalog: &'a dyn Catalog) -> Self {
        Self {
            config,
            catalog,
            throttle: &TokioThrottle,
            progress_callback: None,
            phase_callback: None,
        }
    }

    /// Replace the pause taken after each live lookup
    pub fn with_throttle(mut self, throttle: &'a dyn Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Set a progress callback invoked after each resolved beatmap set
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set a callback invoked when the run enters a new phase
    pub fn with_phase_callback(mut self, callback: PhaseCallback) -> Self {
        self.phase_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run
    ///
    /// The pick store is opened once and closed exactly once, whether or
    /// not the run succeeds.
    pub async fn run(&self) -> Result<PipelineOutcome> {
        self.emit(PipelinePhase::Scanning);
        let store = PickStore::open(&self.config.database_path)?;

        let outcome = self.run_with_store(&store).await;

        if let Err(e) = store.close() {
            tracing::warn!("Failed to close pick store: {}", e);
        }

        outcome
    }

    async fn run_with_store(&self, store: &PickStore) -> Result<PipelineOutcome> {
        let aggregates = store.pick_aggregates(self.config.min_pick_count)?;
        tracing::info!(
            "{} beatmap sets picked at least {} times",
            aggregates.len(),
            self.config.min_pick_count
        );
        self.emit(PipelinePhase::Scanned {
            aggregates: aggregates.len(),
        });

        let cache = SnapshotCache::load_optional(self.config.snapshot_path.as_deref());
        match (&cache, &self.config.snapshot_path) {
            (Some(cache), _) => self.emit(PipelinePhase::SnapshotLoaded {
                entries: cache.len(),
            }),
            (None, Some(_)) => self.emit(PipelinePhase::SnapshotUnavailable),
            (None, None) => {}
        }

        self.emit(PipelinePhase::Resolving {
            total: aggregates.len(),
        });
        let resolver = MetadataResolver::new(
            self.catalog,
            self.throttle,
            self.config.request_delay,
        )
        .with_cache(cache.as_ref());
        let records = resolver
            .resolve_all(&aggregates, self.progress_callback.as_ref())
            .await;
        let summary = ResolveSummary::from_records(&records);
        tracing::info!(
            "Resolved {} beatmap sets: {} cached, {} fetched, {} not found, {} failed",
            summary.total(),
            summary.cached,
            summary.fetched,
            summary.not_found,
            summary.failed
        );

        self.emit(PipelinePhase::WritingReport);
        let report = write_report(&records, &self.config.output_path);
        if let Err(ref e) = report {
            tracing::error!("{}", e);
        }

        self.emit(PipelinePhase::ComputingStats);
        let stats = StatsAnalyzer::analyze(store, self.catalog, &self.config).await;
        match stats {
            Err(ref e @ Error::Store(_)) => tracing::error!("Statistics failed: {}", e),
            Err(ref e) => tracing::warn!("Statistics failed: {}", e),
            Ok(_) => {}
        }

        Ok(PipelineOutcome {
            records,
            summary,
            snapshot_loaded: cache.is_some(),
            report,
            stats,
        })
    }

    fn emit(&self, phase: PipelinePhase) {
        tracing::debug!("Pipeline phase: {}", phase);
        if let Some(ref callback) = self.phase_callback {
            callback(phase);
        }
    }
}
