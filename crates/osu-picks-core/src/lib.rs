//! # osu-picks-core
//!
//! Core library for analysing the pick log of an osu! multiplayer lobby.
//!
//! This crate provides the foundational functionality for:
//! - Aggregating recorded picks per beatmap set from the SQLite pick log
//! - Enriching aggregates with beatmap metadata from the osu! API v2
//! - Reusing a previous report as a snapshot cache to skip lookups
//! - Writing the overplayed-beatmaps CSV report
//! - Computing picker statistics
//!
//! ## Modules
//!
//! - [`api`] - osu! API client and the [`Catalog`] abstraction
//! - [`config`] - Persistent configuration and per-run settings
//! - [`error`] - Error types and Result alias
//! - [`picks`] - Identifiers and pick aggregates
//! - [`pipeline`] - End-to-end run
//! - [`progress`] - Terminal progress bar
//! - [`report`] - CSV report writer
//! - [`resolver`] - Cache-first, rate-limited metadata resolution
//! - [`snapshot`] - Snapshot cache from a previous report
//! - [`stats`] - Picker statistics
//! - [`store`] - Read-only pick log access
//!
//! ## Example
//!
//! ```no_run
//! use osu_picks_core::{Config, OsuApiClient, Pipeline};
//!
//! # async fn run() -> osu_picks_core::Result<()> {
//! let config = Config::load();
//! let mut client = OsuApiClient::new(&config.api)?;
//! client.request_guest_token(&config.api.credentials()?).await?;
//!
//! let run_config = config.into_run_config(5)?;
//! let outcome = Pipeline::new(run_config, &client).run().await?;
//! println!("{} beatmap sets written", outcome.records.len());
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod api;
pub mod config;
pub mod error;
pub mod picks;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod stats;
pub mod store;

// Re-export key types for convenience

// Error types
pub use error::{Error, Result};

// Configuration
pub use config::{parse_min_pick_count, ApiConfig, ClientCredentials, Config, RunConfig};

// Pick data
pub use picks::{BeatmapId, BeatmapMetadata, PickAggregate, PlayerId, PlayerInfo, PlayerPickCount};

// osu! API
pub use api::{Catalog, OsuApiClient};

// Pick log and snapshot
pub use snapshot::{SnapshotCache, SnapshotEntry};
pub use store::PickStore;

// Resolution
pub use resolver::{
    EnrichedRecord, MetadataResolver, ProgressCallback, Resolution, ResolveProgress,
    ResolveSummary, Throttle, TokioThrottle,
};

// Report
pub use report::{read_report, write_report, ReportRow, REPORT_HEADERS};

// Pipeline
pub use pipeline::{PhaseCallback, Pipeline, PipelineOutcome, PipelinePhase};
pub use progress::ProgressBar;

// Statistics
pub use stats::{export_json, ExtremalPicker, PickStats, RankedPicker, StatsAnalyzer};
