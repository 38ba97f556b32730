//! Beatmap metadata resolution
//!
//! Each aggregate is resolved from the snapshot cache when possible and
//! from the osu! API otherwise. Live lookups follow a fixed scheduling
//! policy: one request in flight at a time, and after every request,
//! successful or not, a pause of the configured spacing before the next.
//! Cache hits never touch the network and never pause.

use std::time::Duration;

use async_trait::async_trait;

use crate::api::Catalog;
use crate::error::Error;
use crate::picks::{BeatmapId, BeatmapMetadata, PickAggregate};
use crate::snapshot::SnapshotCache;

/// Text written in place of metadata the service had no record for
pub const NOT_FOUND_SENTINEL: &str = "Not found";

/// Text written in place of metadata whose lookup failed
pub const ERROR_SENTINEL: &str = "Error";

/// Outcome of resolving one beatmap set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Taken from the snapshot cache
    Cached(BeatmapMetadata),
    /// Fetched from the osu! API
    Fetched(BeatmapMetadata),
    /// The API answered without a matching set
    NotFound,
    /// The lookup itself failed
    Failed(String),
}

impl Resolution {
    pub fn metadata(&self) -> Option<&BeatmapMetadata> {
        match self {
            Resolution::Cached(meta) | Resolution::Fetched(meta) => Some(meta),
            Resolution::NotFound | Resolution::Failed(_) => None,
        }
    }

    /// Title, or the sentinel for an unresolved set
    pub fn title(&self) -> &str {
        match self {
            Resolution::Cached(meta) | Resolution::Fetched(meta) => &meta.title,
            Resolution::NotFound => NOT_FOUND_SENTINEL,
            Resolution::Failed(_) => ERROR_SENTINEL,
        }
    }

    /// Artist, or the sentinel for an unresolved set
    pub fn artist(&self) -> &str {
        match self {
            Resolution::Cached(meta) | Resolution::Fetched(meta) => &meta.artist,
            Resolution::NotFound => NOT_FOUND_SENTINEL,
            Resolution::Failed(_) => ERROR_SENTINEL,
        }
    }
}

/// A pick aggregate joined with its resolved metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub beatmap_id: BeatmapId,
    pub resolution: Resolution,
    pub pick_count: u64,
}

impl EnrichedRecord {
    /// Beatmap set name as reported
    pub fn name(&self) -> &str {
        self.resolution.title()
    }

    pub fn artist(&self) -> &str {
        self.resolution.artist()
    }
}

/// Pause between two live lookups
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn wait(&self, spacing: Duration);
}

/// [`Throttle`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioThrottle;

#[async_trait]
impl Throttle for TokioThrottle {
    async fn wait(&self, spacing: Duration) {
        tokio::time::sleep(spacing).await;
    }
}

/// Progress information for resolve callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveProgress {
    /// Number of aggregates resolved so far
    pub current: usize,
    pub total: usize,
    pub beatmap_id: BeatmapId,
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(ResolveProgress) + Send + Sync>;

/// Counts of each resolution outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub cached: usize,
    pub fetched: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl ResolveSummary {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.resolution {
                Resolution::Cached(_) => summary.cached += 1,
                Resolution::Fetched(_) => summary.fetched += 1,
                Resolution::NotFound => summary.not_found += 1,
                Resolution::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.cached + self.fetched + self.not_found + self.failed
    }

    /// Number of requests made against the osu! API
    pub fn live_lookups(&self) -> usize {
        self.fetched + self.not_found + self.failed
    }
}

/// Resolves pick aggregates to beatmap metadata, one at a time
pub struct MetadataResolver<'a> {
    catalog: &'a dyn Catalog,
    cache: Option<&'a SnapshotCache>,
    throttle: &'a dyn Throttle,
    spacing: Duration,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog, throttle: &'a dyn Throttle, spacing: Duration) -> Self {
        Self {
            catalog,
            cache: None,
            throttle,
            spacing,
        }
    }

    /// Consult `cache` before the catalog
    pub fn with_cache(mut self, cache: Option<&'a SnapshotCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Resolve a single aggregate; never fails
    pub async fn resolve(&self, aggregate: &PickAggregate) -> Resolution {
        let id = aggregate.beatmap_id;

        if let Some(entry) = self.cache.and_then(|cache| cache.get(id)) {
            tracing::debug!("Beatmap set {} resolved from snapshot", id);
            return Resolution::Cached(BeatmapMetadata::new(
                entry.artist.clone(),
                entry.beatmapset_name.clone(),
            ));
        }

        let resolution = match self.catalog.beatmapset(id).await {
            Ok(meta) => {
                tracing::debug!("Beatmap set {} fetched: {} - {}", id, meta.artist, meta.title);
                Resolution::Fetched(meta)
            }
            Err(Error::NotFound(_)) => {
                tracing::warn!("Beatmap set {} not found on osu! API", id);
                Resolution::NotFound
            }
            Err(e) => {
                tracing::warn!("Lookup of beatmap set {} failed: {}", id, e);
                Resolution::Failed(e.to_string())
            }
        };

        self.throttle.wait(self.spacing).await;
        resolution
    }

    /// Resolve every aggregate in order, reporting progress after each one
    pub async fn resolve_all(
        &self,
        aggregates: &[PickAggregate],
        progress: Option<&ProgressCallback>,
    ) -> Vec<EnrichedRecord> {
        let total = aggregates.len();
        let mut records = Vec::with_capacity(total);

        for (index, aggregate) in aggregates.iter().enumerate() {
            let resolution = self.resolve(aggregate).await;
            records.push(EnrichedRecord {
                beatmap_id: aggregate.beatmap_id,
                resolution,
                pick_count: aggregate.pick_count,
            });

            if let Some(callback) = progress {
                callback(ResolveProgress {
                    current: index + 1,
                    total,
                    beatmap_id: aggregate.beatmap_id,
                });
            }
        }

        records
    }
}
