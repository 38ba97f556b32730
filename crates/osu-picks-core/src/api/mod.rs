//! osu! API v2 access
//!
//! The pipeline only talks to the catalog through the [`Catalog`] trait so
//! the resolver and statistics can be exercised without a network.

mod client;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use client::OsuApiClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::picks::{BeatmapId, BeatmapMetadata, PlayerId, PlayerInfo};

/// Remote source of beatmap and user metadata
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a beatmap set
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when the service
    /// answered but has no such set; any other error means the call failed.
    async fn beatmapset(&self, id: BeatmapId) -> Result<BeatmapMetadata>;

    /// Resolve a batch of users in a single request
    ///
    /// Users unknown to the service are left out of the result.
    async fn users(&self, ids: &[PlayerId]) -> Result<Vec<PlayerInfo>>;
}
