//! In-memory [`Catalog`] for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Catalog;
use crate::error::{Error, Result};
use crate::picks::{BeatmapId, BeatmapMetadata, PlayerId, PlayerInfo};

enum FakeSet {
    Found(BeatmapMetadata),
    Broken,
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    sets: HashMap<BeatmapId, FakeSet>,
    users: HashMap<PlayerId, String>,
    fail_users: bool,
    pub beatmap_calls: Mutex<Vec<BeatmapId>>,
    pub user_calls: Mutex<Vec<Vec<PlayerId>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, id: i64, artist: &str, title: &str) -> Self {
        self.sets
            .insert(BeatmapId(id), FakeSet::Found(BeatmapMetadata::new(artist, title)));
        self
    }

    /// Lookups of `id` fail as if the request itself broke
    pub fn with_broken(mut self, id: i64) -> Self {
        self.sets.insert(BeatmapId(id), FakeSet::Broken);
        self
    }

    pub fn with_user(mut self, id: i64, name: &str) -> Self {
        self.users.insert(PlayerId(id), name.to_string());
        self
    }

    pub fn failing_users(mut self) -> Self {
        self.fail_users = true;
        self
    }

    pub fn beatmap_calls(&self) -> Vec<BeatmapId> {
        self.beatmap_calls.lock().unwrap().clone()
    }

    pub fn user_calls(&self) -> Vec<Vec<PlayerId>> {
        self.user_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn beatmapset(&self, id: BeatmapId) -> Result<BeatmapMetadata> {
        self.beatmap_calls.lock().unwrap().push(id);
        match self.sets.get(&id) {
            Some(FakeSet::Found(meta)) => Ok(meta.clone()),
            Some(FakeSet::Broken) => Err(Error::Status {
                status: 500,
                url: format!("beatmapsets/{}", id),
            }),
            None => Err(Error::NotFound(format!("beatmapset {}", id))),
        }
    }

    async fn users(&self, ids: &[PlayerId]) -> Result<Vec<PlayerInfo>> {
        self.user_calls.lock().unwrap().push(ids.to_vec());
        if self.fail_users {
            return Err(Error::InvalidResponse("users unavailable".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.users.get(id).map(|name| PlayerInfo {
                    id: *id,
                    name: name.clone(),
                })
            })
            .collect())
    }
}
