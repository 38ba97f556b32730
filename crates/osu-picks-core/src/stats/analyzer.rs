//! Statistics analyzer for the pick log

use std::collections::HashMap;

use crate::api::Catalog;
use crate::config::RunConfig;
use crate::error::Result;
use crate::picks::{PlayerId, PlayerPickCount};
use crate::store::PickStore;

use super::model::{ExtremalPicker, PickStats, RankedPicker};

/// Analyzer for generating statistics from the pick log
pub struct StatsAnalyzer;

impl StatsAnalyzer {
    /// Compute counts and rankings, then resolve picker names
    ///
    /// Any failing store query aborts the analysis. Name lookups are
    /// best-effort: a failed batch leaves the affected names unresolved.
    pub async fn analyze(
        store: &PickStore,
        catalog: &dyn Catalog,
        config: &RunConfig,
    ) -> Result<PickStats> {
        let total_picks = store.total_pick_count()?;
        let unique_players = store.distinct_picker_count()?;
        let unique_beatmaps = store.distinct_beatmap_count()?;
        let top = store.top_pickers(config.top_picker_count)?;

        let (overplayed, underplayed) = if config.compute_extremal_pickers {
            (
                store.top_overplayed_picker(config.min_pick_count)?,
                store.top_underplayed_picker()?,
            )
        } else {
            (None, None)
        };

        let top_names = Self::resolve_names(
            catalog,
            top.iter().map(|p| p.picker_id),
            "top pickers",
        )
        .await;
        let extremal_names = Self::resolve_names(
            catalog,
            overplayed.iter().chain(underplayed.iter()).map(|p| p.picker_id),
            "overplayed/underplayed pickers",
        )
        .await;

        let top_pickers = top
            .iter()
            .enumerate()
            .map(|(index, picker)| RankedPicker {
                rank: index + 1,
                picker_id: picker.picker_id,
                name: top_names.get(&picker.picker_id).cloned(),
                pick_count: picker.pick_count,
            })
            .collect();

        let extremal = |picker: Option<PlayerPickCount>| {
            picker.map(|p| ExtremalPicker {
                picker_id: p.picker_id,
                name: extremal_names.get(&p.picker_id).cloned(),
                pick_count: p.pick_count,
            })
        };

        let stats = PickStats {
            total_picks,
            unique_players,
            unique_beatmaps,
            top_pickers,
            min_pick_count: config
                .compute_extremal_pickers
                .then_some(config.min_pick_count),
            overplayed: extremal(overplayed),
            underplayed: extremal(underplayed),
        };

        if !stats.is_consistent() {
            tracing::warn!(
                "Inconsistent pick counts: {} picks, {} players, {} beatmaps",
                stats.total_picks,
                stats.unique_players,
                stats.unique_beatmaps
            );
        }

        Ok(stats)
    }

    /// Resolve registered picker ids to names with a single batched request
    async fn resolve_names(
        catalog: &dyn Catalog,
        ids: impl Iterator<Item = PlayerId>,
        group: &str,
    ) -> HashMap<PlayerId, String> {
        let mut batch: Vec<PlayerId> = Vec::new();
        for id in ids.filter(PlayerId::is_registered) {
            if !batch.contains(&id) {
                batch.push(id);
            }
        }

        if batch.is_empty() {
            return HashMap::new();
        }

        match catalog.users(&batch).await {
            Ok(users) => users.into_iter().map(|user| (user.id, user.name)).collect(),
            Err(e) => {
                tracing::warn!("Could not resolve names of {} {:?}: {}", group, batch, e);
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeCatalog;
    use crate::store::test_support::create_pick_db;
    use tempfile::TempDir;

    fn sample_store() -> (TempDir, PickStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("picks.db");
        create_pick_db(
            &path,
            &[
                (1, 10),
                (1, 10),
                (2, 10),
                (3, 10),
                (0, 10),
                (2, 20),
                (2, 20),
                (3, 20),
                (3, 30),
                (3, 30),
                (0, 40),
                (0, 50),
                (0, 60),
                (0, 70),
            ],
        );
        let store = PickStore::open(&path).unwrap();
        (dir, store)
    }

    fn config(top: usize, extremal: bool) -> RunConfig {
        RunConfig {
            min_pick_count: 3,
            compute_extremal_pickers: extremal,
            top_picker_count: top,
            ..RunConfig::new("unused.db")
        }
    }

    #[tokio::test]
    async fn test_analyze_with_extremal_pickers() {
        let (_dir, store) = sample_store();
        let catalog = FakeCatalog::new()
            .with_user(1, "WhiteCat")
            .with_user(2, "peppy")
            .with_user(3, "mrekk");

        let stats = StatsAnalyzer::analyze(&store, &catalog, &config(3, true))
            .await
            .unwrap();

        assert_eq!(stats.total_picks, 14);
        assert_eq!(stats.unique_players, 4);
        assert_eq!(stats.unique_beatmaps, 7);
        assert!(stats.is_consistent());

        // Anonymous picker 0 ranks first but is never looked up
        let ranking: Vec<_> = stats
            .top_pickers
            .iter()
            .map(|p| (p.rank, p.picker_id.0, p.display_name(), p.pick_count))
            .collect();
        assert_eq!(
            ranking,
            vec![
                (1, 0, "Anonymous", 5),
                (2, 3, "mrekk", 4),
                (3, 2, "peppy", 3),
            ]
        );

        let overplayed = stats.overplayed.as_ref().unwrap();
        assert_eq!(overplayed.display_name(), "peppy");
        assert_eq!(overplayed.pick_count, 3);

        // Beatmaps 40 to 70 were picked once by the anonymous picker
        let underplayed = stats.underplayed.as_ref().unwrap();
        assert_eq!(underplayed.picker_id, PlayerId(0));
        assert_eq!(underplayed.pick_count, 4);
        assert_eq!(underplayed.display_name(), "Anonymous");

        let calls = catalog.user_calls();
        assert_eq!(calls, vec![vec![PlayerId(3), PlayerId(2)], vec![PlayerId(2)]]);
    }

    #[tokio::test]
    async fn test_analyze_without_extremal_pickers() {
        let (_dir, store) = sample_store();
        let catalog = FakeCatalog::new().with_user(3, "mrekk");

        let stats = StatsAnalyzer::analyze(&store, &catalog, &config(5, false))
            .await
            .unwrap();

        assert!(stats.overplayed.is_none());
        assert!(stats.underplayed.is_none());
        assert_eq!(stats.min_pick_count, None);
        assert_eq!(catalog.user_calls().len(), 1);

        let mrekk = stats
            .top_pickers
            .iter()
            .find(|p| p.picker_id == PlayerId(3))
            .unwrap();
        assert_eq!(mrekk.display_name(), "mrekk");
    }

    #[tokio::test]
    async fn test_name_lookup_failure_is_not_fatal() {
        let (_dir, store) = sample_store();
        let catalog = FakeCatalog::new().failing_users();

        let stats = StatsAnalyzer::analyze(&store, &catalog, &config(4, true))
            .await
            .unwrap();

        assert_eq!(stats.top_pickers.len(), 4);
        assert!(stats
            .top_pickers
            .iter()
            .filter(|p| p.picker_id.is_registered())
            .all(|p| p.display_name() == "Unknown"));
    }

    #[tokio::test]
    async fn test_empty_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        create_pick_db(&path, &[]);
        let store = PickStore::open(&path).unwrap();
        let catalog = FakeCatalog::new();

        let stats = StatsAnalyzer::analyze(&store, &catalog, &config(5, true))
            .await
            .unwrap();

        assert_eq!(stats.total_picks, 0);
        assert!(stats.top_pickers.is_empty());
        assert!(stats.overplayed.is_none());
        assert!(stats.underplayed.is_none());
        assert!(catalog.user_calls().is_empty());
    }
}
