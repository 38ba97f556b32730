//! Metadata cache built from a previously exported report
//!
//! A snapshot lets a run skip live lookups for beatmaps an earlier run
//! already resolved. It is loaded once, never modified afterwards, and a
//! snapshot that fails to parse disables the cache instead of the run.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::picks::BeatmapId;
use crate::resolver::ERROR_SENTINEL;

/// Cached metadata for one beatmap set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub artist: String,
    pub beatmapset_name: String,
}

/// Columns read from the snapshot; any others are ignored
#[derive(Debug, Deserialize)]
struct SnapshotRow {
    beatmapset_id: String,
    beatmapset_name: String,
    artist: String,
}

/// Read-only lookup of beatmap metadata keyed by [`BeatmapId`]
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    entries: HashMap<BeatmapId, SnapshotEntry>,
}

impl SnapshotCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot, failing with [`Error::Parse`] on any malformed input
    pub fn load(path: &Path) -> Result<Self> {
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            message,
        };

        let file = std::fs::File::open(path).map_err(|e| parse_error(e.to_string()))?;
        let cache = Self::from_reader(file).map_err(parse_error)?;

        tracing::info!(
            "Loaded {} cached beatmap sets from {}",
            cache.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Load the snapshot if one is configured
    ///
    /// Returns `None` when `path` is `None` or the snapshot cannot be parsed;
    /// the latter is logged as a warning and the run falls back to live lookups.
    pub fn load_optional(path: Option<&Path>) -> Option<Self> {
        let path = path?;
        match Self::load(path) {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!("Snapshot cache disabled: {}", e);
                None
            }
        }
    }

    /// Parse snapshot CSV from any reader
    fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut cache = Self::new();
        for (index, row) in reader.deserialize::<SnapshotRow>().enumerate() {
            let row = row.map_err(|e| e.to_string())?;
            let id: BeatmapId = row
                .beatmapset_id
                .parse()
                .map_err(|e| format!("row {}: {}", index + 1, e))?;

            // Failed lookups from an earlier run are retried
            if row.artist == ERROR_SENTINEL && row.beatmapset_name == ERROR_SENTINEL {
                tracing::debug!("Skipping failed snapshot entry for beatmap set {}", id);
                continue;
            }

            cache.insert(
                id,
                SnapshotEntry {
                    artist: row.artist,
                    beatmapset_name: row.beatmapset_name,
                },
            );
        }

        Ok(cache)
    }

    /// Insert or replace an entry; later rows of a snapshot win
    pub fn insert(&mut self, id: BeatmapId, entry: SnapshotEntry) {
        self.entries.insert(id, entry);
    }

    /// Look up cached metadata for a beatmap set
    pub fn get(&self, id: BeatmapId) -> Option<&SnapshotEntry> {
        self.entries.get(&id)
    }

    /// Check whether a beatmap set is cached
    pub fn contains(&self, id: BeatmapId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of cached beatmap sets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(csv: &str) -> std::result::Result<SnapshotCache, String> {
        SnapshotCache::from_reader(Cursor::new(csv.to_string()))
    }

    #[test]
    fn test_parse_report_shaped_snapshot() {
        let cache = parse(
            "beatmapset_id,beatmapset_name,artist,pick_count\n\
             10,X,A,5\n\
             20,Galaxy Collapse,Kurokotei,3\n",
        )
        .unwrap();

        assert_eq!(cache.len(), 2);
        let entry = cache.get(BeatmapId(10)).unwrap();
        assert_eq!(entry.artist, "A");
        assert_eq!(entry.beatmapset_name, "X");
        assert!(cache.contains(BeatmapId(20)));
        assert!(!cache.contains(BeatmapId(30)));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let cache = parse("artist,beatmapset_id,beatmapset_name\nA, 10 ,X\n").unwrap();
        assert_eq!(cache.get(BeatmapId(10)).unwrap().artist, "A");
    }

    #[test]
    fn test_later_rows_win() {
        let cache = parse("beatmapset_id,beatmapset_name,artist\n10,Old,A\n10,New,B\n").unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(BeatmapId(10)).unwrap().beatmapset_name, "New");
    }

    #[test]
    fn test_failed_rows_are_not_cached() {
        let cache = parse(
            "beatmapset_id,beatmapset_name,artist,pick_count\n\
             30,Not found,Not found,4\n\
             40,Error,Error,3\n",
        )
        .unwrap();
        assert!(cache.contains(BeatmapId(30)));
        assert!(!cache.contains(BeatmapId(40)));
    }

    #[test]
    fn test_non_integer_id_is_rejected() {
        let err = parse("beatmapset_id,beatmapset_name,artist\nten,X,A\n").unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        assert!(parse("beatmapset_id,artist\n10,A\n").is_err());
    }

    #[test]
    fn test_load_optional_without_path() {
        assert!(SnapshotCache::load_optional(None).is_none());
    }

    #[test]
    fn test_load_optional_degrades_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(SnapshotCache::load_optional(Some(&path)).is_none());
        assert!(matches!(SnapshotCache::load(&path), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(&path, "beatmapset_id,beatmapset_name,artist\n7,Y,B\n").unwrap();

        let cache = SnapshotCache::load_optional(Some(&path)).unwrap();
        assert_eq!(cache.get(BeatmapId(7)).unwrap().artist, "B");
    }
}
