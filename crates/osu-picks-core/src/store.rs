//! Read-only access to the recorded pick log
//!
//! The log is a SQLite database with one `PICKS` row per pick event:
//!
//! | column      | type    | notes                              |
//! |-------------|---------|------------------------------------|
//! | `PICKER_ID` | INTEGER | zero or below for anonymous picks  |
//! | `BEATMAP_ID`| INTEGER | online beatmap set id              |

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::picks::{BeatmapId, PickAggregate, PlayerId, PlayerPickCount};

const PICK_AGGREGATES_SQL: &str = "
    SELECT BEATMAP_ID, COUNT(*) AS PICK_COUNT
    FROM PICKS
    GROUP BY BEATMAP_ID
    HAVING COUNT(*) >= ?1
    ORDER BY PICK_COUNT DESC";

const TOP_PICKERS_SQL: &str = "
    SELECT PICKER_ID, COUNT(*) AS PICK_COUNT
    FROM PICKS
    GROUP BY PICKER_ID
    ORDER BY PICK_COUNT DESC
    LIMIT ?1";

const TOP_OVERPLAYED_PICKER_SQL: &str = "
    SELECT PICKER_ID, COUNT(*) AS PICK_COUNT
    FROM PICKS
    WHERE BEATMAP_ID IN (
        SELECT BEATMAP_ID
        FROM PICKS
        GROUP BY BEATMAP_ID
        HAVING COUNT(*) >= ?1
    )
    GROUP BY PICKER_ID
    ORDER BY PICK_COUNT DESC
    LIMIT 1";

const TOP_UNDERPLAYED_PICKER_SQL: &str = "
    SELECT PICKER_ID, COUNT(*) AS PICK_COUNT
    FROM PICKS
    WHERE BEATMAP_ID IN (
        SELECT BEATMAP_ID
        FROM PICKS
        GROUP BY BEATMAP_ID
        HAVING COUNT(*) = 1 OR COUNT(*) = 2
    )
    GROUP BY PICKER_ID
    ORDER BY PICK_COUNT DESC
    LIMIT 1";

/// Handle on the pick log, opened once per run
pub struct PickStore {
    conn: Connection,
}

impl PickStore {
    /// Open the pick database read-only
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!("Opened pick store at {}", path.display());
        Ok(Self { conn })
    }

    /// Picks per beatmap with at least `min_pick_count` picks, most picked first
    pub fn pick_aggregates(&self, min_pick_count: u32) -> Result<Vec<PickAggregate>> {
        let mut stmt = self.conn.prepare(PICK_AGGREGATES_SQL)?;
        let aggregates = stmt
            .query_map(params![min_pick_count], Self::row_to_aggregate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(aggregates)
    }

    /// Number of distinct pickers, anonymous ones included
    pub fn distinct_picker_count(&self) -> Result<u64> {
        self.scalar("SELECT COUNT(DISTINCT PICKER_ID) FROM PICKS")
    }

    /// Number of distinct beatmaps ever picked
    pub fn distinct_beatmap_count(&self) -> Result<u64> {
        self.scalar("SELECT COUNT(DISTINCT BEATMAP_ID) FROM PICKS")
    }

    /// Total number of pick events
    pub fn total_pick_count(&self) -> Result<u64> {
        self.scalar("SELECT COUNT(*) FROM PICKS")
    }

    /// The `limit` pickers with the most picks
    pub fn top_pickers(&self, limit: usize) -> Result<Vec<PlayerPickCount>> {
        let mut stmt = self.conn.prepare(TOP_PICKERS_SQL)?;
        let pickers = stmt
            .query_map(params![limit as i64], Self::row_to_picker)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pickers)
    }

    /// Picker with the most picks on beatmaps picked at least `min_pick_count` times
    pub fn top_overplayed_picker(&self, min_pick_count: u32) -> Result<Option<PlayerPickCount>> {
        let picker = self
            .conn
            .query_row(
                TOP_OVERPLAYED_PICKER_SQL,
                params![min_pick_count],
                Self::row_to_picker,
            )
            .optional()?;

        Ok(picker)
    }

    /// Picker with the most picks on beatmaps picked only once or twice
    pub fn top_underplayed_picker(&self) -> Result<Option<PlayerPickCount>> {
        let picker = self
            .conn
            .query_row(TOP_UNDERPLAYED_PICKER_SQL, [], Self::row_to_picker)
            .optional()?;

        Ok(picker)
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Store(e))
    }

    fn scalar(&self, sql: &str) -> Result<u64> {
        let value: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(value.max(0) as u64)
    }

    fn row_to_aggregate(row: &Row) -> rusqlite::Result<PickAggregate> {
        let beatmap_id: i64 = row.get(0)?;
        let pick_count: i64 = row.get(1)?;
        Ok(PickAggregate::new(BeatmapId(beatmap_id), pick_count as u64))
    }

    fn row_to_picker(row: &Row) -> rusqlite::Result<PlayerPickCount> {
        let picker_id: i64 = row.get(0)?;
        let pick_count: i64 = row.get(1)?;
        Ok(PlayerPickCount {
            picker_id: PlayerId(picker_id),
            pick_count: pick_count as u64,
        })
    }
}
