//! CSV report of enriched picks
//!
//! One row per pick aggregate, in aggregate order, always preceded by a
//! header row. The same schema is read back as a snapshot on later runs.

use std::fmt::Display;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::picks::BeatmapId;
use crate::resolver::EnrichedRecord;

/// Column names of the report, in order
pub const REPORT_HEADERS: [&str; 4] = ["beatmapset_id", "beatmapset_name", "artist", "pick_count"];

/// A single report row as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub beatmapset_id: BeatmapId,
    pub beatmapset_name: String,
    pub artist: String,
    pub pick_count: u64,
}

impl From<&EnrichedRecord> for ReportRow {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            beatmapset_id: record.beatmap_id,
            beatmapset_name: record.name().to_string(),
            artist: record.artist().to_string(),
            pick_count: record.pick_count,
        }
    }
}

fn write_error(path: &Path, e: impl Display) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Write the report to `path`, replacing any existing file
pub fn write_report(records: &[EnrichedRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| write_error(path, e))?;
    write_report_to(records, file).map_err(|e| write_error(path, e))?;

    tracing::info!("Wrote {} report rows to {}", records.len(), path.display());
    Ok(())
}

/// Write the report to any writer
pub fn write_report_to<W: io::Write>(records: &[EnrichedRecord], writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so an empty report still carries its header
    writer.write_record(REPORT_HEADERS)?;
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a report previously produced by [`write_report`]
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>> {
    let parse_error = |e: csv::Error| Error::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(parse_error)?;

    reader
        .deserialize()
        .collect::<csv::Result<Vec<ReportRow>>>()
        .map_err(parse_error)
}
