//! Export functionality for statistics data

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::model::PickStats;
use crate::error::{Error, Result};

/// Export statistics to JSON format
pub fn export_json(stats: &PickStats, path: &Path) -> Result<()> {
    let write_error = |message: String| Error::Write {
        path: path.to_path_buf(),
        message,
    };

    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| write_error(format!("Failed to serialize stats: {}", e)))?;

    let mut file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    file.write_all(json.as_bytes())
        .map_err(|e| write_error(e.to_string()))?;

    Ok(())
}
