//! Configuration for a pick enrichment run
//!
//! [`Config`] is the user-editable, serde-backed settings file. A run never
//! reads it directly: [`Config::into_run_config`] validates it once and
//! produces the immutable [`RunConfig`] handed to every component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default spacing between two live beatmap lookups
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Default number of pickers in the ranking
pub const DEFAULT_TOP_PICKER_COUNT: usize = 10;

/// Default report destination
pub const DEFAULT_OUTPUT_PATH: &str = "overplayed.csv";

const DEFAULT_API_BASE_URL: &str = "https://osu.ppy.sh/api/v2";
const DEFAULT_TOKEN_URL: &str = "https://osu.ppy.sh/oauth/token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Persistent configuration for osu-picks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the `PICKS` table
    pub database_path: Option<PathBuf>,
    /// Previously exported report reused as a metadata cache
    pub snapshot_path: Option<PathBuf>,
    /// Where the enriched report is written
    pub output_path: PathBuf,
    /// Minimum pick count; prompted for when absent
    pub min_pick_count: Option<u32>,
    /// Spacing between live beatmap lookups in milliseconds
    pub request_delay_ms: u64,
    /// Consult the snapshot before the osu! API
    pub use_snapshot_cache: bool,
    /// Compute the overplayed/underplayed pickers
    pub compute_extremal_pickers: bool,
    /// Number of pickers in the ranking
    pub top_picker_count: usize,
    /// osu! API settings
    pub api: ApiConfig,
}

/// osu! API v2 connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// OAuth client credentials for the guest token grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Client credentials, or a configuration error naming what is missing
    pub fn credentials(&self) -> Result<ClientCredentials> {
        let client_id = self
            .client_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("osu! API client id not configured".to_string()))?;
        let client_secret = self
            .client_secret
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("osu! API client secret not configured".to_string()))?;

        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            snapshot_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            min_pick_count: None,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            use_snapshot_cache: true,
            compute_extremal_pickers: true,
            top_picker_count: DEFAULT_TOP_PICKER_COUNT,
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("osu-picks").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit path; unlike [`Config::load`] errors are surfaced
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Save config to disk
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
            std::fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Apply `OSU_CLIENT_ID`, `OSU_CLIENT_SECRET`, `OSU_PICKS_DB` and `OSU_PICKS_SNAPSHOT`
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides from an arbitrary lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("OSU_CLIENT_ID") {
            self.api.client_id = Some(id);
        }
        if let Some(secret) = lookup("OSU_CLIENT_SECRET") {
            self.api.client_secret = Some(secret);
        }
        if let Some(db) = lookup("OSU_PICKS_DB") {
            self.database_path = Some(PathBuf::from(db));
        }
        if let Some(snapshot) = lookup("OSU_PICKS_SNAPSHOT") {
            self.snapshot_path = Some(PathBuf::from(snapshot));
        }
    }

    /// Validate the configuration and freeze it for a run
    pub fn into_run_config(self, min_pick_count: u32) -> Result<RunConfig> {
        let database_path = self
            .database_path
            .ok_or_else(|| Error::Config("Pick database path not configured".to_string()))?;

        if self.top_picker_count == 0 {
            return Err(Error::Config(
                "Top picker count must be at least 1".to_string(),
            ));
        }

        let snapshot_path = if self.use_snapshot_cache {
            self.snapshot_path
        } else {
            None
        };

        Ok(RunConfig {
            database_path,
            snapshot_path,
            output_path: self.output_path,
            min_pick_count,
            request_delay: Duration::from_millis(self.request_delay_ms),
            compute_extremal_pickers: self.compute_extremal_pickers,
            top_picker_count: self.top_picker_count,
        })
    }
}

/// Immutable settings for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub database_path: PathBuf,
    /// `None` when the snapshot cache is disabled or not configured
    pub snapshot_path: Option<PathBuf>,
    pub output_path: PathBuf,
    /// Inclusive; zero disables the filter
    pub min_pick_count: u32,
    /// Minimum spacing between two live beatmap lookups
    pub request_delay: Duration,
    pub compute_extremal_pickers: bool,
    pub top_picker_count: usize,
}

impl RunConfig {
    /// Run settings with defaults for everything but the database
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            snapshot_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            min_pick_count: 0,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            compute_extremal_pickers: true,
            top_picker_count: DEFAULT_TOP_PICKER_COUNT,
        }
    }
}

/// Parse a user-entered minimum pick count
pub fn parse_min_pick_count(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    trimmed.parse::<u32>().map_err(|_| {
        Error::Config(format!(
            "Invalid minimum pick count {:?}: expected a non-negative whole number",
            trimmed
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_delay_ms, 1000);
        assert_eq!(config.top_picker_count, 10);
        assert_eq!(config.output_path, PathBuf::from("overplayed.csv"));
        assert!(config.use_snapshot_cache);
        assert!(config.compute_extremal_pickers);
        assert_eq!(config.api.base_url, "https://osu.ppy.sh/api/v2");
    }

    #[test]
    fn test_parse_min_pick_count() {
        assert_eq!(parse_min_pick_count("3").unwrap(), 3);
        assert_eq!(parse_min_pick_count(" 12\n").unwrap(), 12);
        assert_eq!(parse_min_pick_count("0").unwrap(), 0);
        assert!(matches!(parse_min_pick_count("abc"), Err(Error::Config(_))));
        assert!(matches!(parse_min_pick_count("-2"), Err(Error::Config(_))));
        assert!(matches!(parse_min_pick_count(""), Err(Error::Config(_))));
    }

    #[test]
    fn test_into_run_config_requires_database() {
        let err = Config::default().into_run_config(3).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_into_run_config_rejects_zero_top_pickers() {
        let config = Config {
            database_path: Some(PathBuf::from("picks.db")),
            top_picker_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.into_run_config(1), Err(Error::Config(_))));
    }

    #[test]
    fn test_into_run_config_drops_snapshot_when_disabled() {
        let config = Config {
            database_path: Some(PathBuf::from("picks.db")),
            snapshot_path: Some(PathBuf::from("old.csv")),
            use_snapshot_cache: false,
            request_delay_ms: 70,
            ..Default::default()
        };
        let run = config.into_run_config(5).unwrap();
        assert_eq!(run.snapshot_path, None);
        assert_eq!(run.request_delay, Duration::from_millis(70));
        assert_eq!(run.min_pick_count, 5);
    }

    #[test]
    fn test_apply_env_from() {
        let vars: HashMap<&str, &str> = [
            ("OSU_CLIENT_ID", "1234"),
            ("OSU_CLIENT_SECRET", "hunter2"),
            ("OSU_PICKS_DB", "/data/picks.db"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, Some(PathBuf::from("/data/picks.db")));
        assert_eq!(config.snapshot_path, None);
        let creds = config.api.credentials().unwrap();
        assert_eq!(creds.client_id, "1234");
        assert_eq!(creds.client_secret, "hunter2");
    }

    #[test]
    fn test_missing_credentials() {
        let api = ApiConfig {
            client_id: Some("1".into()),
            ..Default::default()
        };
        assert!(matches!(api.credentials(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_path": "picks.db", "request_delay_ms": 70}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("picks.db")));
        assert_eq!(config.request_delay_ms, 70);
        assert_eq!(config.top_picker_count, DEFAULT_TOP_PICKER_COUNT);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
