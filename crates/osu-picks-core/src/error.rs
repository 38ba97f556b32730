//! Error types for osu-picks-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for osu-picks operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pick store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("osu! API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid osu! API response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse snapshot {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write report {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error ends the whole run rather than a single lookup or phase
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Config(_) | Error::Auth(_))
    }
}

/// Result type alias for osu-picks operations
pub type Result<T> = std::result::Result<T, Error>;
