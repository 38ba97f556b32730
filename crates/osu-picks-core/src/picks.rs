//! Identifier and aggregate types for recorded lobby picks

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Online beatmap set identifier, as stored in the `BEATMAP_ID` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatmapId(pub i64);

/// osu! user identifier of a picker, as stored in the `PICKER_ID` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    /// Registered users have positive ids; zero and below mark anonymous pickers
    pub fn is_registered(&self) -> bool {
        self.0 > 0
    }
}

fn parse_id(s: &str, kind: &str) -> Result<i64, Error> {
    let trimmed = s.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("Invalid {} id: {:?}", kind, s)))
}

impl FromStr for BeatmapId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, "beatmap").map(Self)
    }
}

impl FromStr for PlayerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, "player").map(Self)
    }
}

impl fmt::Display for BeatmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of times a single beatmap was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickAggregate {
    pub beatmap_id: BeatmapId,
    pub pick_count: u64,
}

impl PickAggregate {
    pub fn new(beatmap_id: BeatmapId, pick_count: u64) -> Self {
        Self {
            beatmap_id,
            pick_count,
        }
    }
}

/// Number of picks made by a single picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPickCount {
    pub picker_id: PlayerId,
    pub pick_count: u64,
}

/// Display metadata of a beatmap set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatmapMetadata {
    pub artist: String,
    pub title: String,
}

impl BeatmapMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// A resolved osu! user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beatmap_id_parsing() {
        assert_eq!("123".parse::<BeatmapId>().unwrap(), BeatmapId(123));
        assert_eq!("  42 ".parse::<BeatmapId>().unwrap(), BeatmapId(42));
        assert!("12.5".parse::<BeatmapId>().is_err());
        assert!("abc".parse::<BeatmapId>().is_err());
        assert!("".parse::<BeatmapId>().is_err());
    }

    #[test]
    fn test_player_registration() {
        assert!(PlayerId(2).is_registered());
        assert!(!PlayerId(0).is_registered());
        assert!(!PlayerId(-1).is_registered());
    }

    #[test]
    fn test_display() {
        assert_eq!(BeatmapId(1001).to_string(), "1001");
        assert_eq!(PlayerId(-3).to_string(), "-3");
    }
}
