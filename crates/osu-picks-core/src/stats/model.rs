//! Data models for pick statistics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::picks::PlayerId;

/// Shown for pickers with a non-positive id
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Shown for registered pickers whose name could not be resolved
pub const UNKNOWN_NAME: &str = "Unknown";

fn display_name(picker_id: PlayerId, name: Option<&str>) -> &str {
    if !picker_id.is_registered() {
        return ANONYMOUS_NAME;
    }
    name.unwrap_or(UNKNOWN_NAME)
}

/// An entry of the top picker ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPicker {
    /// 1-based position in the ranking
    pub rank: usize,
    pub picker_id: PlayerId,
    /// Resolved username, if any
    pub name: Option<String>,
    pub pick_count: u64,
}

impl RankedPicker {
    pub fn display_name(&self) -> &str {
        display_name(self.picker_id, self.name.as_deref())
    }
}

/// The picker leading one of the overplayed/underplayed categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremalPicker {
    pub picker_id: PlayerId,
    pub name: Option<String>,
    /// Picks counted towards the category
    pub pick_count: u64,
}

impl ExtremalPicker {
    pub fn display_name(&self) -> &str {
        display_name(self.picker_id, self.name.as_deref())
    }
}

/// Summary statistics over the whole pick log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickStats {
    /// Total number of pick events
    pub total_picks: u64,
    /// Distinct pickers, anonymous ones included
    pub unique_players: u64,
    /// Distinct beatmap sets
    pub unique_beatmaps: u64,
    /// Most active pickers, best first
    pub top_pickers: Vec<RankedPicker>,
    /// Threshold the overplayed picker was computed with
    pub min_pick_count: Option<u32>,
    /// Most picks on beatmaps at or above the threshold
    pub overplayed: Option<ExtremalPicker>,
    /// Most picks on beatmaps picked once or twice
    pub underplayed: Option<ExtremalPicker>,
}

impl PickStats {
    /// Distinct counts can never exceed the number of picks
    pub fn is_consistent(&self) -> bool {
        self.unique_beatmaps <= self.total_picks && self.unique_players <= self.total_picks
    }
}

impl fmt::Display for PickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total picks: {}", self.total_picks)?;
        writeln!(f, "Unique players count: {}", self.unique_players)?;
        writeln!(f, "Unique beatmaps count: {}", self.unique_beatmaps)?;

        if !self.top_pickers.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top pickers:")?;
            for picker in &self.top_pickers {
                writeln!(
                    f,
                    "{}. {} ({}) with {} picks",
                    picker.rank,
                    picker.display_name(),
                    picker.picker_id,
                    picker.pick_count
                )?;
            }
        }

        if let Some(ref picker) = self.overplayed {
            writeln!(f)?;
            writeln!(
                f,
                "Overplayed picker: {} with {} overplayed picks",
                picker.display_name(),
                picker.pick_count
            )?;
        }

        if let Some(ref picker) = self.underplayed {
            writeln!(f)?;
            writeln!(
                f,
                "Underplayed picker: {} with {} underplayed picks",
                picker.display_name(),
                picker.pick_count
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let anonymous = RankedPicker {
            rank: 1,
            picker_id: PlayerId(0),
            name: Some("ignored".into()),
            pick_count: 3,
        };
        assert_eq!(anonymous.display_name(), "Anonymous");

        let unresolved = ExtremalPicker {
            picker_id: PlayerId(5),
            name: None,
            pick_count: 1,
        };
        assert_eq!(unresolved.display_name(), "Unknown");
    }

    #[test]
    fn test_summary_text() {
        let stats = PickStats {
            total_picks: 11,
            unique_players: 4,
            unique_beatmaps: 4,
            top_pickers: vec![
                RankedPicker {
                    rank: 1,
                    picker_id: PlayerId(3),
                    name: Some("mrekk".into()),
                    pick_count: 4,
                },
                RankedPicker {
                    rank: 2,
                    picker_id: PlayerId(0),
                    name: None,
                    pick_count: 2,
                },
            ],
            min_pick_count: Some(3),
            overplayed: Some(ExtremalPicker {
                picker_id: PlayerId(2),
                name: Some("peppy".into()),
                pick_count: 3,
            }),
            underplayed: None,
        };

        let expected = "\
Total picks: 11
Unique players count: 4
Unique beatmaps count: 4

Top pickers:
1. mrekk (3) with 4 picks
2. Anonymous (0) with 2 picks

Overplayed picker: peppy with 3 overplayed picks
";
        assert_eq!(stats.to_string(), expected);
        assert!(stats.is_consistent());
    }
}
