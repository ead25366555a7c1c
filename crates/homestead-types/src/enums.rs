//! Enumeration types for the calendar, farm cells, and UI panels.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::GridPos;

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season in the 360-day agricultural year (90 days per season).
///
/// Seasons only ever advance `Spring -> Summer -> Fall -> Winter -> Spring`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Water recovers strongly, rain is likely.
    #[default]
    Spring,
    /// Drought and heatwave season. No water recovery.
    Summer,
    /// Moderate water recovery, rain is likely.
    Fall,
    /// Frost season, moderate water recovery.
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Fall, Self::Winter];

    /// The season that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Fall,
            Self::Fall => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }

    /// Human-readable name used in date labels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }
}

impl core::fmt::Display for Season {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Cell status
// ---------------------------------------------------------------------------

/// Growth status reported by a farm cell after its daily update.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum CellStatus {
    /// Nothing planted.
    #[default]
    Empty,
    /// A crop is planted and still maturing.
    Growing,
    /// The crop is mature and can be harvested.
    Ready,
    /// The crop died (stress or neglect) and yields nothing.
    Failed,
}

// ---------------------------------------------------------------------------
// UI panels
// ---------------------------------------------------------------------------

/// A presentation panel that may need redrawing after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Panel {
    /// Date, balance, water, health, and value readouts.
    Hud,
    /// The rolling event log.
    EventLog,
    /// A single grid cell.
    Cell(GridPos),
    /// The research tree.
    Research,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_cycle_wraps_after_four_steps() {
        let mut season = Season::Spring;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(season);
            season = season.next();
        }
        assert_eq!(seen, Season::ALL);
        assert_eq!(season, Season::Spring);
    }

    #[test]
    fn season_label_matches_display() {
        for season in Season::ALL {
            assert_eq!(season.to_string(), season.label());
        }
    }
}
