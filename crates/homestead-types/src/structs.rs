//! Plain data structs shared between the simulation core and the UI.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Grid position
// ---------------------------------------------------------------------------

/// Row/column coordinate of a cell in the square farm grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct GridPos {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl GridPos {
    /// Create a position from a row and column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Climate
// ---------------------------------------------------------------------------

/// Regional climate parameters. The hazard probabilities drift upward each
/// year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Climate {
    /// Average temperature in degrees Celsius.
    pub avg_temp: f64,
    /// Annual rainfall in millimetres.
    pub rainfall: f64,
    /// Base probability of a drought event.
    pub drought_probability: f64,
    /// Base probability of a flood event.
    pub flood_probability: f64,
    /// Base probability of a heatwave event.
    pub heatwave_probability: f64,
}

impl Default for Climate {
    fn default() -> Self {
        Self {
            avg_temp: 18.0,
            rainfall: 650.0,
            drought_probability: 0.1,
            flood_probability: 0.05,
            heatwave_probability: 0.08,
        }
    }
}

// ---------------------------------------------------------------------------
// Sustainability
// ---------------------------------------------------------------------------

/// Sustainability score and its three components, each in 0..=100.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreBreakdown {
    /// Weighted total: soil 40%, diversity 40%, technology 20%.
    pub total: u32,
    /// Mean soil health, rounded.
    pub soil: u32,
    /// Crop diversity after distribution and monocrop penalties.
    pub diversity: u32,
    /// Share of sustainable technology points researched.
    pub tech: u32,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// A single line in the player's event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventLogEntry {
    /// Date label such as `"Spring, Year 1"`.
    pub date_label: String,
    /// Log message.
    pub message: String,
    /// Whether the entry should be rendered as an alert.
    pub is_alert: bool,
}

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

/// Result of harvesting a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvestOutcome {
    /// Sale value credited to the balance.
    pub value: i64,
    /// Display name of the harvested crop.
    pub crop_name: String,
    /// Realised yield as a percentage of the crop's base yield.
    pub yield_percentage: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn grid_pos_display() {
        assert_eq!(GridPos::new(2, 3).to_string(), "(2, 3)");
    }

    #[test]
    fn log_entry_json_shape() {
        let entry = EventLogEntry {
            date_label: String::from("Spring, Year 1"),
            message: String::from("Rain fell"),
            is_alert: false,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date_label"], "Spring, Year 1");
        assert_eq!(json["is_alert"], false);
    }
}
