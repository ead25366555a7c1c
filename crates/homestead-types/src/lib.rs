//! Shared type definitions for the Homestead farming simulation.
//!
//! Every crate in the workspace speaks in these types. The UI-facing ones
//! (dates, notifications, log entries, score breakdowns) flow downstream to
//! `TypeScript` via `ts-rs` for the game panels.
//!
//! # Modules
//!
//! - [`calendar`] -- Day, season, and year constants with day wrapping
//! - [`ids`] -- String-keyed identifiers for crops and technologies
//! - [`enums`] -- Season, cell status, and UI panel enumerations
//! - [`structs`] -- Grid positions, climate, score breakdowns, log entries
//! - [`events`] -- Pending events and their tagged kinds
//! - [`notifications`] -- Outbound notifications for the presentation layer

pub mod calendar;
pub mod enums;
pub mod events;
pub mod ids;
pub mod notifications;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use calendar::{DAYS_PER_SEASON, DAYS_PER_YEAR, days_after, wrap_day};
pub use enums::{CellStatus, Panel, Season};
pub use events::{EventKind, PendingEvent};
pub use ids::{CropId, TechId};
pub use notifications::Notification;
pub use structs::{Climate, EventLogEntry, GridPos, HarvestOutcome, ScoreBreakdown};

#[cfg(test)]
mod tests {
    //! Export checks and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::CropId::export_all();
        let _ = crate::ids::TechId::export_all();

        let _ = crate::enums::Season::export_all();
        let _ = crate::enums::CellStatus::export_all();
        let _ = crate::enums::Panel::export_all();

        let _ = crate::structs::GridPos::export_all();
        let _ = crate::structs::Climate::export_all();
        let _ = crate::structs::ScoreBreakdown::export_all();
        let _ = crate::structs::EventLogEntry::export_all();
        let _ = crate::structs::HarvestOutcome::export_all();

        let _ = crate::notifications::Notification::export_all();
    }
}
