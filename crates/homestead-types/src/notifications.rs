//! Outbound notifications for the presentation layer.
//!
//! The simulation never draws anything. Each state change it wants the UI to
//! know about becomes a [`Notification`]; the session forwards them to a sink.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Panel;
use crate::ids::CropId;
use crate::structs::{EventLogEntry, GridPos};

/// A message from the simulation to whoever renders it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// A new line was appended to the event log.
    Logged(EventLogEntry),
    /// A cell's crop just became ready for harvest.
    HarvestReady {
        /// Position of the ready cell.
        position: GridPos,
        /// Crop that matured.
        crop: CropId,
    },
    /// A panel's backing state changed and should be redrawn.
    Refresh(Panel),
}

impl Notification {
    /// The log entry carried by this notification, if any.
    pub const fn log_entry(&self) -> Option<&EventLogEntry> {
        match self {
            Self::Logged(entry) => Some(entry),
            Self::HarvestReady { .. } | Self::Refresh(_) => None,
        }
    }

    /// Whether this notification carries an alert log entry.
    pub fn is_alert(&self) -> bool {
        self.log_entry().is_some_and(|entry| entry.is_alert)
    }
}
