//! Pending events and their tagged kinds.
//!
//! A [`PendingEvent`] sits in the scheduler's queue until the calendar day
//! equals its `trigger_day`, then it is removed and dispatched on its
//! [`EventKind`]. Multi-day weather carries its remaining duration inline so
//! a single dispatcher can re-enqueue the next day without callbacks.
//!
//! Kinds arrive from generators and, potentially, external content files.
//! Any `type` tag the simulation does not know deserializes to
//! [`EventKind::Unrecognized`], which resolves as a no-op.

use serde::{Deserialize, Serialize};

use crate::ids::{CropId, TechId};

/// The kind of a scheduled event and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Rainfall replenishing the water reserve.
    Rain {
        /// Water reserve points restored.
        amount: u32,
    },
    /// Multi-day drought draining water and stressing crops.
    Drought {
        /// Remaining days including the current one.
        duration: u32,
        /// Severity in 0.0..=1.0 before technology mitigation.
        severity: f64,
    },
    /// Multi-day heatwave stressing crops.
    Heatwave {
        /// Remaining days including the current one.
        duration: u32,
        /// Severity in 0.0..=1.0 before technology mitigation.
        severity: f64,
    },
    /// A single night of frost.
    Frost {
        /// Severity in 0.0..=1.0 before technology mitigation.
        severity: f64,
    },
    /// A market shock on one crop or on all crops.
    Market {
        /// Affected crop, or every crop when absent.
        crop: Option<CropId>,
        /// Multiplier applied to the affected price entries.
        factor: f64,
    },
    /// A government policy changing the balance.
    Policy {
        /// Headline shown in the event log.
        title: String,
        /// Signed balance change.
        balance_delta: i64,
    },
    /// A technology breakthrough, grant, or free upgrade.
    Technology {
        /// Headline shown in the event log.
        title: String,
        /// Signed balance change.
        balance_delta: i64,
        /// Technology granted for free, if any.
        grant: Option<TechId>,
    },
    /// Any event type the simulation does not know how to resolve.
    #[serde(other)]
    Unrecognized,
}

impl EventKind {
    /// Short announcement text used when an event is first scheduled.
    pub fn headline(&self) -> String {
        match self {
            Self::Rain { .. } => String::from("Rain clouds are gathering on the horizon"),
            Self::Drought { duration, .. } => format!("A {duration}-day drought is forecast"),
            Self::Heatwave { duration, .. } => format!("A {duration}-day heatwave is on its way"),
            Self::Frost { .. } => String::from("A hard frost is forecast"),
            Self::Market { crop: Some(crop), .. } => {
                format!("Traders expect a shift in {crop} prices")
            }
            Self::Market { crop: None, .. } => String::from("Traders expect a broad market shift"),
            Self::Policy { title, .. } | Self::Technology { title, .. } => title.clone(),
            Self::Unrecognized => String::from("Something unusual is brewing"),
        }
    }

    /// Whether this kind has a resolution handler.
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// An event waiting in the scheduler's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    /// Calendar day (1..=360) on which the event resolves.
    pub trigger_day: u32,
    /// What happens when it resolves.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl PendingEvent {
    /// Create a pending event for the given trigger day.
    pub const fn new(trigger_day: u32, kind: EventKind) -> Self {
        Self { trigger_day, kind }
    }
}
