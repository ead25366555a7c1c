//! Notification sinks.
//!
//! The tick cycle and the action controller return notifications as plain
//! data. A [`Session`](crate::session::Session) forwards them to a
//! [`NotificationSink`]; the sink never influences control flow.

use tracing::{debug, info, warn};

use homestead_types::Notification;

/// Receiver of simulation notifications.
pub trait NotificationSink {
    /// Handle one notification.
    fn notify(&mut self, notification: &Notification);
}

/// Collects notifications in memory. Used by tests and batch drivers.
impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

/// Writes notifications to `tracing`: alerts at `warn`, log lines at
/// `info`, everything else at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::Logged(entry) if entry.is_alert => {
                warn!(date = %entry.date_label, "{}", entry.message);
            }
            Notification::Logged(entry) => {
                info!(date = %entry.date_label, "{}", entry.message);
            }
            Notification::HarvestReady { position, crop } => {
                debug!(%position, %crop, "Harvest ready");
            }
            Notification::Refresh(panel) => {
                debug!(?panel, "Panel refresh");
            }
        }
    }
}
