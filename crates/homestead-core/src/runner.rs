//! The async frame loop.
//!
//! [`run_session`] drives a [`Session`] from a tokio interval until a day
//! limit, a wall-clock limit, or a stop request ends it. After every
//! simulated day a [`DayCallback`] gets mutable access to the session, which
//! is where a scripted player issues its actions.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use homestead_farm::Cell;

use crate::control::SessionEndReason;
use crate::notify::NotificationSink;
use crate::session::Session;
use crate::tick::DayReport;

/// Errors that prevent the frame loop from running.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A zero frame interval cannot drive a tokio interval.
    #[error("frame interval must be at least 1ms")]
    ZeroFrameInterval,
}

/// Outcome of a completed session.
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Why the loop stopped.
    pub end_reason: SessionEndReason,
    /// Days advanced during the run.
    pub days_run: u64,
    /// Report of the last simulated day, if any ran.
    pub final_report: Option<DayReport>,
}

/// Hook invoked after every simulated day.
pub trait DayCallback<C, S> {
    /// Called with the day's report while the session is between ticks.
    fn on_day(&mut self, session: &mut Session<C, S>, report: &DayReport);
}

/// A callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl<C, S> DayCallback<C, S> for NoOpCallback {
    fn on_day(&mut self, _session: &mut Session<C, S>, _report: &DayReport) {}
}

/// Run `session` until it ends.
///
/// Frames fire every `frame_interval_ms`; the session decides on each frame
/// whether a day is due. Limits and the stop flag are checked once per
/// frame.
pub async fn run_session<C: Cell, S: NotificationSink>(
    session: &mut Session<C, S>,
    callback: &mut dyn DayCallback<C, S>,
) -> Result<SessionResult, RunnerError> {
    let control = std::sync::Arc::clone(session.control());
    let frame_ms = control.frame_interval_ms();
    if frame_ms == 0 {
        return Err(RunnerError::ZeroFrameInterval);
    }

    let mut interval = tokio::time::interval(Duration::from_millis(frame_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        frame_interval_ms = frame_ms,
        day_length_ms = control.day_length_ms(),
        max_days = control.max_days(),
        max_real_time_seconds = control.max_real_time_seconds(),
        "Frame loop starting"
    );

    let mut final_report = None;
    let end_reason = loop {
        interval.tick().await;

        if control.is_stop_requested() {
            break SessionEndReason::StopRequested;
        }
        if control.time_limit_reached() {
            break SessionEndReason::MaxRealTimeReached;
        }

        if let Some(report) = session.frame(Instant::now()) {
            callback.on_day(session, &report);
            final_report = Some(report);
            if control.day_limit_reached(session.days_run()) {
                break SessionEndReason::MaxDaysReached;
            }
        }
    };

    let result = SessionResult {
        end_reason,
        days_run: session.days_run(),
        final_report,
    };
    log_session_end(&result);
    Ok(result)
}

/// Log how a session ended.
pub fn log_session_end(result: &SessionResult) {
    info!(
        reason = ?result.end_reason,
        days_run = result.days_run,
        "Session ended"
    );

    if let Some(ref report) = result.final_report {
        info!(
            day = report.day,
            season = %report.season,
            year = report.year,
            "Final day"
        );
    } else {
        warn!("Session ended before any day ran");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homestead_farm::Plot;
    use homestead_types::{GridPos, Notification};

    use super::*;
    use crate::config::SimulationConfig;

    fn fast_config(max_days: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.session.day_length_ms = 1;
        config.session.frame_interval_ms = 1;
        config.session.max_days = max_days;
        config
    }

    #[tokio::test]
    async fn stops_at_day_limit() {
        let mut session = Session::from_config(&fast_config(5), Vec::new()).unwrap();
        let result = run_session(&mut session, &mut NoOpCallback).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::MaxDaysReached);
        assert_eq!(result.days_run, 5);
        assert_eq!(result.final_report.unwrap().day, 6);
        assert_eq!(session.farm().state.clock.day(), 6);
    }

    #[tokio::test]
    async fn stop_request_ends_the_loop() {
        let mut session = Session::from_config(&fast_config(0), Vec::new()).unwrap();
        session.control().request_stop();
        let result = run_session(&mut session, &mut NoOpCallback).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::StopRequested);
        assert_eq!(result.days_run, 0);
        assert!(result.final_report.is_none());
    }

    #[tokio::test]
    async fn zero_frame_interval_is_rejected() {
        let mut config = fast_config(1);
        config.session.frame_interval_ms = 0;
        let mut session = Session::from_config(&config, Vec::new()).unwrap();
        let err = run_session(&mut session, &mut NoOpCallback).await;
        assert!(matches!(err, Err(RunnerError::ZeroFrameInterval)));
    }

    struct PlantOnce {
        days_seen: u64,
    }

    impl DayCallback<Plot, Vec<Notification>> for PlantOnce {
        fn on_day(&mut self, session: &mut Session<Plot, Vec<Notification>>, _: &DayReport) {
            self.days_seen += 1;
            if self.days_seen == 1 {
                assert!(session.plant(GridPos::new(0, 0), "lettuce").is_ok());
            }
            if self.days_seen == 3 {
                session.control().request_stop();
            }
        }
    }

    #[tokio::test]
    async fn callback_acts_between_days() {
        let mut session = Session::from_config(&fast_config(0), Vec::new()).unwrap();
        let mut callback = PlantOnce { days_seen: 0 };
        let result = run_session(&mut session, &mut callback).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::StopRequested);
        assert_eq!(callback.days_seen, 3);
        let cell = session.farm().grid.get(GridPos::new(0, 0)).unwrap();
        assert!(cell.crop().is_some());
    }
}
