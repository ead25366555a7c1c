//! Runtime session control.
//!
//! [`SessionControl`] is shared between the frame loop and whatever drives
//! it from outside (a signal handler, a UI). Every field a controller can
//! touch is atomic, so the frame loop reads them without locking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// Reached the configured `max_days`.
    MaxDaysReached,
    /// Reached the configured `max_real_time_seconds`.
    MaxRealTimeReached,
    /// A stop was requested.
    StopRequested,
}

/// Shared control state for one session.
#[derive(Debug)]
pub struct SessionControl {
    paused: AtomicBool,
    stop_requested: AtomicBool,
    /// Wall-clock milliseconds per simulated day.
    day_length_ms: AtomicU64,
    frame_interval_ms: u64,
    started_at: DateTime<Utc>,
    /// 0 = unlimited.
    max_days: u64,
    /// 0 = unlimited.
    max_real_time_seconds: u64,
}

impl SessionControl {
    /// Control state for a session configured by `config`.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            paused: AtomicBool::new(config.start_paused),
            stop_requested: AtomicBool::new(false),
            day_length_ms: AtomicU64::new(config.day_length_ms.max(1)),
            frame_interval_ms: config.frame_interval_ms,
            started_at: Utc::now(),
            max_days: config.max_days,
            max_real_time_seconds: config.max_real_time_seconds,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether ticks are currently suppressed.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Suppress ticks until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Allow ticks again.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Flip the pause flag. Returns the new state.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Ask the frame loop to finish after the current frame.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Wall-clock length of one simulated day.
    pub fn day_length(&self) -> Duration {
        Duration::from_millis(self.day_length_ms())
    }

    /// Day length in milliseconds.
    pub fn day_length_ms(&self) -> u64 {
        self.day_length_ms.load(Ordering::Acquire)
    }

    /// Change the day length. Returns the previous value, or `None` if
    /// `ms` is zero.
    pub fn set_day_length_ms(&self, ms: u64) -> Option<u64> {
        if ms == 0 {
            return None;
        }
        Some(self.day_length_ms.swap(ms, Ordering::AcqRel))
    }

    /// Period of the driving frame loop.
    pub const fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// `true` once `days_run` reaches a non-zero `max_days`.
    pub const fn day_limit_reached(&self, days_run: u64) -> bool {
        self.max_days > 0 && days_run >= self.max_days
    }

    /// `true` once a non-zero `max_real_time_seconds` has elapsed.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Wall-clock start of the session.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the session started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured day limit.
    pub const fn max_days(&self) -> u64 {
        self.max_days
    }

    /// Configured wall-clock limit in seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

impl Default for SessionControl {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let control = SessionControl::default();
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert_eq!(control.day_length_ms(), 1000);
    }

    #[test]
    fn start_paused_is_honoured() {
        let config = SessionConfig {
            start_paused: true,
            ..SessionConfig::default()
        };
        assert!(SessionControl::new(&config).is_paused());
    }

    #[test]
    fn pause_resume_and_toggle() {
        let control = SessionControl::default();
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
        assert!(!control.is_paused());
    }

    #[test]
    fn stop_request_sticks() {
        let control = SessionControl::default();
        control.request_stop();
        assert!(control.is_stop_requested());
    }

    #[test]
    fn day_length_rejects_zero() {
        let control = SessionControl::default();
        assert_eq!(control.set_day_length_ms(250), Some(1000));
        assert_eq!(control.day_length(), Duration::from_millis(250));
        assert_eq!(control.set_day_length_ms(0), None);
        assert_eq!(control.day_length_ms(), 250);
    }

    #[test]
    fn zero_limits_are_unlimited() {
        let control = SessionControl::default();
        assert!(!control.day_limit_reached(1_000_000));
        assert!(!control.time_limit_reached());
    }

    #[test]
    fn day_limit() {
        let config = SessionConfig {
            max_days: 30,
            ..SessionConfig::default()
        };
        let control = SessionControl::new(&config);
        assert!(!control.day_limit_reached(29));
        assert!(control.day_limit_reached(30));
    }
}
