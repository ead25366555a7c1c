//! The session adapter: owns a farm and forwards what happens to a sink.
//!
//! [`Session::frame`] is called by a frame-timing source. It advances the
//! simulation by one day when the session is not paused and at least one
//! day length of wall-clock time has elapsed since the previous tick.
//! Player actions go through the same session, so they never interleave
//! with a tick.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{debug, info};

use homestead_farm::{Cell, EventGenerator, FarmError, Plot, StandardEvents};
use homestead_types::{GridPos, Notification};

use crate::actions::{self, ActionReport};
use crate::config::SimulationConfig;
use crate::control::SessionControl;
use crate::farm::Farm;
use crate::notify::NotificationSink;
use crate::tick::{DayReport, TickContext, advance_day};

/// A running simulation.
pub struct Session<C, S> {
    farm: Farm<C>,
    generator: Box<dyn EventGenerator>,
    rng: StdRng,
    sink: S,
    control: Arc<SessionControl>,
    last_tick: Option<Instant>,
    days_run: u64,
}

impl<S: NotificationSink> Session<Plot, S> {
    /// A standard session: reference plots, default tables, the standard
    /// event generator, and an RNG seeded from `world.seed`.
    pub fn from_config(config: &SimulationConfig, sink: S) -> Result<Self, FarmError> {
        let mut rng = StdRng::seed_from_u64(config.world.seed);
        let farm = Farm::from_config(config, &mut rng)?;
        let generator = StandardEvents::new(
            config.events.seasonal_lead_days,
            config.events.ambient_lead_days,
        );
        info!(
            farm = %config.world.name,
            seed = config.world.seed,
            grid_size = config.world.grid_size,
            "Session created"
        );
        Ok(Self::new(
            farm,
            Box::new(generator),
            rng,
            sink,
            Arc::new(SessionControl::new(&config.session)),
        ))
    }
}

impl<C: Cell, S: NotificationSink> Session<C, S> {
    /// Wrap an assembled farm.
    pub fn new(
        farm: Farm<C>,
        generator: Box<dyn EventGenerator>,
        rng: StdRng,
        sink: S,
        control: Arc<SessionControl>,
    ) -> Self {
        Self {
            farm,
            generator,
            rng,
            sink,
            control,
            last_tick: None,
            days_run: 0,
        }
    }

    /// Drive the session from a frame-timing source.
    ///
    /// The first frame only records the baseline. A paused frame drops the
    /// baseline, so time spent paused never counts towards the next day and
    /// the first frame after resuming starts timing afresh.
    pub fn frame(&mut self, now: Instant) -> Option<DayReport> {
        if self.control.is_paused() {
            self.last_tick = None;
            return None;
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };
        if now.saturating_duration_since(last) < self.control.day_length() {
            return None;
        }
        self.last_tick = Some(now);
        Some(self.step())
    }

    /// Advance exactly one day, ignoring pause and timing.
    pub fn step(&mut self) -> DayReport {
        let mut ctx = TickContext {
            rng: &mut self.rng,
            generator: self.generator.as_ref(),
        };
        let report = advance_day(&mut self.farm, &mut ctx);
        self.days_run = self.days_run.saturating_add(1);
        forward(&mut self.sink, &report.notifications);
        report
    }

    // -----------------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------------

    /// Plant `crop_id` at `position`.
    pub fn plant(&mut self, position: GridPos, crop_id: &str) -> ActionReport {
        let report = actions::plant(&mut self.farm, position, crop_id);
        self.forward_action(report)
    }

    /// Irrigate the crop at `position`.
    pub fn irrigate(&mut self, position: GridPos) -> ActionReport {
        let report = actions::irrigate(&mut self.farm, position);
        self.forward_action(report)
    }

    /// Fertilize the crop at `position`.
    pub fn fertilize(&mut self, position: GridPos) -> ActionReport {
        let report = actions::fertilize(&mut self.farm, position);
        self.forward_action(report)
    }

    /// Harvest the crop at `position`.
    pub fn harvest(&mut self, position: GridPos) -> ActionReport {
        let report = actions::harvest(&mut self.farm, position);
        self.forward_action(report)
    }

    /// Research `tech_id`.
    pub fn research(&mut self, tech_id: &str) -> ActionReport {
        let report = actions::research(&mut self.farm, tech_id);
        self.forward_action(report)
    }

    fn forward_action(&mut self, report: ActionReport) -> ActionReport {
        debug!(ok = report.is_ok(), "Player action");
        forward(&mut self.sink, &report.notifications);
        report
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The simulated farm.
    pub const fn farm(&self) -> &Farm<C> {
        &self.farm
    }

    /// Mutable access for scripted setups.
    pub const fn farm_mut(&mut self) -> &mut Farm<C> {
        &mut self.farm
    }

    /// Shared control handle.
    pub const fn control(&self) -> &Arc<SessionControl> {
        &self.control
    }

    /// The notification sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Days advanced since the session was created.
    pub const fn days_run(&self) -> u64 {
        self.days_run
    }

    /// Tear down the session, keeping the farm.
    pub fn into_farm(self) -> Farm<C> {
        self.farm
    }
}

fn forward<S: NotificationSink>(sink: &mut S, notifications: &[Notification]) {
    for notification in notifications {
        sink.notify(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use homestead_types::Panel;

    use super::*;

    fn session() -> Session<Plot, Vec<Notification>> {
        let mut config = SimulationConfig::default();
        config.events.ambient_chance = 0.0;
        Session::from_config(&config, Vec::new()).unwrap()
    }

    #[test]
    fn first_frame_sets_baseline() {
        let mut session = session();
        let start = Instant::now();
        assert!(session.frame(start).is_none());
        assert_eq!(session.days_run(), 0);
    }

    #[test]
    fn ticks_once_per_day_length() {
        let mut session = session();
        let start = Instant::now();
        session.frame(start);

        assert!(session.frame(start + Duration::from_millis(500)).is_none());
        let report = session.frame(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(report.day, 2);
        assert!(session.frame(start + Duration::from_millis(1500)).is_none());
        assert!(session.frame(start + Duration::from_millis(2000)).is_some());
        assert_eq!(session.days_run(), 2);
    }

    #[test]
    fn paused_frames_skip_without_queueing() {
        let mut session = session();
        let start = Instant::now();
        session.frame(start);
        session.control().pause();

        assert!(session.frame(start + Duration::from_secs(10)).is_none());
        assert_eq!(session.farm().state.clock.day(), 1);

        // The pause does not count: resuming restarts the day timer.
        session.control().resume();
        assert!(session.frame(start + Duration::from_secs(11)).is_none());
        assert!(session.frame(start + Duration::from_millis(11_500)).is_none());
        assert!(session.frame(start + Duration::from_secs(12)).is_some());
        assert_eq!(session.days_run(), 1);
    }

    #[test]
    fn step_forwards_notifications() {
        let mut session = session();
        let report = session.step();
        assert_eq!(session.sink(), &report.notifications);
        assert_eq!(session.sink().last(), Some(&Notification::Refresh(Panel::Hud)));
    }

    #[test]
    fn actions_forward_notifications() {
        let mut session = session();
        let report = session.plant(GridPos::new(0, 0), "wheat");
        assert!(report.is_ok());
        assert_eq!(session.sink(), &report.notifications);

        let rejected = session.harvest(GridPos::new(1, 1));
        assert!(!rejected.is_ok());
        assert!(session.sink().iter().any(Notification::is_alert));
    }

    #[test]
    fn same_seed_same_history() {
        let mut a = session();
        let mut b = session();
        for _ in 0..400 {
            assert_eq!(a.step(), b.step());
        }
        assert_eq!(a.farm().state.balance, b.farm().state.balance);
    }
}
