//! Simulation core for Homestead: calendar, economy, events, and player
//! actions over a farm grid.
//!
//! A [`Farm`] holds all mutable state. [`advance_day`] moves it forward one
//! day; the [`actions`] functions apply player commands between days. Both
//! return notifications as data, which a [`Session`] forwards to a
//! [`NotificationSink`].
//!
//! # Modules
//!
//! - [`clock`] -- Day, season, and year counters.
//! - [`config`] -- Configuration loading from `homestead-config.yaml`.
//! - [`economy`] -- Inflation, costs, market prices, and subsidies.
//! - [`sustainability`] -- The soil, diversity, and technology score.
//! - [`state`] -- The economic ledger.
//! - [`farm`] -- The [`Farm`] aggregate.
//! - [`log`] -- The bounded player-facing event log.
//! - [`scheduler`] -- Pending events: seeding, queueing, and resolution.
//! - [`actions`] -- Validated player actions.
//! - [`notify`] -- [`NotificationSink`] and [`TracingSink`].
//! - [`tick`] -- The eight-step daily cycle.
//! - [`control`] -- Shared pause, stop, and speed control.
//! - [`session`] -- [`Session`], the frame-driven adapter.
//! - [`runner`] -- The async frame loop.

pub mod actions;
pub mod clock;
pub mod config;
pub mod control;
pub mod economy;
pub mod farm;
pub mod log;
pub mod notify;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod sustainability;
pub mod tick;

pub use actions::{ActionReceipt, ActionReport, Rejection};
pub use clock::GameClock;
pub use config::{ConfigError, SimulationConfig};
pub use control::{SessionControl, SessionEndReason};
pub use economy::Economy;
pub use farm::Farm;
pub use log::EventLog;
pub use notify::{NotificationSink, TracingSink};
pub use runner::{DayCallback, NoOpCallback, RunnerError, SessionResult, run_session};
pub use scheduler::EventQueue;
pub use session::Session;
pub use state::SimulationState;
pub use tick::{DayReport, TickContext, advance_day};
