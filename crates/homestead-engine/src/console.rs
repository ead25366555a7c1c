//! Operator commands read line by line from standard input.
//!
//! The console runs on its own thread and only touches the shared
//! [`SessionControl`], so it never blocks the frame loop.
//!
//! # Commands
//!
//! | Command | Effect |
//! |---------|--------|
//! | `pause` | Stop advancing days |
//! | `resume` | Advance days again |
//! | `toggle` | Flip between paused and running |
//! | `speed <ms>` | Set the wall-clock length of one day |
//! | `status` | Report pause state, day length, and elapsed time |
//! | `stop` | End the session after the current frame |

use std::io::BufRead;
use std::num::ParseIntError;
use std::str::FromStr;

use homestead_core::SessionControl;
use tracing::{info, warn};

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop advancing days.
    Pause,
    /// Advance days again.
    Resume,
    /// Flip the pause flag.
    Toggle,
    /// Set the day length in milliseconds.
    Speed(u64),
    /// Report the session status.
    Status,
    /// End the session.
    Stop,
}

/// Why a console line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The first word is not a command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// `speed` without an argument.
    #[error("speed needs a day length in milliseconds")]
    MissingDayLength,

    /// `speed` with an argument that is not a whole number.
    #[error("invalid day length {value}: {source}")]
    InvalidDayLength {
        /// The rejected argument.
        value: String,
        /// The parse failure.
        source: ParseIntError,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().unwrap_or_default().to_ascii_lowercase();
        match word.as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "toggle" | "p" => Ok(Self::Toggle),
            "status" => Ok(Self::Status),
            "stop" | "quit" => Ok(Self::Stop),
            "speed" => {
                let value = words.next().ok_or(CommandError::MissingDayLength)?;
                value
                    .parse()
                    .map(Self::Speed)
                    .map_err(|source| CommandError::InvalidDayLength {
                        value: value.to_owned(),
                        source,
                    })
            }
            _ => Err(CommandError::Unknown(word)),
        }
    }
}

/// Carry out `command` and describe the outcome.
pub fn apply(control: &SessionControl, command: Command) -> String {
    match command {
        Command::Pause => {
            control.pause();
            String::from("Session paused")
        }
        Command::Resume => {
            control.resume();
            String::from("Session resumed")
        }
        Command::Toggle => {
            let message = if control.toggle_pause() {
                "Session paused"
            } else {
                "Session resumed"
            };
            message.to_owned()
        }
        Command::Speed(ms) => control.set_day_length_ms(ms).map_or_else(
            || String::from("Day length must be at least 1ms"),
            |previous| format!("Day length changed from {previous}ms to {ms}ms"),
        ),
        Command::Status => format!(
            "paused={} day_length_ms={} elapsed_seconds={}",
            control.is_paused(),
            control.day_length_ms(),
            control.elapsed_seconds()
        ),
        Command::Stop => {
            control.request_stop();
            String::from("Stop requested")
        }
    }
}

/// Apply commands from `input` until it ends or a stop is requested.
pub fn listen<R: BufRead>(control: &SessionControl, input: R) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Console input failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                let message = apply(control, command);
                info!(?command, %message, "Operator command applied");
            }
            Err(e) => warn!(error = %e, "Ignoring console input"),
        }
        if control.is_stop_requested() {
            return;
        }
    }
}
