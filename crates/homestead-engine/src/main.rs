//! Headless engine binary for the Homestead simulation.
//!
//! Loads configuration, builds a farm, and runs it on the async frame loop
//! with an [`Autopilot`] player until a day limit, a wall-clock limit, or
//! ctrl-c ends the session.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `homestead-config.yaml` (or `HOMESTEAD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the farm and the session
//! 4. Install the ctrl-c stop handler and the operator console
//! 5. Run the frame loop with the autopilot
//! 6. Log the result

mod autopilot;
mod console;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use homestead_core::config::LoggingConfig;
use homestead_core::{Session, SimulationConfig, TracingSink, runner};
use homestead_farm::Plot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::autopilot::{Autopilot, DEFAULT_CASH_RESERVE};
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "homestead-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, farm construction, or the frame loop
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("homestead-engine starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        farm = config.world.name,
        seed = config.world.seed,
        grid_size = config.world.grid_size,
        day_length_ms = config.session.day_length_ms,
        max_days = config.session.max_days,
        "Configuration resolved"
    );

    // 3. Build the farm and the session.
    let mut session = build_session(&config)?;
    let farm = session.farm();
    info!(
        balance = farm.state.balance,
        water = farm.state.water_reserve,
        crops = farm.crops.len(),
        technologies = farm.technologies.len(),
        "Farm ready"
    );

    // 4. Stop cleanly on ctrl-c; accept operator commands on stdin.
    let control = Arc::clone(session.control());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after this frame");
                control.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for ctrl-c"),
        }
    });
    let control = Arc::clone(session.control());
    let console = std::thread::Builder::new()
        .name(String::from("console"))
        .spawn(move || console::listen(&control, std::io::stdin().lock()));
    if let Err(e) = console {
        warn!(error = %e, "Operator console unavailable");
    }

    // 5. Run the frame loop.
    let mut autopilot = Autopilot::new(&session.farm().crops, DEFAULT_CASH_RESERVE);
    let result = runner::run_session(&mut session, &mut autopilot)
        .await
        .map_err(EngineError::from)?;

    // 6. Log the result.
    let farm = session.farm();
    let stats = autopilot.stats();
    info!(
        date = %farm.state.clock.date_label(),
        balance = farm.state.balance,
        farm_value = farm.state.farm_value,
        farm_health = farm.state.farm_health,
        sustainability = farm.state.sustainability.total,
        researched = farm.state.researched_techs.len(),
        "Final farm state"
    );
    info!(
        harvests = stats.harvests,
        plantings = stats.plantings,
        irrigations = stats.irrigations,
        fertilizations = stats.fertilizations,
        research = stats.research,
        rejections = stats.rejections,
        "Autopilot summary"
    );
    info!(
        end_reason = ?result.end_reason,
        days_run = result.days_run,
        "homestead-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `HOMESTEAD_CONFIG` or the default path.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os("HOMESTEAD_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    load_config_from(path)
}

/// A missing file falls back to defaults; a present but invalid file is an
/// error. Environment overrides apply either way.
fn load_config_from(path: PathBuf) -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SimulationConfig::from_env_defaults()?, None))
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn build_session(config: &SimulationConfig) -> Result<Session<Plot, TracingSink>, EngineError> {
    Ok(Session::from_config(config, TracingSink)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let missing = PathBuf::from("no/such/homestead.yaml");
        let (config, path) = load_config_from(missing).unwrap();
        assert!(path.is_none());
        assert_eq!(config.world.grid_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_file_loads() {
        let shipped = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../homestead-config.yaml");
        let (config, path) = load_config_from(shipped).unwrap();
        assert!(path.is_some());
        assert_eq!(config.session, SimulationConfig::default().session);
    }
}
