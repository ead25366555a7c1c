//! Configuration loading and typed config structures for the Homestead
//! simulation.
//!
//! The canonical configuration lives in `homestead-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file at
//! all) yields a playable game.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use homestead_types::Climate;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `homestead-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Farm size, seed, and starting resources.
    #[serde(default)]
    pub world: WorldConfig,

    /// Inflation, overhead, and action pricing.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Event probabilities and scheduling windows.
    #[serde(default)]
    pub events: EventsConfig,

    /// Initial climate and its yearly drift.
    #[serde(default)]
    pub climate: ClimateConfig,

    /// Real-time pacing and run bounds.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `HOMESTEAD_SEED` overrides `world.seed` when set to a valid integer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Built-in defaults with environment overrides applied, for runs
    /// without a config file.
    pub fn from_env_defaults() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.world.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.world.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.grid_size == 0 {
            return Err(invalid("world.grid_size", "must be at least 1"));
        }
        if self.world.starting_water > 100 {
            return Err(invalid("world.starting_water", "must be at most 100"));
        }
        if !(0.0..=100.0).contains(&self.world.starting_soil_health) {
            return Err(invalid("world.starting_soil_health", "must be within 0..=100"));
        }
        if !(0.0..=1.0).contains(&self.economy.inflation_rate) {
            return Err(invalid("economy.inflation_rate", "must be within 0..=1"));
        }
        if self.economy.overhead_cost_per_cell < 0 {
            return Err(invalid("economy.overhead_cost_per_cell", "must not be negative"));
        }
        let probabilities = [
            ("events.ambient_chance", self.events.ambient_chance),
            ("events.decade_policy_chance", self.events.decade_policy_chance),
            ("events.drought_chance", self.events.drought_chance),
            ("events.heatwave_chance", self.events.heatwave_chance),
            ("events.frost_chance", self.events.frost_chance),
            ("events.rain_chance", self.events.rain_chance),
            ("climate.drought_probability", self.climate.drought_probability),
            ("climate.flood_probability", self.climate.flood_probability),
            ("climate.heatwave_probability", self.climate.heatwave_probability),
        ];
        if let Some((field, _)) = probabilities
            .iter()
            .find(|(_, p)| !(0.0..=1.0).contains(p))
        {
            return Err(invalid(*field, "probability must be within 0..=1"));
        }
        if self.session.day_length_ms == 0 {
            return Err(invalid("session.day_length_ms", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

/// Farm size, seed, and starting resources.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable farm name.
    #[serde(default = "default_farm_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Side length of the square farm grid.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Opening balance.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i64,

    /// Opening water reserve (0..=100).
    #[serde(default = "default_starting_water")]
    pub starting_water: u32,

    /// Soil health of every plot at the start (0..=100).
    #[serde(default = "default_starting_soil_health")]
    pub starting_soil_health: f64,
}

impl WorldConfig {
    /// Override the seed from `HOMESTEAD_SEED` when it is set.
    pub fn apply_env_overrides(&mut self) {
        self.override_seed(std::env::var("HOMESTEAD_SEED").ok().as_deref());
    }

    /// Replace the seed with `raw` if it parses as an integer.
    fn override_seed(&mut self, raw: Option<&str>) {
        match raw.map(|value| value.trim().parse::<u64>()) {
            Some(Ok(seed)) => self.seed = seed,
            Some(Err(_)) => warn!("Ignoring HOMESTEAD_SEED, not an integer"),
            None => {}
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_farm_name(),
            seed: default_seed(),
            grid_size: default_grid_size(),
            starting_balance: default_starting_balance(),
            starting_water: default_starting_water(),
            starting_soil_health: default_starting_soil_health(),
        }
    }
}

/// Inflation, overhead, and action pricing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Annual inflation rate applied to overhead and action costs.
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,

    /// Daily overhead charged per grid cell in year one.
    #[serde(default = "default_overhead_cost_per_cell")]
    pub overhead_cost_per_cell: i64,

    /// Share of a crop's base price paid to plant it.
    #[serde(default = "default_planting_cost_ratio")]
    pub planting_cost_ratio: f64,

    /// Irrigation cost before inflation.
    #[serde(default = "default_irrigation_base_cost")]
    pub irrigation_base_cost: i64,

    /// Fertilizer cost before inflation.
    #[serde(default = "default_fertilizer_base_cost")]
    pub fertilizer_base_cost: i64,

    /// Water drawn from the reserve per irrigation at efficiency 1.0.
    #[serde(default = "default_irrigation_water_draw")]
    pub irrigation_water_draw: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            inflation_rate: default_inflation_rate(),
            overhead_cost_per_cell: default_overhead_cost_per_cell(),
            planting_cost_ratio: default_planting_cost_ratio(),
            irrigation_base_cost: default_irrigation_base_cost(),
            fertilizer_base_cost: default_fertilizer_base_cost(),
            irrigation_water_draw: default_irrigation_water_draw(),
        }
    }
}

/// Event probabilities and scheduling windows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventsConfig {
    /// Daily chance of an unprompted event.
    #[serde(default = "default_ambient_chance")]
    pub ambient_chance: f64,

    /// Chance of a policy event on every tenth year.
    #[serde(default = "default_decade_policy_chance")]
    pub decade_policy_chance: f64,

    /// Chance a drought is seeded when summer starts.
    #[serde(default = "default_drought_chance")]
    pub drought_chance: f64,

    /// Chance a heatwave is seeded when summer starts.
    #[serde(default = "default_heatwave_chance")]
    pub heatwave_chance: f64,

    /// Chance a frost is seeded when winter starts.
    #[serde(default = "default_frost_chance")]
    pub frost_chance: f64,

    /// Chance rain is seeded when spring or fall starts.
    #[serde(default = "default_rain_chance")]
    pub rain_chance: f64,

    /// Latest offset, in days, for seasonally seeded events.
    #[serde(default = "default_seasonal_lead_days")]
    pub seasonal_lead_days: u32,

    /// Latest offset, in days, for ambient and policy events.
    #[serde(default = "default_ambient_lead_days")]
    pub ambient_lead_days: u32,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            ambient_chance: default_ambient_chance(),
            decade_policy_chance: default_decade_policy_chance(),
            drought_chance: default_drought_chance(),
            heatwave_chance: default_heatwave_chance(),
            frost_chance: default_frost_chance(),
            rain_chance: default_rain_chance(),
            seasonal_lead_days: default_seasonal_lead_days(),
            ambient_lead_days: default_ambient_lead_days(),
        }
    }
}

/// Initial climate and its yearly drift.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClimateConfig {
    /// Average temperature in degrees Celsius.
    #[serde(default = "default_avg_temp")]
    pub avg_temp: f64,

    /// Annual rainfall in millimetres.
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,

    /// Starting drought probability.
    #[serde(default = "default_drought_probability")]
    pub drought_probability: f64,

    /// Starting flood probability.
    #[serde(default = "default_flood_probability")]
    pub flood_probability: f64,

    /// Starting heatwave probability.
    #[serde(default = "default_heatwave_probability")]
    pub heatwave_probability: f64,

    /// Added to the drought and heatwave probabilities every year.
    #[serde(default = "default_annual_drift")]
    pub annual_drift: f64,
}

impl ClimateConfig {
    /// The climate a new farm starts with.
    pub const fn initial(&self) -> Climate {
        Climate {
            avg_temp: self.avg_temp,
            rainfall: self.rainfall,
            drought_probability: self.drought_probability,
            flood_probability: self.flood_probability,
            heatwave_probability: self.heatwave_probability,
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            avg_temp: default_avg_temp(),
            rainfall: default_rainfall(),
            drought_probability: default_drought_probability(),
            flood_probability: default_flood_probability(),
            heatwave_probability: default_heatwave_probability(),
            annual_drift: default_annual_drift(),
        }
    }
}

/// Real-time pacing and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Wall-clock milliseconds per simulated day.
    #[serde(default = "default_day_length_ms")]
    pub day_length_ms: u64,

    /// Milliseconds between frames of the driving loop.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many simulated days (0 = unlimited).
    #[serde(default)]
    pub max_days: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Whether the session starts paused.
    #[serde(default)]
    pub start_paused: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            day_length_ms: default_day_length_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            max_days: 0,
            max_real_time_seconds: 0,
            start_paused: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_farm_name() -> String {
    "Willow Creek".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_grid_size() -> usize {
    5
}

const fn default_starting_balance() -> i64 {
    10_000
}

const fn default_starting_water() -> u32 {
    70
}

const fn default_starting_soil_health() -> f64 {
    70.0
}

const fn default_inflation_rate() -> f64 {
    0.03
}

const fn default_overhead_cost_per_cell() -> i64 {
    5
}

const fn default_planting_cost_ratio() -> f64 {
    0.4
}

const fn default_irrigation_base_cost() -> i64 {
    200
}

const fn default_fertilizer_base_cost() -> i64 {
    300
}

const fn default_irrigation_water_draw() -> f64 {
    5.0
}

const fn default_ambient_chance() -> f64 {
    0.01
}

const fn default_decade_policy_chance() -> f64 {
    0.7
}

const fn default_drought_chance() -> f64 {
    0.6
}

const fn default_heatwave_chance() -> f64 {
    0.5
}

const fn default_frost_chance() -> f64 {
    0.6
}

const fn default_rain_chance() -> f64 {
    0.7
}

const fn default_seasonal_lead_days() -> u32 {
    80
}

const fn default_ambient_lead_days() -> u32 {
    10
}

const fn default_avg_temp() -> f64 {
    18.0
}

const fn default_rainfall() -> f64 {
    650.0
}

const fn default_drought_probability() -> f64 {
    0.1
}

const fn default_flood_probability() -> f64 {
    0.05
}

const fn default_heatwave_probability() -> f64 {
    0.08
}

const fn default_annual_drift() -> f64 {
    0.005
}

const fn default_day_length_ms() -> u64 {
    1000
}

const fn default_frame_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}
