//! The [`Farm`] aggregate: ledger, grid, static tables, event queue, and log.
//!
//! Every operation in the core takes `&mut Farm<C>` explicitly. There is no
//! hidden shared state, so a test can build a farm, drive it, and inspect
//! any part of it directly.

use homestead_farm::{
    Cell, CropCatalogue, FarmError, FarmGrid, Plot, TechRegistry, default_crops,
    default_technologies, effect_keys,
};
use homestead_types::{EventLogEntry, Notification, TechId};
use rand::Rng;
use tracing::debug;

use crate::config::{EventsConfig, SimulationConfig};
use crate::economy::Economy;
use crate::log::EventLog;
use crate::scheduler::EventQueue;
use crate::state::SimulationState;
use crate::sustainability;

/// Land value of one cell at full soil health.
pub const LAND_VALUE_PER_CELL: f64 = 1000.0;

/// Event and climate rules fixed at farm creation.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmRules {
    /// Event probabilities and windows.
    pub events: EventsConfig,
    /// Yearly increase of the drought and heatwave probabilities.
    pub climate_drift: f64,
}

/// One simulated farm.
#[derive(Debug, Clone)]
pub struct Farm<C> {
    /// The economic ledger and calendar.
    pub state: SimulationState,
    /// The plots.
    pub grid: FarmGrid<C>,
    /// The research tree.
    pub technologies: TechRegistry,
    /// Plantable crops.
    pub crops: CropCatalogue,
    /// Events waiting for their trigger day.
    pub pending: EventQueue,
    /// The player-facing event log.
    pub log: EventLog,
    /// Pricing rules.
    pub economy: Economy,
    /// Event and climate rules.
    pub rules: FarmRules,
}

impl Farm<Plot> {
    /// A standard farm: reference plots, default crops and technologies.
    pub fn from_config<R: Rng + ?Sized>(
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Self, FarmError> {
        let soil = config.world.starting_soil_health;
        let grid = FarmGrid::new(config.world.grid_size, |_| Plot::with_soil_health(soil))?;
        Ok(Self::new(config, grid, default_crops(), default_technologies(), rng))
    }
}

impl<C: Cell> Farm<C> {
    /// Assemble a farm around an existing grid and tables.
    ///
    /// Market prices are drawn from `rng`, one per catalogue crop.
    pub fn new<R: Rng + ?Sized>(
        config: &SimulationConfig,
        grid: FarmGrid<C>,
        crops: CropCatalogue,
        technologies: TechRegistry,
        rng: &mut R,
    ) -> Self {
        let market_prices = Economy::initial_market_prices(crops.ids(), rng);
        let researched_techs = technologies
            .iter()
            .filter(|t| t.researched)
            .map(|t| t.id.clone())
            .collect();
        let state = SimulationState {
            clock: crate::clock::GameClock::new(),
            balance: config.world.starting_balance,
            water_reserve: config.world.starting_water,
            farm_health: 0,
            farm_value: 0,
            overhead_cost_per_cell: config.economy.overhead_cost_per_cell,
            climate: config.climate.initial(),
            market_prices,
            researched_techs,
            sustainability: homestead_types::ScoreBreakdown::default(),
        };
        let mut farm = Self {
            state,
            grid,
            technologies,
            crops,
            pending: EventQueue::default(),
            log: EventLog::default(),
            economy: Economy::from_config(&config.economy),
            rules: FarmRules {
                events: config.events.clone(),
                climate_drift: config.climate.annual_drift,
            },
        };
        farm.recompute_farm_health();
        farm.recompute_farm_value();
        farm.state.sustainability = farm.score_sustainability();
        farm
    }

    /// Append a log entry dated today and queue its notification.
    pub fn record(
        &mut self,
        notes: &mut Vec<Notification>,
        message: impl Into<String>,
        alert: bool,
    ) {
        let entry = EventLogEntry {
            date_label: self.state.clock.date_label(),
            message: message.into(),
            is_alert: alert,
        };
        self.log.push(entry.clone());
        notes.push(Notification::Logged(entry));
    }

    /// Research or grant `id`: append it to the researched set, mark it in
    /// the registry, and apply its one-time soil effect.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown or already
    /// researched.
    pub fn unlock_technology(&mut self, id: &TechId) -> bool {
        let Some(tech) = self.technologies.get(id.as_str()) else {
            return false;
        };
        if self.state.researched_techs.contains(id) {
            return false;
        }
        let soil_multiplier = tech.effect(effect_keys::SOIL_HEALTH);
        self.technologies.mark_researched(id.as_str());
        self.state.researched_techs.insert(id.clone());
        if let Some(multiplier) = soil_multiplier {
            for cell in self.grid.cells_mut() {
                cell.set_soil_health((cell.soil_health() * multiplier).min(100.0));
            }
            debug!(tech = %id, multiplier, "One-time soil effect applied");
        }
        true
    }

    /// `farm_health = round(avg_soil * 0.7 + water * 0.3)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn recompute_farm_health(&mut self) {
        let health = self.grid.average_soil_health() * 0.7
            + f64::from(self.state.water_reserve) * 0.3;
        self.state.farm_health = health.round().clamp(0.0, 100.0) as u32;
    }

    /// Land value by soil health, plus researched technology, plus cash.
    #[allow(clippy::cast_possible_truncation)]
    pub fn recompute_farm_value(&mut self) {
        let land: f64 = self
            .grid
            .cells()
            .map(|c| LAND_VALUE_PER_CELL * c.soil_health() / 100.0)
            .sum();
        self.state.farm_value = (land.round() as i64)
            .saturating_add(self.technologies.researched_value(&self.state.researched_techs))
            .saturating_add(self.state.balance.max(0));
    }

    /// Score the farm as it stands now.
    pub fn score_sustainability(&self) -> homestead_types::ScoreBreakdown {
        sustainability::score(&self.grid, self.crops.len(), &self.state.researched_techs)
    }

    /// Ids of technologies not yet researched, in table order.
    pub fn unresearched(&self) -> Vec<TechId> {
        self.technologies
            .iter()
            .filter(|t| !self.state.researched_techs.contains(&t.id))
            .map(|t| t.id.clone())
            .collect()
    }
}
