//! Player actions: plant, irrigate, fertilize, harvest, research.
//!
//! Every action runs the same pipeline:
//! 1. Validate -- position, plot state, catalogue and tree lookups.
//! 2. Price -- inflation-adjusted cost for the current year.
//! 3. Afford -- balance must cover the cost.
//! 4. Apply -- deduct, then delegate to the cell or the research tree.
//! 5. Notify -- log line plus panel refreshes.
//!
//! A failed stage logs an alert and returns a typed [`Rejection`]; nothing
//! is mutated apart from the log.

use homestead_farm::{Cell, effect_keys, tech_ids};
use homestead_types::{CellStatus, CropId, GridPos, HarvestOutcome, Notification, Panel, TechId};
use tracing::{debug, info};

use crate::farm::Farm;
use crate::state::SimulationState;

/// Expected-yield bonus from AI irrigation on each irrigation.
pub const AI_IRRIGATION_YIELD_BONUS: f64 = 10.0;

/// Expected-yield ceiling after the AI irrigation bonus.
pub const AI_IRRIGATION_YIELD_CAP: f64 = 150.0;

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The position is outside the grid.
    #[error("plot {position} is outside the farm")]
    OutOfBounds {
        /// The requested position.
        position: GridPos,
    },

    /// The crop id is not in the catalogue.
    #[error("unknown crop: {0}")]
    UnknownCrop(CropId),

    /// The plot already holds a living crop.
    #[error("plot {position} is already planted")]
    PlotOccupied {
        /// The occupied plot.
        position: GridPos,
    },

    /// The plot holds no crop.
    #[error("plot {position} has nothing planted")]
    EmptyPlot {
        /// The empty plot.
        position: GridPos,
    },

    /// The crop on the plot has died.
    #[error("crop on plot {position} has failed")]
    CropFailed {
        /// The plot.
        position: GridPos,
    },

    /// The crop was already irrigated.
    #[error("plot {position} is already irrigated")]
    AlreadyIrrigated {
        /// The irrigated plot.
        position: GridPos,
    },

    /// The crop was already fertilized.
    #[error("plot {position} is already fertilized")]
    AlreadyFertilized {
        /// The fertilized plot.
        position: GridPos,
    },

    /// The crop is not mature.
    #[error("crop on plot {position} is not ready for harvest")]
    NotReady {
        /// The plot.
        position: GridPos,
    },

    /// The technology id is not in the research tree.
    #[error("unknown technology: {0}")]
    UnknownTechnology(TechId),

    /// The technology was already researched.
    #[error("{0} is already researched")]
    AlreadyResearched(TechId),

    /// Some prerequisites are still missing.
    #[error("{tech} requires {}", format_ids(.missing))]
    PrerequisitesNotMet {
        /// The requested technology.
        tech: TechId,
        /// Prerequisites not yet researched.
        missing: Vec<TechId>,
    },

    /// The balance does not cover the cost.
    #[error("insufficient funds: need {cost}, have {balance}")]
    InsufficientFunds {
        /// Cost of the action.
        cost: i64,
        /// Balance at the time of the attempt.
        balance: i64,
    },
}

fn format_ids(ids: &[TechId]) -> String {
    ids.iter()
        .map(TechId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReceipt {
    /// A crop was planted.
    Planted {
        /// Where.
        position: GridPos,
        /// What.
        crop: CropId,
        /// Amount charged.
        cost: i64,
    },
    /// A crop was irrigated.
    Irrigated {
        /// Where.
        position: GridPos,
        /// Amount charged.
        cost: i64,
        /// Water drawn from the reserve.
        water_used: u32,
    },
    /// A crop was fertilized.
    Fertilized {
        /// Where.
        position: GridPos,
        /// Amount charged.
        cost: i64,
    },
    /// A crop was harvested and sold.
    Harvested {
        /// Where.
        position: GridPos,
        /// Sale details.
        outcome: HarvestOutcome,
    },
    /// A technology was researched.
    Researched {
        /// Which.
        tech: TechId,
        /// Amount charged.
        cost: i64,
    },
}

/// Result of an action plus the notifications it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    /// Receipt on success, rejection otherwise.
    pub outcome: Result<ActionReceipt, Rejection>,
    /// Log lines and panel refreshes to forward.
    pub notifications: Vec<Notification>,
}

impl ActionReport {
    /// Whether the action succeeded.
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Validation stages
// ---------------------------------------------------------------------------

fn cell_at<C: Cell>(farm: &Farm<C>, position: GridPos) -> Result<&C, Rejection> {
    farm.grid
        .get(position)
        .ok_or(Rejection::OutOfBounds { position })
}

fn planted_cell<C: Cell>(farm: &Farm<C>, position: GridPos) -> Result<&C, Rejection> {
    let cell = cell_at(farm, position)?;
    if cell.crop().is_none() {
        return Err(Rejection::EmptyPlot { position });
    }
    Ok(cell)
}

fn living_cell<C: Cell>(farm: &Farm<C>, position: GridPos) -> Result<&C, Rejection> {
    let cell = planted_cell(farm, position)?;
    if cell.status() == CellStatus::Failed {
        return Err(Rejection::CropFailed { position });
    }
    Ok(cell)
}

fn afford(state: &SimulationState, cost: i64) -> Result<(), Rejection> {
    if !state.can_afford(cost) {
        return Err(Rejection::InsufficientFunds {
            cost,
            balance: state.balance,
        });
    }
    Ok(())
}

fn finish<C: Cell>(
    farm: &mut Farm<C>,
    outcome: Result<(ActionReceipt, String), Rejection>,
    refresh: &[Panel],
) -> ActionReport {
    let mut notifications = Vec::new();
    match outcome {
        Ok((receipt, message)) => {
            farm.record(&mut notifications, message, false);
            notifications.push(Notification::Refresh(Panel::EventLog));
            notifications.extend(refresh.iter().copied().map(Notification::Refresh));
            ActionReport {
                outcome: Ok(receipt),
                notifications,
            }
        }
        Err(rejection) => {
            debug!(%rejection, "Action rejected");
            farm.record(&mut notifications, rejection.to_string(), true);
            notifications.push(Notification::Refresh(Panel::EventLog));
            ActionReport {
                outcome: Err(rejection),
                notifications,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Plant `crop_id` at `position`. A failed crop may be planted over.
pub fn plant<C: Cell>(farm: &mut Farm<C>, position: GridPos, crop_id: &str) -> ActionReport {
    let outcome = try_plant(farm, position, crop_id);
    finish(farm, outcome, &[Panel::Hud, Panel::Cell(position)])
}

fn try_plant<C: Cell>(
    farm: &mut Farm<C>,
    position: GridPos,
    crop_id: &str,
) -> Result<(ActionReceipt, String), Rejection> {
    let crop = farm
        .crops
        .get(crop_id)
        .cloned()
        .ok_or_else(|| Rejection::UnknownCrop(CropId::new(crop_id)))?;
    let cell = cell_at(farm, position)?;
    if cell.crop().is_some() && cell.status() != CellStatus::Failed {
        return Err(Rejection::PlotOccupied { position });
    }
    let cost = farm
        .economy
        .planting_cost(crop.base_price, farm.state.clock.year());
    afford(&farm.state, cost)?;

    farm.state.debit(cost);
    if let Some(cell) = farm.grid.get_mut(position) {
        cell.plant(&crop);
    }
    info!(%position, crop = %crop.id, cost, "Planted");
    Ok((
        ActionReceipt::Planted {
            position,
            crop: crop.id.clone(),
            cost,
        },
        format!("Planted {} at {position} for {cost}", crop.name),
    ))
}

/// Irrigate the crop at `position`, drawing from the water reserve.
pub fn irrigate<C: Cell>(farm: &mut Farm<C>, position: GridPos) -> ActionReport {
    let outcome = try_irrigate(farm, position);
    finish(farm, outcome, &[Panel::Hud, Panel::Cell(position)])
}

fn try_irrigate<C: Cell>(
    farm: &mut Farm<C>,
    position: GridPos,
) -> Result<(ActionReceipt, String), Rejection> {
    let cell = living_cell(farm, position)?;
    if cell.is_irrigated() {
        return Err(Rejection::AlreadyIrrigated { position });
    }
    let cost = farm.economy.irrigation_cost(farm.state.clock.year());
    afford(&farm.state, cost)?;

    let efficiency = farm
        .technologies
        .effect_multiplier(&farm.state.researched_techs, effect_keys::WATER_EFFICIENCY);
    let water_used = farm.economy.irrigation_water(efficiency);
    let ai_bonus = farm.state.has_tech(tech_ids::AI_IRRIGATION);

    farm.state.debit(cost);
    farm.state.adjust_water(-i64::from(water_used));
    if let Some(cell) = farm.grid.get_mut(position) {
        cell.irrigate(efficiency);
        if ai_bonus {
            let boosted =
                (cell.expected_yield() + AI_IRRIGATION_YIELD_BONUS).min(AI_IRRIGATION_YIELD_CAP);
            cell.set_expected_yield(boosted);
        }
    }
    info!(%position, cost, water_used, efficiency, "Irrigated");
    Ok((
        ActionReceipt::Irrigated {
            position,
            cost,
            water_used,
        },
        format!("Irrigated plot {position} for {cost}"),
    ))
}

/// Fertilize the crop at `position`.
pub fn fertilize<C: Cell>(farm: &mut Farm<C>, position: GridPos) -> ActionReport {
    let outcome = try_fertilize(farm, position);
    finish(farm, outcome, &[Panel::Hud, Panel::Cell(position)])
}

fn try_fertilize<C: Cell>(
    farm: &mut Farm<C>,
    position: GridPos,
) -> Result<(ActionReceipt, String), Rejection> {
    let cell = living_cell(farm, position)?;
    if cell.is_fertilized() {
        return Err(Rejection::AlreadyFertilized { position });
    }
    let cost = farm.economy.fertilizer_cost(farm.state.clock.year());
    afford(&farm.state, cost)?;

    let efficiency = farm.technologies.effect_multiplier(
        &farm.state.researched_techs,
        effect_keys::FERTILIZER_EFFICIENCY,
    );
    farm.state.debit(cost);
    if let Some(cell) = farm.grid.get_mut(position) {
        cell.fertilize(efficiency);
    }
    info!(%position, cost, efficiency, "Fertilized");
    Ok((
        ActionReceipt::Fertilized { position, cost },
        format!("Fertilized plot {position} for {cost}"),
    ))
}

/// Harvest the mature crop at `position` and sell it at market price.
pub fn harvest<C: Cell>(farm: &mut Farm<C>, position: GridPos) -> ActionReport {
    let outcome = try_harvest(farm, position);
    finish(farm, outcome, &[Panel::Hud, Panel::Cell(position)])
}

fn try_harvest<C: Cell>(
    farm: &mut Farm<C>,
    position: GridPos,
) -> Result<(ActionReceipt, String), Rejection> {
    let cell = planted_cell(farm, position)?;
    if !cell.is_harvest_ready() {
        return Err(Rejection::NotReady { position });
    }
    let price = cell
        .crop()
        .map_or(crate::economy::DEFAULT_MARKET_PRICE, |c| {
            farm.state.market_price(&c.id)
        });
    let water = farm.state.water_reserve;
    let outcome = farm
        .grid
        .get_mut(position)
        .and_then(|cell| cell.harvest(water, price))
        .ok_or(Rejection::NotReady { position })?;

    farm.state.credit(outcome.value);
    info!(%position, value = outcome.value, price, "Harvested");
    let message = format!(
        "Harvested {} from {position} for {} ({:.0}% yield)",
        outcome.crop_name, outcome.value, outcome.yield_percentage
    );
    Ok((ActionReceipt::Harvested { position, outcome }, message))
}

/// Research `tech_id` from the tree.
pub fn research<C: Cell>(farm: &mut Farm<C>, tech_id: &str) -> ActionReport {
    let outcome = try_research(farm, tech_id);
    finish(farm, outcome, &[Panel::Hud, Panel::Research])
}

fn try_research<C: Cell>(
    farm: &mut Farm<C>,
    tech_id: &str,
) -> Result<(ActionReceipt, String), Rejection> {
    let tech = farm
        .technologies
        .get(tech_id)
        .ok_or_else(|| Rejection::UnknownTechnology(TechId::new(tech_id)))?;
    if tech.researched || farm.state.has_tech(tech_id) {
        return Err(Rejection::AlreadyResearched(tech.id.clone()));
    }
    let researched = &farm.state.researched_techs;
    if !farm.technologies.prerequisites_met(tech_id, researched) {
        let missing = tech
            .prerequisites
            .iter()
            .filter(|p| !researched.contains(*p))
            .cloned()
            .collect();
        return Err(Rejection::PrerequisitesNotMet {
            tech: tech.id.clone(),
            missing,
        });
    }
    let cost = tech.cost;
    let id = tech.id.clone();
    let name = tech.name.clone();
    afford(&farm.state, cost)?;

    farm.state.debit(cost);
    farm.unlock_technology(&id);
    info!(tech = %id, cost, "Researched");
    Ok((
        ActionReceipt::Researched { tech: id, cost },
        format!("Researched {name} for {cost}"),
    ))
}
