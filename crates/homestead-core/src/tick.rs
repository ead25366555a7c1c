//! The daily tick cycle.
//!
//! [`advance_day`] is the single orchestration point of the simulation. It
//! runs eight steps in a fixed order:
//!
//! 1. Calendar -- increment the day and season-day counters.
//! 2. Overhead -- charge every cell's daily overhead, even into debt.
//! 3. Growth -- update every cell, noting crops that just became ready.
//! 4. Season -- on rollover: market drift, seasonal events, water recovery.
//! 5. Year -- on rollover: inflation, farm value, sustainability and
//!    subsidy, climate drift, decade policy.
//! 6. Events -- resolve everything due today.
//! 7. Health -- recompute farm health.
//! 8. Ambient -- roll for an unprompted event.
//!
//! The step is pure with respect to the outside world: randomness and event
//! content come in through [`TickContext`], notifications go out in the
//! returned [`DayReport`].

use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

use homestead_farm::{Cell, EventGenerator};
use homestead_types::{CellStatus, GridPos, Notification, Panel, Season};

use crate::economy::Economy;
use crate::farm::Farm;
use crate::scheduler;

/// Injected dependencies for one tick.
pub struct TickContext<'a> {
    /// Source of all randomness.
    pub rng: &'a mut dyn RngCore,
    /// Source of event content.
    pub generator: &'a dyn EventGenerator,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayReport {
    /// Day of the year after the tick.
    pub day: u32,
    /// Season after the tick.
    pub season: Season,
    /// Year after the tick.
    pub year: u32,
    /// Whether a new season began.
    pub season_changed: bool,
    /// Whether a new year began.
    pub year_changed: bool,
    /// Overhead charged.
    pub overhead_charged: i64,
    /// Cells whose crop became ready this tick.
    pub harvest_ready: Vec<GridPos>,
    /// Cells whose crop failed this tick.
    pub crops_failed: Vec<GridPos>,
    /// Seasonal and decade events enqueued.
    pub events_seeded: usize,
    /// Events resolved with an effect.
    pub events_resolved: usize,
    /// Subsidy paid, on year boundaries.
    pub subsidy: Option<i64>,
    /// Whether an ambient event was announced.
    pub ambient_event: bool,
    /// Notifications to forward, in emission order.
    pub notifications: Vec<Notification>,
}

/// Advance the simulation by one day.
pub fn advance_day<C: Cell>(farm: &mut Farm<C>, ctx: &mut TickContext<'_>) -> DayReport {
    let mut report = DayReport::default();
    let mut notes = Vec::new();

    // --- Step 1: Calendar ---
    farm.state.clock.tick();

    // --- Step 2: Overhead ---
    report.overhead_charged = charge_overhead(farm, &mut notes);

    // --- Step 3: Growth ---
    update_cells(farm, &mut report, &mut notes);

    // --- Step 4: Season ---
    if farm.state.clock.roll_season() {
        report.season_changed = true;
        report.events_seeded = season_transition(farm, ctx, &mut notes);
    }

    // --- Step 5: Year ---
    if farm.state.clock.roll_year() {
        report.year_changed = true;
        let (subsidy, decade) = year_transition(farm, ctx, &mut notes);
        report.subsidy = Some(subsidy);
        if decade {
            report.events_seeded = report.events_seeded.saturating_add(1);
        }
    }

    // --- Step 6: Events ---
    report.events_resolved = scheduler::resolve_day(farm, &mut notes);

    // --- Step 7: Health ---
    farm.recompute_farm_health();

    // --- Step 8: Ambient ---
    report.ambient_event = scheduler::roll_ambient(farm, ctx.generator, ctx.rng, &mut notes);

    if notes.iter().any(|n| n.log_entry().is_some()) {
        notes.push(Notification::Refresh(Panel::EventLog));
    }
    notes.push(Notification::Refresh(Panel::Hud));

    let clock = farm.state.clock;
    debug!(
        day = clock.day(),
        season = %clock.season(),
        year = clock.year(),
        balance = farm.state.balance,
        water = farm.state.water_reserve,
        health = farm.state.farm_health,
        pending = farm.pending.len(),
        "Day advanced"
    );

    report.day = clock.day();
    report.season = clock.season();
    report.year = clock.year();
    report.notifications = notes;
    report
}

/// Step 2. Returns the amount charged. Logs an alert on entering debt.
fn charge_overhead<C: Cell>(farm: &mut Farm<C>, notes: &mut Vec<Notification>) -> i64 {
    let overhead = Economy::daily_overhead(farm.grid.len(), farm.state.overhead_cost_per_cell);
    let before = farm.state.balance;
    farm.state.debit(overhead);
    if before >= 0 && farm.state.balance < 0 {
        warn!(balance = farm.state.balance, overhead, "Farm entered debt");
        farm.record(
            notes,
            format!("Overhead of {overhead} pushed the farm into debt"),
            true,
        );
    }
    overhead
}

/// Step 3.
fn update_cells<C: Cell>(
    farm: &mut Farm<C>,
    report: &mut DayReport,
    notes: &mut Vec<Notification>,
) {
    let water = farm.state.water_reserve;
    let researched = &farm.state.researched_techs;
    for (position, cell) in farm.grid.iter_mut() {
        let before = cell.status();
        let after = cell.update(water, researched);
        if before == after {
            continue;
        }
        match after {
            CellStatus::Ready => {
                if let Some(crop) = cell.crop() {
                    notes.push(Notification::HarvestReady {
                        position,
                        crop: crop.id.clone(),
                    });
                }
                notes.push(Notification::Refresh(Panel::Cell(position)));
                report.harvest_ready.push(position);
            }
            CellStatus::Failed => {
                notes.push(Notification::Refresh(Panel::Cell(position)));
                report.crops_failed.push(position);
            }
            CellStatus::Empty | CellStatus::Growing => {}
        }
    }

    if !report.harvest_ready.is_empty() {
        let count = report.harvest_ready.len();
        farm.record(notes, format!("{count} crop(s) ready for harvest"), false);
    }
    if !report.crops_failed.is_empty() {
        let count = report.crops_failed.len();
        farm.record(notes, format!("{count} crop(s) failed"), true);
    }
}

/// Step 4. Returns the number of seasonal events seeded.
fn season_transition<C: Cell>(
    farm: &mut Farm<C>,
    ctx: &mut TickContext<'_>,
    notes: &mut Vec<Notification>,
) -> usize {
    let season = farm.state.clock.season();
    Economy::fluctuate_market(&mut farm.state.market_prices, ctx.rng);
    let seeded = scheduler::seed_seasonal(farm, ctx.generator, ctx.rng);

    let recovery: u32 = match season {
        Season::Spring => ctx.rng.random_range(10..=25),
        Season::Summer => 0,
        Season::Fall | Season::Winter => ctx.rng.random_range(5..=15),
    };
    farm.state.adjust_water(i64::from(recovery));

    info!(%season, year = farm.state.clock.year(), recovery, seeded, "Season changed");
    farm.record(notes, format!("{season} has arrived"), false);
    seeded
}

/// Step 5. Returns the subsidy paid and whether a decade policy was queued.
fn year_transition<C: Cell>(
    farm: &mut Farm<C>,
    ctx: &mut TickContext<'_>,
    notes: &mut Vec<Notification>,
) -> (i64, bool) {
    let year = farm.state.clock.year();

    // Inflation
    farm.state.overhead_cost_per_cell = farm
        .economy
        .inflate_overhead(farm.state.overhead_cost_per_cell);

    // Farm value
    farm.recompute_farm_value();

    // Sustainability and subsidy
    let score = farm.score_sustainability();
    farm.state.sustainability = score;
    let subsidy = Economy::roll_subsidy(score.total, ctx.rng);
    farm.state.credit(subsidy);
    if subsidy > 0 {
        farm.record(
            notes,
            format!(
                "Sustainability subsidy of {subsidy} received (score {})",
                score.total
            ),
            false,
        );
    } else {
        farm.record(
            notes,
            format!("No sustainability subsidy this year (score {})", score.total),
            false,
        );
    }

    // Climate drift
    let drift = farm.rules.climate_drift;
    let climate = &mut farm.state.climate;
    climate.drought_probability = (climate.drought_probability + drift).min(1.0);
    climate.heatwave_probability = (climate.heatwave_probability + drift).min(1.0);

    // Decade milestone
    let decade = scheduler::check_decade(farm, ctx.generator, ctx.rng);

    info!(
        year,
        overhead_per_cell = farm.state.overhead_cost_per_cell,
        farm_value = farm.state.farm_value,
        sustainability = score.total,
        subsidy,
        decade,
        "Year changed"
    );
    farm.record(notes, format!("Year {year} begins"), false);
    (subsidy, decade)
}
