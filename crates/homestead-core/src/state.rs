//! The shared economic ledger every component reads and writes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use homestead_types::{Climate, CropId, ScoreBreakdown, TechId};

use crate::clock::GameClock;
use crate::economy::DEFAULT_MARKET_PRICE;

/// Upper bound of the water reserve.
pub const MAX_WATER_RESERVE: u32 = 100;

/// Complete mutable state of one simulation, outside the grid.
///
/// Fields are public so the tick cycle and the action controller can
/// borrow them disjointly. Invariants maintained by the mutators below:
/// `water_reserve` stays in `0..=100`, `overhead_cost_per_cell` never
/// decreases, and `researched_techs` never shrinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// The calendar.
    pub clock: GameClock,
    /// Cash on hand. Negative means debt.
    pub balance: i64,
    /// Shared water reserve, `0..=100`.
    pub water_reserve: u32,
    /// Derived: soil and water condition, `0..=100`.
    pub farm_health: u32,
    /// Derived at each year end: land, technology, and cash value.
    pub farm_value: i64,
    /// Daily overhead per grid cell. Compounds yearly.
    pub overhead_cost_per_cell: i64,
    /// Regional climate; hazard probabilities drift upward yearly.
    pub climate: Climate,
    /// Market price multiplier per crop, `0.5..=2.0`.
    pub market_prices: BTreeMap<CropId, f64>,
    /// Technologies researched or granted. Append-only.
    pub researched_techs: BTreeSet<TechId>,
    /// Most recent year-end sustainability score.
    pub sustainability: ScoreBreakdown,
}

impl SimulationState {
    /// Shift the water reserve by `delta`, clamped to `0..=100`.
    pub fn adjust_water(&mut self, delta: i64) {
        let next = i64::from(self.water_reserve)
            .saturating_add(delta)
            .clamp(0, i64::from(MAX_WATER_RESERVE));
        self.water_reserve = u32::try_from(next).unwrap_or(MAX_WATER_RESERVE);
    }

    /// Market multiplier for `crop`, `1.0` when unpriced.
    pub fn market_price(&self, crop: &CropId) -> f64 {
        self.market_prices
            .get(crop)
            .copied()
            .unwrap_or(DEFAULT_MARKET_PRICE)
    }

    /// Add `amount` to the balance.
    pub const fn credit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Subtract `amount` from the balance. May go negative.
    pub const fn debit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_sub(amount);
    }

    /// Whether the balance covers `cost`.
    pub const fn can_afford(&self, cost: i64) -> bool {
        self.balance >= cost
    }

    /// Whether `id` has been researched or granted.
    pub fn has_tech(&self, id: &str) -> bool {
        self.researched_techs.contains(id)
    }
}
