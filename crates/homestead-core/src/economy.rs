//! Overhead, inflation, action pricing, market prices, and subsidies.
//!
//! Two inflation mechanisms run side by side. The per-cell overhead is
//! compounded in place once a year (and rounded, so it never decreases),
//! while action costs are priced fresh from `base * (1 + rate)^(year - 1)`.

use std::collections::BTreeMap;

use rand::Rng;

use homestead_farm::PriceShift;
use homestead_types::CropId;

use crate::config::EconomyConfig;

/// Lowest allowed market price multiplier.
pub const MIN_MARKET_PRICE: f64 = 0.5;

/// Highest allowed market price multiplier.
pub const MAX_MARKET_PRICE: f64 = 2.0;

/// Price multiplier used for crops missing from the price table.
pub const DEFAULT_MARKET_PRICE: f64 = 1.0;

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Pricing rules derived from the economy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Economy {
    inflation_rate: f64,
    planting_cost_ratio: f64,
    irrigation_base_cost: i64,
    fertilizer_base_cost: i64,
    irrigation_water_draw: f64,
}

impl Default for Economy {
    fn default() -> Self {
        Self::from_config(&EconomyConfig::default())
    }
}

impl Economy {
    /// Build the pricing rules from configuration.
    pub const fn from_config(config: &EconomyConfig) -> Self {
        Self {
            inflation_rate: config.inflation_rate,
            planting_cost_ratio: config.planting_cost_ratio,
            irrigation_base_cost: config.irrigation_base_cost,
            fertilizer_base_cost: config.fertilizer_base_cost,
            irrigation_water_draw: config.irrigation_water_draw,
        }
    }

    /// Annual inflation rate.
    pub const fn inflation_rate(&self) -> f64 {
        self.inflation_rate
    }

    /// `(1 + rate)^(year - 1)`.
    pub fn inflation_multiplier(&self, year: u32) -> f64 {
        let exponent = i32::try_from(year.saturating_sub(1)).unwrap_or(i32::MAX);
        (1.0 + self.inflation_rate).powi(exponent)
    }

    /// Cost to plant a crop with the given base price.
    pub fn planting_cost(&self, base_price: i64, year: u32) -> i64 {
        round_to_i64(
            base_price as f64 * self.planting_cost_ratio * self.inflation_multiplier(year),
        )
    }

    /// Cost to irrigate one plot.
    pub fn irrigation_cost(&self, year: u32) -> i64 {
        round_to_i64(self.irrigation_base_cost as f64 * self.inflation_multiplier(year))
    }

    /// Cost to fertilize one plot.
    pub fn fertilizer_cost(&self, year: u32) -> i64 {
        round_to_i64(self.fertilizer_base_cost as f64 * self.inflation_multiplier(year))
    }

    /// Water drawn from the reserve by one irrigation.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn irrigation_water(&self, efficiency: f64) -> u32 {
        (self.irrigation_water_draw / efficiency.max(f64::EPSILON))
            .round()
            .max(0.0) as u32
    }

    /// Daily overhead for a grid of `cells` cells.
    pub fn daily_overhead(cells: usize, overhead_cost_per_cell: i64) -> i64 {
        i64::try_from(cells)
            .unwrap_or(i64::MAX)
            .saturating_mul(overhead_cost_per_cell)
    }

    /// Next year's per-cell overhead. Never lower than `current`.
    pub fn inflate_overhead(&self, current: i64) -> i64 {
        round_to_i64(current as f64 * (1.0 + self.inflation_rate)).max(current)
    }

    /// Opening market price table: each crop uniform in `[0.8, 1.2]`.
    pub fn initial_market_prices<R: Rng + ?Sized>(
        crops: impl IntoIterator<Item = CropId>,
        rng: &mut R,
    ) -> BTreeMap<CropId, f64> {
        crops
            .into_iter()
            .map(|crop| (crop, rng.random_range(0.8..=1.2)))
            .collect()
    }

    /// Season-change drift: each price times uniform `[0.9, 1.1]`, clamped.
    pub fn fluctuate_market<R: Rng + ?Sized>(prices: &mut BTreeMap<CropId, f64>, rng: &mut R) {
        for price in prices.values_mut() {
            *price = clamp_price(*price * rng.random_range(0.9..=1.1));
        }
    }

    /// Apply a market shock, clamping every affected entry.
    pub fn apply_price_shift(prices: &mut BTreeMap<CropId, f64>, shift: &PriceShift) {
        match &shift.crop {
            Some(crop) => {
                if let Some(price) = prices.get_mut(crop) {
                    *price = clamp_price(*price * shift.factor);
                }
            }
            None => {
                for price in prices.values_mut() {
                    *price = clamp_price(*price * shift.factor);
                }
            }
        }
    }

    /// Subsidy tier for a sustainability total, before randomisation.
    pub const fn subsidy_base(sustainability_total: u32) -> i64 {
        match sustainability_total {
            70.. => 4000,
            50..=69 => 2000,
            30..=49 => 1000,
            _ => 0,
        }
    }

    /// Year-end subsidy: tier amount times uniform `[0.5, 1.5]`, rounded.
    pub fn roll_subsidy<R: Rng + ?Sized>(sustainability_total: u32, rng: &mut R) -> i64 {
        let base = Self::subsidy_base(sustainability_total);
        if base == 0 {
            return 0;
        }
        round_to_i64(base as f64 * rng.random_range(0.5..=1.5))
    }
}

/// Clamp a price multiplier into `[0.5, 2.0]`.
pub fn clamp_price(price: f64) -> f64 {
    price.clamp(MIN_MARKET_PRICE, MAX_MARKET_PRICE)
}
