//! [`Plot`]: the reference [`Cell`] with a growth timer.
//!
//! A plot counts growing days until the crop's `growth_days` is reached.
//! Growth stalls on days the water reserve is below the crop's need, unless
//! the crop was irrigated or drought-resistant seeds are researched. Stalled
//! days and weather stress eat into the expected yield; at zero the crop
//! fails. Harvesting drains soil health, more so under monoculture.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use homestead_types::{CellStatus, CropId, HarvestOutcome, TechId};

use crate::crops::Crop;
use crate::grid::Cell;
use crate::technology::tech_ids;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Expected yield of a freshly planted crop, in percent.
pub const BASE_EXPECTED_YIELD: f64 = 100.0;

/// Upper bound on expected yield, in percent.
pub const MAX_EXPECTED_YIELD: f64 = 150.0;

/// Soil health of untouched land.
pub const DEFAULT_SOIL_HEALTH: f64 = 70.0;

/// Yield lost on each day growth stalls for lack of water.
const DRY_DAY_PENALTY: f64 = 2.0;

/// Yield gained from irrigation at efficiency 1.0.
const IRRIGATION_BONUS: f64 = 10.0;

/// Yield gained from fertilizer at efficiency 1.0.
const FERTILIZER_BONUS: f64 = 15.0;

/// Soil health restored by fertilizer at efficiency 1.0.
const FERTILIZER_SOIL_GAIN: f64 = 3.0;

/// Extra soil drain per consecutive planting of the same crop.
const MONOCROP_DRAIN_FACTOR: f64 = 0.5;

// ---------------------------------------------------------------------------
// Plot
// ---------------------------------------------------------------------------

/// A single plot of farmland.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    crop: Option<Crop>,
    status: CellStatus,
    days_growing: u32,
    soil_health: f64,
    irrigated: bool,
    fertilized: bool,
    expected_yield: f64,
    consecutive_plantings: u32,
    last_crop: Option<CropId>,
}

impl Default for Plot {
    fn default() -> Self {
        Self::with_soil_health(DEFAULT_SOIL_HEALTH)
    }
}

impl Plot {
    /// An empty plot with the given starting soil health.
    pub fn with_soil_health(soil_health: f64) -> Self {
        Self {
            crop: None,
            status: CellStatus::Empty,
            days_growing: 0,
            soil_health: soil_health.clamp(0.0, 100.0),
            irrigated: false,
            fertilized: false,
            expected_yield: 0.0,
            consecutive_plantings: 0,
            last_crop: None,
        }
    }

    /// Days the current crop has grown.
    pub const fn days_growing(&self) -> u32 {
        self.days_growing
    }

    fn clear(&mut self) {
        self.crop = None;
        self.status = CellStatus::Empty;
        self.days_growing = 0;
        self.irrigated = false;
        self.fertilized = false;
        self.expected_yield = 0.0;
    }
}

impl Cell for Plot {
    fn update(&mut self, water_reserve: u32, researched: &BTreeSet<TechId>) -> CellStatus {
        let Some(crop) = &self.crop else {
            self.status = CellStatus::Empty;
            return self.status;
        };
        if self.status != CellStatus::Growing {
            return self.status;
        }

        let watered = self.irrigated
            || water_reserve >= crop.water_need
            || researched.contains(tech_ids::DROUGHT_RESISTANT);
        if watered {
            self.days_growing = self.days_growing.saturating_add(1);
        } else {
            self.expected_yield = (self.expected_yield - DRY_DAY_PENALTY).max(0.0);
        }

        if self.expected_yield <= 0.0 {
            self.status = CellStatus::Failed;
        } else if self.days_growing >= crop.growth_days {
            self.status = CellStatus::Ready;
        }
        self.status
    }

    fn plant(&mut self, crop: &Crop) {
        self.consecutive_plantings = if self.last_crop.as_ref() == Some(&crop.id) {
            self.consecutive_plantings.saturating_add(1)
        } else {
            0
        };
        self.last_crop = Some(crop.id.clone());
        self.clear();
        self.crop = Some(crop.clone());
        self.status = CellStatus::Growing;
        self.expected_yield = BASE_EXPECTED_YIELD;
    }

    fn irrigate(&mut self, efficiency: f64) {
        if self.crop.is_none() {
            return;
        }
        self.irrigated = true;
        self.expected_yield =
            (self.expected_yield + IRRIGATION_BONUS * efficiency).min(MAX_EXPECTED_YIELD);
    }

    fn fertilize(&mut self, efficiency: f64) {
        if self.crop.is_none() {
            return;
        }
        self.fertilized = true;
        self.expected_yield =
            (self.expected_yield + FERTILIZER_BONUS * efficiency).min(MAX_EXPECTED_YIELD);
        self.set_soil_health(self.soil_health + FERTILIZER_SOIL_GAIN * efficiency);
    }

    fn harvest(&mut self, water_reserve: u32, market_price: f64) -> Option<HarvestOutcome> {
        let crop = self.crop.clone()?;
        if self.status != CellStatus::Ready {
            return None;
        }

        let soil_factor = 0.5 + self.soil_health / 200.0;
        let water_factor = if self.irrigated || water_reserve >= crop.water_need {
            1.0
        } else {
            0.8
        };
        let yield_percentage = self.expected_yield * soil_factor * water_factor;
        let gross = crop.base_price as f64 * yield_percentage / 100.0;
        #[allow(clippy::cast_possible_truncation)]
        let value = (gross * market_price).round() as i64;

        let drain = crop.soil_drain
            * (1.0 + MONOCROP_DRAIN_FACTOR * f64::from(self.consecutive_plantings));
        self.set_soil_health(self.soil_health - drain);
        self.clear();

        Some(HarvestOutcome {
            value,
            crop_name: crop.name,
            yield_percentage,
        })
    }

    fn apply_stress(&mut self, amount: f64) {
        if self.status != CellStatus::Growing {
            return;
        }
        self.expected_yield = (self.expected_yield - amount).max(0.0);
        if self.expected_yield <= 0.0 {
            self.status = CellStatus::Failed;
        }
    }

    fn crop(&self) -> Option<&Crop> {
        self.crop.as_ref()
    }

    fn status(&self) -> CellStatus {
        self.status
    }

    fn soil_health(&self) -> f64 {
        self.soil_health
    }

    fn set_soil_health(&mut self, value: f64) {
        self.soil_health = value.clamp(0.0, 100.0);
    }

    fn is_irrigated(&self) -> bool {
        self.irrigated
    }

    fn is_fertilized(&self) -> bool {
        self.fertilized
    }

    fn consecutive_plantings(&self) -> u32 {
        self.consecutive_plantings
    }

    fn expected_yield(&self) -> f64 {
        self.expected_yield
    }

    fn set_expected_yield(&mut self, value: f64) {
        self.expected_yield = value.clamp(0.0, MAX_EXPECTED_YIELD);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crops::default_crops;

    fn wheat() -> Crop {
        default_crops().get("wheat").cloned().unwrap()
    }

    fn grow_to_maturity(plot: &mut Plot, water: u32) -> CellStatus {
        let none = BTreeSet::new();
        let mut status = plot.status();
        for _ in 0..200 {
            status = plot.update(water, &none);
            if status != CellStatus::Growing {
                break;
            }
        }
        status
    }

    #[test]
    fn empty_plot_stays_empty() {
        let mut plot = Plot::default();
        assert_eq!(plot.update(50, &BTreeSet::new()), CellStatus::Empty);
        assert!(plot.crop().is_none());
    }

    #[test]
    fn crop_matures_after_growth_days() {
        let mut plot = Plot::default();
        let crop = wheat();
        plot.plant(&crop);
        let none = BTreeSet::new();
        for _ in 1..crop.growth_days {
            assert_eq!(plot.update(80, &none), CellStatus::Growing);
        }
        assert_eq!(plot.update(80, &none), CellStatus::Ready);
        assert!(plot.is_harvest_ready());
    }

    #[test]
    fn dry_days_stall_growth_and_eventually_fail() {
        let mut plot = Plot::default();
        plot.plant(&wheat());
        assert_eq!(grow_to_maturity(&mut plot, 0), CellStatus::Failed);
        assert_eq!(plot.days_growing(), 0);
    }

    #[test]
    fn drought_resistant_seeds_grow_without_water() {
        let mut plot = Plot::default();
        let crop = wheat();
        plot.plant(&crop);
        let researched: BTreeSet<TechId> =
            std::iter::once(TechId::new(tech_ids::DROUGHT_RESISTANT)).collect();
        for _ in 0..crop.growth_days {
            plot.update(0, &researched);
        }
        assert!(plot.is_harvest_ready());
    }

    #[test]
    fn harvest_credits_value_and_clears_plot() {
        let mut plot = Plot::with_soil_health(100.0);
        plot.plant(&wheat());
        grow_to_maturity(&mut plot, 80);
        let outcome = plot.harvest(80, 1.0).unwrap();
        // 100% yield on perfect soil at price 1.0 sells for the base price.
        assert_eq!(outcome.value, 1000);
        assert_eq!(outcome.crop_name, "Wheat");
        assert!(plot.crop().is_none());
        assert!(plot.soil_health() < 100.0);
    }

    #[test]
    fn harvest_before_ready_yields_nothing() {
        let mut plot = Plot::default();
        plot.plant(&wheat());
        assert!(plot.harvest(80, 1.0).is_none());
        assert!(plot.crop().is_some());
    }

    #[test]
    fn replanting_same_crop_counts_consecutive() {
        let mut plot = Plot::default();
        let crop = wheat();
        let corn = default_crops().get("corn").cloned().unwrap();
        plot.plant(&crop);
        assert_eq!(plot.consecutive_plantings(), 0);
        plot.plant(&crop);
        plot.plant(&crop);
        assert_eq!(plot.consecutive_plantings(), 2);
        plot.plant(&corn);
        assert_eq!(plot.consecutive_plantings(), 0);
    }

    #[test]
    fn irrigation_and_fertilizer_cap_yield() {
        let mut plot = Plot::default();
        plot.plant(&wheat());
        plot.irrigate(10.0);
        plot.fertilize(10.0);
        assert!(plot.is_irrigated());
        assert!(plot.is_fertilized());
        assert!((plot.expected_yield() - MAX_EXPECTED_YIELD).abs() < f64::EPSILON);
    }

    #[test]
    fn stress_fails_crop_at_zero_yield() {
        let mut plot = Plot::default();
        plot.plant(&wheat());
        plot.apply_stress(250.0);
        assert_eq!(plot.status(), CellStatus::Failed);
    }
}
