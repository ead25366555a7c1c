//! Sustainability scoring.
//!
//! A pure function of the grid and the researched technology set. The total
//! weighs soil 40%, crop diversity 40%, and sustainable technology 20%.

use std::collections::{BTreeMap, BTreeSet};

use homestead_farm::{Cell, FarmGrid, tech_ids};
use homestead_types::{CropId, ScoreBreakdown, TechId};

/// Sustainability points per technology. Unlisted technologies score zero.
pub const TECH_POINTS: [(&str, u32); 9] = [
    (tech_ids::NO_TILL_FARMING, 20),
    (tech_ids::SILVOPASTURE, 20),
    (tech_ids::DRIP_IRRIGATION, 15),
    (tech_ids::RENEWABLE_ENERGY, 15),
    (tech_ids::PRECISION_DRONES, 15),
    (tech_ids::DROUGHT_RESISTANT, 10),
    (tech_ids::AI_IRRIGATION, 10),
    (tech_ids::SOIL_SENSORS, 10),
    (tech_ids::GREENHOUSE, 10),
];

/// Sum of every entry in [`TECH_POINTS`].
pub const MAX_TECH_POINTS: u32 = 125;

/// Weight of the distribution penalty (share of the most common crop).
const DISTRIBUTION_PENALTY_WEIGHT: f64 = 50.0;

/// Penalty per consecutive planting of the same crop.
const MONOCROP_PENALTY_PER_PLANTING: f64 = 2.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_score(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

/// Score the farm. `available_crop_types` counts plantable crops only.
pub fn score<C: Cell>(
    grid: &FarmGrid<C>,
    available_crop_types: usize,
    researched: &BTreeSet<TechId>,
) -> ScoreBreakdown {
    combine(
        soil_score(grid),
        diversity_score(grid, available_crop_types),
        tech_score(researched),
    )
}

/// Weighted total of the three components.
pub fn combine(soil: u32, diversity: u32, tech: u32) -> ScoreBreakdown {
    let total = f64::from(soil) * 0.4 + f64::from(diversity) * 0.4 + f64::from(tech) * 0.2;
    ScoreBreakdown {
        total: round_score(total),
        soil,
        diversity,
        tech,
    }
}

/// Mean soil health, rounded.
pub fn soil_score<C: Cell>(grid: &FarmGrid<C>) -> u32 {
    round_score(grid.average_soil_health())
}

/// Crop diversity after distribution and monocrop penalties.
///
/// Zero when nothing is planted.
pub fn diversity_score<C: Cell>(grid: &FarmGrid<C>, available_crop_types: usize) -> u32 {
    let mut counts: BTreeMap<&CropId, usize> = BTreeMap::new();
    let mut monocrop_penalty = 0.0;
    for cell in grid.cells() {
        let Some(crop) = cell.crop() else {
            continue;
        };
        let count = counts.entry(&crop.id).or_insert(0);
        *count = count.saturating_add(1);
        let consecutive = cell.consecutive_plantings();
        if consecutive > 0 {
            monocrop_penalty += f64::from(consecutive) * MONOCROP_PENALTY_PER_PLANTING;
        }
    }

    let total_crops: usize = counts.values().sum();
    let max_possible = total_crops.min(available_crop_types);
    if total_crops == 0 || max_possible == 0 {
        return 0;
    }

    let total = total_crops as f64;
    let raw = counts.len() as f64 / max_possible as f64 * 100.0;
    let most_common = counts.values().copied().max().unwrap_or(0) as f64;
    let distribution_penalty = most_common / total * DISTRIBUTION_PENALTY_WEIGHT;
    round_score((raw - distribution_penalty - monocrop_penalty / total).max(0.0))
}

/// Share of sustainable technology points researched, as a percentage.
pub fn tech_score(researched: &BTreeSet<TechId>) -> u32 {
    let points: u32 = TECH_POINTS
        .iter()
        .filter(|(id, _)| researched.contains(*id))
        .map(|(_, points)| *points)
        .sum();
    round_score(f64::from(points) / f64::from(MAX_TECH_POINTS) * 100.0)
}
