//! Per-event effects on the farm grid.
//!
//! Each `apply_*` function mutates the grid cells directly (crop stress) and
//! returns an [`EffectOutcome`] describing the ledger-level changes the
//! scheduler must apply: water, balance, market prices, technology grants,
//! and the next link of a multi-day chain. Keeping ledger writes out of this
//! module lets the scheduler clamp every value in one place.

use std::collections::BTreeSet;

use tracing::debug;

use homestead_types::{CropId, EventKind, TechId};

use crate::grid::{Cell, FarmGrid};
use crate::technology::{TechRegistry, effect_keys};

/// Effective severity below which a weather event does no damage.
pub const MITIGATION_THRESHOLD: f64 = 0.25;

/// Yield stress per unit of effective drought severity, per day.
const DROUGHT_STRESS: f64 = 6.0;
/// Water lost per unit of effective drought severity, per day.
const DROUGHT_WATER_LOSS: f64 = 8.0;
/// Yield stress per unit of effective heat severity, per day.
const HEAT_STRESS: f64 = 8.0;
/// Water lost per unit of effective heat severity, per day.
const HEAT_WATER_LOSS: f64 = 4.0;
/// Yield stress per unit of effective frost severity.
const FROST_STRESS: f64 = 20.0;

/// A multiplicative change to one crop's market price, or to all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceShift {
    /// Affected crop, or every crop when `None`.
    pub crop: Option<CropId>,
    /// Multiplier to apply before clamping.
    pub factor: f64,
}

/// What an event did, for the scheduler to apply and log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    /// Log message for the event.
    pub message: String,
    /// Whether the message is an alert.
    pub alert: bool,
    /// Whether technology mitigated the event entirely.
    pub skipped: bool,
    /// Signed change to the water reserve.
    pub water_delta: i64,
    /// Signed change to the balance.
    pub balance_delta: i64,
    /// Market price change, if any.
    pub price_shift: Option<PriceShift>,
    /// Technology granted for free, if any.
    pub granted_tech: Option<TechId>,
    /// Next day's event for a multi-day chain.
    pub continuation: Option<EventKind>,
    /// Message logged once when a multi-day chain ends.
    pub closing_message: Option<String>,
}

impl EffectOutcome {
    fn note(message: String, alert: bool) -> Self {
        Self {
            message,
            alert,
            ..Self::default()
        }
    }
}

fn stress_planted<C: Cell>(grid: &mut FarmGrid<C>, amount: f64) -> usize {
    let mut stressed = 0_usize;
    for cell in grid.cells_mut().filter(|c| c.crop().is_some()) {
        cell.apply_stress(amount);
        stressed = stressed.saturating_add(1);
    }
    stressed
}

#[allow(clippy::cast_possible_truncation)]
fn water_loss(effective: f64, per_unit: f64) -> i64 {
    -((effective * per_unit).round() as i64)
}

/// Rainfall: replenish the water reserve.
pub fn apply_rain(amount: u32) -> EffectOutcome {
    EffectOutcome {
        water_delta: i64::from(amount),
        ..EffectOutcome::note(format!("Rain replenished the reservoir (+{amount} water)"), false)
    }
}

/// One day of drought: drain water and stress crops unless mitigated.
pub fn apply_drought<C: Cell>(
    grid: &mut FarmGrid<C>,
    techs: &TechRegistry,
    researched: &BTreeSet<TechId>,
    duration: u32,
    severity: f64,
) -> EffectOutcome {
    let effective = severity * techs.effect_multiplier(researched, effect_keys::DROUGHT_IMPACT);
    let mut outcome = if effective < MITIGATION_THRESHOLD {
        EffectOutcome {
            skipped: true,
            ..EffectOutcome::note(
                String::from("Drought-resistant crops shrugged off the dry weather"),
                false,
            )
        }
    } else {
        let stressed = stress_planted(grid, effective * DROUGHT_STRESS);
        debug!(effective, stressed, duration, "drought applied");
        EffectOutcome {
            water_delta: water_loss(effective, DROUGHT_WATER_LOSS),
            ..EffectOutcome::note(
                format!("Drought parched the fields ({duration} days remaining)"),
                true,
            )
        }
    };
    if duration > 1 {
        outcome.continuation = Some(EventKind::Drought {
            duration: duration.saturating_sub(1),
            severity,
        });
    } else {
        outcome.closing_message = Some(String::from("The drought has ended"));
    }
    outcome
}

/// One day of heatwave: stress crops and evaporate water unless mitigated.
pub fn apply_heatwave<C: Cell>(
    grid: &mut FarmGrid<C>,
    techs: &TechRegistry,
    researched: &BTreeSet<TechId>,
    duration: u32,
    severity: f64,
) -> EffectOutcome {
    let effective = severity * techs.effect_multiplier(researched, effect_keys::HEAT_IMPACT);
    let mut outcome = if effective < MITIGATION_THRESHOLD {
        EffectOutcome {
            skipped: true,
            ..EffectOutcome::note(
                String::from("Shaded and sheltered crops weathered the heat"),
                false,
            )
        }
    } else {
        let stressed = stress_planted(grid, effective * HEAT_STRESS);
        debug!(effective, stressed, duration, "heatwave applied");
        EffectOutcome {
            water_delta: water_loss(effective, HEAT_WATER_LOSS),
            ..EffectOutcome::note(
                format!("A heatwave scorched the crops ({duration} days remaining)"),
                true,
            )
        }
    };
    if duration > 1 {
        outcome.continuation = Some(EventKind::Heatwave {
            duration: duration.saturating_sub(1),
            severity,
        });
    } else {
        outcome.closing_message = Some(String::from("The heatwave has broken"));
    }
    outcome
}

/// A frost: stress crops. Always reported as an alert.
pub fn apply_frost<C: Cell>(
    grid: &mut FarmGrid<C>,
    techs: &TechRegistry,
    researched: &BTreeSet<TechId>,
    severity: f64,
) -> EffectOutcome {
    let effective = severity * techs.effect_multiplier(researched, effect_keys::FROST_IMPACT);
    let stressed = stress_planted(grid, effective * FROST_STRESS);
    debug!(effective, stressed, "frost applied");
    let message = if stressed == 0 {
        String::from("Frost covered the empty fields")
    } else {
        format!("Frost damaged crops on {stressed} plots")
    };
    EffectOutcome::note(message, true)
}

/// A market shock on one crop or on all crops.
pub fn apply_market(crop: Option<&CropId>, factor: f64) -> EffectOutcome {
    let direction = if factor >= 1.0 { "rose" } else { "fell" };
    let percent = ((factor - 1.0).abs() * 100.0).round();
    let subject = crop.map_or_else(|| String::from("Crop"), |c| c.to_string());
    EffectOutcome {
        price_shift: Some(PriceShift {
            crop: crop.cloned(),
            factor,
        }),
        ..EffectOutcome::note(format!("{subject} prices {direction} {percent}%"), false)
    }
}

/// A policy changing the balance. Negative changes are alerts.
pub fn apply_policy(title: &str, balance_delta: i64) -> EffectOutcome {
    let message = if balance_delta >= 0 {
        format!("{title}: +{balance_delta}")
    } else {
        format!("{title}: {balance_delta}")
    };
    EffectOutcome {
        balance_delta,
        ..EffectOutcome::note(message, balance_delta < 0)
    }
}

/// A technology breakthrough: balance change and an optional free grant.
///
/// The message does not name the grant; only the caller knows whether the
/// technology was still locked.
pub fn apply_technology(
    title: &str,
    balance_delta: i64,
    grant: Option<&TechId>,
) -> EffectOutcome {
    let message = if balance_delta == 0 {
        title.to_owned()
    } else {
        format!("{title}: {balance_delta:+}")
    };
    EffectOutcome {
        balance_delta,
        granted_tech: grant.cloned(),
        ..EffectOutcome::note(message, false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crops::default_crops;
    use crate::plot::Plot;
    use crate::technology::{default_technologies, tech_ids};

    fn planted_grid() -> FarmGrid<Plot> {
        let wheat = default_crops().get("wheat").cloned().unwrap();
        let mut grid = FarmGrid::new(2, |_| Plot::default()).unwrap();
        for cell in grid.cells_mut() {
            cell.plant(&wheat);
        }
        grid
    }

    fn researched(ids: &[&str]) -> BTreeSet<TechId> {
        ids.iter().map(|id| TechId::new(*id)).collect()
    }

    #[test]
    fn drought_chain_continues_with_one_less_day() {
        let mut grid = planted_grid();
        let techs = default_technologies();
        let outcome = apply_drought(&mut grid, &techs, &researched(&[]), 3, 0.6);
        assert!(outcome.alert);
        assert!(!outcome.skipped);
        assert!(outcome.water_delta < 0);
        assert_eq!(
            outcome.continuation,
            Some(EventKind::Drought {
                duration: 2,
                severity: 0.6
            })
        );
        assert!(outcome.closing_message.is_none());
        assert!(grid.cells().all(|c| c.expected_yield() < 100.0));
    }

    #[test]
    fn last_drought_day_closes_the_chain() {
        let mut grid = planted_grid();
        let techs = default_technologies();
        let outcome = apply_drought(&mut grid, &techs, &researched(&[]), 1, 0.6);
        assert!(outcome.continuation.is_none());
        assert_eq!(outcome.closing_message.as_deref(), Some("The drought has ended"));
    }

    #[test]
    fn mitigated_drought_is_skipped_but_continues() {
        let mut grid = planted_grid();
        let techs = default_technologies();
        let set = researched(&[tech_ids::DROUGHT_RESISTANT]);
        let outcome = apply_drought(&mut grid, &techs, &set, 4, 0.4);
        assert!(outcome.skipped);
        assert_eq!(outcome.water_delta, 0);
        assert!(outcome.continuation.is_some());
        assert!(grid.cells().all(|c| (c.expected_yield() - 100.0).abs() < f64::EPSILON));
    }

    #[test]
    fn greenhouse_softens_frost() {
        let techs = default_technologies();
        let mut bare = planted_grid();
        let mut covered = planted_grid();
        let bare_out = apply_frost(&mut bare, &techs, &researched(&[]), 0.5);
        apply_frost(&mut covered, &techs, &researched(&[tech_ids::GREENHOUSE]), 0.5);
        assert!(bare_out.alert);
        let bare_yield = bare.cells().next().unwrap().expected_yield();
        let covered_yield = covered.cells().next().unwrap().expected_yield();
        assert!(covered_yield > bare_yield);
    }

    #[test]
    fn negative_policy_is_an_alert() {
        assert!(apply_policy("Fine", -800).alert);
        assert!(!apply_policy("Grant", 800).alert);
        assert_eq!(apply_policy("Fine", -800).balance_delta, -800);
    }

    #[test]
    fn market_message_names_direction() {
        let corn = CropId::new("corn");
        let up = apply_market(Some(&corn), 1.2);
        assert_eq!(up.message, "corn prices rose 20%");
        let down = apply_market(None, 0.9);
        assert_eq!(down.message, "Crop prices fell 10%");
        assert!(down.price_shift.unwrap().crop.is_none());
    }

    #[test]
    fn technology_grant_is_forwarded() {
        let tech = TechId::new(tech_ids::SOIL_SENSORS);
        let outcome = apply_technology("Open data", 0, Some(&tech));
        assert_eq!(outcome.granted_tech, Some(tech));
        assert_eq!(outcome.message, "Open data");
        let grant = apply_technology("Agritech grant", 1200, None);
        assert_eq!(grant.message, "Agritech grant: +1200");
    }
}
