//! The research tree: prerequisites, effect multipliers, and the default
//! technology table.
//!
//! Effects are named multipliers (`water_efficiency`, `drought_impact`, ...).
//! The effective value of an effect is the product over every researched
//! technology that declares it, or `1.0` when none does. Researching is a
//! one-way transition.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use homestead_types::TechId;

use crate::error::FarmError;

/// Well-known technology ids.
pub mod tech_ids {
    /// Drip irrigation.
    pub const DRIP_IRRIGATION: &str = "drip_irrigation";
    /// Soil moisture and nutrient sensors.
    pub const SOIL_SENSORS: &str = "soil_sensors";
    /// Drought-resistant seed varieties.
    pub const DROUGHT_RESISTANT: &str = "drought_resistant";
    /// AI-scheduled irrigation.
    pub const AI_IRRIGATION: &str = "ai_irrigation";
    /// Precision spraying drones.
    pub const PRECISION_DRONES: &str = "precision_drones";
    /// Greenhouses.
    pub const GREENHOUSE: &str = "greenhouse";
    /// No-till farming.
    pub const NO_TILL_FARMING: &str = "no_till_farming";
    /// Silvopasture.
    pub const SILVOPASTURE: &str = "silvopasture";
    /// On-farm renewable energy.
    pub const RENEWABLE_ENERGY: &str = "renewable_energy";
    /// Hydroponic growing.
    pub const HYDROPONICS: &str = "hydroponics";
}

/// Well-known effect names.
pub mod effect_keys {
    /// Multiplier on irrigation effect and water draw.
    pub const WATER_EFFICIENCY: &str = "water_efficiency";
    /// Multiplier on fertilizer effect.
    pub const FERTILIZER_EFFICIENCY: &str = "fertilizer_efficiency";
    /// Multiplier on drought severity.
    pub const DROUGHT_IMPACT: &str = "drought_impact";
    /// Multiplier on heatwave severity.
    pub const HEAT_IMPACT: &str = "heat_impact";
    /// Multiplier on frost severity.
    pub const FROST_IMPACT: &str = "frost_impact";
    /// One-time multiplier on every cell's soil health when researched.
    pub const SOIL_HEALTH: &str = "soil_health";
}

// ---------------------------------------------------------------------------
// Technology
// ---------------------------------------------------------------------------

/// A researchable technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    /// Registry key.
    pub id: TechId,
    /// Display name.
    pub name: String,
    /// Short description for the research panel.
    pub description: String,
    /// Research cost before inflation.
    pub cost: i64,
    /// Technologies that must be researched first.
    pub prerequisites: Vec<TechId>,
    /// Named effect multipliers.
    pub effects: BTreeMap<String, f64>,
    /// Whether this technology has been researched.
    pub researched: bool,
}

impl Technology {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        cost: i64,
        prerequisites: &[&str],
        effects: &[(&str, f64)],
    ) -> Self {
        Self {
            id: TechId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            cost,
            prerequisites: prerequisites.iter().map(|p| TechId::new(*p)).collect(),
            effects: effects
                .iter()
                .map(|(k, v)| ((*k).to_owned(), *v))
                .collect(),
            researched: false,
        }
    }

    /// The value this technology declares for `effect`, if any.
    pub fn effect(&self, effect: &str) -> Option<f64> {
        self.effects.get(effect).copied()
    }
}

// ---------------------------------------------------------------------------
// TechRegistry
// ---------------------------------------------------------------------------

/// Ordered technology table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechRegistry {
    techs: Vec<Technology>,
}

impl TechRegistry {
    /// Build a registry, rejecting duplicate ids and dangling prerequisites.
    pub fn new(techs: Vec<Technology>) -> Result<Self, FarmError> {
        let mut ids = BTreeSet::new();
        for tech in &techs {
            if !ids.insert(tech.id.clone()) {
                return Err(FarmError::DuplicateTechnology(tech.id.clone()));
            }
        }
        for tech in &techs {
            if let Some(missing) = tech.prerequisites.iter().find(|p| !ids.contains(*p)) {
                return Err(FarmError::UnknownPrerequisite {
                    tech: tech.id.clone(),
                    prerequisite: missing.clone(),
                });
            }
        }
        Ok(Self { techs })
    }

    /// Look up a technology by id.
    pub fn get(&self, id: &str) -> Option<&Technology> {
        self.techs.iter().find(|t| t.id.as_str() == id)
    }

    /// Iterate in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.techs.iter()
    }

    /// Number of technologies.
    pub fn len(&self) -> usize {
        self.techs.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.techs.is_empty()
    }

    /// Whether every prerequisite of `id` is in `researched`.
    ///
    /// Unknown ids have no satisfiable prerequisites and return `false`.
    pub fn prerequisites_met(&self, id: &str, researched: &BTreeSet<TechId>) -> bool {
        self.get(id)
            .is_some_and(|t| t.prerequisites.iter().all(|p| researched.contains(p)))
    }

    /// Product of `effect` over every researched technology declaring it.
    pub fn effect_multiplier(&self, researched: &BTreeSet<TechId>, effect: &str) -> f64 {
        self.techs
            .iter()
            .filter(|t| researched.contains(&t.id))
            .filter_map(|t| t.effect(effect))
            .product()
    }

    /// Mark `id` as researched. Returns `false` if the id is unknown.
    pub fn mark_researched(&mut self, id: &str) -> bool {
        match self.techs.iter_mut().find(|t| t.id.as_str() == id) {
            Some(tech) => {
                tech.researched = true;
                true
            }
            None => false,
        }
    }

    /// Sum of the base costs of every researched technology.
    pub fn researched_value(&self, researched: &BTreeSet<TechId>) -> i64 {
        self.techs
            .iter()
            .filter(|t| researched.contains(&t.id))
            .fold(0_i64, |acc, t| acc.saturating_add(t.cost))
    }
}

/// The standard research tree.
pub fn default_technologies() -> TechRegistry {
    use effect_keys::{
        DROUGHT_IMPACT, FERTILIZER_EFFICIENCY, FROST_IMPACT, HEAT_IMPACT, SOIL_HEALTH,
        WATER_EFFICIENCY,
    };
    use tech_ids::{
        AI_IRRIGATION, DRIP_IRRIGATION, DROUGHT_RESISTANT, GREENHOUSE, HYDROPONICS,
        NO_TILL_FARMING, PRECISION_DRONES, RENEWABLE_ENERGY, SILVOPASTURE, SOIL_SENSORS,
    };

    TechRegistry {
        techs: vec![
            Technology::new(
                DRIP_IRRIGATION,
                "Drip Irrigation",
                "Delivers water straight to the roots.",
                3000,
                &[],
                &[(WATER_EFFICIENCY, 1.3)],
            ),
            Technology::new(
                SOIL_SENSORS,
                "Soil Sensors",
                "Measures moisture and nutrients per plot.",
                2500,
                &[],
                &[(FERTILIZER_EFFICIENCY, 1.25)],
            ),
            Technology::new(
                DROUGHT_RESISTANT,
                "Drought-Resistant Seeds",
                "Crops keep growing through dry spells.",
                4000,
                &[],
                &[(DROUGHT_IMPACT, 0.5)],
            ),
            Technology::new(
                AI_IRRIGATION,
                "AI Irrigation",
                "Schedules watering from sensor data.",
                8000,
                &[DRIP_IRRIGATION, SOIL_SENSORS],
                &[(WATER_EFFICIENCY, 1.2)],
            ),
            Technology::new(
                PRECISION_DRONES,
                "Precision Drones",
                "Targets fertilizer where it is needed.",
                6000,
                &[SOIL_SENSORS],
                &[(FERTILIZER_EFFICIENCY, 1.2)],
            ),
            Technology::new(
                GREENHOUSE,
                "Greenhouses",
                "Shields crops from frost and heat.",
                7000,
                &[],
                &[(FROST_IMPACT, 0.3), (HEAT_IMPACT, 0.6)],
            ),
            Technology::new(
                NO_TILL_FARMING,
                "No-Till Farming",
                "Leaves soil structure intact.",
                3500,
                &[],
                &[(SOIL_HEALTH, 1.15)],
            ),
            Technology::new(
                SILVOPASTURE,
                "Silvopasture",
                "Trees and pasture share the land.",
                6000,
                &[NO_TILL_FARMING],
                &[(SOIL_HEALTH, 1.1), (HEAT_IMPACT, 0.8)],
            ),
            Technology::new(
                RENEWABLE_ENERGY,
                "Renewable Energy",
                "Solar and wind power for the farm.",
                9000,
                &[],
                &[],
            ),
            Technology::new(
                HYDROPONICS,
                "Hydroponics",
                "Soil-free growing with recirculated water.",
                10000,
                &[GREENHOUSE],
                &[(WATER_EFFICIENCY, 1.5)],
            ),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn researched(ids: &[&str]) -> BTreeSet<TechId> {
        ids.iter().map(|id| TechId::new(*id)).collect()
    }

    #[test]
    fn default_tree_is_consistent() {
        let registry = default_technologies();
        let rebuilt = TechRegistry::new(registry.iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn dangling_prerequisite_is_rejected() {
        let techs = vec![Technology::new("a", "A", "", 100, &["ghost"], &[])];
        assert!(matches!(
            TechRegistry::new(techs),
            Err(FarmError::UnknownPrerequisite { .. })
        ));
    }

    #[test]
    fn prerequisites_require_every_parent() {
        let registry = default_technologies();
        let none = researched(&[]);
        let drip = researched(&[tech_ids::DRIP_IRRIGATION]);
        let both = researched(&[tech_ids::DRIP_IRRIGATION, tech_ids::SOIL_SENSORS]);
        assert!(!registry.prerequisites_met(tech_ids::AI_IRRIGATION, &none));
        assert!(!registry.prerequisites_met(tech_ids::AI_IRRIGATION, &drip));
        assert!(registry.prerequisites_met(tech_ids::AI_IRRIGATION, &both));
        assert!(registry.prerequisites_met(tech_ids::GREENHOUSE, &none));
        assert!(!registry.prerequisites_met("warp_drive", &both));
    }

    #[test]
    fn effect_multiplier_defaults_to_one() {
        let registry = default_technologies();
        let value = registry.effect_multiplier(&researched(&[]), effect_keys::WATER_EFFICIENCY);
        assert!((value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn effect_multiplier_compounds() {
        let registry = default_technologies();
        let set = researched(&[tech_ids::DRIP_IRRIGATION, tech_ids::AI_IRRIGATION]);
        let value = registry.effect_multiplier(&set, effect_keys::WATER_EFFICIENCY);
        assert!((value - 1.56).abs() < 1e-9);
    }

    #[test]
    fn mark_researched_is_one_way() {
        let mut registry = default_technologies();
        assert!(registry.mark_researched(tech_ids::GREENHOUSE));
        assert!(registry.get(tech_ids::GREENHOUSE).unwrap().researched);
        assert!(!registry.mark_researched("warp_drive"));
    }

    #[test]
    fn researched_value_sums_costs() {
        let registry = default_technologies();
        let set = researched(&[tech_ids::DRIP_IRRIGATION, tech_ids::SOIL_SENSORS]);
        assert_eq!(registry.researched_value(&set), 5500);
    }
}
