//! Crop definitions and the default crop catalogue.
//!
//! The catalogue holds only real crops. The "empty plot" pseudo-type used by
//! some UIs is not a crop and is never listed, so `catalogue.len()` is the
//! number of crop types a player can actually plant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use homestead_types::CropId;

use crate::error::FarmError;

/// Static definition of a plantable crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Catalogue key.
    pub id: CropId,
    /// Display name.
    pub name: String,
    /// Sale value of a 100% yield at market price 1.0.
    pub base_price: i64,
    /// Days from planting to maturity.
    pub growth_days: u32,
    /// Soil health lost per harvest.
    pub soil_drain: f64,
    /// Minimum water reserve for normal growth.
    pub water_need: u32,
}

impl Crop {
    /// Build a crop definition.
    pub fn new(
        id: &str,
        name: &str,
        base_price: i64,
        growth_days: u32,
        soil_drain: f64,
        water_need: u32,
    ) -> Self {
        Self {
            id: CropId::new(id),
            name: name.to_owned(),
            base_price,
            growth_days,
            soil_drain,
            water_need,
        }
    }
}

/// Ordered, id-unique collection of crop definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropCatalogue {
    crops: Vec<Crop>,
}

impl CropCatalogue {
    /// Build a catalogue, rejecting duplicate ids.
    pub fn new(crops: Vec<Crop>) -> Result<Self, FarmError> {
        let mut seen = BTreeSet::new();
        for crop in &crops {
            if !seen.insert(crop.id.clone()) {
                return Err(FarmError::DuplicateCrop(crop.id.clone()));
            }
        }
        Ok(Self { crops })
    }

    /// Look up a crop by id.
    pub fn get(&self, id: &str) -> Option<&Crop> {
        self.crops.iter().find(|c| c.id.as_str() == id)
    }

    /// Iterate in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = &Crop> {
        self.crops.iter()
    }

    /// All crop ids in catalogue order.
    pub fn ids(&self) -> Vec<CropId> {
        self.crops.iter().map(|c| c.id.clone()).collect()
    }

    /// Number of plantable crop types.
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}

/// The six crops available in a standard game.
pub fn default_crops() -> CropCatalogue {
    CropCatalogue {
        crops: vec![
            Crop::new("wheat", "Wheat", 1000, 40, 4.0, 20),
            Crop::new("corn", "Corn", 1200, 50, 6.0, 30),
            Crop::new("soybeans", "Soybeans", 900, 45, 1.0, 25),
            Crop::new("potatoes", "Potatoes", 800, 35, 5.0, 25),
            Crop::new("tomatoes", "Tomatoes", 1500, 60, 5.0, 35),
            Crop::new("lettuce", "Lettuce", 600, 25, 2.0, 30),
        ],
    }
}
