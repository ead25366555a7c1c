//! Farm grid, crops, technologies, and event content for the Homestead
//! simulation.
//!
//! This crate holds everything the simulation core consumes but does not
//! own: the per-cell growth model behind the [`Cell`] trait, the static crop
//! and technology tables, the random event content behind the
//! [`EventGenerator`] trait, and the per-event effects on the grid.
//!
//! # Modules
//!
//! - [`grid`] -- The [`Cell`] trait and the fixed-size square [`FarmGrid`].
//! - [`plot`] -- [`Plot`], the reference cell with a growth timer, yield,
//!   and soil bookkeeping.
//! - [`crops`] -- Crop definitions and the default crop catalogue.
//! - [`technology`] -- The research tree: prerequisites, effect multipliers,
//!   and the default technology table.
//! - [`generator`] -- The [`EventGenerator`] trait and [`StandardEvents`].
//! - [`effects`] -- Per-event grid effects returning an [`EffectOutcome`].
//! - [`error`] -- Error types for building grids and tables.

pub mod crops;
pub mod effects;
pub mod error;
pub mod generator;
pub mod grid;
pub mod plot;
pub mod technology;

// Re-export primary types at crate root.
pub use crops::{Crop, CropCatalogue, default_crops};
pub use effects::{
    EffectOutcome, PriceShift, apply_drought, apply_frost, apply_heatwave, apply_market,
    apply_policy, apply_rain, apply_technology,
};
pub use error::FarmError;
pub use generator::{EventGenerator, FarmSnapshot, StandardEvents};
pub use grid::{Cell, FarmGrid};
pub use plot::Plot;
pub use technology::{TechRegistry, Technology, default_technologies, effect_keys, tech_ids};
