//! Error types for the `homestead-farm` crate.

use homestead_types::{CropId, TechId};

/// Errors that can occur while building the grid or the static tables.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    /// The grid side length must be at least one cell.
    #[error("invalid grid size {size}: must be at least 1")]
    InvalidGridSize {
        /// The rejected side length.
        size: usize,
    },

    /// The grid side length squared does not fit in memory bounds.
    #[error("grid size {size} overflows the cell count")]
    GridTooLarge {
        /// The rejected side length.
        size: usize,
    },

    /// Two crops share the same identifier.
    #[error("duplicate crop id: {0}")]
    DuplicateCrop(CropId),

    /// Two technologies share the same identifier.
    #[error("duplicate technology id: {0}")]
    DuplicateTechnology(TechId),

    /// A technology lists a prerequisite that is not in the table.
    #[error("technology {tech} requires unknown prerequisite {prerequisite}")]
    UnknownPrerequisite {
        /// The technology with the dangling prerequisite.
        tech: TechId,
        /// The missing prerequisite.
        prerequisite: TechId,
    },
}
