//! The [`Cell`] trait and the fixed-size square [`FarmGrid`].
//!
//! The simulation core never looks inside a cell. It drives growth through
//! [`Cell::update`], mutates cells through the action methods, and reads the
//! handful of accessors it needs for scoring and validation. Any growth model
//! that implements the trait can be dropped into the grid.

use std::collections::BTreeSet;

use homestead_types::{CellStatus, GridPos, HarvestOutcome, TechId};

use crate::crops::Crop;
use crate::error::FarmError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single plot of land in the farm grid.
pub trait Cell {
    /// Advance the cell by one day and report its status afterwards.
    fn update(&mut self, water_reserve: u32, researched: &BTreeSet<TechId>) -> CellStatus;

    /// Plant `crop`, replacing whatever (dead) crop was there.
    fn plant(&mut self, crop: &Crop);

    /// Irrigate the current crop with the given efficiency multiplier.
    fn irrigate(&mut self, efficiency: f64);

    /// Fertilize the current crop with the given efficiency multiplier.
    fn fertilize(&mut self, efficiency: f64);

    /// Harvest the crop at the given market price multiplier.
    ///
    /// Returns `None` when there is nothing to harvest.
    fn harvest(&mut self, water_reserve: u32, market_price: f64) -> Option<HarvestOutcome>;

    /// Reduce the crop's expected yield by `amount` percentage points.
    fn apply_stress(&mut self, amount: f64);

    /// The planted crop, if any.
    fn crop(&self) -> Option<&Crop>;

    /// Status as of the last update or action.
    fn status(&self) -> CellStatus;

    /// Soil health in `0.0..=100.0`.
    fn soil_health(&self) -> f64;

    /// Overwrite the soil health. Implementations clamp to `0.0..=100.0`.
    fn set_soil_health(&mut self, value: f64);

    /// Whether the current crop has been irrigated.
    fn is_irrigated(&self) -> bool;

    /// Whether the current crop has been fertilized.
    fn is_fertilized(&self) -> bool;

    /// Number of back-to-back plantings of the same crop on this cell.
    fn consecutive_plantings(&self) -> u32;

    /// Expected yield as a percentage of the crop's base yield.
    fn expected_yield(&self) -> f64;

    /// Overwrite the expected yield.
    fn set_expected_yield(&mut self, value: f64);

    /// Whether the crop is mature and can be harvested.
    fn is_harvest_ready(&self) -> bool {
        self.status() == CellStatus::Ready
    }
}

// ---------------------------------------------------------------------------
// FarmGrid
// ---------------------------------------------------------------------------

/// A square grid of cells whose dimensions never change after construction.
#[derive(Debug, Clone)]
pub struct FarmGrid<C> {
    size: usize,
    cells: Vec<C>,
}

impl<C> FarmGrid<C> {
    /// Build a `size` x `size` grid, creating each cell with `make_cell`.
    pub fn new(size: usize, mut make_cell: impl FnMut(GridPos) -> C) -> Result<Self, FarmError> {
        if size == 0 {
            return Err(FarmError::InvalidGridSize { size });
        }
        let count = size
            .checked_mul(size)
            .ok_or(FarmError::GridTooLarge { size })?;
        let mut cells = Vec::with_capacity(count);
        for row in 0..size {
            for col in 0..size {
                cells.push(make_cell(GridPos::new(row, col)));
            }
        }
        Ok(Self { size, cells })
    }

    /// Side length of the grid.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a grid holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `pos` lies inside the grid.
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    fn index_of(&self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        pos.row.checked_mul(self.size)?.checked_add(pos.col)
    }

    /// The cell at `pos`, if inside the grid.
    pub fn get(&self, pos: GridPos) -> Option<&C> {
        self.index_of(pos).and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `pos`, if inside the grid.
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut C> {
        self.index_of(pos).and_then(|i| self.cells.get_mut(i))
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + use<C> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| GridPos::new(row, col)))
    }

    /// Iterate over `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &C)> {
        self.positions().zip(self.cells.iter())
    }

    /// Iterate mutably over `(position, cell)` pairs in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GridPos, &mut C)> {
        self.positions().zip(self.cells.iter_mut())
    }

    /// Iterate over the cells only.
    pub fn cells(&self) -> impl Iterator<Item = &C> {
        self.cells.iter()
    }

    /// Iterate mutably over the cells only.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.cells.iter_mut()
    }
}

impl<C: Cell> FarmGrid<C> {
    /// Mean soil health across every cell.
    pub fn average_soil_health(&self) -> f64 {
        let total: f64 = self.cells.iter().map(Cell::soil_health).sum();
        total / self.cells.len().max(1) as f64
    }

    /// Number of cells with a crop planted.
    pub fn planted_count(&self) -> usize {
        self.cells.iter().filter(|c| c.crop().is_some()).count()
    }
}
