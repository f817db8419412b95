//! Occupancy grid: terrain, movement costs and cell occupants.
//!
//! Occupancy is only written through [`Level`](crate::level::Level), which
//! keeps each unit's recorded position and the referencing cell in sync.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::{Position, UnitId};
use crate::error::{GameError, Result};
use crate::terrain::{TileStats, TileType};

/// Neighbour visitation order: up, down, left, right.
///
/// Searches rely on this order to break ties between equal-cost paths.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain kind.
    pub tile: TileType,
    /// Cost to enter, avoid and defense bonuses.
    pub stats: TileStats,
    occupant: Option<UnitId>,
}

impl Cell {
    /// Create an empty cell with the tile's default statistics.
    #[must_use]
    pub const fn new(tile: TileType) -> Self {
        Self::with_stats(tile, tile.default_stats())
    }

    /// Create an empty cell with explicit statistics.
    #[must_use]
    pub const fn with_stats(tile: TileType, stats: TileStats) -> Self {
        Self {
            tile,
            stats,
            occupant: None,
        }
    }

    /// Unit standing on this cell.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Movement cost, or `None` if the cell can never be entered.
    #[must_use]
    pub const fn movement_cost(&self) -> Option<u32> {
        if self.tile.is_walkable() {
            Some(self.stats.penalty)
        } else {
            None
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(TileType::Floor)
    }
}

/// Position sets cached for the acting unit.
///
/// These are a pure function of occupancy and the actor's stats. They are
/// cleared whenever occupancy changes and exist for previews only; decision
/// code always recomputes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSets {
    /// Unit the sets were computed for.
    pub actor: Option<UnitId>,
    /// Cells the actor can end its move on.
    pub accessible: BTreeSet<Position>,
    /// Cells the actor threatens after moving.
    pub attackable: BTreeSet<Position>,
    /// Cells the actor's ability reaches from its current cell.
    pub ability_range: BTreeSet<Position>,
    /// Cells reachable with double movement (lookahead preview).
    pub vis_range: BTreeSet<Position>,
}

impl DerivedSets {
    /// Whether the sets are current for `unit`.
    #[must_use]
    pub fn is_for(&self, unit: UnitId) -> bool {
        self.actor == Some(unit)
    }
}

/// Fixed-size rectangular grid stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    derived: DerivedSets,
}

impl Grid {
    /// Create a grid with every cell set to floor.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); cell_count],
            derived: DerivedSets::default(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Check if a position is within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as u32) < self.width
            && (pos.row as u32) < self.height
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok((pos.row as usize) * (self.width as usize) + (pos.col as usize))
        } else {
            Err(GameError::OutOfBounds {
                position: pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Cell at a position.
    pub fn cell(&self, pos: Position) -> Result<&Cell> {
        let index = self.index(pos)?;
        Ok(&self.cells[index])
    }

    /// Cell at a position, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).ok().map(|index| &self.cells[index])
    }

    /// Replace the terrain of a cell, keeping its occupant.
    pub fn set_tile(&mut self, pos: Position, tile: TileType, stats: TileStats) -> Result<()> {
        let index = self.index(pos)?;
        let cell = &mut self.cells[index];
        cell.tile = tile;
        cell.stats = stats;
        Ok(())
    }

    /// Movement cost of a cell, `None` when impassable or out of bounds.
    #[must_use]
    pub fn movement_cost(&self, pos: Position) -> Option<u32> {
        self.get(pos).and_then(Cell::movement_cost)
    }

    /// In-bounds orthogonal neighbours in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dc, dr)| pos.offset(dc, dr))
            .filter(|next| self.in_bounds(*next))
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |row| (0..width).map(move |col| Position::new(col, row)))
    }

    /// Cached derived sets.
    #[must_use]
    pub const fn derived(&self) -> &DerivedSets {
        &self.derived
    }

    pub(crate) fn set_derived(&mut self, derived: DerivedSets) {
        self.derived = derived;
    }

    pub(crate) fn clear_derived(&mut self) {
        self.derived = DerivedSets::default();
    }

    pub(crate) fn set_occupant(&mut self, pos: Position, occupant: Option<UnitId>) -> Result<()> {
        let index = self.index(pos)?;
        self.cells[index].occupant = occupant;
        Ok(())
    }
}
