//! # Tactics Core
//!
//! Deterministic decision and movement-resolution engine for a turn-based
//! grid tactics game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No file IO
//! - No randomness
//! - No combat arithmetic (delegated to a [`CombatResolver`](orchestrator::CombatResolver))
//!
//! ## Crate Structure
//!
//! - [`grid`], [`level`], [`unit`], [`terrain`] - the occupancy grid and units
//! - [`reachability`] - cells a unit can move to this turn
//! - [`pathfinding`] - shortest paths and budget truncation
//! - [`targeting`] - attack squares and nearest-unit queries
//! - [`behavior`] - per-unit decision strategies
//! - [`orchestrator`] - step-at-a-time turn execution
//! - [`data`] - RON scenario and terrain definitions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod components;
pub mod data;
pub mod error;
pub mod grid;
pub mod level;
pub mod orchestrator;
pub mod pathfinding;
pub mod reachability;
pub mod targeting;
pub mod terrain;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::behavior::{decide, Action, Behavior};
    pub use crate::components::*;
    pub use crate::data::{Placement, ScenarioData, TerrainTable, UnitData};
    pub use crate::error::{GameError, Result};
    pub use crate::grid::{Cell, DerivedSets, Grid};
    pub use crate::level::Level;
    pub use crate::orchestrator::{
        CombatOutcome, CombatResolver, HostState, OrchestratorState, Step, TickOutcome,
        TurnEvent, TurnOrchestrator,
    };
    pub use crate::pathfinding::{furthest_movement_on_path, get_path, path_cost, Passage};
    pub use crate::reachability::accessible;
    pub use crate::targeting::{
        cells_in_range, find_attacking_squares, find_nearest, threatened_cells, AttackOption,
        TieBreak,
    };
    pub use crate::terrain::{TileStats, TileType, IMPASSABLE};
    pub use crate::unit::{Ability, Buff, Stat, Unit, UnitArena};
}
