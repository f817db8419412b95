//! Data structures for scenario configuration.
//!
//! This module contains pure data structures describing terrain overrides,
//! unit definitions and unit placements. All structs are designed to be
//! deserialized from RON.
//!
//! **Note:** This module contains no IO - it only parses strings and builds
//! levels. Reading files is handled by `tactics_headless`.

mod scenario_data;
mod terrain_data;

pub use scenario_data::{Placement, ScenarioData, UnitData};
pub use terrain_data::TerrainTable;
