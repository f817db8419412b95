//! Per-tile statistics overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::terrain::{TileStats, TileType};

/// Tile statistics, falling back to [`TileType::default_stats`] for any
/// tile type without an override.
///
/// # Example RON
///
/// ```ron
/// TerrainTable(
///     overrides: {
///         Forest: TileStats(penalty: 2, avoid: 30, defense: 1),
///         Swamp: TileStats(penalty: 4),
///     },
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTable {
    /// Replacement statistics keyed by tile type.
    #[serde(default)]
    pub overrides: HashMap<TileType, TileStats>,
}

impl TerrainTable {
    /// Parse a table from RON.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let table: Self = ron::from_str(ron)?;
        table.validate()?;
        Ok(table)
    }

    /// Statistics for `tile`.
    #[must_use]
    pub fn stats(&self, tile: TileType) -> TileStats {
        self.overrides
            .get(&tile)
            .copied()
            .unwrap_or_else(|| tile.default_stats())
    }

    /// Check that every walkable tile costs at least one point to enter.
    pub fn validate(&self) -> Result<()> {
        for tile in TileType::ALL {
            let stats = self.stats(tile);
            if tile.is_walkable() && stats.penalty == 0 {
                return Err(GameError::Configuration(format!(
                    "tile {tile:?} must cost at least 1 to enter"
                )));
            }
        }
        Ok(())
    }
}
