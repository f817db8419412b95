//! Terrain classification and per-tile statistics.

use serde::{Deserialize, Serialize};

/// Movement cost used for impassable tiles.
///
/// Never added to a running total; searches skip impassable tiles before
/// reading their penalty.
pub const IMPASSABLE: u32 = u32::MAX;

/// Terrain kinds a cell can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Open ground.
    #[default]
    Floor,
    /// Solid wall; cannot be entered.
    Wall,
    /// Woods: slower, grants avoid.
    Forest,
    /// Bog: very slow.
    Swamp,
    /// Fortification: grants defense.
    Fort,
    /// Objective tile.
    Goal,
    /// Village.
    Village,
    /// Treasure chest.
    Chest,
    /// Reinforcement spawn point.
    Spawn,
}

/// Statistics attached to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStats {
    /// Cost to enter the tile (>= 1, or [`IMPASSABLE`]).
    pub penalty: u32,
    /// Avoid bonus for a unit standing here.
    #[serde(default)]
    pub avoid: i32,
    /// Defense bonus for a unit standing here.
    #[serde(default)]
    pub defense: i32,
}

impl TileType {
    /// All tile types, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Floor,
        Self::Wall,
        Self::Forest,
        Self::Swamp,
        Self::Fort,
        Self::Goal,
        Self::Village,
        Self::Chest,
        Self::Spawn,
    ];

    /// Built-in statistics for this tile type.
    #[must_use]
    pub const fn default_stats(self) -> TileStats {
        let (penalty, avoid, defense) = match self {
            Self::Floor | Self::Goal | Self::Chest | Self::Spawn => (1, 0, 0),
            Self::Wall => (IMPASSABLE, 0, 0),
            Self::Forest => (2, 20, 1),
            Self::Swamp => (3, 0, 0),
            Self::Fort => (1, 10, 2),
            Self::Village => (1, 10, 0),
        };
        TileStats {
            penalty,
            avoid,
            defense,
        }
    }

    /// Returns true if units may ever stand on this tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Single-character map code used by scenario rows and ASCII output.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Forest => 'f',
            Self::Swamp => '~',
            Self::Fort => 'F',
            Self::Goal => 'G',
            Self::Village => 'V',
            Self::Chest => 'C',
            Self::Spawn => 'S',
        }
    }

    /// Parse a map code produced by [`TileType::code`].
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|tile| tile.code() == code)
    }
}
