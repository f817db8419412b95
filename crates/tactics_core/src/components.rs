//! Small value types shared by every module: positions, factions, unit ids
//! and weapon ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A grid coordinate.
///
/// Ordered by column, then row. Every position set in the crate is a
/// `BTreeSet<Position>`, so this ordering is also the enumeration order
/// callers observe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Column (x).
    pub col: i32,
    /// Row (y).
    pub row: i32,
}

impl Position {
    /// Create a position from a column and row.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance between two positions.
    ///
    /// This is the only distance metric the engine uses, for movement
    /// heuristics and weapon range alike.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// Position offset by the given delta.
    #[must_use]
    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        Self {
            col: self.col + dcol,
            row: self.row + drow,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl From<(i32, i32)> for Position {
    fn from((col, row): (i32, i32)) -> Self {
        Self::new(col, row)
    }
}

/// Side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Player-controlled side.
    Ally,
    /// Computer-controlled side.
    Enemy,
}

impl Faction {
    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }

    /// Display name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ally => "Ally",
            Self::Enemy => "Enemy",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a unit in the level's [`UnitArena`](crate::unit::UnitArena).
///
/// Cells store this instead of a reference, so removing a unit can never
/// leave a dangling occupant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Arena slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inclusive weapon range in Manhattan distance.
///
/// A `min` above 1 describes weapons that cannot strike adjacent cells
/// (bows and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponRange {
    /// Minimum distance.
    pub min: u32,
    /// Maximum distance.
    pub max: u32,
}

impl WeaponRange {
    /// Adjacent-only melee range.
    pub const MELEE: Self = Self { min: 1, max: 1 };

    /// Create a new range.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        assert!(min <= max, "WeaponRange min must not exceed max");
        Self { min, max }
    }

    /// Whether `distance` falls inside the range.
    #[must_use]
    pub const fn contains(self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

impl Default for WeaponRange {
    fn default() -> Self {
        Self::MELEE
    }
}
