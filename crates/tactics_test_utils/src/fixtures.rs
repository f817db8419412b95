//! Test fixtures and helpers.
//!
//! Pre-built levels, unit templates and a predictable combat resolver for
//! consistent testing.

use tactics_core::prelude::*;

/// Shorthand for [`Position::new`].
#[must_use]
pub const fn pos(col: i32, row: i32) -> Position {
    Position::new(col, row)
}

/// An all-floor level with no units.
#[must_use]
pub fn open_level(width: u32, height: u32) -> Level {
    Level::new(Grid::new(width, height))
}

/// A unit-free level drawn from map rows (see [`TileType::code`]).
///
/// # Panics
///
/// Panics if the rows are ragged or contain unknown codes.
#[must_use]
pub fn level_from_rows(rows: &[&str]) -> Level {
    let scenario = ScenarioData {
        name: "fixture".into(),
        description: String::new(),
        terrain: TerrainTable::default(),
        map: rows.iter().map(|row| (*row).to_string()).collect(),
        units: Vec::new(),
        placements: Vec::new(),
    };
    Level::new(scenario.build_grid().expect("fixture map rows must be valid"))
}

/// Melee unit that chases the nearest opponent.
#[must_use]
pub fn soldier(name: &str, faction: Faction, movement: u32) -> Unit {
    Unit::new(name, faction, 20, movement)
        .with_combat(6, 2)
        .with_behavior(Behavior::Pursue)
}

/// Bow user: cannot strike adjacent cells, never advances.
#[must_use]
pub fn archer(name: &str, faction: Faction) -> Unit {
    Unit::new(name, faction, 14, 4)
        .with_range(2, 2)
        .with_combat(5, 1)
        .with_behavior(Behavior::RangedSkirmish)
}

/// Stationary defender.
#[must_use]
pub fn guard(name: &str, faction: Faction) -> Unit {
    Unit::new(name, faction, 25, 3)
        .with_combat(5, 4)
        .with_behavior(Behavior::HoldPosition)
}

/// Small two-sided battle used by integration and determinism tests.
///
/// ```text
/// . . . f . . . .
/// . A . f . ~ . E
/// . . . . . ~ . .
/// . L . # # . . E
/// . . . . . . . .
/// . A . f . . . E
/// ```
///
/// `L` is the ally leader, `A` ally soldiers, `E` enemy raiders.
#[must_use]
pub fn skirmish_level() -> Level {
    let mut level = level_from_rows(&[
        "...f....", //
        "...f.~..",
        ".....~..",
        "...##...",
        "........",
        "...f....",
    ]);
    let spawns = [
        (soldier("Lord", Faction::Ally, 4).as_leader(), pos(1, 3)),
        (soldier("Lancer", Faction::Ally, 5), pos(1, 1)),
        (archer("Bowman", Faction::Ally), pos(1, 5)),
        (soldier("Raider", Faction::Enemy, 5), pos(7, 1)),
        (guard("Sentry", Faction::Enemy), pos(7, 3)),
        (archer("Hunter", Faction::Enemy), pos(7, 5)),
    ];
    for (unit, at) in spawns {
        level.spawn(unit, at).expect("fixture spawn must be legal");
    }
    level
}

/// Combat resolver that deals a fixed amount to the defender and never
/// counter-attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDamage {
    /// Damage per attack.
    pub amount: u32,
    /// Attacks resolved so far.
    pub resolved: u32,
}

impl FixedDamage {
    /// Resolver dealing `amount` per attack.
    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self {
            amount,
            resolved: 0,
        }
    }
}

impl CombatResolver for FixedDamage {
    fn resolve(&mut self, level: &Level, attacker: UnitId, defender: Position) -> CombatOutcome {
        self.resolved += 1;
        CombatOutcome {
            attacker_health: level.unit(attacker).map_or(0, |u| u.health),
            defender_health: level
                .unit_at(defender)
                .map_or(0, |u| u.health.saturating_sub(self.amount)),
        }
    }
}

/// Check that every unit's position and the grid agree.
///
/// # Panics
///
/// Panics with a description of the first disagreement found.
pub fn assert_occupancy_consistent(level: &Level) {
    for unit in level.units() {
        assert_eq!(
            level.occupant_at(unit.position).expect("unit must be in bounds"),
            Some(unit.id),
            "unit {} at {} is not recorded by its cell",
            unit.id,
            unit.position
        );
    }
    let occupied = level
        .map()
        .positions()
        .filter(|p| level.occupant_at(*p).ok().flatten().is_some())
        .count();
    assert_eq!(
        occupied,
        level.units().count(),
        "grid records more occupants than there are units"
    );
}
