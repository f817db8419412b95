//! Targeting queries: which reachable cells can strike whom, which cells a
//! unit threatens, and the nearest unit matching a predicate.
//!
//! # Ordering
//!
//! Behaviors take the first candidate they are given, so the order of
//! results here is the tie-break policy:
//!
//! - attack candidates follow the reachable set's ascending (column, row)
//!   order, then ascending target [`UnitId`];
//! - [`find_nearest`] breaks distance ties on [`UnitId`] as selected by
//!   [`TieBreak`].

use std::collections::BTreeSet;

use crate::components::{Position, UnitId, WeaponRange};
use crate::level::Level;
use crate::unit::Unit;

/// A cell to move to and the unit to attack from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttackOption {
    /// Where the attacker stands.
    pub destination: Position,
    /// Who it attacks.
    pub target: UnitId,
}

/// How [`find_nearest`] resolves equal distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The lowest unit id wins.
    #[default]
    PreferLower,
    /// The highest unit id wins.
    PreferHigher,
}

/// In-bounds cells whose distance from `origin` lies within `range`.
#[must_use]
pub fn cells_in_range(level: &Level, origin: Position, range: WeaponRange) -> BTreeSet<Position> {
    let map = level.map();
    let width = i32::try_from(map.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(map.height()).unwrap_or(i32::MAX);
    let reach = i32::try_from(range.max).unwrap_or(i32::MAX);

    // Only offsets that land on the grid are scanned.
    let mut cells = BTreeSet::new();
    let first_col = (-reach).max(origin.col.saturating_neg());
    let last_col = reach.min(width.saturating_sub(1).saturating_sub(origin.col));
    for dcol in first_col..=last_col {
        let span = reach - dcol.abs();
        let first_row = (-span).max(origin.row.saturating_neg());
        let last_row = span.min(height.saturating_sub(1).saturating_sub(origin.row));
        for drow in first_row..=last_row {
            let cell = origin.offset(dcol, drow);
            if level.map().in_bounds(cell) && range.contains(origin.distance(cell)) {
                cells.insert(cell);
            }
        }
    }
    cells
}

/// Every cell `unit` could strike after moving to any cell of `reachable`.
#[must_use]
pub fn threatened_cells(
    level: &Level,
    unit: &Unit,
    reachable: &BTreeSet<Position>,
) -> BTreeSet<Position> {
    reachable
        .iter()
        .flat_map(|&from| cells_in_range(level, from, unit.range))
        .collect()
}

/// Every (destination, target) pair from which `unit` can attack an
/// opposing unit, in the documented order. Empty when nothing is in range.
#[must_use]
pub fn find_attacking_squares(
    level: &Level,
    unit: &Unit,
    reachable: &BTreeSet<Position>,
) -> Vec<AttackOption> {
    let opponents: Vec<&Unit> = level
        .units()
        .filter(|other| other.is_alive() && unit.is_hostile_to(other))
        .collect();

    let mut options = Vec::new();
    for &destination in reachable {
        for target in &opponents {
            if unit.range.contains(destination.distance(target.position)) {
                options.push(AttackOption {
                    destination,
                    target: target.id,
                });
            }
        }
    }
    options
}

/// Closest living unit to `origin` satisfying `predicate`.
#[must_use]
pub fn find_nearest<P>(
    level: &Level,
    origin: Position,
    predicate: P,
    tie_break: TieBreak,
) -> Option<UnitId>
where
    P: Fn(&Unit) -> bool,
{
    let mut best: Option<(u32, UnitId)> = None;
    for unit in level.units().filter(|u| u.is_alive() && predicate(u)) {
        let distance = origin.distance(unit.position);
        let replace = match best {
            None => true,
            Some((best_distance, _)) => match tie_break {
                TieBreak::PreferLower => distance < best_distance,
                TieBreak::PreferHigher => distance <= best_distance,
            },
        };
        if replace {
            best = Some((distance, unit.id));
        }
    }
    best.map(|(_, id)| id)
}
