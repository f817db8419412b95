//! Grid-based shortest-path search.
//!
//! Terrain penalties vary per cell, so both path queries and the
//! reachability engine run Dijkstra over non-negative integer costs. The
//! open set is ordered by (cost, discovery sequence) and a node's
//! predecessor is only replaced by a strictly cheaper route. Together with
//! the fixed neighbour order (up, down, left, right) this makes the chosen
//! path among equal-cost candidates fully deterministic.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::components::{Faction, Position};
use crate::level::Level;

/// Which cells a search may step into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passage {
    /// Terrain and occupancy: cells held by another faction are walls.
    RespectOccupancy(Faction),
    /// Terrain only. Used to plan toward a unit the mover cannot yet
    /// legally stand next to.
    IgnoreOccupancy,
}

/// Cost of stepping into `pos`, or `None` if the step is not allowed.
pub(crate) fn entry_cost(level: &Level, pos: Position, passage: Passage) -> Option<u32> {
    let cell = level.map().get(pos)?;
    let cost = cell.movement_cost()?;
    match passage {
        Passage::IgnoreOccupancy => Some(cost),
        Passage::RespectOccupancy(faction) => match level.unit_at(pos) {
            Some(unit) if unit.faction != faction => None,
            _ => Some(cost),
        },
    }
}

/// Result of a Dijkstra expansion.
#[derive(Debug, Default)]
pub(crate) struct SearchTree {
    /// Cheapest known cost to each settled or frontier cell.
    pub cost: HashMap<Position, u32>,
    /// Predecessor on the cheapest route.
    pub came_from: HashMap<Position, Position>,
}

/// Expand from `start`, never extending a route beyond `budget`, stopping
/// early once `goal` is settled.
pub(crate) fn search(
    level: &Level,
    start: Position,
    passage: Passage,
    budget: Option<u32>,
    goal: Option<Position>,
) -> SearchTree {
    let mut tree = SearchTree::default();
    let mut open: BinaryHeap<Reverse<(u32, u64, Position)>> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    tree.cost.insert(start, 0);
    open.push(Reverse((0, sequence, start)));

    while let Some(Reverse((cost, _, current))) = open.pop() {
        if tree.cost.get(&current).is_some_and(|&best| cost > best) {
            continue;
        }
        if Some(current) == goal {
            break;
        }

        for next in level.map().neighbors(current) {
            let Some(step) = entry_cost(level, next, passage) else {
                continue;
            };
            let total = cost.saturating_add(step);
            if budget.is_some_and(|limit| total > limit) {
                continue;
            }
            if total < tree.cost.get(&next).copied().unwrap_or(u32::MAX) {
                tree.cost.insert(next, total);
                tree.came_from.insert(next, current);
                sequence += 1;
                open.push(Reverse((total, sequence, next)));
            }
        }
    }

    tracing::trace!(
        %start,
        visited = tree.cost.len(),
        "Search expanded"
    );
    tree
}

/// Shortest path from `start` to `goal`, inclusive of both ends.
///
/// Returns `[start]` when `start == goal` and an empty path when the goal
/// cannot be reached (or either end is out of bounds).
#[must_use]
pub fn get_path(level: &Level, start: Position, goal: Position, passage: Passage) -> Vec<Position> {
    if !level.map().in_bounds(start) || !level.map().in_bounds(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let tree = search(level, start, passage, None, Some(goal));
    if !tree.came_from.contains_key(&goal) {
        return Vec::new();
    }

    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = tree.came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Total entry cost of walking `path` from its first cell.
#[must_use]
pub fn path_cost(level: &Level, path: &[Position]) -> Option<u32> {
    path.iter().skip(1).try_fold(0u32, |total, &pos| {
        level
            .map()
            .movement_cost(pos)
            .map(|cost| total.saturating_add(cost))
    })
}

/// Furthest cell along `path` reachable with `movement` points.
///
/// Walks from the path's first cell accumulating entry costs. The result is
/// always a cell of the path. It is the start itself when even the first
/// step is unaffordable. The walk passes through units of the mover's
/// faction but never stops on an occupied cell. A unit of another faction
/// ends the walk. Returns `None` only for an empty path.
#[must_use]
pub fn furthest_movement_on_path(
    level: &Level,
    path: &[Position],
    movement: u32,
) -> Option<Position> {
    let (&start, rest) = path.split_first()?;
    let mover = level.unit_at(start).map(|unit| (unit.id, unit.faction));

    let mut spent: u32 = 0;
    let mut furthest = start;
    for &step in rest {
        let Some(cost) = level.map().movement_cost(step) else {
            break;
        };
        spent = spent.saturating_add(cost);
        if spent > movement {
            break;
        }
        match level.unit_at(step) {
            None => furthest = step,
            Some(unit) if mover.is_some_and(|(id, _)| id == unit.id) => furthest = step,
            Some(unit) if mover.is_some_and(|(_, faction)| faction == unit.faction) => {}
            Some(_) => break,
        }
    }
    Some(furthest)
}
