//! Movement range: every cell a unit can end its move on this turn.

use std::collections::BTreeSet;

use crate::components::{Faction, Position};
use crate::level::Level;
use crate::pathfinding::{search, Passage};

/// Cells reachable from `origin` within `movement` points.
///
/// Units of `faction` can be walked through; units of the other faction
/// block like walls. Occupied cells are never destinations, but the origin
/// is always part of the result, even with a zero budget.
#[must_use]
pub fn accessible(
    level: &Level,
    origin: Position,
    movement: u32,
    faction: Faction,
) -> BTreeSet<Position> {
    let tree = search(
        level,
        origin,
        Passage::RespectOccupancy(faction),
        Some(movement),
        None,
    );

    let mut reach: BTreeSet<Position> = tree
        .cost
        .into_keys()
        .filter(|pos| level.unit_at(*pos).is_none())
        .collect();
    reach.insert(origin);
    reach
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::terrain::TileType;
    use crate::unit::Unit;

    fn pos(col: i32, row: i32) -> Position {
        Position::new(col, row)
    }

    #[test]
    fn test_diamond_on_open_floor() {
        let level = Level::new(Grid::new(5, 5));
        let reach = accessible(&level, pos(2, 2), 2, Faction::Ally);

        assert_eq!(reach.len(), 13);
        for cell in &reach {
            assert!(cell.distance(pos(2, 2)) <= 2);
        }
    }

    #[test]
    fn test_zero_budget_contains_only_origin() {
        let level = Level::new(Grid::new(3, 3));
        let reach = accessible(&level, pos(1, 1), 0, Faction::Enemy);
        assert_eq!(reach.into_iter().collect::<Vec<_>>(), vec![pos(1, 1)]);
    }

    #[test]
    fn test_origin_included_even_when_occupied_by_mover() {
        let mut level = Level::new(Grid::new(3, 3));
        level
            .spawn(Unit::new("Mover", Faction::Ally, 10, 1), pos(0, 0))
            .unwrap();
        let reach = accessible(&level, pos(0, 0), 1, Faction::Ally);
        assert_eq!(reach.len(), 3);
        assert!(reach.contains(&pos(0, 0)));
    }

    #[test]
    fn test_terrain_penalties_shrink_range() {
        let mut grid = Grid::new(1, 4);
        grid.set_tile(pos(0, 1), TileType::Forest, TileType::Forest.default_stats())
            .unwrap();
        let level = Level::new(grid);

        let reach = accessible(&level, pos(0, 0), 2, Faction::Ally);
        assert_eq!(reach.into_iter().collect::<Vec<_>>(), vec![pos(0, 0), pos(0, 1)]);
    }

    #[test]
    fn test_enemies_block_but_friends_are_passable() {
        let mut level = Level::new(Grid::new(1, 5));
        level
            .spawn(Unit::new("Mover", Faction::Ally, 10, 4), pos(0, 0))
            .unwrap();
        level
            .spawn(Unit::new("Friend", Faction::Ally, 10, 4), pos(0, 1))
            .unwrap();
        level
            .spawn(Unit::new("Foe", Faction::Enemy, 10, 4), pos(0, 3))
            .unwrap();

        let reach = accessible(&level, pos(0, 0), 4, Faction::Ally);
        assert_eq!(reach.into_iter().collect::<Vec<_>>(), vec![pos(0, 0), pos(0, 2)]);
    }

    #[test]
    fn test_walls_are_never_reachable() {
        let mut grid = Grid::new(3, 1);
        grid.set_tile(pos(1, 0), TileType::Wall, TileType::Wall.default_stats())
            .unwrap();
        let level = Level::new(grid);
        let reach = accessible(&level, pos(0, 0), 10, Faction::Ally);
        assert_eq!(reach.len(), 1);
    }
}
