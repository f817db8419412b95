//! ASCII board renderer for terminal review.
//!
//! Terrain uses the map codes of [`TileType::code`]. Units are drawn with the
//! first letter of their name: uppercase for allies, lowercase for enemies.
//! Exhausted units are followed by `'`, fresh ones by a space.

use std::fmt::Write;

use tactics_core::prelude::*;

/// ASCII rendering configuration.
#[derive(Debug, Clone, Copy)]
pub struct AsciiConfig {
    /// Print the unit roster under the board.
    pub show_legend: bool,
    /// Shade the acting unit's movement range with `+`.
    pub show_reach: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_reach: false,
        }
    }
}

fn glyph(unit: &Unit) -> char {
    let letter = unit.name.chars().next().unwrap_or('?');
    match unit.faction {
        Faction::Ally => letter.to_ascii_uppercase(),
        Faction::Enemy => letter.to_ascii_lowercase(),
    }
}

/// Render the level as text.
#[must_use]
pub fn render_ascii(level: &Level, config: &AsciiConfig) -> String {
    let map = level.map();
    let reach = &map.derived().accessible;
    let mut out = String::new();

    let _ = write!(out, "   ");
    for col in 0..map.width() {
        let _ = write!(out, "{:<2}", col % 10);
    }
    out.push('\n');

    for row in 0..map.height() as i32 {
        let _ = write!(out, "{row:>2} ");
        for col in 0..map.width() as i32 {
            let pos = Position::new(col, row);
            match level.unit_at(pos) {
                Some(unit) => {
                    out.push(glyph(unit));
                    out.push(if unit.exhausted { '\'' } else { ' ' });
                }
                None => {
                    let code = if config.show_reach && reach.contains(&pos) {
                        '+'
                    } else {
                        map.get(pos).map_or('?', |cell| cell.tile.code())
                    };
                    out.push(code);
                    out.push(' ');
                }
            }
        }
        out.push('\n');
    }

    if config.show_legend {
        for unit in level.units() {
            let _ = writeln!(
                out,
                "  {} {:<12} {:<5} {:>3}/{:<3} at {}{}{}",
                glyph(unit),
                unit.name,
                unit.faction.name(),
                unit.health,
                unit.max_health,
                unit.position,
                if unit.leader { " [leader]" } else { "" },
                if unit.exhausted { " [done]" } else { "" },
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_layout() {
        let mut grid = Grid::new(3, 2);
        grid.set_tile(Position::new(1, 0), TileType::Wall, TileType::Wall.default_stats())
            .unwrap();
        let mut level = Level::new(grid);
        level
            .spawn(Unit::new("knight", Faction::Ally, 10, 3), Position::new(0, 1))
            .unwrap();
        let b = level
            .spawn(Unit::new("Brigand", Faction::Enemy, 10, 3), Position::new(2, 1))
            .unwrap();
        level.exhaust(b).unwrap();

        let text = render_ascii(
            &level,
            &AsciiConfig {
                show_legend: false,
                show_reach: false,
            },
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], " 0 . # . ");
        assert_eq!(lines[2], " 1 K . b'");
    }

    #[test]
    fn test_legend_lists_units() {
        let mut level = Level::new(Grid::new(2, 2));
        level
            .spawn(
                Unit::new("Lord", Faction::Ally, 20, 3).as_leader(),
                Position::new(0, 0),
            )
            .unwrap();
        let text = render_ascii(&level, &AsciiConfig::default());
        assert!(text.contains("Lord"));
        assert!(text.contains("[leader]"));
    }

    #[test]
    fn test_reach_shading() {
        let mut level = Level::new(Grid::new(3, 1));
        let id = level
            .spawn(Unit::new("Scout", Faction::Ally, 10, 1), Position::new(0, 0))
            .unwrap();
        level.refresh_derived(id).unwrap();
        let text = render_ascii(
            &level,
            &AsciiConfig {
                show_legend: false,
                show_reach: true,
            },
        );
        assert_eq!(text.lines().nth(1), Some(" 0 S + . "));
    }
}
