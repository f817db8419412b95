//! Scenario definitions: map rows, unit templates and placements.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::components::{Faction, Position, WeaponRange};
use crate::data::TerrainTable;
use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::level::Level;
use crate::terrain::TileType;
use crate::unit::{Ability, Unit};

/// Data-driven unit template.
///
/// Placements refer to templates by `id`, so one template can be placed
/// many times on either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique identifier referenced by placements.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Maximum health points.
    pub health: u32,

    /// Movement budget per turn.
    pub movement: u32,

    /// Weapon range.
    #[serde(default)]
    pub range: WeaponRange,

    /// Attack power.
    #[serde(default)]
    pub attack: u32,

    /// Defense.
    #[serde(default)]
    pub defense: u32,

    /// Support ability.
    #[serde(default)]
    pub ability: Ability,

    /// Default strategy, unless the placement overrides it.
    #[serde(default)]
    pub behavior: Behavior,
}

impl UnitData {
    /// Build a unit of `faction` from this template.
    pub fn instantiate(&self, faction: Faction) -> Result<Unit> {
        if self.range.min > self.range.max {
            return Err(GameError::Configuration(format!(
                "unit '{}' has range min {} above max {}",
                self.id, self.range.min, self.range.max
            )));
        }
        if self.health == 0 {
            return Err(GameError::Configuration(format!(
                "unit '{}' must start with positive health",
                self.id
            )));
        }

        let mut unit = Unit::new(self.name.clone(), faction, self.health, self.movement)
            .with_combat(self.attack, self.defense)
            .with_ability(self.ability)
            .with_behavior(self.behavior);
        unit.range = self.range;
        Ok(unit)
    }
}

/// A unit template placed on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Template id.
    pub unit: String,

    /// Side the unit fights for.
    pub faction: Faction,

    /// Starting cell.
    pub position: Position,

    /// Strategy override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,

    /// Losing this unit ends the game.
    #[serde(default)]
    pub leader: bool,
}

/// A complete battle description.
///
/// # Example RON
///
/// ```ron
/// ScenarioData(
///     name: "Ford",
///     map: [
///         "..f..",
///         ".~~..",
///         ".....",
///     ],
///     units: [
///         UnitData(id: "knight", name: "Knight", health: 20, movement: 4, attack: 7, defense: 4),
///         UnitData(id: "archer", name: "Archer", health: 14, movement: 4, range: (min: 2, max: 2), attack: 6, behavior: RangedSkirmish),
///     ],
///     placements: [
///         Placement(unit: "knight", faction: Ally, position: (col: 0, row: 2), leader: true),
///         Placement(unit: "archer", faction: Enemy, position: (col: 4, row: 0)),
///     ],
/// )
/// ```
///
/// Map rows use the codes of [`TileType::code`]; row 0 is the top row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: String,

    /// Terrain statistics overrides.
    #[serde(default)]
    pub terrain: TerrainTable,

    /// Map rows, top to bottom.
    pub map: Vec<String>,

    /// Unit templates.
    #[serde(default)]
    pub units: Vec<UnitData>,

    /// Units on the map at the start.
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl ScenarioData {
    /// Parse a scenario from RON.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Ok(ron::from_str(ron)?)
    }

    /// Serialize to pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            GameError::DataParse {
                message: e.to_string(),
            }
        })
    }

    /// Build the grid described by the map rows.
    pub fn build_grid(&self) -> Result<Grid> {
        self.terrain.validate()?;

        let height = self.map.len();
        let width = self.map.first().map_or(0, |row| row.chars().count());
        if width == 0 || height == 0 {
            return Err(GameError::Configuration(format!(
                "scenario '{}' has an empty map",
                self.name
            )));
        }

        let too_large = || GameError::Configuration("map dimensions overflow".into());
        let mut grid = Grid::new(
            u32::try_from(width).map_err(|_| too_large())?,
            u32::try_from(height).map_err(|_| too_large())?,
        );

        for (row, line) in self.map.iter().enumerate() {
            if line.chars().count() != width {
                return Err(GameError::Configuration(format!(
                    "map row {row} has {} cells, expected {width}",
                    line.chars().count()
                )));
            }
            for (col, code) in line.chars().enumerate() {
                let tile = TileType::from_code(code).ok_or_else(|| {
                    GameError::Configuration(format!(
                        "unknown tile code '{code}' at column {col}, row {row}"
                    ))
                })?;
                let pos = Position::new(
                    i32::try_from(col).map_err(|_| too_large())?,
                    i32::try_from(row).map_err(|_| too_large())?,
                );
                grid.set_tile(pos, tile, self.terrain.stats(tile))?;
            }
        }
        Ok(grid)
    }

    /// Build a validated level.
    pub fn build(&self) -> Result<Level> {
        let grid = self.build_grid()?;

        let mut templates: HashMap<&str, &UnitData> = HashMap::with_capacity(self.units.len());
        for data in &self.units {
            if templates.insert(data.id.as_str(), data).is_some() {
                return Err(GameError::Configuration(format!(
                    "duplicate unit id '{}'",
                    data.id
                )));
            }
        }

        let mut units = Vec::with_capacity(self.placements.len());
        for placement in &self.placements {
            let data = templates.get(placement.unit.as_str()).ok_or_else(|| {
                GameError::Configuration(format!(
                    "placement at {} references unknown unit '{}'",
                    placement.position, placement.unit
                ))
            })?;
            let mut unit = data.instantiate(placement.faction)?;
            if let Some(behavior) = placement.behavior {
                unit.behavior = behavior;
            }
            unit.leader = placement.leader;
            unit.position = placement.position;
            units.push(unit);
        }

        let level = Level::from_parts(grid, units)?;
        tracing::debug!(
            scenario = %self.name,
            width = level.map().width(),
            height = level.map().height(),
            units = level.units().count(),
            "Scenario built"
        );
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORD: &str = r#"
ScenarioData(
    name: "Ford",
    map: [
        "..f..",
        ".~~..",
        ".....",
    ],
    units: [
        UnitData(id: "knight", name: "Knight", health: 20, movement: 4, attack: 7, defense: 4),
        UnitData(id: "archer", name: "Archer", health: 14, movement: 4, range: (min: 2, max: 2), attack: 6, behavior: RangedSkirmish),
    ],
    placements: [
        Placement(unit: "knight", faction: Ally, position: (col: 0, row: 2), leader: true),
        Placement(unit: "archer", faction: Enemy, position: (col: 4, row: 0)),
        Placement(unit: "knight", faction: Enemy, position: (col: 4, row: 2), behavior: Some(Pursue)),
    ],
)
"#;

    #[test]
    fn test_build_ford() {
        let scenario = ScenarioData::from_ron_str(FORD).unwrap();
        let level = scenario.build().unwrap();

        assert_eq!(level.map().width(), 5);
        assert_eq!(level.map().height(), 3);
        assert_eq!(level.terrain_at(Position::new(2, 0)).unwrap(), 2);
        assert_eq!(level.terrain_at(Position::new(1, 1)).unwrap(), 3);

        let knight = level.unit_at(Position::new(0, 2)).unwrap();
        assert_eq!(knight.faction, Faction::Ally);
        assert!(knight.leader);

        let archer = level.unit_at(Position::new(4, 0)).unwrap();
        assert_eq!(archer.range, WeaponRange::new(2, 2));
        assert_eq!(archer.behavior, Behavior::RangedSkirmish);

        let raider = level.unit_at(Position::new(4, 2)).unwrap();
        assert_eq!(raider.faction, Faction::Enemy);
        assert_eq!(raider.behavior, Behavior::Pursue);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut scenario = ScenarioData::from_ron_str(FORD).unwrap();
        scenario.map[1].push('.');
        assert!(matches!(scenario.build(), Err(GameError::Configuration(_))));
    }

    #[test]
    fn test_unknown_tile_code_rejected() {
        let mut scenario = ScenarioData::from_ron_str(FORD).unwrap();
        scenario.map[0] = "..?..".into();
        assert!(matches!(scenario.build(), Err(GameError::Configuration(_))));
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let mut scenario = ScenarioData::from_ron_str(FORD).unwrap();
        scenario.placements[0].unit = "dragon".into();
        assert!(matches!(scenario.build(), Err(GameError::Configuration(_))));
    }

    #[test]
    fn test_unit_on_wall_rejected() {
        let mut scenario = ScenarioData::from_ron_str(FORD).unwrap();
        scenario.map[2] = "#....".into();
        assert!(matches!(scenario.build(), Err(GameError::Configuration(_))));
    }

    #[test]
    fn test_ron_round_trip_preserves_scenario() {
        let scenario = ScenarioData::from_ron_str(FORD).unwrap();
        let text = scenario.to_ron_string().unwrap();
        assert_eq!(ScenarioData::from_ron_str(&text).unwrap(), scenario);
    }
}
