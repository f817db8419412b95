//! A level: the grid plus the units standing on it.
//!
//! Every occupancy change goes through this type so the cell/unit position
//! invariant holds after each call. Validation happens before the first
//! write, so a failed call leaves the level untouched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::{Faction, Position, UnitId};
use crate::error::{GameError, Result};
use crate::grid::{DerivedSets, Grid};
use crate::reachability::accessible;
use crate::targeting::{cells_in_range, threatened_cells};
use crate::unit::{Unit, UnitArena};

/// Grid and units of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    map: Grid,
    units: UnitArena,
    leader: Option<UnitId>,
}

impl Level {
    /// Create a level with no units.
    #[must_use]
    pub fn new(map: Grid) -> Self {
        Self {
            map,
            units: UnitArena::new(),
            leader: None,
        }
    }

    /// Assemble a level from a loaded grid and a unit list.
    ///
    /// Each unit is placed at its recorded position. Any disagreement between
    /// the grid's occupants and the units' positions, or two units sharing
    /// a cell, is a configuration error.
    pub fn from_parts(map: Grid, units: Vec<Unit>) -> Result<Self> {
        let mut claimed: Vec<(Position, UnitId)> = Vec::with_capacity(units.len());
        for (index, unit) in units.iter().enumerate() {
            let id = UnitId(u32::try_from(index).map_err(|_| {
                GameError::Configuration("too many units for one level".into())
            })?);
            let cell = map.cell(unit.position).map_err(|e| {
                GameError::Configuration(format!("unit '{}' is misplaced: {e}", unit.name))
            })?;
            if cell.movement_cost().is_none() {
                return Err(GameError::Configuration(format!(
                    "unit '{}' stands on impassable cell {}",
                    unit.name, unit.position
                )));
            }
            if let Some(&(_, other)) = claimed.iter().find(|(pos, _)| *pos == unit.position) {
                return Err(GameError::Configuration(format!(
                    "unit '{}' shares cell {} with unit {other}",
                    unit.name, unit.position
                )));
            }
            claimed.push((unit.position, id));
        }

        for pos in map.positions() {
            let Some(recorded) = map.get(pos).and_then(|cell| cell.occupant()) else {
                continue;
            };
            let expected = claimed.iter().find(|(p, _)| *p == pos).map(|(_, id)| *id);
            if expected != Some(recorded) {
                return Err(GameError::Configuration(format!(
                    "cell {pos} references unit {recorded} but no unit is recorded there"
                )));
            }
        }

        let mut level = Self::new(map);
        for unit in units {
            let position = unit.position;
            let leader = unit.leader;
            let id = level.units.insert(unit);
            level.map.set_occupant(position, Some(id))?;
            if leader {
                level.leader = Some(id);
            }
        }
        Ok(level)
    }

    /// The grid.
    #[must_use]
    pub const fn map(&self) -> &Grid {
        &self.map
    }

    /// Movement cost of a cell.
    ///
    /// Impassable cells report [`IMPASSABLE`](crate::terrain::IMPASSABLE).
    pub fn terrain_at(&self, pos: Position) -> Result<u32> {
        Ok(self.map.cell(pos)?.stats.penalty)
    }

    /// Unit standing on a cell.
    pub fn occupant_at(&self, pos: Position) -> Result<Option<UnitId>> {
        Ok(self.map.cell(pos)?.occupant())
    }

    /// Unit occupying `pos`, or `None` when empty or out of bounds.
    #[must_use]
    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.map
            .get(pos)
            .and_then(|cell| cell.occupant())
            .and_then(|id| self.units.get(id))
    }

    /// Look up a living unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Living units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Living units of one faction in ascending id order.
    pub fn faction_units(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |unit| unit.faction == faction)
    }

    /// Insert a new unit into the level at `pos`.
    pub fn spawn(&mut self, mut unit: Unit, pos: Position) -> Result<UnitId> {
        self.check_enterable(pos, None)?;
        unit.position = pos;
        let leader = unit.leader;
        let id = self.units.insert(unit);
        self.map.set_occupant(pos, Some(id))?;
        if leader {
            self.leader = Some(id);
        }
        self.map.clear_derived();
        Ok(id)
    }

    /// Move an existing unit to `pos`.
    ///
    /// Placing a unit on the cell it already occupies is a no-op.
    pub fn place(&mut self, id: UnitId, pos: Position) -> Result<()> {
        let from = self.units.get(id).ok_or(GameError::UnitNotFound(id))?.position;
        self.check_enterable(pos, Some(id))?;

        self.map.set_occupant(from, None)?;
        self.map.set_occupant(pos, Some(id))?;
        if let Some(unit) = self.units.get_mut(id) {
            unit.position = pos;
        }
        self.map.clear_derived();
        Ok(())
    }

    /// Take the unit on `pos` off the grid and out of the level.
    pub fn remove(&mut self, pos: Position) -> Result<Option<Unit>> {
        let Some(id) = self.map.cell(pos)?.occupant() else {
            return Ok(None);
        };
        self.map.set_occupant(pos, None)?;
        self.map.clear_derived();
        Ok(self.units.remove(id))
    }

    fn check_enterable(&self, pos: Position, mover: Option<UnitId>) -> Result<()> {
        let cell = self.map.cell(pos)?;
        if cell.movement_cost().is_none() {
            return Err(GameError::Impassable(pos));
        }
        match cell.occupant() {
            Some(occupant) if Some(occupant) != mover => Err(GameError::OccupiedCell {
                position: pos,
                occupant,
            }),
            _ => Ok(()),
        }
    }

    /// Set a unit's health (clamped to its maximum).
    pub fn set_health(&mut self, id: UnitId, health: u32) -> Result<()> {
        self.units
            .get_mut(id)
            .ok_or(GameError::UnitNotFound(id))?
            .set_health(health);
        Ok(())
    }

    /// Mark a unit as having acted this turn.
    pub fn exhaust(&mut self, id: UnitId) -> Result<()> {
        self.units
            .get_mut(id)
            .ok_or(GameError::UnitNotFound(id))?
            .deactivate();
        Ok(())
    }

    /// Remove every unit at zero health, returning them in id order.
    pub fn remove_dead_units(&mut self) -> Vec<Unit> {
        let fallen: Vec<Position> = self
            .units
            .iter()
            .filter(|unit| !unit.is_alive())
            .map(|unit| unit.position)
            .collect();

        fallen
            .into_iter()
            .filter_map(|pos| self.remove(pos).ok().flatten())
            .collect()
    }

    /// Whether the level's leader has died.
    #[must_use]
    pub fn leader_fallen(&self) -> bool {
        self.leader
            .is_some_and(|id| self.units.get(id).map_or(true, |unit| !unit.is_alive()))
    }

    /// Whether any unit of `faction` can still act this turn.
    #[must_use]
    pub fn has_remaining_actors(&self, faction: Faction) -> bool {
        self.faction_units(faction).any(|unit| !unit.exhausted)
    }

    /// Start a side's turn: refresh its units and count down their buffs.
    pub fn begin_faction_turn(&mut self, faction: Faction) {
        for unit in self.units.iter_mut().filter(|u| u.faction == faction) {
            unit.activate();
            unit.tick_buff();
        }
        tracing::debug!(%faction, "Faction turn started");
    }

    /// First free spawn tile, scanning columns left to right.
    #[must_use]
    pub fn next_spawn_location(&self) -> Option<Position> {
        let width = self.map.width() as i32;
        let height = self.map.height() as i32;
        (0..width)
            .flat_map(|col| (0..height).map(move |row| Position::new(col, row)))
            .find(|pos| {
                self.map.get(*pos).is_some_and(|cell| {
                    cell.tile == crate::terrain::TileType::Spawn && cell.occupant().is_none()
                })
            })
    }

    /// Recompute the cached derived sets for `id`.
    pub fn refresh_derived(&mut self, id: UnitId) -> Result<()> {
        let unit = self.units.get(id).ok_or(GameError::UnitNotFound(id))?;
        let reach = accessible(self, unit.position, unit.movement, unit.faction);
        let attackable = threatened_cells(self, unit, &reach);
        let ability_range = unit
            .ability
            .range()
            .map_or_else(BTreeSet::new, |range| cells_in_range(self, unit.position, range));
        let vis_range = accessible(
            self,
            unit.position,
            unit.movement.saturating_mul(2),
            unit.faction,
        );

        self.map.set_derived(DerivedSets {
            actor: Some(id),
            accessible: reach,
            attackable,
            ability_range,
            vis_range,
        });
        Ok(())
    }

    /// Drop the cached derived sets.
    pub fn clear_derived(&mut self) {
        self.map.clear_derived();
    }
}
