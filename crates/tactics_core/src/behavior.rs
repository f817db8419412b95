//! Decision strategies for computer-controlled units.
//!
//! The set of behaviors is closed, so dispatch is a plain `match` on the
//! tag. Each strategy reads the level and returns an [`Action`] value;
//! nothing here mutates state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{Position, UnitId};
use crate::level::Level;
use crate::pathfinding::{furthest_movement_on_path, get_path, Passage};
use crate::reachability::accessible;
use crate::targeting::{find_attacking_squares, find_nearest, TieBreak};
use crate::unit::Unit;

/// Strategy tag assigned to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// No strategy configured. Acting with this tag is a configuration
    /// warning and the unit stays put.
    #[default]
    None,
    /// Attack whatever is reachable, otherwise close in.
    Pursue,
    /// Attack only from the current cell.
    HoldPosition,
    /// Attack whatever is reachable, otherwise wait.
    RangedSkirmish,
    /// Close in on the nearest opponent without attacking.
    HitAndStepBack,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Pursue => "pursue",
            Self::HoldPosition => "hold-position",
            Self::RangedSkirmish => "ranged-skirmish",
            Self::HitAndStepBack => "hit-and-step-back",
        };
        f.write_str(name)
    }
}

/// What a unit decided to do: where to go and, optionally, whom to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Cell to move to (may be the current cell).
    pub destination: Position,
    /// Unit to attack after moving.
    pub target: Option<UnitId>,
}

impl Action {
    /// Stay in place and do nothing.
    #[must_use]
    pub const fn wait(position: Position) -> Self {
        Self {
            destination: position,
            target: None,
        }
    }

    /// Move without attacking.
    #[must_use]
    pub const fn move_to(destination: Position) -> Self {
        Self {
            destination,
            target: None,
        }
    }

    /// Move, then attack.
    #[must_use]
    pub const fn attack(destination: Position, target: UnitId) -> Self {
        Self {
            destination,
            target: Some(target),
        }
    }
}

/// Choose an action for `unit` according to its behavior tag.
#[must_use]
pub fn decide(level: &Level, unit: &Unit) -> Action {
    let action = match unit.behavior {
        Behavior::None => {
            tracing::warn!(
                unit = %unit.id,
                name = %unit.name,
                "Unit has no behavior configured; staying in place"
            );
            Action::wait(unit.position)
        }
        Behavior::Pursue => pursue(level, unit),
        Behavior::HoldPosition => hold_position(level, unit),
        Behavior::RangedSkirmish => ranged_skirmish(level, unit),
        Behavior::HitAndStepBack => advance(level, unit),
    };

    tracing::debug!(
        unit = %unit.id,
        behavior = %unit.behavior,
        destination = %action.destination,
        target = ?action.target,
        "Decided action"
    );
    action
}

fn pursue(level: &Level, unit: &Unit) -> Action {
    first_attack(level, unit).unwrap_or_else(|| advance(level, unit))
}

fn hold_position(level: &Level, unit: &Unit) -> Action {
    let reach = accessible(level, unit.position, unit.movement, unit.faction);
    find_attacking_squares(level, unit, &reach)
        .into_iter()
        .find(|option| option.destination == unit.position)
        .map_or_else(
            || Action::wait(unit.position),
            |option| Action::attack(option.destination, option.target),
        )
}

// Pursue without the advance: out of reach means holding still.
fn ranged_skirmish(level: &Level, unit: &Unit) -> Action {
    first_attack(level, unit).unwrap_or_else(|| Action::wait(unit.position))
}

fn first_attack(level: &Level, unit: &Unit) -> Option<Action> {
    let reach = accessible(level, unit.position, unit.movement, unit.faction);
    find_attacking_squares(level, unit, &reach)
        .first()
        .map(|option| Action::attack(option.destination, option.target))
}

/// Walk toward the nearest opponent as far as the budget allows.
fn advance(level: &Level, unit: &Unit) -> Action {
    let Some(nearest) = find_nearest(
        level,
        unit.position,
        |other| unit.is_hostile_to(other),
        TieBreak::PreferLower,
    )
    .and_then(|id| level.unit(id)) else {
        return Action::wait(unit.position);
    };

    let path = get_path(level, unit.position, nearest.position, Passage::IgnoreOccupancy);
    furthest_movement_on_path(level, &path, unit.movement)
        .map_or_else(|| Action::wait(unit.position), Action::move_to)
}
