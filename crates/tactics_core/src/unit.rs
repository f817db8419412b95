//! Units and the arena that owns them.
//!
//! The grid never owns units. Cells hold a [`UnitId`] into the
//! [`UnitArena`]; the arena hands out ids sequentially and never reuses a
//! slot, so an id held after the unit died simply resolves to `None`.

use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::components::{Faction, Position, UnitId, WeaponRange};

/// Support ability a unit can use on neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ability {
    /// No ability.
    #[default]
    None,
    /// Restore health.
    Heal,
    /// Temporarily raise a stat.
    Buff,
    /// Temporarily raise defense.
    Shield,
    /// Refresh an exhausted ally.
    Dance,
}

impl Ability {
    /// Range at which the ability can be used.
    #[must_use]
    pub const fn range(self) -> Option<WeaponRange> {
        match self {
            Self::None => None,
            Self::Heal | Self::Buff | Self::Shield | Self::Dance => Some(WeaponRange::MELEE),
        }
    }
}

/// Stat affected by a [`Buff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Attack power.
    Attack,
    /// Damage reduction.
    Defense,
    /// Ability power.
    Aptitude,
    /// Speed.
    Speed,
}

/// Temporary stat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    /// Stat modified.
    pub stat: Stat,
    /// Amount added to the stat.
    pub amount: i32,
    /// Owning-side turns left before the buff expires.
    pub turns_remaining: u32,
}

/// A combatant on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Arena identifier, assigned on insertion.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Allegiance.
    pub faction: Faction,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Movement budget per turn.
    pub movement: u32,
    /// Weapon range.
    pub range: WeaponRange,
    /// Attack power (read by combat resolvers only).
    pub attack: u32,
    /// Defense (read by combat resolvers only).
    pub defense: u32,
    /// Support ability.
    pub ability: Ability,
    /// Strategy used when the unit is not player-controlled.
    pub behavior: Behavior,
    /// Current position. Must agree with the cell that references this unit.
    pub position: Position,
    /// Has already acted this turn.
    pub exhausted: bool,
    /// Losing this unit ends the game.
    pub leader: bool,
    /// Active buff, if any.
    pub buff: Option<Buff>,
}

impl Unit {
    /// Create a unit at full health with default stats.
    ///
    /// The id is a placeholder until the unit is inserted into a
    /// [`UnitArena`].
    #[must_use]
    pub fn new(name: impl Into<String>, faction: Faction, max_health: u32, movement: u32) -> Self {
        Self {
            id: UnitId(u32::MAX),
            name: name.into(),
            faction,
            health: max_health,
            max_health,
            movement,
            range: WeaponRange::MELEE,
            attack: 0,
            defense: 0,
            ability: Ability::None,
            behavior: Behavior::None,
            position: Position::default(),
            exhausted: false,
            leader: false,
            buff: None,
        }
    }

    /// Builder: set weapon range.
    #[must_use]
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.range = WeaponRange::new(min, max);
        self
    }

    /// Builder: set behavior tag.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Builder: set attack and defense.
    #[must_use]
    pub fn with_combat(mut self, attack: u32, defense: u32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    /// Builder: set support ability.
    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = ability;
        self
    }

    /// Builder: mark as leader.
    #[must_use]
    pub fn as_leader(mut self) -> Self {
        self.leader = true;
        self
    }

    /// Whether the unit is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether `other` fights for the other side.
    #[must_use]
    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }

    /// Reduce health, clamped to zero.
    pub fn damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore health, clamped to maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Set health directly, clamped to maximum.
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    /// Mark the unit as done for this turn.
    pub fn deactivate(&mut self) {
        self.exhausted = true;
    }

    /// Allow the unit to act again.
    pub fn activate(&mut self) {
        self.exhausted = false;
    }

    /// Replace the active buff.
    pub fn apply_buff(&mut self, buff: Buff) {
        self.buff = Some(buff);
    }

    /// Count down the active buff, dropping it when it runs out.
    pub fn tick_buff(&mut self) {
        if let Some(buff) = self.buff.as_mut() {
            buff.turns_remaining = buff.turns_remaining.saturating_sub(1);
            if buff.turns_remaining == 0 {
                self.buff = None;
            }
        }
    }

    /// Stat bonus currently granted by the active buff.
    #[must_use]
    pub fn buff_bonus(&self, stat: Stat) -> i32 {
        self.buff
            .filter(|buff| buff.stat == stat)
            .map_or(0, |buff| buff.amount)
    }
}

/// Stable-index storage for units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitArena {
    slots: Vec<Option<Unit>>,
}

impl UnitArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit, assigning and returning its id.
    pub fn insert(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        unit.id = id;
        self.slots.push(Some(unit));
        id
    }

    /// Remove a unit, returning it. The slot is never reused.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    /// Look up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Living units in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.slots.iter().flatten()
    }

    /// Living units in ascending id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.slots.iter_mut().flatten()
    }

    /// Number of living units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if no living units remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
