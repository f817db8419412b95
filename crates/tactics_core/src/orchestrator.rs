//! Turn orchestration for computer-controlled factions.
//!
//! The orchestrator is a small interpreter over a queue of atomic steps.
//! Each call to [`TurnOrchestrator::tick`] executes at most one step, so the
//! host can pause between any two of them (to animate a move, open a menu,
//! or abort the turn) without the level ever being half-updated.
//!
//! # Step Order
//!
//! For each actor:
//! 1. **Plan** (only when the queue is empty) - pick the nearest unexhausted
//!    unit of the controlled faction and enqueue its two steps
//! 2. **Select** - refresh the preview sets and move the cursor
//! 3. **Resolve** - decide, move, fight, exhaust
//!
//! Planning shares a tick with the select step it enqueues, so a faction of
//! `n` units finishes its work in `2 * n` ticks.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::behavior::{decide, Action};
use crate::components::{Faction, Position, UnitId};
use crate::error::{GameError, Result};
use crate::level::Level;
use crate::targeting::{find_nearest, TieBreak};

/// Post-combat health of both parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Attacker health after the exchange.
    pub attacker_health: u32,
    /// Defender health after the exchange.
    pub defender_health: u32,
}

/// Computes combat results. The orchestrator only applies them.
pub trait CombatResolver {
    /// Resolve an attack by `attacker` on the unit standing at `defender`.
    fn resolve(&mut self, level: &Level, attacker: UnitId, defender: Position) -> CombatOutcome;
}

/// Whether the host is ready for the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostState {
    /// Nothing pending on the host side.
    #[default]
    Ready,
    /// The host is animating, showing a menu or otherwise occupied.
    Busy,
}

/// One atomic unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Focus the given unit.
    SelectActor(UnitId),
    /// Decide and commit the given unit's action.
    ResolveAction(UnitId),
}

impl Step {
    /// Unit the step concerns.
    #[must_use]
    pub const fn actor(self) -> UnitId {
        match self {
            Self::SelectActor(id) | Self::ResolveAction(id) => id,
        }
    }
}

/// Where the orchestrator is in the current actor's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrchestratorState {
    /// No actor in progress.
    #[default]
    Idle,
    /// The unit has been selected; its action is pending.
    ActorSelected(UnitId),
    /// The unit's action has been committed.
    ActionResolved(UnitId),
    /// No actor is left; further ticks do nothing until reset.
    TurnComplete,
}

/// Side-effect notifications for presentation and turn management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A unit moved (possibly zero cells) and may attack.
    UnitActing {
        /// Acting unit.
        unit: UnitId,
        /// Cell it started from.
        from: Position,
        /// Cell it ended on.
        to: Position,
        /// Unit it attacks, if any.
        target: Option<UnitId>,
    },
    /// A unit finished acting for this turn.
    UnitExhausted(UnitId),
    /// A unit died and left the level.
    UnitRemoved {
        /// Removed unit.
        unit: UnitId,
        /// Its allegiance.
        faction: Faction,
        /// Where it fell.
        position: Position,
    },
    /// Every unit of the faction has acted.
    FactionTurnComplete(Faction),
}

/// Result of a single [`TurnOrchestrator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The host was busy; nothing happened.
    Deferred,
    /// A unit was selected.
    Selected(UnitId),
    /// A unit's action was committed.
    Resolved {
        /// Acting unit.
        unit: UnitId,
        /// What it did.
        action: Action,
    },
    /// The queued plan referred to a unit that can no longer act and was
    /// discarded. Planning runs again on the next tick.
    PlanDiscarded(UnitId),
    /// No unit of the faction is left to act.
    TurnComplete,
}

/// Drives one faction's computer-controlled turn.
#[derive(Debug, Clone)]
pub struct TurnOrchestrator {
    faction: Faction,
    cursor: Position,
    queue: VecDeque<Step>,
    state: OrchestratorState,
    events: Vec<TurnEvent>,
}

impl TurnOrchestrator {
    /// Create an orchestrator for `faction`, searching for actors outward
    /// from `cursor`.
    #[must_use]
    pub fn new(faction: Faction, cursor: Position) -> Self {
        Self {
            faction,
            cursor,
            queue: VecDeque::with_capacity(2),
            state: OrchestratorState::Idle,
            events: Vec::new(),
        }
    }

    /// Faction being driven.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Position actors are searched from.
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Current cycle state.
    #[must_use]
    pub const fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Number of steps still queued.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Discard any queued steps and return to idle.
    ///
    /// Already committed actions stay committed. A finished turn is reopened,
    /// so the next tick plans again.
    pub fn abort(&mut self) {
        if !self.queue.is_empty() {
            tracing::debug!(faction = %self.faction, dropped = self.queue.len(), "Turn aborted");
        }
        self.queue.clear();
        self.state = OrchestratorState::Idle;
    }

    /// Switch to driving `faction`, keeping the cursor and pending events.
    pub fn reset_for(&mut self, faction: Faction) {
        self.abort();
        self.faction = faction;
    }

    /// Take all events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance by one step.
    ///
    /// Plans when the queue is empty, then executes the next queued step.
    /// Returns [`TickOutcome::Deferred`] without touching anything while the
    /// host is busy.
    pub fn tick<C: CombatResolver + ?Sized>(
        &mut self,
        level: &mut Level,
        host: HostState,
        combat: &mut C,
    ) -> TickOutcome {
        if host == HostState::Busy {
            return TickOutcome::Deferred;
        }
        if self.state == OrchestratorState::TurnComplete {
            return TickOutcome::TurnComplete;
        }

        if self.queue.is_empty() && !self.plan(level) {
            self.state = OrchestratorState::TurnComplete;
            self.events.push(TurnEvent::FactionTurnComplete(self.faction));
            tracing::debug!(faction = %self.faction, "Faction turn complete");
            return TickOutcome::TurnComplete;
        }

        let Some(step) = self.queue.pop_front() else {
            return TickOutcome::TurnComplete;
        };

        let actor = step.actor();
        if !level.unit(actor).is_some_and(|unit| !unit.exhausted) {
            tracing::debug!(unit = %actor, ?step, "Discarding stale plan");
            self.queue.clear();
            self.state = OrchestratorState::Idle;
            return TickOutcome::PlanDiscarded(actor);
        }

        match step {
            Step::SelectActor(id) => self.select(level, id),
            Step::ResolveAction(id) => self.resolve(level, id, combat),
        }
    }

    fn plan(&mut self, level: &Level) -> bool {
        let faction = self.faction;
        let Some(actor) = find_nearest(
            level,
            self.cursor,
            |unit| unit.faction == faction && !unit.exhausted,
            TieBreak::PreferLower,
        ) else {
            return false;
        };

        tracing::debug!(%faction, unit = %actor, cursor = %self.cursor, "Planned next actor");
        self.queue.push_back(Step::SelectActor(actor));
        self.queue.push_back(Step::ResolveAction(actor));
        true
    }

    fn select(&mut self, level: &mut Level, id: UnitId) -> TickOutcome {
        if let Err(err) = level.refresh_derived(id) {
            tracing::error!(unit = %id, error = %err, "Failed to refresh derived sets");
        }
        if let Some(unit) = level.unit(id) {
            self.cursor = unit.position;
        }
        self.state = OrchestratorState::ActorSelected(id);
        TickOutcome::Selected(id)
    }

    fn resolve<C: CombatResolver + ?Sized>(
        &mut self,
        level: &mut Level,
        id: UnitId,
        combat: &mut C,
    ) -> TickOutcome {
        let Some(unit) = level.unit(id) else {
            return TickOutcome::PlanDiscarded(id);
        };
        let from = unit.position;
        let mut action = decide(level, unit);

        if let Err(err) = level.place(id, action.destination) {
            tracing::error!(
                unit = %id,
                destination = %action.destination,
                error = %err,
                "Action violated an occupancy invariant; unit stays in place"
            );
            debug_assert!(false, "illegal action for unit {id}: {err}");
            action = Action::wait(from);
        } else {
            self.events.push(TurnEvent::UnitActing {
                unit: id,
                from,
                to: action.destination,
                target: action.target,
            });
            self.cursor = action.destination;

            // After an attack the search for the next actor starts at the defender.
            if let Some(target) = action.target {
                if let Err(err) = self.fight(level, id, target, combat) {
                    tracing::error!(unit = %id, %target, error = %err, "Combat could not be applied");
                }
            }
        }

        if level.unit(id).is_some() {
            if let Err(err) = level.exhaust(id) {
                tracing::error!(unit = %id, error = %err, "Failed to exhaust unit");
            } else {
                self.events.push(TurnEvent::UnitExhausted(id));
            }
        }

        self.state = OrchestratorState::ActionResolved(id);
        TickOutcome::Resolved { unit: id, action }
    }

    fn fight<C: CombatResolver + ?Sized>(
        &mut self,
        level: &mut Level,
        attacker: UnitId,
        target: UnitId,
        combat: &mut C,
    ) -> Result<()> {
        let defender = level
            .unit(target)
            .ok_or(GameError::UnitNotFound(target))?
            .position;
        self.cursor = defender;

        let outcome = combat.resolve(level, attacker, defender);
        tracing::debug!(
            %attacker,
            %target,
            attacker_health = outcome.attacker_health,
            defender_health = outcome.defender_health,
            "Combat resolved"
        );
        level.set_health(attacker, outcome.attacker_health)?;
        level.set_health(target, outcome.defender_health)?;

        for fallen in level.remove_dead_units() {
            tracing::debug!(unit = %fallen.id, position = %fallen.position, "Unit removed");
            self.events.push(TurnEvent::UnitRemoved {
                unit: fallen.id,
                faction: fallen.faction,
                position: fallen.position,
            });
        }
        Ok(())
    }
}
