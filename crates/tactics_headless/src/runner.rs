//! Headless battle loop.
//!
//! Plays the host role around [`TurnOrchestrator`]: both factions are
//! computer-controlled, turns alternate starting with the enemy, and after
//! every committed move the host stays busy for a configurable number of
//! ticks to stand in for animation.

use serde::{Deserialize, Serialize};
use tactics_core::prelude::*;

use crate::combat::StatCombat;

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Stop after this many faction turns.
    pub max_turns: u32,
    /// Ticks each committed move occupies the host (1 = no delay).
    pub ticks_per_step: u32,
    /// Faction that moves first.
    pub first: Faction,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_turns: 60,
            ticks_per_step: 1,
            first: Faction::Enemy,
        }
    }
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    /// The ally leader died.
    LeaderFell,
    /// No ally units remain.
    AlliesRouted,
    /// No enemy units remain.
    EnemiesRouted,
    /// The turn limit was reached.
    TurnLimit,
}

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    /// Unit id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Side.
    pub faction: Faction,
    /// Remaining health.
    pub health: u32,
    /// Final position.
    pub position: Position,
}

/// A unit that died during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    /// Unit id.
    pub id: u32,
    /// Side.
    pub faction: Faction,
    /// Where it fell.
    pub position: Position,
    /// Faction turn during which it fell (0-based).
    pub turn: u32,
}

/// Outcome of a headless run, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// How the battle ended.
    pub result: BattleResult,
    /// Faction turns played.
    pub turns: u32,
    /// Orchestrator ticks issued, including deferred ones.
    pub ticks: u64,
    /// Ticks on which the host was busy.
    pub deferred_ticks: u64,
    /// Actions committed.
    pub actions: u32,
    /// Attacks among those actions.
    pub attacks: u32,
    /// Units that died.
    pub casualties: Vec<Casualty>,
    /// Units still standing.
    pub survivors: Vec<UnitSummary>,
}

impl UnitSummary {
    fn of(unit: &Unit) -> Self {
        Self {
            id: unit.id.0,
            name: unit.name.clone(),
            faction: unit.faction,
            health: unit.health,
            position: unit.position,
        }
    }
}

/// Drives a level to completion.
#[derive(Debug)]
pub struct BattleRunner {
    name: String,
    level: Level,
    orchestrator: TurnOrchestrator,
    combat: StatCombat,
    config: RunConfig,
    busy_for: u32,
    turns: u32,
    ticks: u64,
    deferred_ticks: u64,
    actions: u32,
    attacks: u32,
    casualties: Vec<Casualty>,
}

impl BattleRunner {
    /// Create a runner for `level`.
    #[must_use]
    pub fn new(name: impl Into<String>, mut level: Level, config: RunConfig) -> Self {
        level.begin_faction_turn(config.first);
        let cursor = level
            .faction_units(config.first)
            .next()
            .map_or_else(Position::default, |unit| unit.position);
        Self {
            name: name.into(),
            level,
            orchestrator: TurnOrchestrator::new(config.first, cursor),
            combat: StatCombat::new(),
            config,
            busy_for: 0,
            turns: 0,
            ticks: 0,
            deferred_ticks: 0,
            actions: 0,
            attacks: 0,
            casualties: Vec::new(),
        }
    }

    /// The level being played.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Faction turns completed.
    #[must_use]
    pub const fn turns(&self) -> u32 {
        self.turns
    }

    /// Why the battle is over, if it is.
    #[must_use]
    pub fn result(&self) -> Option<BattleResult> {
        if self.level.leader_fallen() {
            Some(BattleResult::LeaderFell)
        } else if self.level.faction_units(Faction::Ally).next().is_none() {
            Some(BattleResult::AlliesRouted)
        } else if self.level.faction_units(Faction::Enemy).next().is_none() {
            Some(BattleResult::EnemiesRouted)
        } else if self.turns >= self.config.max_turns {
            Some(BattleResult::TurnLimit)
        } else {
            None
        }
    }

    /// Issue one orchestrator tick. Returns the events it produced and
    /// whether a faction turn ended.
    pub fn tick(&mut self) -> (Vec<TurnEvent>, bool) {
        let host = if self.busy_for > 0 {
            self.busy_for -= 1;
            HostState::Busy
        } else {
            HostState::Ready
        };

        self.ticks += 1;
        let outcome = self.orchestrator.tick(&mut self.level, host, &mut self.combat);
        let events = self.orchestrator.drain_events();

        match outcome {
            TickOutcome::Deferred => self.deferred_ticks += 1,
            TickOutcome::Resolved { action, .. } => {
                self.actions += 1;
                if action.target.is_some() {
                    self.attacks += 1;
                }
                self.busy_for = self.config.ticks_per_step.saturating_sub(1);
            }
            _ => {}
        }

        for event in &events {
            if let TurnEvent::UnitRemoved { unit, faction, position } = event {
                tracing::info!(%unit, %faction, %position, "Unit fell");
                self.casualties.push(Casualty {
                    id: unit.0,
                    faction: *faction,
                    position: *position,
                    turn: self.turns,
                });
            }
        }

        let turn_over = outcome == TickOutcome::TurnComplete;
        if turn_over {
            let next = self.orchestrator.faction().opponent();
            self.turns += 1;
            self.level.begin_faction_turn(next);
            self.orchestrator.reset_for(next);
            tracing::debug!(turn = self.turns, faction = %next, "Turn handed over");
        }
        (events, turn_over)
    }

    /// Play until the battle ends, calling `on_turn` after each faction
    /// turn.
    pub fn run<F>(&mut self, mut on_turn: F) -> RunSummary
    where
        F: FnMut(&Self),
    {
        while self.result().is_none() {
            let (_, turn_over) = self.tick();
            if turn_over {
                on_turn(self);
            }
        }
        self.summary()
    }

    /// Snapshot of the run so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            scenario: self.name.clone(),
            result: self.result().unwrap_or(BattleResult::TurnLimit),
            turns: self.turns,
            ticks: self.ticks,
            deferred_ticks: self.deferred_ticks,
            actions: self.actions,
            attacks: self.attacks,
            casualties: self.casualties.clone(),
            survivors: self.level.units().map(UnitSummary::of).collect(),
        }
    }
}
