//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Every decision the engine makes must be reproducible. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Position sets are `BTreeSet`s and units are always visited in id order.
//!
//! - **Search tie-breaks**: equal-cost paths must resolve the same way every
//!   time. The open set is ordered by (cost, discovery sequence).
//!
//! - **Thread scheduling**: levels are plain data, so parallel runs must all
//!   agree.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual engines in each core module
//! 2. **Property tests**: random levels still satisfy the engine invariants
//! 3. **Integration tests**: full battles are reproducible
//! 4. **Parallel tests**: running N battles in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tactics_core::prelude::*;

use crate::fixtures::FixedDamage;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// A level driven by alternating computer-controlled turns.
///
/// Both factions are played by the orchestrator, starting with
/// [`Faction::Enemy`]. The battle stops once the leader falls or one side
/// is wiped out.
#[derive(Debug, Clone)]
pub struct Battle {
    /// The level being played.
    pub level: Level,
    /// Orchestrator for the side currently moving.
    pub orchestrator: TurnOrchestrator,
    /// Combat resolver.
    pub combat: FixedDamage,
    /// Faction turns completed so far.
    pub turns: u32,
    /// Every event drained so far.
    pub events: Vec<TurnEvent>,
}

impl Battle {
    /// Start a battle on `level` with the enemy moving first.
    #[must_use]
    pub fn new(mut level: Level, damage: u32) -> Self {
        level.begin_faction_turn(Faction::Enemy);
        Self {
            level,
            orchestrator: TurnOrchestrator::new(Faction::Enemy, Position::new(0, 0)),
            combat: FixedDamage::new(damage),
            turns: 0,
            events: Vec::new(),
        }
    }

    /// Whether the battle has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.level.leader_fallen()
            || self.level.faction_units(Faction::Ally).next().is_none()
            || self.level.faction_units(Faction::Enemy).next().is_none()
    }

    /// Advance by one orchestrator tick, handing the turn over when a side
    /// has finished.
    pub fn step(&mut self) {
        if self.is_over() {
            return;
        }
        let outcome = self
            .orchestrator
            .tick(&mut self.level, HostState::Ready, &mut self.combat);
        self.events.extend(self.orchestrator.drain_events());

        if outcome == TickOutcome::TurnComplete {
            let next = self.orchestrator.faction().opponent();
            self.level.begin_faction_turn(next);
            self.orchestrator.reset_for(next);
            self.turns += 1;
            tracing::trace!(turn = self.turns, faction = %next, "Handing over turn");
        }
    }

    /// Hash of the level state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        level_hash(&self.level)
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of ticks each battle ran.
    pub ticks: u64,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run N battles on scoped threads and collect final hashes.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, num_ticks: u64) -> ParallelBattleResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        battle.step();
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    ParallelBattleResult {
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two battle runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the battles agree throughout, `Some(tick)` at the first tick
/// where they differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.step();
        second.step();

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Hash of everything that decides future play: terrain, occupancy and
/// unit state.
#[must_use]
pub fn level_hash(level: &Level) -> u64 {
    let mut hasher = DefaultHasher::new();
    for pos in level.map().positions() {
        if let Some(cell) = level.map().get(pos) {
            cell.tile.hash(&mut hasher);
            cell.occupant().hash(&mut hasher);
        }
    }
    for unit in level.units() {
        unit.id.hash(&mut hasher);
        unit.position.hash(&mut hasher);
        unit.health.hash(&mut hasher);
        unit.exhausted.hash(&mut hasher);
    }
    hasher.finish()
}

/// Proptest strategies for engine invariants.
///
/// These strategies generate random but reproducible levels for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;
    use tactics_core::prelude::*;

    /// Generate terrain, mostly floor.
    pub fn arb_tile() -> impl Strategy<Value = TileType> {
        prop_oneof![
            6 => Just(TileType::Floor),
            2 => Just(TileType::Forest),
            1 => Just(TileType::Swamp),
            2 => Just(TileType::Wall),
            1 => Just(TileType::Fort),
        ]
    }

    /// Generate a faction.
    pub fn arb_faction() -> impl Strategy<Value = Faction> {
        prop_oneof![Just(Faction::Ally), Just(Faction::Enemy)]
    }

    /// Generate a behavior tag, including the unconfigured one.
    pub fn arb_behavior() -> impl Strategy<Value = Behavior> {
        prop_oneof![
            Just(Behavior::None),
            Just(Behavior::Pursue),
            Just(Behavior::HoldPosition),
            Just(Behavior::RangedSkirmish),
            Just(Behavior::HitAndStepBack),
        ]
    }

    /// Generate movement budgets (0-7).
    pub fn arb_movement() -> impl Strategy<Value = u32> {
        0u32..8u32
    }

    /// Generate weapon ranges with `1 <= min <= max <= 3`.
    pub fn arb_range() -> impl Strategy<Value = WeaponRange> {
        (1u32..=3u32)
            .prop_flat_map(|min| (Just(min), min..=3u32))
            .prop_map(|(min, max)| WeaponRange::new(min, max))
    }

    /// Parameters for placing a test unit.
    #[derive(Debug, Clone)]
    pub struct TestUnitParams {
        /// Cell index in row-major order (wrapped to the map size).
        pub cell: usize,
        /// Side.
        pub faction: Faction,
        /// Movement budget.
        pub movement: u32,
        /// Weapon range.
        pub range: WeaponRange,
        /// Strategy.
        pub behavior: Behavior,
    }

    /// Generate parameters for a test unit.
    pub fn arb_unit_params() -> impl Strategy<Value = TestUnitParams> {
        (
            any::<usize>(),
            arb_faction(),
            arb_movement(),
            arb_range(),
            arb_behavior(),
        )
            .prop_map(|(cell, faction, movement, range, behavior)| TestUnitParams {
                cell,
                faction,
                movement,
                range,
                behavior,
            })
    }

    /// Generate a level of 3x3 to 8x8 cells with up to `max_units` units.
    ///
    /// Units that would land on a wall or an occupied cell are skipped, so
    /// the level may hold fewer units than generated.
    pub fn arb_level(max_units: usize) -> impl Strategy<Value = Level> {
        (3u32..=8u32, 3u32..=8u32)
            .prop_flat_map(move |(width, height)| {
                let cells = (width * height) as usize;
                (
                    Just(width),
                    Just(height),
                    proptest::collection::vec(arb_tile(), cells),
                    proptest::collection::vec(arb_unit_params(), 1..=max_units),
                )
            })
            .prop_map(|(width, height, tiles, units)| {
                let mut grid = Grid::new(width, height);
                let positions: Vec<Position> = grid.positions().collect();
                for (pos, tile) in positions.iter().zip(tiles) {
                    grid.set_tile(*pos, tile, tile.default_stats())
                        .expect("generated position is in bounds");
                }

                let mut level = Level::new(grid);
                for (index, params) in units.into_iter().enumerate() {
                    let at = positions[params.cell % positions.len()];
                    let mut unit = Unit::new(format!("U{index}"), params.faction, 10, params.movement)
                        .with_behavior(params.behavior)
                        .with_combat(4, 1);
                    unit.range = params.range;
                    // Walls and occupied cells are rejected; skipping is fine.
                    let _ = level.spawn(unit, at);
                }
                level
            })
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::skirmish_level;
    use proptest::prelude::*;

    // =========================================================================
    // Harness tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_detects_divergence() {
        use std::sync::atomic::{AtomicU64, Ordering};
        let counter = AtomicU64::new(0);
        let result = verify_determinism(
            2,
            1,
            || counter.fetch_add(1, Ordering::SeqCst),
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    // =========================================================================
    // Battle determinism
    // =========================================================================

    #[test]
    fn test_skirmish_battle_determinism() {
        let result = verify_determinism(
            3,
            200,
            || Battle::new(skirmish_level(), 7),
            Battle::step,
            Battle::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_parallel_battles_agree() {
        let result = run_parallel_battles(|| Battle::new(skirmish_level(), 7), 4, 150);
        assert!(result.is_deterministic(), "{:?}", result.hashes);
    }

    #[test]
    fn test_no_divergence_tick_by_tick() {
        assert_eq!(
            find_first_divergence(|| Battle::new(skirmish_level(), 5), 120),
            None
        );
    }

    #[test]
    fn test_battle_hands_over_turns() {
        let mut battle = Battle::new(skirmish_level(), 1);
        for _ in 0..40 {
            battle.step();
        }
        assert!(battle.turns >= 2);
        assert!(battle
            .events
            .contains(&TurnEvent::FactionTurnComplete(Faction::Enemy)));
        assert!(battle
            .events
            .contains(&TurnEvent::FactionTurnComplete(Faction::Ally)));
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_accessible_contains_origin(level in arb_level(6), budget in 0u32..8) {
            for unit in level.units() {
                let reach = accessible(&level, unit.position, budget, unit.faction);
                prop_assert!(reach.contains(&unit.position));
            }
        }

        #[test]
        fn prop_reachable_cells_within_budget(level in arb_level(6)) {
            for unit in level.units() {
                let reach = accessible(&level, unit.position, unit.movement, unit.faction);
                for &cell in &reach {
                    prop_assert!(level.unit_at(cell).map_or(true, |u| u.id == unit.id));
                    let path = get_path(
                        &level,
                        unit.position,
                        cell,
                        Passage::RespectOccupancy(unit.faction),
                    );
                    prop_assert!(!path.is_empty());
                    let cost = path_cost(&level, &path).expect("path cells are passable");
                    prop_assert!(cost <= unit.movement, "{cell} costs {cost} > {}", unit.movement);
                    for step in &path {
                        prop_assert!(level.unit_at(*step).map_or(true, |u| u.faction == unit.faction));
                    }
                }
            }
        }

        #[test]
        fn prop_furthest_movement_stays_on_path(
            level in arb_level(6),
            goal_index in any::<usize>(),
            budget in 0u32..10,
        ) {
            let cells: Vec<Position> = level.map().positions().collect();
            let goal = cells[goal_index % cells.len()];
            for unit in level.units() {
                let path = get_path(&level, unit.position, goal, Passage::IgnoreOccupancy);
                let Some(stop) = furthest_movement_on_path(&level, &path, budget) else {
                    prop_assert!(path.is_empty());
                    continue;
                };
                prop_assert!(path.contains(&stop));
                if let Some(&first_step) = path.get(1) {
                    let first_cost = level.map().movement_cost(first_step).expect("path is passable");
                    if budget < first_cost {
                        prop_assert_eq!(stop, unit.position);
                    }
                }
            }
        }

        #[test]
        fn prop_attack_squares_empty_iff_nothing_in_range(level in arb_level(6)) {
            for unit in level.units() {
                let reach = accessible(&level, unit.position, unit.movement, unit.faction);
                let options = find_attacking_squares(&level, unit, &reach);
                let any_in_range = reach.iter().any(|cell| {
                    level
                        .units()
                        .filter(|other| other.faction != unit.faction)
                        .any(|other| unit.range.contains(cell.distance(other.position)))
                });
                prop_assert_eq!(options.is_empty(), !any_in_range);
            }
        }

        #[test]
        fn prop_decide_is_idempotent_and_legal(level in arb_level(6)) {
            for unit in level.units() {
                let first = decide(&level, unit);
                prop_assert_eq!(first, decide(&level, unit));

                let dest_free = level.unit_at(first.destination).map_or(true, |u| u.id == unit.id);
                prop_assert!(dest_free, "{:?} ends on an occupied cell", first);
                if let Some(target) = first.target {
                    let target = level.unit(target).expect("target exists");
                    prop_assert!(unit.is_hostile_to(target));
                    prop_assert!(unit.range.contains(first.destination.distance(target.position)));
                }
            }
        }

        #[test]
        fn prop_battles_keep_occupancy_consistent(level in arb_level(8), ticks in 1u64..60) {
            let mut battle = Battle::new(level, 4);
            for _ in 0..ticks {
                battle.step();
                crate::fixtures::assert_occupancy_consistent(&battle.level);
            }
        }
    }
}
