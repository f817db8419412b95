//! End-to-end scenarios across reachability, targeting, behaviors and the
//! turn orchestrator.

use tactics_core::prelude::*;
use tactics_test_utils::determinism::Battle;
use tactics_test_utils::fixtures::{
    archer, assert_occupancy_consistent, guard, level_from_rows, open_level, pos, skirmish_level,
    soldier, FixedDamage,
};

#[test]
fn test_open_floor_diamond() {
    let level = open_level(5, 5);
    let reach = accessible(&level, pos(2, 2), 2, Faction::Ally);

    let expected: Vec<Position> = vec![
        pos(0, 2),
        pos(1, 1),
        pos(1, 2),
        pos(1, 3),
        pos(2, 0),
        pos(2, 1),
        pos(2, 2),
        pos(2, 3),
        pos(2, 4),
        pos(3, 1),
        pos(3, 2),
        pos(3, 3),
        pos(4, 2),
    ];
    assert_eq!(reach.into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn test_pursuer_closes_to_melee() {
    let mut level = open_level(5, 5);
    let a = level
        .spawn(
            Unit::new("A", Faction::Ally, 20, 3).with_behavior(Behavior::Pursue),
            pos(0, 0),
        )
        .unwrap();
    let b = level
        .spawn(Unit::new("B", Faction::Enemy, 20, 3), pos(0, 3))
        .unwrap();

    let action = decide(&level, level.unit(a).unwrap());
    assert_eq!(action.destination, pos(0, 2));
    assert_eq!(action.target, Some(b));
}

#[test]
fn test_guard_without_targets_holds() {
    let mut level = open_level(6, 6);
    let g = level.spawn(guard("Sentry", Faction::Enemy), pos(3, 3)).unwrap();
    level
        .spawn(soldier("Far", Faction::Ally, 4), pos(0, 0))
        .unwrap();

    let action = decide(&level, level.unit(g).unwrap());
    assert_eq!(action, Action::wait(pos(3, 3)));
}

#[test]
fn test_archer_keeps_distance() {
    let mut level = open_level(6, 1);
    let bow = level.spawn(archer("Bow", Faction::Enemy), pos(0, 0)).unwrap();
    let knight = level
        .spawn(soldier("Knight", Faction::Ally, 4), pos(5, 0))
        .unwrap();

    let action = decide(&level, level.unit(bow).unwrap());
    assert_eq!(action.target, Some(knight));
    assert_eq!(action.destination.distance(pos(5, 0)), 2);
    assert_eq!(action.destination, pos(3, 0));
}

#[test]
fn test_walls_force_detour() {
    let mut level = level_from_rows(&[
        ".....", //
        ".###.",
        ".....",
    ]);
    let hunter = level
        .spawn(soldier("Hunter", Faction::Enemy, 2), pos(2, 0))
        .unwrap();
    level
        .spawn(soldier("Prey", Faction::Ally, 2), pos(2, 2))
        .unwrap();

    let action = decide(&level, level.unit(hunter).unwrap());
    assert_eq!(action.target, None);
    assert!(level.map().movement_cost(action.destination).is_some());
    assert_eq!(action.destination.distance(pos(2, 0)), 2);
}

#[test]
fn test_two_units_resolve_in_two_ticks_each() {
    let mut level = open_level(8, 8);
    let first = level
        .spawn(soldier("First", Faction::Enemy, 3), pos(7, 0))
        .unwrap();
    let second = level
        .spawn(soldier("Second", Faction::Enemy, 3), pos(7, 7))
        .unwrap();
    level
        .spawn(soldier("Target", Faction::Ally, 3), pos(0, 4))
        .unwrap();

    let mut orchestrator = TurnOrchestrator::new(Faction::Enemy, pos(7, 0));
    let mut combat = FixedDamage::new(3);
    for _ in 0..4 {
        orchestrator.tick(&mut level, HostState::Ready, &mut combat);
        assert_occupancy_consistent(&level);
    }

    assert_eq!(orchestrator.queue_len(), 0);
    assert!(level.unit(first).unwrap().exhausted);
    assert!(level.unit(second).unwrap().exhausted);
    assert!(!level.has_remaining_actors(Faction::Enemy));
    assert_eq!(
        orchestrator.tick(&mut level, HostState::Ready, &mut combat),
        TickOutcome::TurnComplete
    );
}

#[test]
fn test_busy_ticks_interleave_without_changes() {
    let mut level = skirmish_level();
    let mut orchestrator = TurnOrchestrator::new(Faction::Enemy, pos(7, 0));
    let mut combat = FixedDamage::new(3);

    orchestrator.tick(&mut level, HostState::Ready, &mut combat);
    let snapshot = level.clone();
    for _ in 0..5 {
        assert_eq!(
            orchestrator.tick(&mut level, HostState::Busy, &mut combat),
            TickOutcome::Deferred
        );
    }
    assert_eq!(level, snapshot);
    assert_eq!(orchestrator.queue_len(), 1);
}

#[test]
fn test_battle_runs_to_completion() {
    let mut battle = Battle::new(skirmish_level(), 25);
    let mut ticks = 0;
    while !battle.is_over() && ticks < 2_000 {
        battle.step();
        assert_occupancy_consistent(&battle.level);
        ticks += 1;
    }

    assert!(battle.is_over(), "battle did not finish in {ticks} ticks");
    assert!(battle
        .events
        .iter()
        .any(|e| matches!(e, TurnEvent::UnitRemoved { .. })));
    for unit in battle.level.units() {
        assert!(unit.is_alive());
    }
}

#[test]
fn test_scenario_data_builds_playable_level() {
    let scenario = ScenarioData::from_ron_str(
        r#"ScenarioData(
            name: "Bridge",
            map: [
                "..~~..",
                "..~~..",
                "......",
            ],
            units: [
                UnitData(id: "raider", name: "Raider", health: 12, movement: 4, attack: 5, behavior: Pursue),
                UnitData(id: "lord", name: "Lord", health: 20, movement: 4, attack: 6),
            ],
            placements: [
                Placement(unit: "lord", faction: Ally, position: (col: 0, row: 0), leader: true),
                Placement(unit: "raider", faction: Enemy, position: (col: 5, row: 0)),
            ],
        )"#,
    )
    .unwrap();
    let mut level = scenario.build().unwrap();
    assert_occupancy_consistent(&level);

    let mut orchestrator = TurnOrchestrator::new(Faction::Enemy, pos(5, 0));
    let mut combat = FixedDamage::new(30);
    while orchestrator.tick(&mut level, HostState::Ready, &mut combat) != TickOutcome::TurnComplete {}

    let raider = level.faction_units(Faction::Enemy).next().unwrap();
    assert!(raider.exhausted);
    assert!(raider.position.col < 5);
    assert!(!level.leader_fallen());
}
