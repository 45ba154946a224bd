mod common;

use std::time::Instant;

use common::{FIGHTER, GOBLIN, ORC};
use tactics_core::{
    ActionRequest, AlwaysReact, CombatEngine, CombatEvent, CombatPhase, Position,
};

/// Moves, strikes and passes through three rounds.
fn play(seed: u64) -> (CombatEngine, Vec<CombatEvent>) {
    let mut engine = common::started(seed);
    let mut events = engine.drain_events();
    let now = Instant::now();

    for round in 0..3 {
        if engine.phase() == CombatPhase::CombatEnd {
            break;
        }
        if round == 0 {
            let moved = engine
                .move_to(FIGHTER, Position::new(1, 3), now, &mut AlwaysReact)
                .unwrap();
            engine.complete_action(moved.token);
        }
        let request = ActionRequest::at_unit(FIGHTER, "strike", ORC);
        if let Ok(result) = engine.execute_action(request, now, &mut AlwaysReact) {
            engine.complete_action(result.token);
        }
        while engine.phase() != CombatPhase::CombatEnd {
            engine.end_turn().unwrap();
            if engine.current_combatant() == Some(FIGHTER) {
                break;
            }
        }
        events.extend(engine.drain_events());
    }
    (engine, events)
}

#[test]
fn same_seed_same_combat() {
    let (a, events_a) = play(42);
    let (b, events_b) = play(42);

    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(events_a, events_b);
    assert!(a.snapshot().draws > 0);
}

#[test]
fn snapshot_reflects_engine_state() {
    let (engine, _) = play(7);
    let snapshot = engine.snapshot();

    assert_eq!(snapshot.phase, engine.phase());
    assert_eq!(snapshot.round, engine.round());
    assert_eq!(snapshot.turn_order, vec![FIGHTER, GOBLIN, ORC]);
    assert_eq!(
        snapshot.combatant(GOBLIN).map(|c| c.resources.hp),
        engine.state().combatant(GOBLIN).map(|c| c.resources.hp)
    );
}

#[cfg(feature = "serde")]
#[test]
fn equal_combats_have_equal_digests() {
    let (a, _) = play(99);
    let (b, _) = play(99);
    let digest = a.snapshot().digest().unwrap();

    assert_eq!(digest, b.snapshot().digest().unwrap());
    assert_eq!(hex::encode(digest).len(), 64);
}
