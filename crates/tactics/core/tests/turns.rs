mod common;

use std::time::Instant;

use common::{FIGHTER, GOBLIN, ORC};
use tactics_core::{
    ActionRequest, CombatEvent, CombatPhase, CombatantStats, NeverReact, Side, StatusId,
    TurnError,
};

#[test]
fn initiative_orders_turns_and_opens_the_first() {
    let mut engine = common::engine(11);
    let order = engine.start_combat().unwrap();

    assert_eq!(order, vec![FIGHTER, GOBLIN, ORC]);
    assert_eq!(engine.round(), 1);
    assert_eq!(engine.current_combatant(), Some(FIGHTER));
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);

    let events = engine.drain_events();
    assert!(matches!(events[0], CombatEvent::CombatStarted { .. }));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::TurnChanged { round: 1, current: FIGHTER }
    )));
}

#[test]
fn combat_starts_only_once() {
    let mut engine = common::started(12);
    assert_eq!(
        engine.start_combat(),
        Err(TurnError::PhaseDisallows(CombatPhase::PlayerDecision))
    );
}

#[test]
fn end_turn_needs_a_started_combat() {
    let mut engine = common::engine(13);
    assert_eq!(
        engine.end_turn(),
        Err(TurnError::PhaseDisallows(CombatPhase::CombatStart))
    );
}

#[test]
fn turns_cycle_and_wrap_into_the_next_round() {
    let mut engine = common::started(14);

    engine.end_turn().unwrap();
    assert_eq!(engine.current_combatant(), Some(GOBLIN));
    assert_eq!(engine.phase(), CombatPhase::AiDecision);

    engine.end_turn().unwrap();
    assert_eq!(engine.current_combatant(), Some(ORC));

    engine.end_turn().unwrap();
    assert_eq!(engine.current_combatant(), Some(FIGHTER));
    assert_eq!(engine.round(), 2);
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::PhaseChanged { to: CombatPhase::RoundEnd, .. }
    )));
}

#[test]
fn dead_combatants_lose_their_turns() {
    let mut goblin = common::goblin();
    goblin.stats = CombatantStats {
        dies_at_zero: true,
        ..CombatantStats::default()
    };
    goblin.resources.hp = 2;
    let mut engine = common::with_roster(common::builder(15), common::fighter(), goblin, common::orc())
        .build()
        .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "smite", GOBLIN),
            Instant::now(),
            &mut NeverReact,
        )
        .unwrap();
    engine.complete_action(result.token);
    engine.end_turn().unwrap();

    assert_eq!(engine.current_combatant(), Some(ORC));
}

#[test]
fn timed_statuses_expire_at_the_bearers_turn_end() {
    let mut engine = common::started(16);
    let blessed = StatusId::new("blessed");
    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "bless", FIGHTER),
            Instant::now(),
            &mut NeverReact,
        )
        .unwrap();
    engine.complete_action(result.token);

    // Two-turn duration: survives the first turn end, gone after the second.
    for _ in 0..3 {
        engine.end_turn().unwrap();
    }
    assert!(engine.has_status(FIGHTER, &blessed));
    for _ in 0..3 {
        engine.end_turn().unwrap();
    }
    assert!(!engine.has_status(FIGHTER, &blessed));
}

#[test]
fn every_phase_change_follows_an_edge() {
    let mut engine = common::started(17);
    let mut events = engine.drain_events();

    for _ in 0..200 {
        match engine.phase() {
            CombatPhase::CombatEnd => break,
            CombatPhase::PlayerDecision => {
                let target = [GOBLIN, ORC].into_iter().find(|&id| {
                    engine
                        .state()
                        .combatant(id)
                        .is_some_and(|c| c.life_state.is_alive())
                });
                if let Some(target) = target {
                    let request = ActionRequest::at_unit(FIGHTER, "smite", target);
                    if let Ok(result) = engine.execute_action(request, Instant::now(), &mut NeverReact) {
                        engine.complete_action(result.token);
                    }
                }
                if engine.phase() != CombatPhase::CombatEnd {
                    engine.end_turn().unwrap();
                }
            }
            _ => engine.end_turn().unwrap(),
        }
        events.extend(engine.drain_events());
    }

    assert_eq!(engine.phase(), CombatPhase::CombatEnd);
    for event in &events {
        if let CombatEvent::PhaseChanged { from, to, .. } = event {
            assert!(from.can_transition_to(*to), "{from} -> {to}");
        }
    }
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::CombatEnded { winner: Some(Side::Party), .. }
    )));
}
