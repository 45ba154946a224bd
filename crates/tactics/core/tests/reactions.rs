mod common;

use std::time::Instant;

use common::{FIGHTER, GOBLIN, ORC};
use tactics_core::status::StatusFlags;
use tactics_core::{
    ActionDefinition, ActionRequest, AlwaysReact, CombatEvent, CombatPhase, CombatSnapshot,
    CombatantId, DamageType, DiceExpr, Effect, MoveError, NeverReact, OutcomeModifier, Position,
    ReactionDecision, ReactionDefinition, ReactionId, ReactionPrompt, ReactionResponse,
    ReactionTrigger, StatusApplication, StatusDefinition, TargetFilter, TargetType,
};

fn prompts(events: &[CombatEvent]) -> Vec<CombatantId> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ReactionPromptCreated { prompt } => Some(prompt.reactor),
            _ => None,
        })
        .collect()
}

#[test]
fn leaving_reach_prompts_each_enemy_once() {
    let mut engine = common::started(21);
    engine.drain_events();

    let outcome = engine
        .move_to(FIGHTER, Position::new(1, 5), Instant::now(), &mut AlwaysReact)
        .unwrap();
    let events = engine.drain_events();

    assert_eq!(prompts(&events), vec![GOBLIN, ORC]);
    for reactor in [GOBLIN, ORC] {
        assert_eq!(engine.state().combatant(reactor).unwrap().budget.reaction, 0);
    }
    assert!(!outcome.interrupted);
    assert_eq!(outcome.end, Position::new(1, 5));
    assert_eq!(engine.state().combatant(FIGHTER).unwrap().budget.movement, 2);
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::MovementCompleted { .. })));

    // Spent charges come back when the round ends.
    engine.complete_action(outcome.token);
    for _ in 0..3 {
        engine.end_turn().unwrap();
    }
    assert_eq!(engine.round(), 2);
    for reactor in [GOBLIN, ORC] {
        assert_eq!(engine.state().combatant(reactor).unwrap().budget.reaction, 1);
    }
}

#[test]
fn declined_prompts_keep_the_charge() {
    let mut engine = common::started(22);
    engine.drain_events();
    engine
        .move_to(FIGHTER, Position::new(1, 5), Instant::now(), &mut NeverReact)
        .unwrap();
    let events = engine.drain_events();

    let declined = events
        .iter()
        .filter(|e| matches!(
            e,
            CombatEvent::ReactionPromptResolved { decision: ReactionDecision::Decline, .. }
        ))
        .count();
    assert_eq!(declined, 2);
    assert_eq!(engine.state().combatant(GOBLIN).unwrap().budget.reaction, 1);
    assert_eq!(
        engine.state().combatant(FIGHTER).unwrap().resources.hp,
        40
    );
}

#[test]
fn disengaged_movers_provoke_nothing() {
    let disengaged = StatusDefinition::new("disengaged", "Disengaged")
        .with_duration(1)
        .with_flags(StatusFlags::DISENGAGED);
    let mut engine = common::with_roster(
        common::builder(23).status(disengaged),
        common::fighter(),
        common::goblin(),
        common::orc(),
    )
    .build()
    .unwrap();
    engine.start_combat().unwrap();
    engine
        .apply_status(StatusApplication::new("disengaged", FIGHTER))
        .unwrap();
    engine.drain_events();

    engine
        .move_to(FIGHTER, Position::new(1, 5), Instant::now(), &mut AlwaysReact)
        .unwrap();
    assert!(prompts(&engine.drain_events()).is_empty());
}

#[test]
fn movement_budget_is_enforced_across_moves() {
    let mut engine = common::started(24);
    let first = engine
        .move_to(FIGHTER, Position::new(1, 5), Instant::now(), &mut NeverReact)
        .unwrap();
    engine.complete_action(first.token);

    let err = engine
        .move_to(FIGHTER, Position::new(4, 5), Instant::now(), &mut NeverReact)
        .unwrap_err();
    assert_eq!(
        err,
        MoveError::InsufficientMovement {
            needed: 3,
            available: 2
        }
    );
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);
    assert!(engine
        .pending_events()
        .any(|e| matches!(e, CombatEvent::MovementFailed { .. })));
}

#[test]
fn occupied_tiles_cannot_be_destinations() {
    let engine = common::started(25);
    assert_eq!(
        engine.can_move_to(FIGHTER, Position::new(2, 1)),
        Err(MoveError::Occupied(Position::new(2, 1)))
    );
    assert_eq!(
        engine.can_move_to(GOBLIN, Position::new(3, 3)),
        Err(MoveError::NotMoversTurn(GOBLIN))
    );
}

fn counterspell(id: &str, priority: i32) -> ReactionDefinition {
    ReactionDefinition::new(
        id,
        "Counterspell",
        ReactionTrigger::ACTION_DECLARED,
        ReactionResponse::Cancel,
    )
    .spell_only()
    .with_priority(priority)
}

#[test]
fn highest_priority_cancel_closes_the_window() {
    let firebolt = ActionDefinition::new("firebolt", "Firebolt", TargetType::SingleUnit { range: 6 })
        .with_filter(TargetFilter::Enemies)
        .spell()
        .with_effect(Effect::damage(DiceExpr::flat(4), DamageType::Force));
    let builder = common::builder(26)
        .action(firebolt)
        .reaction(counterspell("slow_counter", 0))
        .reaction(counterspell("quick_counter", 10));
    let mut engine = common::with_roster(
        builder,
        common::fighter().with_actions(["firebolt"]),
        common::goblin(),
        common::orc(),
    )
    .grant(GOBLIN, "slow_counter")
    .grant(ORC, "quick_counter")
    .build()
    .unwrap();
    engine.start_combat().unwrap();
    engine.drain_events();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "firebolt", GOBLIN),
            Instant::now(),
            &mut AlwaysReact,
        )
        .unwrap();

    assert_eq!(result.cancelled_by, Some((ORC, ReactionId::new("quick_counter"))));
    assert!(result.outcomes.is_empty());
    assert_eq!(prompts(&engine.drain_events()), vec![ORC]);
    assert_eq!(engine.state().combatant(GOBLIN).unwrap().resources.hp, 10);
    assert_eq!(engine.state().combatant(FIGHTER).unwrap().budget.action, 0);
    assert_eq!(engine.state().combatant(ORC).unwrap().budget.reaction, 0);
}

#[test]
fn non_spells_are_not_countered() {
    let mut engine = common::with_roster(
        common::builder(27).reaction(counterspell("counter", 0)),
        common::fighter(),
        common::goblin(),
        common::orc(),
    )
    .grant(ORC, "counter")
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "smite", GOBLIN),
            Instant::now(),
            &mut AlwaysReact,
        )
        .unwrap();
    assert!(!result.was_cancelled());
    assert_eq!(result.total_damage(), 4);
}

#[test]
fn damage_reactions_modify_the_amount() {
    let brace = ReactionDefinition::new(
        "brace",
        "Brace",
        ReactionTrigger::INCOMING_DAMAGE,
        ReactionResponse::Modify(OutcomeModifier::DamagePercent(-50)),
    )
    .self_target();
    let mut engine = common::with_roster(
        common::builder(28).reaction(brace),
        common::fighter(),
        common::goblin(),
        common::orc(),
    )
    .grant(GOBLIN, "brace")
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "smite", GOBLIN),
            Instant::now(),
            &mut AlwaysReact,
        )
        .unwrap();
    assert_eq!(result.total_damage(), 2);
    assert!(result.outcomes[0].modified_by_reaction);
    assert_eq!(engine.state().combatant(GOBLIN).unwrap().resources.hp, 8);
}

#[test]
fn reactions_may_be_decided_by_closures() {
    let mut engine = common::started(29);
    let mut asked = 0;
    let mut decider = |_: &ReactionPrompt, _: &CombatSnapshot| {
        asked += 1;
        ReactionDecision::Decline
    };
    engine
        .move_to(FIGHTER, Position::new(1, 5), Instant::now(), &mut decider)
        .unwrap();
    assert_eq!(asked, 2);
}

#[test]
fn reactions_nest_inside_reaction_actions() {
    use CombatPhase::{ActionExecution, ReactionPrompt};

    let parry = ReactionDefinition::new(
        "parry",
        "Parry",
        ReactionTrigger::ACTION_DECLARED,
        ReactionResponse::Modify(OutcomeModifier::DefenseBonus(2)),
    )
    .self_target();
    let mut orc = common::orc();
    orc.position = Position::new(7, 7);
    let mut engine = common::with_roster(
        common::builder(30).reaction(parry),
        common::fighter(),
        common::goblin(),
        orc,
    )
    .grant(FIGHTER, "parry")
    .build()
    .unwrap();
    engine.start_combat().unwrap();
    engine.drain_events();

    engine
        .move_to(FIGHTER, Position::new(0, 1), Instant::now(), &mut AlwaysReact)
        .unwrap();
    let events = engine.drain_events();

    let raised: Vec<(CombatantId, usize)> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ReactionPromptCreated { prompt } => Some((prompt.reactor, prompt.depth)),
            _ => None,
        })
        .collect();
    assert_eq!(raised, vec![(GOBLIN, 0), (FIGHTER, 1)]);

    let phases: Vec<CombatPhase> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            ActionExecution,
            ReactionPrompt,
            ActionExecution,
            ReactionPrompt,
            ActionExecution,
            ReactionPrompt,
            ActionExecution,
        ]
    );
    assert_eq!(engine.phase(), CombatPhase::ActionExecution);
    for reactor in [FIGHTER, GOBLIN] {
        assert_eq!(engine.state().combatant(reactor).unwrap().budget.reaction, 0);
    }
}
