mod common;

use std::time::{Duration, Instant};

use common::{FIGHTER, GOBLIN, ORC};
use tactics_core::{
    ActionDefinition, ActionError, ActionRequest, ActionToken, AdvantageState, AlwaysReact,
    AttackType, Battlefield, CombatEvent, CombatPhase, Combatant, CombatantId, CombatantStats,
    DamageType, DiceExpr, Effect, Faction, LifeState, Modifier, ModifierKind, ModifierOwner,
    NeverReact, Position, ReactionDefinition, ReactionResponse, ReactionTrigger, ResourcePool,
    RollCategory, Side, StatusApplication, StatusId, TargetFilter, TargetType,
};

fn smite(target: tactics_core::CombatantId) -> ActionRequest {
    ActionRequest::at_unit(FIGHTER, "smite", target)
}

#[test]
fn actions_are_rejected_before_combat_starts() {
    let mut engine = common::engine(1);
    let err = engine
        .execute_action(smite(GOBLIN), Instant::now(), &mut NeverReact)
        .unwrap_err();
    assert_eq!(err, ActionError::PhaseDisallows(CombatPhase::CombatStart));
    assert_eq!(engine.outstanding_token(), None);
}

#[test]
fn only_the_current_combatant_may_act() {
    let mut engine = common::started(1);
    let request = ActionRequest::at_unit(GOBLIN, "strike", FIGHTER);
    let err = engine
        .execute_action(request, Instant::now(), &mut NeverReact)
        .unwrap_err();
    assert_eq!(err, ActionError::NotActorsTurn(GOBLIN));
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);
}

#[test]
fn action_waits_for_its_completion_token() {
    let mut engine = common::started(2);
    let result = engine
        .execute_action(smite(GOBLIN), Instant::now(), &mut NeverReact)
        .unwrap();
    assert_eq!(engine.phase(), CombatPhase::ActionExecution);
    assert_eq!(engine.outstanding_token(), Some(result.token));

    assert!(!engine.complete_action(ActionToken::UNCORRELATED));
    assert_eq!(engine.phase(), CombatPhase::ActionExecution);

    assert!(engine.complete_action(result.token));
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);
    assert!(!engine.complete_action(result.token));
}

#[test]
fn execution_timeout_forces_recovery() {
    let mut engine = common::started(3);
    let start = Instant::now();
    engine
        .execute_action(smite(GOBLIN), start, &mut NeverReact)
        .unwrap();

    assert!(!engine.tick(start));
    let late = start + engine.config().execution_timeout + Duration::from_millis(1);
    assert!(engine.tick(late));
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);
    assert_eq!(engine.outstanding_token(), None);
}

#[test]
fn second_action_in_a_turn_is_refused() {
    let mut engine = common::started(4);
    let first = engine
        .execute_action(smite(GOBLIN), Instant::now(), &mut NeverReact)
        .unwrap();
    engine.complete_action(first.token);
    engine.drain_events();

    let err = engine
        .execute_action(smite(GOBLIN), Instant::now(), &mut NeverReact)
        .unwrap_err();
    assert_eq!(err, ActionError::InsufficientResources(ResourcePool::Action));
    assert_eq!(engine.phase(), CombatPhase::PlayerDecision);
    assert_eq!(engine.outstanding_token(), None);

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ActionFailed { error: ActionError::InsufficientResources(_), .. }
    )));
}

#[test]
fn unknown_action_is_rejected_without_spending() {
    let mut engine = common::started(5);
    let request = ActionRequest::at_unit(FIGHTER, "fireball", GOBLIN);
    let err = engine
        .execute_action(request, Instant::now(), &mut NeverReact)
        .unwrap_err();
    assert_eq!(err, ActionError::UnknownAction("fireball".into()));
    assert_eq!(engine.state().combatant(FIGHTER).unwrap().budget.action, 1);
}

#[test]
fn damage_to_zero_downs_the_target() {
    let mut engine = common::with_roster(
        common::builder(6),
        common::fighter(),
        common::goblin(),
        common::orc().with_hp(4),
    )
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(smite(ORC), Instant::now(), &mut NeverReact)
        .unwrap();
    assert_eq!(result.total_damage(), 4);
    assert_eq!(result.outcomes[0].life_state, LifeState::Downed);

    let orc = engine.state().combatant(ORC).unwrap();
    assert_eq!(orc.resources.hp, 0);
    assert_eq!(orc.life_state, LifeState::Downed);
    assert!(engine.pending_events().any(|e| matches!(
        e,
        CombatEvent::LifeStateChanged { combatant: ORC, to: LifeState::Downed, .. }
    )));
    assert_ne!(engine.phase(), CombatPhase::CombatEnd);
}

#[test]
fn killing_the_last_enemy_ends_the_combat() {
    let fragile = CombatantStats {
        dies_at_zero: true,
        ..CombatantStats::default()
    };
    let mut goblin = common::goblin();
    goblin.stats = fragile;
    goblin.resources.hp = 3;
    let mut orc = common::orc();
    orc.life_state = LifeState::Dead;
    orc.resources.hp = 0;

    let mut engine = common::with_roster(common::builder(7), common::fighter(), goblin, orc)
        .build()
        .unwrap();
    engine.start_combat().unwrap();
    engine
        .apply_status(StatusApplication::new("blessed", GOBLIN))
        .unwrap();

    let result = engine
        .execute_action(smite(GOBLIN), Instant::now(), &mut NeverReact)
        .unwrap();
    assert_eq!(result.outcomes[0].life_state, LifeState::Dead);
    assert_eq!(engine.phase(), CombatPhase::CombatEnd);
    assert_eq!(engine.outstanding_token(), None);
    assert!(!engine.has_status(GOBLIN, &StatusId::new("blessed")));

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::CombatEnded { winner: Some(Side::Party), .. }
    )));
    assert!(!engine.complete_action(result.token));
}

#[test]
fn advantage_wins_two_to_one() {
    let owner = || ModifierOwner::Named("test".into());
    let mut engine = common::with_roster(
        common::builder(8),
        common::fighter(),
        common::goblin(),
        common::orc(),
    )
    .modifier(FIGHTER, Modifier::new(RollCategory::AttackRoll, ModifierKind::Advantage, owner()))
    .modifier(FIGHTER, Modifier::new(RollCategory::AttackRoll, ModifierKind::Advantage, owner()))
    .modifier(FIGHTER, Modifier::new(RollCategory::AttackRoll, ModifierKind::Disadvantage, owner()))
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let request = ActionRequest::at_unit(FIGHTER, "strike", GOBLIN);
    let result = engine
        .execute_action(request, Instant::now(), &mut NeverReact)
        .unwrap();
    let attack = result.outcomes[0].attack.expect("strike rolls to hit");
    assert_eq!(attack.d20.advantage, AdvantageState::Advantage);
    let discarded = attack.d20.discarded.expect("two dice rolled");
    assert!(attack.d20.natural >= discarded);
}

#[test]
fn status_apply_and_remove_emit_one_event_each() {
    let mut engine = common::started(9);
    engine.drain_events();
    let blessed = StatusId::new("blessed");

    engine
        .apply_status(StatusApplication::new(blessed.clone(), FIGHTER))
        .unwrap();
    assert!(engine.has_status(FIGHTER, &blessed));
    assert!(engine.remove_status(FIGHTER, &blessed));
    assert!(!engine.remove_status(FIGHTER, &blessed));

    let events = engine.drain_events();
    let applied = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::StatusApplied { .. }))
        .count();
    let removed = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::StatusRemoved { .. }))
        .count();
    assert_eq!((applied, removed), (1, 1));
}

#[test]
fn hit_chance_only_for_attack_rolls() {
    let engine = common::started(10);
    let chance = engine
        .hit_chance(FIGHTER, GOBLIN, &"strike".into())
        .expect("strike rolls to hit");
    assert!(chance > 0.0 && chance < 1.0);
    assert_eq!(engine.hit_chance(FIGHTER, GOBLIN, &"smite".into()), None);
}

/// Weapon attack whose damage lands hit or miss, so passes are predictable.
fn cleave() -> ActionDefinition {
    ActionDefinition::new("cleave", "Cleave", TargetType::SingleUnit { range: 1 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::MeleeWeapon)
        .with_effect(Effect::damage(DiceExpr::flat(4), DamageType::Force))
}

fn veteran() -> Combatant {
    let mut fighter = common::fighter().with_actions(["cleave"]);
    fighter.stats.extra_attacks = 1;
    fighter
}

#[test]
fn extra_attacks_replay_without_paying_twice() {
    let mut goblin = common::goblin();
    goblin.stats.max_hp = 40;
    goblin.resources.hp = 40;
    let mut engine = common::with_roster(
        common::builder(11).action(cleave()),
        veteran(),
        goblin,
        common::orc(),
    )
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "cleave", GOBLIN),
            Instant::now(),
            &mut NeverReact,
        )
        .unwrap();
    let passes: Vec<u8> = result.outcomes.iter().map(|o| o.pass).collect();
    assert_eq!(passes, vec![0, 1]);
    assert_eq!(result.total_damage(), 8);
    assert_eq!(engine.state().combatant(GOBLIN).unwrap().resources.hp, 32);
    assert_eq!(engine.state().combatant(FIGHTER).unwrap().budget.action, 0);
}

#[test]
fn extra_attacks_skip_targets_killed_by_the_first() {
    let mut goblin = common::goblin();
    goblin.stats.dies_at_zero = true;
    goblin.resources.hp = 4;
    let mut engine = common::with_roster(
        common::builder(12).action(cleave()),
        veteran(),
        goblin,
        common::orc(),
    )
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "cleave", GOBLIN),
            Instant::now(),
            &mut NeverReact,
        )
        .unwrap();
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].life_state, LifeState::Dead);
    assert_ne!(engine.phase(), CombatPhase::CombatEnd);
}

#[test]
fn extra_attacks_stop_when_the_attacker_drops() {
    let retort = ReactionDefinition::new(
        "retort",
        "Retort",
        ReactionTrigger::DAMAGED,
        ReactionResponse::ExecuteAction("smite".into()),
    )
    .self_target();
    let mut fighter = veteran();
    fighter.resources.hp = 4;
    let mut goblin = common::goblin();
    goblin.stats.max_hp = 40;
    goblin.resources.hp = 40;
    let mut engine = common::with_roster(
        common::builder(13).action(cleave()).reaction(retort),
        fighter,
        goblin,
        common::orc(),
    )
    .grant(GOBLIN, "retort")
    .build()
    .unwrap();
    engine.start_combat().unwrap();

    let result = engine
        .execute_action(
            ActionRequest::at_unit(FIGHTER, "cleave", GOBLIN),
            Instant::now(),
            &mut AlwaysReact,
        )
        .unwrap();
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(
        engine.state().combatant(FIGHTER).unwrap().life_state,
        LifeState::Downed
    );
    assert_eq!(engine.state().combatant(GOBLIN).unwrap().resources.hp, 36);
}

#[test]
fn interrupted_moves_never_end_on_an_ally() {
    const SQUIRE: CombatantId = CombatantId(4);
    let grab = ReactionDefinition::new(
        "grab",
        "Grab",
        ReactionTrigger::LEAVES_REACH,
        ReactionResponse::Cancel,
    );
    let mut goblin = common::goblin();
    goblin.position = Position::new(0, 1);
    let squire = Combatant::new(
        SQUIRE,
        "Squire",
        Faction::Party,
        Position::new(1, 2),
        CombatantStats::default(),
    );
    // The only route to (1, 3) runs through the squire.
    let field = Battlefield::new(5, 5).with_blocked([Position::new(0, 2), Position::new(2, 2)]);
    let mut engine = common::builder(14)
        .battlefield(field)
        .reaction(grab)
        .combatant(common::fighter())
        .combatant(squire)
        .combatant(goblin)
        .modifier(
            FIGHTER,
            Modifier::new(RollCategory::Initiative, ModifierKind::Flat(100), ModifierOwner::Scenario),
        )
        .grant(GOBLIN, "grab")
        .build()
        .unwrap();
    engine.start_combat().unwrap();
    let speed = engine.state().combatant(FIGHTER).unwrap().stats.speed;

    let outcome = engine
        .move_to(FIGHTER, Position::new(1, 3), Instant::now(), &mut AlwaysReact)
        .unwrap();
    assert!(outcome.interrupted);
    assert_eq!(outcome.end, Position::new(1, 1));
    assert!(outcome.waypoints.is_empty());
    assert_eq!(outcome.distance, 0);

    let fighter = engine.state().combatant(FIGHTER).unwrap();
    assert_eq!(fighter.position, Position::new(1, 1));
    assert_eq!(fighter.budget.movement, speed);
    assert_eq!(
        engine.state().combatant(SQUIRE).unwrap().position,
        Position::new(1, 2)
    );
}
