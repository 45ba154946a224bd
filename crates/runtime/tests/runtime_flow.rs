//! End-to-end runtime tests: worker thread, presentation hand-off, providers.

use std::time::{Duration, Instant};

use tokio::sync::broadcast::error::TryRecvError;

use tactics_content::{actions, reactions, roster};
use tactics_core::{
    Battlefield, CombatEvent, CombatPhase, CombatantId, Position, ReactionDecision, Scenario,
};
use tactics_runtime::{
    Choice, DecisionPoint, Event, GoalBasedAiProvider, Runtime, RuntimeConfig, RuntimeError,
    SilentPresenter, Submitted, Topic,
};

const FIGHTER: CombatantId = CombatantId(1);
const BRUTE: CombatantId = CombatantId(2);

/// Fighter and orc brute on an open field, the fighter holding an
/// opportunity attack.
fn duel(fighter_at: Position, brute_at: Position) -> Scenario {
    let mut scenario = Scenario::new(11, Battlefield::new(12, 8));
    scenario.actions = actions::all();
    scenario.reactions = reactions::all();
    scenario.roster = vec![
        roster::fighter(FIGHTER, fighter_at),
        roster::orc_brute(BRUTE, brute_at),
    ];
    scenario.grant(FIGHTER, reactions::OPPORTUNITY_ATTACK);
    scenario
}

fn other(actor: CombatantId) -> CombatantId {
    if actor == FIGHTER { BRUTE } else { FIGHTER }
}

/// One tile toward the middle of the field, free in every duel below.
fn step_inward(actor: CombatantId) -> Position {
    if actor == FIGHTER {
        Position::new(3, 2)
    } else {
        Position::new(7, 2)
    }
}

async fn decide(handle: &tactics_runtime::RuntimeHandle) -> CombatantId {
    match handle.await_decision().await.unwrap() {
        DecisionPoint::Decide { actor, .. } => actor,
        DecisionPoint::Finished { .. } => panic!("combat ended early"),
    }
}

#[tokio::test]
async fn ai_duel_runs_to_a_winner() {
    let ai = GoalBasedAiProvider::new(actions::all());
    let config = RuntimeConfig {
        event_buffer_size: 4096,
        ..RuntimeConfig::default()
    };
    let mut runtime = Runtime::builder()
        .config(config)
        .scenario(duel(Position::new(1, 3), Position::new(10, 3)))
        .player_provider(ai.clone())
        .ai_provider(ai)
        .build()
        .await
        .unwrap();
    let mut phases = runtime.handle().subscribe(Topic::Phase);

    let winner = tokio::time::timeout(Duration::from_secs(30), runtime.run())
        .await
        .expect("duel should finish")
        .unwrap();
    assert!(winner.is_some());

    let snapshot = runtime.handle().snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CombatPhase::CombatEnd);

    let mut ended = None;
    loop {
        match phases.try_recv() {
            Ok(Event::Combat(CombatEvent::CombatEnded { winner, .. })) => ended = Some(winner),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    assert_eq!(ended, Some(winner));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_provider_is_reported() {
    let mut runtime = Runtime::builder()
        .scenario(duel(Position::new(2, 2), Position::new(8, 2)))
        .build()
        .await
        .unwrap();
    runtime.handle().start_combat().await.unwrap();

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderNotSet { .. }));
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_scenario_fails_the_build() {
    let err = Runtime::builder().build().await.err().unwrap();
    assert!(matches!(err, RuntimeError::MissingScenario));
}

#[tokio::test]
async fn choices_from_the_wrong_actor_are_rejected() {
    let runtime = Runtime::builder()
        .scenario(duel(Position::new(2, 2), Position::new(8, 2)))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.start_combat().await.unwrap();
    let actor = decide(&handle).await;

    let err = handle.end_turn(other(actor)).await.unwrap_err();
    match err {
        RuntimeError::WrongActor { expected, provided } => {
            assert_eq!(expected, Some(actor));
            assert_eq!(provided, other(actor));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Engine-level refusals are rejections too, and leave the turn open.
    let off_field = handle
        .submit(actor, Choice::move_to(Position::new(200, 200)))
        .await
        .unwrap_err();
    assert!(matches!(off_field, RuntimeError::MoveRejected(_)));
    assert!(off_field.is_rejection());
    assert_eq!(decide(&handle).await, actor);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn silent_presentation_recovers_after_timeout() {
    let timeout = Duration::from_millis(60);
    let config = RuntimeConfig {
        execution_timeout: timeout,
        tick_interval: Duration::from_millis(5),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .scenario(duel(Position::new(2, 2), Position::new(8, 2)))
        .presenter(SilentPresenter)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.start_combat().await.unwrap();
    let actor = decide(&handle).await;

    let submitted_at = Instant::now();
    let submitted = handle
        .submit(actor, Choice::move_to(step_inward(actor)))
        .await
        .unwrap();
    let token = submitted.token().unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CombatPhase::ActionExecution);
    assert_eq!(snapshot.outstanding, Some(token));

    assert_eq!(decide(&handle).await, actor);
    assert!(submitted_at.elapsed() >= timeout);
    assert!(!handle.complete_action(token).await.unwrap());
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn completion_releases_the_turn_once() {
    let runtime = Runtime::builder()
        .scenario(duel(Position::new(2, 2), Position::new(8, 2)))
        .presenter(SilentPresenter)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.start_combat().await.unwrap();
    let actor = decide(&handle).await;

    let submitted = handle
        .submit(actor, Choice::move_to(step_inward(actor)))
        .await
        .unwrap();
    let Submitted::Moved(outcome) = &submitted else {
        panic!("expected a move, got {submitted:?}");
    };
    assert_eq!(outcome.end, step_inward(actor));

    let token = submitted.token().unwrap();
    assert!(handle.complete_action(token).await.unwrap());
    assert!(!handle.complete_action(token).await.unwrap());
    assert_eq!(decide(&handle).await, actor);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn player_reactions_wait_for_an_answer() {
    let config = RuntimeConfig {
        interactive_reactions: true,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .scenario(duel(Position::new(2, 2), Position::new(3, 2)))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut reaction_events = handle.subscribe(Topic::Reaction);
    handle.start_combat().await.unwrap();

    if decide(&handle).await == FIGHTER {
        handle.end_turn(FIGHTER).await.unwrap();
    }
    assert_eq!(decide(&handle).await, BRUTE);

    let answering = {
        let handle = handle.clone();
        tokio::spawn(async move {
            loop {
                let event = reaction_events.recv().await.unwrap();
                if let Event::ReactionAwaiting { prompt, .. } = event {
                    // Submissions are refused while the prompt is open.
                    let busy = handle.end_turn(BRUTE).await.unwrap_err();
                    assert!(matches!(busy, RuntimeError::AwaitingReaction));
                    handle
                        .resolve_prompt(prompt.id, ReactionDecision::Use)
                        .await
                        .unwrap();
                    return prompt;
                }
            }
        })
    };

    let submitted = handle
        .submit(BRUTE, Choice::move_to(Position::new(7, 2)))
        .await
        .unwrap();
    let prompt = answering.await.unwrap();
    assert_eq!(prompt.reactor, FIGHTER);
    assert_eq!(prompt.reaction.as_str(), reactions::OPPORTUNITY_ATTACK);
    assert!(matches!(submitted, Submitted::Moved(_)));

    let snapshot = handle.snapshot().await.unwrap();
    let fighter = snapshot.combatant(FIGHTER).unwrap();
    assert_eq!(fighter.budget.reaction, 0);

    let err = handle
        .resolve_prompt(prompt.id, ReactionDecision::Use)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownPrompt(_)));
    runtime.shutdown().await.unwrap();
}
