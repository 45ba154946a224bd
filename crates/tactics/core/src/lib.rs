//! Deterministic turn-based tactical combat rules.
//!
//! `tactics-core` owns the canonical combat semantics: the phase machine, the
//! initiative queue, the action pipeline, statuses, reactions and movement.
//! All state mutation flows through [`engine::CombatEngine`], which is built
//! from registered definitions by [`engine::CombatEngineBuilder`] and driven
//! by a host loop through `start_combat`, `execute_action`, `move_to`,
//! `end_turn`, `complete_action` and `tick`.
//!
//! Nothing here performs I/O or spawns threads. Every random outcome comes from
//! a seeded [`rules::RollStream`], so identical call sequences reproduce
//! identical combats.
pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod movement;
pub mod reaction;
pub mod rules;
pub mod scenario;
pub mod state;
pub mod status;

pub use action::{
    ActionCost, ActionDefinition, ActionError, ActionOptions, ActionRequest, ActionResult,
    ActionTarget, AttackType, Effect, EffectCondition, EffectKind, ForcedMoveDirection, SaveSpec,
    TargetFilter, TargetOutcome, TargetType, ZoneSpec,
};
pub use config::CombatConfig;
pub use engine::{
    ActionToken, CombatEngine, CombatEngineBuilder, CombatPhase, CombatSnapshot, PhaseMachine,
    ScenarioError, TurnError, TurnQueue,
};
pub use error::{ErrorSeverity, GameError};
pub use events::{CombatEvent, EventLog, Topic};
pub use movement::{MoveError, MoveOutcome, PathPreview};
pub use reaction::{
    AlwaysReact, NeverReact, OutcomeModifier, ReactionDecider, ReactionDecision,
    ReactionDefinition, ReactionPrompt, ReactionResponse, ReactionScope, ReactionTrigger,
    TriggerOutcome,
};
pub use rules::{
    AdvantageState, DamageType, DiceExpr, HitOutcome, Modifier, ModifierCondition, ModifierKind,
    ModifierOwner, RollCategory, RollStream, RulesEngine,
};
pub use scenario::{ReactionGrant, Scenario};
pub use state::{
    Ability, AbilityScores, ActionBudget, ActionId, Area, Battlefield, CombatState, Combatant,
    CombatantId, CombatantStats, Controller, DeathSaves, Faction, LifeState, Position,
    ReactionId, ResourcePool, Resources, Side, StatusId, Zone, ZoneId,
};
pub use status::{
    InteractionRule, StatusApplication, StatusDefinition, StatusError, StatusFlags,
    StatusInstance, StatusInteraction, StatusManager, TickEffect, TickTiming,
};
