//! Runtime orchestration for the tactical combat engine.
//!
//! This crate wraps the synchronous [`tactics_core::CombatEngine`] in a worker
//! thread, feeds presentation timelines to a [`Presenter`], and asks decision
//! providers what each combatant does next. Consumers embed [`Runtime`] to
//! drive a combat, subscribe to events, and answer reaction prompts through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`presentation`] turns engine results into timelines and completes them
//! - [`providers`] ships the goal-based AI decision provider
//! - `workers` keeps the simulation thread internal to the crate
pub mod api;
pub mod events;
pub mod presentation;
pub mod providers;
pub mod runtime;

mod workers;

pub use api::{
    Choice, DecisionPoint, DecisionProvider, DecisionRequest, EndTurnProvider, Profile,
    ProviderKind, RankedDecision, Result, RuntimeError, RuntimeHandle, ScenarioProvider,
    StaticScenario, Submitted,
};
pub use events::{Event, EventBus, Topic};
pub use presentation::{
    AnimationShape, Completer, FixedDelayPresenter, ImmediatePresenter, Marker, MarkerKind,
    Presenter, SilentPresenter, Timeline,
};
pub use providers::GoalBasedAiProvider;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, StepOutcome};
