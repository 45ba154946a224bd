//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, engine validation, and decision
//! providers so clients can bubble them up with consistent context.
use std::fmt;

use thiserror::Error;
use tokio::sync::oneshot;

use tactics_core::reaction::PromptId;
use tactics_core::{
    ActionError, CombatantId, ErrorSeverity, GameError, MoveError, ScenarioError, TurnError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} decision provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("decision provider failed: {0}")]
    Provider(String),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("failed to spawn the simulation worker thread")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("simulation worker thread panicked")]
    WorkerPanicked,

    #[error("runtime requires a scenario provider before building")]
    MissingScenario,

    #[error("scenario rejected")]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("action rejected")]
    ActionRejected(#[from] ActionError),

    #[error("movement rejected")]
    MoveRejected(#[from] MoveError),

    #[error("choice submitted for {provided} but it is {expected:?}'s turn")]
    WrongActor {
        expected: Option<CombatantId>,
        provided: CombatantId,
    },

    #[error("a reaction prompt is awaiting an answer")]
    AwaitingReaction,

    #[error("{0} is not the open reaction prompt")]
    UnknownPrompt(PromptId),

    #[error("combat is over")]
    CombatOver,
}

impl RuntimeError {
    /// Whether the rejection came from engine validation, so that an
    /// alternate choice may still succeed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ActionRejected(_) | Self::MoveRejected(_) | Self::WrongActor { .. }
        )
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActionRejected(err) => err.severity(),
            Self::MoveRejected(err) => err.severity(),
            Self::Turn(err) => err.severity(),
            Self::Scenario(_) | Self::MissingScenario | Self::ProviderNotSet { .. } => {
                ErrorSeverity::Validation
            }
            Self::WrongActor { .. }
            | Self::AwaitingReaction
            | Self::UnknownPrompt(_)
            | Self::CombatOver
            | Self::Provider(_) => ErrorSeverity::Recoverable,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
            Self::WorkerSpawn(_) | Self::WorkerPanicked => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ProviderNotSet { .. } => "RUNTIME_PROVIDER_NOT_SET",
            Self::Provider(_) => "RUNTIME_PROVIDER_FAILED",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerSpawn(_) => "RUNTIME_WORKER_SPAWN",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::WorkerPanicked => "RUNTIME_WORKER_PANICKED",
            Self::MissingScenario => "RUNTIME_MISSING_SCENARIO",
            Self::Scenario(_) => "RUNTIME_SCENARIO_REJECTED",
            Self::Turn(err) => err.error_code(),
            Self::ActionRejected(err) => err.error_code(),
            Self::MoveRejected(err) => err.error_code(),
            Self::WrongActor { .. } => "RUNTIME_WRONG_ACTOR",
            Self::AwaitingReaction => "RUNTIME_AWAITING_REACTION",
            Self::UnknownPrompt(_) => "RUNTIME_UNKNOWN_PROMPT",
            Self::CombatOver => "RUNTIME_COMBAT_OVER",
        }
    }
}

/// Which provider answers for a combatant, by its controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Player,
    Ai,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Player => "player",
            ProviderKind::Ai => "ai",
        };
        write!(f, "{}", label)
    }
}

impl From<tactics_core::Controller> for ProviderKind {
    fn from(controller: tactics_core::Controller) -> Self {
        match controller {
            tactics_core::Controller::Player => ProviderKind::Player,
            tactics_core::Controller::Ai => ProviderKind::Ai,
        }
    }
}
