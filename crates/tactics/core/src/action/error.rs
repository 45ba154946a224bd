use crate::engine::CombatPhase;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActionId, CombatantId, Position, ResourcePool};

/// Why an action request was rejected.
///
/// Validation happens before anything is spent, so a rejected action leaves
/// state untouched apart from the `ActionFailed` notification.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("actor {0} not found")]
    ActorNotFound(CombatantId),

    #[error("actor {0} cannot act")]
    ActorCannotAct(CombatantId),

    #[error("it is not {0}'s turn")]
    NotActorsTurn(CombatantId),

    #[error("actions are not accepted during the {0} phase")]
    PhaseDisallows(CombatPhase),

    #[error("unknown action `{0}`")]
    UnknownAction(ActionId),

    #[error("actor does not know action `{0}`")]
    ActionNotKnown(ActionId),

    #[error("target {0} not found")]
    TargetNotFound(CombatantId),

    #[error("target {0} is not a valid target for this action")]
    InvalidTarget(CombatantId),

    #[error("target {0} is dead")]
    TargetDead(CombatantId),

    #[error("the action needs a different kind of target")]
    WrongTargetKind,

    #[error("point {0} is outside the battlefield")]
    PointOutOfBounds(Position),

    #[error("target is {distance} tiles away, range is {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("{given} targets given, at most {max} allowed")]
    TooManyTargets { given: usize, max: u8 },

    #[error("not enough {0} left")]
    InsufficientResources(ResourcePool),

    #[error("the way to the target is blocked")]
    PathBlocked,
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAction(_)
            | Self::ActionNotKnown(_)
            | Self::TargetNotFound(_)
            | Self::InvalidTarget(_)
            | Self::WrongTargetKind
            | Self::PointOutOfBounds(_)
            | Self::TooManyTargets { .. }
            | Self::ActorNotFound(_) => ErrorSeverity::Validation,
            Self::ActorCannotAct(_)
            | Self::NotActorsTurn(_)
            | Self::PhaseDisallows(_)
            | Self::TargetDead(_)
            | Self::OutOfRange { .. }
            | Self::InsufficientResources(_)
            | Self::PathBlocked => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            Self::ActorCannotAct(_) => "ACTION_ACTOR_CANNOT_ACT",
            Self::NotActorsTurn(_) => "ACTION_NOT_ACTORS_TURN",
            Self::PhaseDisallows(_) => "ACTION_PHASE_DISALLOWS",
            Self::UnknownAction(_) => "ACTION_UNKNOWN",
            Self::ActionNotKnown(_) => "ACTION_NOT_KNOWN",
            Self::TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            Self::InvalidTarget(_) => "ACTION_INVALID_TARGET",
            Self::TargetDead(_) => "ACTION_TARGET_DEAD",
            Self::WrongTargetKind => "ACTION_WRONG_TARGET_KIND",
            Self::PointOutOfBounds(_) => "ACTION_POINT_OUT_OF_BOUNDS",
            Self::OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            Self::TooManyTargets { .. } => "ACTION_TOO_MANY_TARGETS",
            Self::InsufficientResources(_) => "ACTION_INSUFFICIENT_RESOURCES",
            Self::PathBlocked => "ACTION_PATH_BLOCKED",
        }
    }
}
