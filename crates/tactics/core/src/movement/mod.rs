//! Grid pathing and movement results.
//!
//! The engine walks a [`PathPreview`] tile by tile, raising `LEAVES_REACH`
//! reactions before each step and reporting zone entry and exit.
mod path;

pub use path::{PathPreview, find_path};

use crate::engine::{ActionToken, CombatPhase};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{CombatantId, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOutcome {
    pub token: ActionToken,
    pub mover: CombatantId,
    pub start: Position,
    pub end: Position,
    /// Tiles actually entered.
    pub waypoints: Vec<Position>,
    /// Movement spent.
    pub distance: u32,
    /// The move stopped before the destination.
    pub interrupted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("mover {0} not found")]
    MoverNotFound(CombatantId),

    #[error("it is not {0}'s turn")]
    NotMoversTurn(CombatantId),

    #[error("movement is not accepted during the {0} phase")]
    PhaseDisallows(CombatPhase),

    #[error("combatant {0} cannot move")]
    CannotMove(CombatantId),

    #[error("{0} is outside the battlefield")]
    OutOfBounds(Position),

    #[error("{0} is blocked")]
    Blocked(Position),

    #[error("{0} is occupied")]
    Occupied(Position),

    #[error("no path to {0}")]
    NoPath(Position),

    #[error("path needs {needed} movement, {available} left")]
    InsufficientMovement { needed: u32, available: u32 },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MoverNotFound(_) | Self::OutOfBounds(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MoverNotFound(_) => "MOVE_MOVER_NOT_FOUND",
            Self::NotMoversTurn(_) => "MOVE_NOT_MOVERS_TURN",
            Self::PhaseDisallows(_) => "MOVE_PHASE_DISALLOWS",
            Self::CannotMove(_) => "MOVE_CANNOT_MOVE",
            Self::OutOfBounds(_) => "MOVE_OUT_OF_BOUNDS",
            Self::Blocked(_) => "MOVE_BLOCKED",
            Self::Occupied(_) => "MOVE_OCCUPIED",
            Self::NoPath(_) => "MOVE_NO_PATH",
            Self::InsufficientMovement { .. } => "MOVE_INSUFFICIENT_MOVEMENT",
        }
    }
}
