//! Notifications produced by the engine.
//!
//! The engine never calls out to observers. Every notable change is appended
//! to an [`EventLog`] outbox in the order it happened; hosts drain it after
//! each call and fan the events out by [`Topic`].

use crate::action::{ActionError, ActionResult};
use crate::engine::{ActionToken, CombatPhase};
use crate::movement::{MoveError, MoveOutcome};
use crate::reaction::{PromptId, ReactionDecision, ReactionPrompt};
use crate::rules::DamageType;
use crate::state::{ActionId, CombatantId, LifeState, ReactionId, Side, StatusId, ZoneId};
use crate::status::RemovalReason;

/// Subscription topics.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    Phase,
    Turn,
    Action,
    Status,
    Reaction,
    Area,
    Combatant,
}

/// What a status tick did to its bearer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickResult {
    Damage { amount: u32, damage_type: DamageType },
    Heal { amount: u32 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    CombatStarted {
        order: Vec<CombatantId>,
    },
    CombatEnded {
        winner: Option<Side>,
        round: u32,
    },
    PhaseChanged {
        from: CombatPhase,
        to: CombatPhase,
        reason: String,
    },
    TurnChanged {
        round: u32,
        current: CombatantId,
    },
    ActionExecuted {
        result: ActionResult,
    },
    ActionFailed {
        token: ActionToken,
        actor: CombatantId,
        action: ActionId,
        error: ActionError,
    },
    MovementCompleted {
        outcome: MoveOutcome,
    },
    MovementFailed {
        token: ActionToken,
        mover: CombatantId,
        error: MoveError,
    },
    StatusApplied {
        target: CombatantId,
        status: StatusId,
        source: Option<CombatantId>,
        stacks: u8,
        refreshed: bool,
    },
    StatusRemoved {
        target: CombatantId,
        status: StatusId,
        reason: RemovalReason,
    },
    StatusTicked {
        target: CombatantId,
        status: StatusId,
        result: TickResult,
    },
    ReactionPromptCreated {
        prompt: ReactionPrompt,
    },
    ReactionPromptResolved {
        prompt: PromptId,
        reactor: CombatantId,
        reaction: ReactionId,
        decision: ReactionDecision,
    },
    AreaEntered {
        zone: ZoneId,
        combatant: CombatantId,
    },
    AreaLeft {
        zone: ZoneId,
        combatant: CombatantId,
    },
    LifeStateChanged {
        combatant: CombatantId,
        from: LifeState,
        to: LifeState,
    },
}

impl CombatEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::CombatStarted { .. } | Self::CombatEnded { .. } | Self::PhaseChanged { .. } => {
                Topic::Phase
            }
            Self::TurnChanged { .. } => Topic::Turn,
            Self::ActionExecuted { .. }
            | Self::ActionFailed { .. }
            | Self::MovementCompleted { .. }
            | Self::MovementFailed { .. } => Topic::Action,
            Self::StatusApplied { .. } | Self::StatusRemoved { .. } | Self::StatusTicked { .. } => {
                Topic::Status
            }
            Self::ReactionPromptCreated { .. } | Self::ReactionPromptResolved { .. } => {
                Topic::Reaction
            }
            Self::AreaEntered { .. } | Self::AreaLeft { .. } => Topic::Area,
            Self::LifeStateChanged { .. } => Topic::Combatant,
        }
    }
}

/// Ordered outbox of events not yet handed to the host.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
