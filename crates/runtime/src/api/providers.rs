//! Asynchronous abstractions for sourcing combatant intent and scenarios.
//!
//! Runtime users plug in [`DecisionProvider`] implementations so a combat can
//! run with human input, scripted fixtures, or AI policies. The runtime never
//! trusts a choice: every one is re-validated by the engine, and rejected
//! choices fall through to the alternates and finally to ending the turn.
use async_trait::async_trait;

use tactics_core::{ActionId, ActionTarget, CombatSnapshot, CombatantId, Position, Scenario};

use super::errors::Result;

/// Behavioural bias handed to AI providers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Profile {
    #[default]
    Aggressive,
    /// Prefers keeping distance and defensive options.
    Cautious,
    /// Prefers healing and buffing allies.
    Support,
}

/// One thing a combatant may do with its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Choice {
    UseAction { action: ActionId, target: ActionTarget },
    Move { destination: Position },
    EndTurn,
}

impl Choice {
    pub fn use_action(action: impl Into<ActionId>, target: ActionTarget) -> Self {
        Self::UseAction {
            action: action.into(),
            target,
        }
    }

    pub fn move_to(destination: Position) -> Self {
        Self::Move { destination }
    }
}

/// Best choice first, then fallbacks in preference order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedDecision {
    pub choice: Choice,
    pub alternates: Vec<Choice>,
}

impl RankedDecision {
    pub fn new(choice: Choice) -> Self {
        Self {
            choice,
            alternates: Vec::new(),
        }
    }

    pub fn end_turn() -> Self {
        Self::new(Choice::EndTurn)
    }

    #[must_use]
    pub fn with_alternate(mut self, choice: Choice) -> Self {
        self.alternates.push(choice);
        self
    }

    /// Choices in the order they should be tried.
    pub fn into_choices(self) -> impl Iterator<Item = Choice> {
        std::iter::once(self.choice).chain(self.alternates)
    }
}

#[derive(Clone, Debug)]
pub struct DecisionRequest {
    pub actor: CombatantId,
    pub profile: Profile,
    pub snapshot: CombatSnapshot,
}

/// Trait for choosing what the current combatant does next.
///
/// Called repeatedly within a turn until it returns [`Choice::EndTurn`] or
/// the runtime's per-turn choice limit is reached.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn decide(&self, request: DecisionRequest) -> Result<RankedDecision>;
}

/// Ends every turn immediately. Useful for testing or as a fallback.
pub struct EndTurnProvider;

#[async_trait]
impl DecisionProvider for EndTurnProvider {
    async fn decide(&self, _request: DecisionRequest) -> Result<RankedDecision> {
        Ok(RankedDecision::end_turn())
    }
}

/// Supplies the combat the runtime starts with.
#[async_trait]
pub trait ScenarioProvider: Send + Sync {
    async fn scenario(&self) -> Result<Scenario>;
}

/// A scenario fixed at construction.
pub struct StaticScenario(pub Scenario);

#[async_trait]
impl ScenarioProvider for StaticScenario {
    async fn scenario(&self) -> Result<Scenario> {
        Ok(self.0.clone())
    }
}
