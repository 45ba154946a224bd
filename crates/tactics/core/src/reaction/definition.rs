use bitflags::bitflags;

use crate::state::{ActionId, ReactionId};

bitflags! {
    /// Moments at which a reaction may interrupt resolution.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ReactionTrigger: u8 {
        /// An action was declared, before any roll.
        const ACTION_DECLARED = 1 << 0;
        /// An attack roll hit, before damage.
        const ATTACK_HIT = 1 << 1;
        /// Damage is about to be applied.
        const INCOMING_DAMAGE = 1 << 2;
        /// Damage was applied.
        const DAMAGED = 1 << 3;
        /// A combatant is about to step out of the reactor's reach.
        const LEAVES_REACH = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionScope {
    /// Any trigger whose source is hostile to the reactor.
    #[default]
    AnyHostileSource,
    /// Only triggers aimed at the reactor itself.
    SelfTarget,
}

/// Adjustment a `Modify` response makes to the triggering effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutcomeModifier {
    /// Added to the target's defence; the attack roll is re-evaluated.
    DefenseBonus(i32),
    /// Percentage added to incoming damage (negative reduces it).
    DamagePercent(i32),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionResponse {
    /// Run an action through the pipeline, aimed at the trigger source.
    ExecuteAction(ActionId),
    Modify(OutcomeModifier),
    /// Abort the triggering action.
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionDefinition {
    pub id: ReactionId,
    pub name: String,
    pub triggers: ReactionTrigger,
    /// Higher priorities are prompted first.
    pub priority: i32,
    /// Maximum distance to the trigger source; 0 means unlimited, or the
    /// reactor's own reach for `LEAVES_REACH`.
    pub range: u32,
    pub scope: ReactionScope,
    pub can_cancel: bool,
    pub can_modify: bool,
    /// Only answers spellcasting.
    pub spell_only: bool,
    pub response: ReactionResponse,
}

impl ReactionDefinition {
    pub fn new(
        id: impl Into<ReactionId>,
        name: impl Into<String>,
        triggers: ReactionTrigger,
        response: ReactionResponse,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            triggers,
            priority: 0,
            range: 0,
            scope: ReactionScope::AnyHostileSource,
            can_cancel: matches!(response, ReactionResponse::Cancel),
            can_modify: matches!(response, ReactionResponse::Modify(_)),
            spell_only: false,
            response,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn self_target(mut self) -> Self {
        self.scope = ReactionScope::SelfTarget;
        self
    }

    #[must_use]
    pub fn spell_only(mut self) -> Self {
        self.spell_only = true;
        self
    }

    /// Action this reaction runs, if its response executes one.
    pub fn action(&self) -> Option<&ActionId> {
        match &self.response {
            ReactionResponse::ExecuteAction(id) => Some(id),
            _ => None,
        }
    }
}
