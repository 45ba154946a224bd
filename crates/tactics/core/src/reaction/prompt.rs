use std::fmt;

use crate::action::AttackType;
use crate::engine::CombatSnapshot;
use crate::state::{ActionId, CombatantId, Position, ReactionId};

use super::definition::ReactionTrigger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PromptId(pub u64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt#{}", self.0)
    }
}

/// What happened to cause a trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerContext {
    /// Exactly one trigger flag.
    pub trigger: ReactionTrigger,
    /// Combatant whose action or movement caused the trigger.
    pub source: CombatantId,
    /// Combatant the triggering effect is aimed at, if any.
    pub target: Option<CombatantId>,
    pub action: Option<ActionId>,
    pub spell: bool,
    pub attack_type: AttackType,
    /// Source position (the tile being left for `LEAVES_REACH`).
    pub position: Position,
    /// Tile being entered for `LEAVES_REACH`.
    pub destination: Option<Position>,
    /// Damage about to be, or just, dealt.
    pub amount: u32,
}

impl TriggerContext {
    pub fn new(trigger: ReactionTrigger, source: CombatantId, position: Position) -> Self {
        Self {
            trigger,
            source,
            target: None,
            action: None,
            spell: false,
            attack_type: AttackType::None,
            position,
            destination: None,
            amount: 0,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionId, attack_type: AttackType, spell: bool) -> Self {
        self.action = Some(action);
        self.attack_type = attack_type;
        self.spell = spell;
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: Position) -> Self {
        self.destination = Some(destination);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionDecision {
    Use,
    Decline,
}

/// An open question to one reactor. Consumed by [`ReactionPrompt::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionPrompt {
    pub id: PromptId,
    pub reactor: CombatantId,
    pub reaction: ReactionId,
    pub context: TriggerContext,
    /// Resolution stack depth at which the prompt was raised.
    pub depth: usize,
}

/// A decided prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptResolution {
    pub id: PromptId,
    pub reactor: CombatantId,
    pub reaction: ReactionId,
    pub context: TriggerContext,
    pub decision: ReactionDecision,
}

impl ReactionPrompt {
    pub fn resolve(self, decision: ReactionDecision) -> PromptResolution {
        PromptResolution {
            id: self.id,
            reactor: self.reactor,
            reaction: self.reaction,
            context: self.context,
            decision,
        }
    }
}

/// Answers reaction prompts synchronously while a trigger is being resolved.
pub trait ReactionDecider {
    fn decide(&mut self, prompt: &ReactionPrompt, snapshot: &CombatSnapshot) -> ReactionDecision;
}

impl<F> ReactionDecider for F
where
    F: FnMut(&ReactionPrompt, &CombatSnapshot) -> ReactionDecision,
{
    fn decide(&mut self, prompt: &ReactionPrompt, snapshot: &CombatSnapshot) -> ReactionDecision {
        self(prompt, snapshot)
    }
}

/// Uses every reaction offered.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysReact;

impl ReactionDecider for AlwaysReact {
    fn decide(&mut self, _: &ReactionPrompt, _: &CombatSnapshot) -> ReactionDecision {
        ReactionDecision::Use
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NeverReact;

impl ReactionDecider for NeverReact {
    fn decide(&mut self, _: &ReactionPrompt, _: &CombatSnapshot) -> ReactionDecision {
        ReactionDecision::Decline
    }
}
