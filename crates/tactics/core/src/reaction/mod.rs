//! Out-of-turn reactions.
//!
//! Definitions are registered once and granted to combatants. When the engine
//! hits a trigger point it asks [`ReactionSystem::candidates`] for eligible
//! reactors, prompts each through a [`ReactionDecider`] and folds the
//! responses into a [`TriggerOutcome`]. Reactions raised while another is
//! resolving nest on the [`ResolutionStack`].
mod definition;
mod prompt;
mod stack;
mod system;

pub use definition::{
    OutcomeModifier, ReactionDefinition, ReactionResponse, ReactionScope, ReactionTrigger,
};
pub use prompt::{
    AlwaysReact, NeverReact, PromptId, PromptResolution, ReactionDecider, ReactionDecision,
    ReactionPrompt, TriggerContext,
};
pub use stack::{ResolutionFrame, ResolutionStack};
pub use system::ReactionSystem;

use crate::state::{CombatantId, ReactionId};

/// Accumulated effect of the reactions answering one trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub cancelled_by: Option<(CombatantId, ReactionId)>,
    pub defense_bonus: i32,
    pub damage_adjust_percent: i32,
}

impl TriggerOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_by.is_some()
    }

    pub fn is_modified(&self) -> bool {
        self.defense_bonus != 0 || self.damage_adjust_percent != 0
    }

    pub fn apply(&mut self, modifier: OutcomeModifier) {
        match modifier {
            OutcomeModifier::DefenseBonus(bonus) => self.defense_bonus += bonus,
            OutcomeModifier::DamagePercent(percent) => self.damage_adjust_percent += percent,
        }
    }

    /// Scales `amount` by the accumulated damage adjustment, never below zero.
    pub fn adjust_damage(&self, amount: u32) -> u32 {
        if self.damage_adjust_percent == 0 {
            return amount;
        }
        let scaled = i64::from(amount) * i64::from(100 + self.damage_adjust_percent) / 100;
        u32::try_from(scaled.max(0)).unwrap_or(u32::MAX)
    }
}
