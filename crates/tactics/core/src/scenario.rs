//! Plain data bundle describing a combat before it starts.

use crate::action::ActionDefinition;
use crate::reaction::ReactionDefinition;
use crate::state::{Battlefield, Combatant, CombatantId, ReactionId};
use crate::status::{StatusDefinition, StatusInteraction};

/// Makes a registered reaction available to one combatant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionGrant {
    pub combatant: CombatantId,
    pub reaction: ReactionId,
}

/// Everything needed to build a [`crate::CombatEngine`].
///
/// Validation happens in [`crate::CombatEngine::from_scenario`]; a scenario
/// itself may hold dangling references.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub seed: u64,
    pub battlefield: Battlefield,
    pub roster: Vec<Combatant>,
    pub actions: Vec<ActionDefinition>,
    pub statuses: Vec<StatusDefinition>,
    pub interactions: Vec<StatusInteraction>,
    pub reactions: Vec<ReactionDefinition>,
    pub grants: Vec<ReactionGrant>,
}

impl Scenario {
    pub fn new(seed: u64, battlefield: Battlefield) -> Self {
        Self {
            seed,
            battlefield,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn grant(&mut self, combatant: CombatantId, reaction: impl Into<ReactionId>) {
        self.grants.push(ReactionGrant {
            combatant,
            reaction: reaction.into(),
        });
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.iter().find(|c| c.id == id)
    }
}
