//! Read-only view of the combat for AI decisions.

use std::collections::HashMap;

use tactics_core::{
    ActionDefinition, ActionId, CombatSnapshot, Combatant, CombatantId, EffectKind, TargetFilter,
};

use crate::api::Profile;

/// Blackboard shared by goal selection, candidate generation and scoring.
pub struct AiContext<'a> {
    pub actor: &'a Combatant,
    pub snapshot: &'a CombatSnapshot,
    pub profile: Profile,
    catalogue: &'a HashMap<ActionId, ActionDefinition>,
}

impl<'a> AiContext<'a> {
    /// Returns `None` if `actor` is not in the snapshot.
    pub fn new(
        actor: CombatantId,
        snapshot: &'a CombatSnapshot,
        profile: Profile,
        catalogue: &'a HashMap<ActionId, ActionDefinition>,
    ) -> Option<Self> {
        let actor = snapshot.combatant(actor)?;
        Some(Self {
            actor,
            snapshot,
            profile,
            catalogue,
        })
    }

    pub fn definition(&self, action: &ActionId) -> Option<&'a ActionDefinition> {
        self.catalogue.get(action)
    }

    /// Known actions the actor can pay for right now. Reaction-cost
    /// actions are left to the reaction system.
    pub fn affordable_actions(&self) -> impl Iterator<Item = &'a ActionDefinition> + '_ {
        self.actor
            .known_actions
            .iter()
            .filter_map(|id| self.catalogue.get(id))
            .filter(|def| def.cost.reaction == 0)
            .filter(|def| self.actor.budget.shortfall(&def.cost).is_none())
    }

    /// Living combatants hostile to the actor.
    pub fn enemies(&self) -> impl Iterator<Item = &'a Combatant> + '_ {
        self.snapshot
            .combatants
            .iter()
            .filter(|c| c.life_state.is_alive() && self.actor.is_hostile_to(c))
    }

    /// Living non-hostile combatants, the actor included.
    pub fn allies(&self) -> impl Iterator<Item = &'a Combatant> + '_ {
        self.snapshot
            .combatants
            .iter()
            .filter(|c| c.life_state.is_alive() && !self.actor.is_hostile_to(c))
    }

    pub fn distance_to(&self, other: &Combatant) -> u32 {
        self.actor.position.distance(other.position)
    }

    /// Closest enemy, lowest id on ties.
    pub fn nearest_enemy(&self) -> Option<&'a Combatant> {
        self.enemies()
            .min_by_key(|c| (self.distance_to(c), c.id))
    }

    /// Ally with the lowest HP share, if any ally is bloodied.
    pub fn most_wounded_ally(&self) -> Option<&'a Combatant> {
        self.allies()
            .filter(|c| c.is_bloodied())
            .min_by_key(|c| (hp_percent(c), c.id))
    }

    /// Actor HP as a percentage of its maximum.
    pub fn hp_percent(&self) -> u32 {
        hp_percent(self.actor)
    }

    pub fn can_heal(&self) -> bool {
        self.affordable_actions().any(heals)
    }

    /// Whether `filter` lets the actor target `other`.
    pub fn admits(&self, filter: TargetFilter, other: &Combatant) -> bool {
        match filter {
            TargetFilter::Any => true,
            TargetFilter::Enemies => self.actor.is_hostile_to(other),
            TargetFilter::Allies => !self.actor.is_hostile_to(other),
            TargetFilter::Others => other.id != self.actor.id,
        }
    }
}

fn hp_percent(combatant: &Combatant) -> u32 {
    let max = combatant.stats.max_hp.max(1);
    combatant.resources.hp.saturating_mul(100) / max
}

pub(crate) fn heals(def: &ActionDefinition) -> bool {
    def.effects
        .iter()
        .any(|e| matches!(e.kind, EffectKind::Heal { .. }))
}

/// Expected damage of an action in tenths, summed over its damage effects.
pub(crate) fn expected_damage_tenths(def: &ActionDefinition) -> i32 {
    def.effects
        .iter()
        .filter_map(|e| match &e.kind {
            EffectKind::Damage { dice, .. } => Some(dice.average_tenths()),
            _ => None,
        })
        .sum()
}
