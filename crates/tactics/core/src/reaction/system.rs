use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::trace;

use crate::state::{CombatState, Combatant, CombatantId, ReactionId};
use crate::status::StatusManager;

use super::definition::{ReactionDefinition, ReactionScope, ReactionTrigger};
use super::prompt::{PromptId, ReactionPrompt, TriggerContext};
use super::stack::ResolutionStack;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Grant {
    combatant: CombatantId,
    reaction: ReactionId,
    seq: u32,
}

/// Registry of reaction definitions and grants, plus the resolution stack.
#[derive(Clone, Debug, Default)]
pub struct ReactionSystem {
    definitions: BTreeMap<ReactionId, ReactionDefinition>,
    grants: Vec<Grant>,
    next_prompt: u64,
    stack: ResolutionStack,
}

impl ReactionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: ReactionDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn definition(&self, reaction: &ReactionId) -> Option<&ReactionDefinition> {
        self.definitions.get(reaction)
    }

    pub fn is_registered(&self, reaction: &ReactionId) -> bool {
        self.definitions.contains_key(reaction)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ReactionDefinition> {
        self.definitions.values()
    }

    /// Makes `reaction` available to `combatant`. Returns false for unknown
    /// reactions and repeated grants.
    pub fn grant(&mut self, combatant: CombatantId, reaction: ReactionId) -> bool {
        if !self.is_registered(&reaction)
            || self
                .grants
                .iter()
                .any(|g| g.combatant == combatant && g.reaction == reaction)
        {
            return false;
        }
        let seq = self.grants.len() as u32;
        self.grants.push(Grant {
            combatant,
            reaction,
            seq,
        });
        true
    }

    pub fn grants_of(&self, combatant: CombatantId) -> impl Iterator<Item = &ReactionId> {
        self.grants
            .iter()
            .filter(move |g| g.combatant == combatant)
            .map(|g| &g.reaction)
    }

    pub fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    pub(crate) fn stack_mut(&mut self) -> &mut ResolutionStack {
        &mut self.stack
    }

    /// Eligible `(reactor, reaction)` pairs for `ctx`, in prompting order:
    /// priority descending, then initiative `rank`, then grant order.
    pub fn candidates(
        &self,
        ctx: &TriggerContext,
        state: &CombatState,
        statuses: &StatusManager,
        rank: impl Fn(CombatantId) -> usize,
    ) -> Vec<(CombatantId, ReactionId)> {
        let Some(source) = state.combatant(ctx.source) else {
            return Vec::new();
        };

        let mut eligible: Vec<(Reverse<i32>, usize, u32, CombatantId, ReactionId)> = self
            .grants
            .iter()
            .filter_map(|grant| {
                let def = self.definitions.get(&grant.reaction)?;
                let reactor = state.combatant(grant.combatant)?;
                self.is_eligible(def, reactor, source, ctx, statuses)
                    .then(|| {
                        (
                            Reverse(def.priority),
                            rank(reactor.id),
                            grant.seq,
                            reactor.id,
                            def.id.clone(),
                        )
                    })
            })
            .collect();
        eligible.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        trace!(
            target: "tactics::reaction",
            trigger = ?ctx.trigger,
            source = %ctx.source,
            count = eligible.len(),
            "reaction candidates"
        );
        eligible
            .into_iter()
            .map(|(_, _, _, reactor, reaction)| (reactor, reaction))
            .collect()
    }

    fn is_eligible(
        &self,
        def: &ReactionDefinition,
        reactor: &Combatant,
        source: &Combatant,
        ctx: &TriggerContext,
        statuses: &StatusManager,
    ) -> bool {
        if !def.triggers.intersects(ctx.trigger)
            || (def.spell_only && !ctx.spell)
            || !reactor.life_state.is_alive()
            || reactor.budget.reaction == 0
            || statuses.flags_of(reactor.id).blocks_reactions()
            || !reactor.is_hostile_to(source)
            || self.stack.involves(reactor.id)
        {
            return false;
        }
        if def.scope == ReactionScope::SelfTarget && ctx.target != Some(reactor.id) {
            return false;
        }

        if ctx.trigger.contains(ReactionTrigger::LEAVES_REACH) {
            let reach = if def.range > 0 { def.range } else { reactor.stats.reach };
            let Some(destination) = ctx.destination else {
                return false;
            };
            reactor.position.distance(ctx.position) <= reach
                && reactor.position.distance(destination) > reach
        } else {
            def.range == 0 || reactor.position.distance(ctx.position) <= def.range
        }
    }

    pub(crate) fn open_prompt(
        &mut self,
        reactor: CombatantId,
        reaction: ReactionId,
        context: TriggerContext,
    ) -> ReactionPrompt {
        self.next_prompt += 1;
        ReactionPrompt {
            id: PromptId(self.next_prompt),
            reactor,
            reaction,
            context,
            depth: self.stack.depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::reaction::ReactionResponse;
    use crate::rules::RulesEngine;
    use crate::state::{Battlefield, CombatantStats, Faction, Position, StatusId};
    use crate::status::{StatusApplication, StatusDefinition, StatusFlags};

    fn unit(id: u32, faction: Faction, x: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("unit-{id}"),
            faction,
            Position::new(x, 0),
            CombatantStats::default(),
        )
    }

    fn opportunity() -> ReactionDefinition {
        ReactionDefinition::new(
            "opportunity",
            "Opportunity Attack",
            ReactionTrigger::LEAVES_REACH,
            ReactionResponse::ExecuteAction("strike".into()),
        )
    }

    fn leave(from: i32, to: i32) -> TriggerContext {
        TriggerContext::new(ReactionTrigger::LEAVES_REACH, CombatantId(0), Position::new(from, 0))
            .with_destination(Position::new(to, 0))
    }

    #[test]
    fn leaving_reach_requires_crossing_its_edge() {
        let state = CombatState::new(
            Battlefield::new(10, 1),
            vec![unit(0, Faction::Party, 2), unit(1, Faction::Hostile, 3)],
        );
        let statuses = StatusManager::new();
        let mut reactions = ReactionSystem::new();
        reactions.register(opportunity());
        assert!(reactions.grant(CombatantId(1), "opportunity".into()));
        assert!(!reactions.grant(CombatantId(1), "opportunity".into()));

        let leaving = reactions.candidates(&leave(2, 1), &state, &statuses, |_| 0);
        assert_eq!(leaving, vec![(CombatantId(1), ReactionId::new("opportunity"))]);

        let staying = reactions.candidates(&leave(2, 4), &state, &statuses, |_| 0);
        assert!(staying.is_empty());
    }

    #[test]
    fn suppressed_or_spent_reactors_are_skipped() {
        let mut state = CombatState::new(
            Battlefield::new(10, 1),
            vec![unit(0, Faction::Party, 2), unit(1, Faction::Hostile, 3)],
        );
        let mut statuses = StatusManager::new();
        statuses.register(
            StatusDefinition::new("stunned", "Stunned").with_flags(StatusFlags::INCAPACITATED),
        );
        let mut reactions = ReactionSystem::new();
        reactions.register(opportunity());
        reactions.grant(CombatantId(1), "opportunity".into());

        let mut rules = RulesEngine::new(1, 20);
        let mut events = EventLog::default();
        statuses
            .apply_status(
                &mut rules,
                &mut events,
                StatusApplication::new(StatusId::new("stunned"), CombatantId(1)),
            )
            .expect("registered");
        assert!(reactions.candidates(&leave(2, 1), &state, &statuses, |_| 0).is_empty());

        let mut statuses = StatusManager::new();
        statuses.register(StatusDefinition::new("stunned", "Stunned"));
        if let Some(reactor) = state.combatant_mut(CombatantId(1)) {
            reactor.budget.reaction = 0;
        }
        assert!(reactions.candidates(&leave(2, 1), &state, &statuses, |_| 0).is_empty());
    }

    #[test]
    fn candidates_sort_by_priority_then_rank() {
        let state = CombatState::new(
            Battlefield::new(10, 1),
            vec![
                unit(0, Faction::Party, 0),
                unit(1, Faction::Hostile, 5),
                unit(2, Faction::Hostile, 6),
                unit(3, Faction::Hostile, 7),
            ],
        );
        let statuses = StatusManager::new();
        let mut reactions = ReactionSystem::new();
        reactions.register(ReactionDefinition::new(
            "jeer",
            "Jeer",
            ReactionTrigger::ACTION_DECLARED,
            ReactionResponse::Cancel,
        ));
        reactions.register(
            ReactionDefinition::new(
                "counter",
                "Counter",
                ReactionTrigger::ACTION_DECLARED,
                ReactionResponse::Cancel,
            )
            .with_priority(10),
        );
        reactions.grant(CombatantId(1), "jeer".into());
        reactions.grant(CombatantId(2), "jeer".into());
        reactions.grant(CombatantId(3), "counter".into());

        let ctx = TriggerContext::new(ReactionTrigger::ACTION_DECLARED, CombatantId(0), Position::ORIGIN);
        let order: Vec<CombatantId> = reactions
            .candidates(&ctx, &state, &statuses, |id| if id == CombatantId(2) { 0 } else { 1 })
            .into_iter()
            .map(|(reactor, _)| reactor)
            .collect();
        assert_eq!(order, vec![CombatantId(3), CombatantId(2), CombatantId(1)]);
    }
}
