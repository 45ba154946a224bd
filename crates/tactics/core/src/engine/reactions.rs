//! Prompting reactors and applying their responses.

use tracing::{debug, warn};

use crate::action::{ActionCost, ActionOptions, ActionRequest};
use crate::events::CombatEvent;
use crate::reaction::{
    PromptResolution, ReactionDecider, ReactionDecision, ReactionResponse, ResolutionFrame,
    TriggerContext, TriggerOutcome,
};
use crate::state::{CombatantId, ReactionId};

use super::{ActionToken, CombatEngine, CombatPhase};

impl CombatEngine {
    /// Eligible reactors for `ctx`, in prompting order.
    pub(crate) fn reaction_candidates(&self, ctx: &TriggerContext) -> Vec<(CombatantId, ReactionId)> {
        let turns = &self.turns;
        self.reactions
            .candidates(ctx, &self.state, &self.statuses, |id| turns.rank_of(id))
    }

    /// Prompts every eligible reactor for `ctx` and folds their responses.
    pub(crate) fn resolve_trigger(
        &mut self,
        ctx: TriggerContext,
        decider: &mut dyn ReactionDecider,
    ) -> TriggerOutcome {
        let candidates = self.reaction_candidates(&ctx);
        self.resolve_candidates(ctx, candidates, decider)
    }

    /// Prompts `candidates` in order. A cancel ends the window: later
    /// reactors are not asked.
    pub(crate) fn resolve_candidates(
        &mut self,
        ctx: TriggerContext,
        candidates: Vec<(CombatantId, ReactionId)>,
        decider: &mut dyn ReactionDecider,
    ) -> TriggerOutcome {
        let mut outcome = TriggerOutcome::default();
        if candidates.is_empty() {
            return outcome;
        }
        if self.reactions.stack().is_full() {
            warn!(
                target: "tactics::reaction",
                trigger = ?ctx.trigger,
                depth = self.reactions.stack().depth(),
                "resolution depth exceeded, no reaction used"
            );
            return outcome;
        }

        let opened = self.phase.current() == CombatPhase::ActionExecution
            && self.phase.try_transition(
                CombatPhase::ReactionPrompt,
                "reaction window opened",
                &mut self.events,
            );

        for (reactor, reaction) in candidates {
            if outcome.is_cancelled() {
                break;
            }
            // An earlier response may have downed or spent this reactor.
            if !self.can_still_react(reactor) {
                continue;
            }

            let prompt = self.reactions.open_prompt(reactor, reaction, ctx.clone());
            self.events.push(CombatEvent::ReactionPromptCreated {
                prompt: prompt.clone(),
            });
            let decision = decider.decide(&prompt, &self.snapshot());
            let resolved = prompt.resolve(decision);
            debug!(
                target: "tactics::reaction",
                prompt = %resolved.id,
                reactor = %resolved.reactor,
                reaction = %resolved.reaction,
                %decision,
                "reaction prompt resolved"
            );
            self.events.push(CombatEvent::ReactionPromptResolved {
                prompt: resolved.id,
                reactor: resolved.reactor,
                reaction: resolved.reaction.clone(),
                decision,
            });

            if decision == ReactionDecision::Use {
                self.use_reaction(resolved, &mut outcome, decider);
            }
        }

        if opened {
            self.phase.try_transition(
                CombatPhase::ActionExecution,
                "reaction window closed",
                &mut self.events,
            );
        }
        outcome
    }

    fn can_still_react(&self, reactor: CombatantId) -> bool {
        self.state
            .combatant(reactor)
            .is_some_and(|c| c.life_state.is_alive() && c.budget.reaction > 0)
            && !self.statuses.flags_of(reactor).blocks_reactions()
    }

    fn use_reaction(
        &mut self,
        resolved: PromptResolution,
        outcome: &mut TriggerOutcome,
        decider: &mut dyn ReactionDecider,
    ) {
        let Some(def) = self.reactions.definition(&resolved.reaction).cloned() else {
            warn!(target: "tactics::reaction", reaction = %resolved.reaction, "reaction definition missing");
            return;
        };
        let frame = ResolutionFrame {
            prompt: resolved.id,
            reactor: resolved.reactor,
            reaction: resolved.reaction.clone(),
            trigger: resolved.context.trigger,
            depth: self.reactions.stack().depth(),
        };
        if self.reactions.stack_mut().push(frame).is_err() {
            warn!(target: "tactics::reaction", reaction = %def.id, "resolution depth exceeded, no reaction used");
            return;
        }

        let spent = self
            .state
            .combatant_mut(resolved.reactor)
            .is_some_and(|c| c.budget.spend(&ActionCost::REACTION).is_ok());
        if !spent {
            warn!(target: "tactics::reaction", reactor = %resolved.reactor, "reactor has no reaction left");
            self.reactions.stack_mut().pop();
            return;
        }

        match &def.response {
            ReactionResponse::ExecuteAction(action) => {
                let request = ActionRequest::at_unit(resolved.reactor, action.clone(), resolved.context.source)
                    .with_options(ActionOptions::REACTION);
                let prompting = self.phase.current() == CombatPhase::ReactionPrompt
                    && self.phase.try_transition(
                        CombatPhase::ActionExecution,
                        "reaction action",
                        &mut self.events,
                    );
                if let Err(err) = self.run_action(&request, ActionToken::UNCORRELATED, decider) {
                    debug!(target: "tactics::reaction", reaction = %def.id, %err, "reaction action failed");
                }
                if prompting {
                    self.phase.try_transition(
                        CombatPhase::ReactionPrompt,
                        "reaction action resolved",
                        &mut self.events,
                    );
                }
            }
            ReactionResponse::Modify(modifier) if def.can_modify => outcome.apply(*modifier),
            ReactionResponse::Cancel if def.can_cancel => {
                outcome.cancelled_by = Some((resolved.reactor, def.id.clone()));
            }
            other => {
                warn!(target: "tactics::reaction", reaction = %def.id, ?other, "response not permitted by definition");
            }
        }

        self.reactions.stack_mut().pop();
    }
}
