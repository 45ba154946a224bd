//! The action pipeline: validate, spend, declare, roll, apply, replay.

use std::time::Instant;

use tracing::{debug, info};

use crate::action::{
    ActionDefinition, ActionError, ActionRequest, ActionResult, EffectKind, TargetOutcome,
    resolve_targets,
};
use crate::events::CombatEvent;
use crate::reaction::{ReactionDecider, ReactionTrigger, TriggerContext};
use crate::rules::{AttackQuery, DamageQuery, DamageType, HitOutcome, SaveQuery};
use crate::state::CombatantId;
use crate::status::{RemovalReason, StatusApplication};

use super::{ActionToken, CombatEngine, CombatPhase};

impl CombatEngine {
    /// Executes an action for the combatant whose turn it is.
    ///
    /// On success the engine stays in `ActionExecution` until the returned
    /// token is completed through [`CombatEngine::complete_action`] or the
    /// execution timeout passes. On failure nothing is spent and the
    /// decision phase is restored at once.
    pub fn execute_action(
        &mut self,
        request: ActionRequest,
        now: Instant,
        decider: &mut dyn ReactionDecider,
    ) -> Result<ActionResult, ActionError> {
        let phase = self.phase.current();
        if !phase.is_decision() {
            return Err(ActionError::PhaseDisallows(phase));
        }
        if self.turns.current() != Some(request.actor) {
            return Err(ActionError::NotActorsTurn(request.actor));
        }

        let token = self.correlator.begin(now, self.config.execution_timeout);
        self.phase.try_transition(
            CombatPhase::ActionExecution,
            "action started",
            &mut self.events,
        );

        match self.run_action(&request, token, decider) {
            Ok(result) => {
                if self.should_end_combat() {
                    self.finish_combat("one side left standing");
                }
                Ok(result)
            }
            Err(error) => {
                debug!(
                    target: "tactics::action",
                    %token,
                    actor = %request.actor,
                    action = %request.action,
                    %error,
                    "action rejected"
                );
                self.events.push(CombatEvent::ActionFailed {
                    token,
                    actor: request.actor,
                    action: request.action.clone(),
                    error: error.clone(),
                });
                self.correlator.complete(token);
                self.resume_decision_state("action failed, selection cleared, decision phase restored");
                Err(error)
            }
        }
    }

    /// Validates and resolves an action without phase gating or token issue.
    /// Reactions reuse this to run their response actions.
    pub(crate) fn run_action(
        &mut self,
        request: &ActionRequest,
        token: ActionToken,
        decider: &mut dyn ReactionDecider,
    ) -> Result<ActionResult, ActionError> {
        let def = self
            .actions
            .get(&request.action)
            .cloned()
            .ok_or_else(|| ActionError::UnknownAction(request.action.clone()))?;
        let actor = self
            .state
            .combatant(request.actor)
            .ok_or(ActionError::ActorNotFound(request.actor))?;
        if !actor.life_state.is_alive() || self.statuses.flags_of(actor.id).blocks_actions() {
            return Err(ActionError::ActorCannotAct(actor.id));
        }
        if !request.options.as_reaction && !actor.knows(&def.id) {
            return Err(ActionError::ActionNotKnown(def.id.clone()));
        }
        let targets = resolve_targets(&self.state, actor, &def, &request.target)?;
        let actor_id = actor.id;
        let actor_position = actor.position;

        if !request.options.skip_cost_validation {
            self.state
                .combatant_mut(actor_id)
                .ok_or(ActionError::ActorNotFound(actor_id))?
                .budget
                .spend(&def.cost)
                .map_err(ActionError::InsufficientResources)?;
        }

        let mut result = ActionResult::new(token, actor_id, def.id.clone(), def.attack_type);
        result.point = targets.point;

        let mut declared = TriggerContext::new(ReactionTrigger::ACTION_DECLARED, actor_id, actor_position)
            .with_action(def.id.clone(), def.attack_type, def.spell);
        if let Some(&first) = targets.units.first() {
            declared = declared.with_target(first);
        }
        let declared = self.resolve_trigger(declared, decider);
        if let Some(cancel) = declared.cancelled_by {
            info!(
                target: "tactics::action",
                actor = %actor_id,
                action = %def.id,
                by = %cancel.0,
                reaction = %cancel.1,
                "action cancelled"
            );
            result.cancelled_by = Some(cancel);
            self.events.push(CombatEvent::ActionExecuted {
                result: result.clone(),
            });
            return Ok(result);
        }

        for &tile in &targets.approach {
            self.relocate(actor_id, tile);
        }
        result.approach = targets.approach.clone();

        if let (Some(spec), Some(area)) = (&def.zone, targets.area) {
            result.zone = Some(self.create_zone(actor_id, &def, area, spec));
        }

        let passes = if def.allows_extra_attacks() {
            1 + self
                .state
                .combatant(actor_id)
                .map_or(0, |c| c.stats.extra_attacks)
        } else {
            1
        };
        for pass in 0..passes {
            if pass > 0 && !self.can_act(actor_id) {
                break;
            }
            for &target in &targets.units {
                let gone = self
                    .state
                    .combatant(target)
                    .is_none_or(|c| c.life_state.is_dead());
                if gone {
                    continue;
                }
                let outcome = self.resolve_target(&def, actor_id, target, pass, decider);
                result.outcomes.push(outcome);
            }
        }

        info!(
            target: "tactics::action",
            %token,
            actor = %actor_id,
            action = %def.id,
            targets = targets.units.len(),
            damage = result.total_damage(),
            "action executed"
        );
        self.events.push(CombatEvent::ActionExecuted {
            result: result.clone(),
        });
        Ok(result)
    }

    fn resolve_target(
        &mut self,
        def: &ActionDefinition,
        actor: CombatantId,
        target: CombatantId,
        pass: u8,
        decider: &mut dyn ReactionDecider,
    ) -> TargetOutcome {
        let life_state = self
            .state
            .combatant(target)
            .map(|c| c.life_state)
            .unwrap_or_default();
        let mut outcome = TargetOutcome::new(target, pass, life_state);
        let (Some(a), Some(t)) = (self.state.combatant(actor), self.state.combatant(target)) else {
            return outcome;
        };
        let (attack_bonus, spell_dc, actor_position) =
            (a.stats.attack_bonus(def.attack_type), a.stats.spell_save_dc(), a.position);
        let (armor_class, save_bonus) = (
            t.stats.armor_class,
            def.save.map(|spec| t.stats.save_bonus(spec.ability)),
        );
        let context = self
            .roll_context(actor, target)
            .with_attack_type(def.attack_type);

        let mut hit = None;
        if def.attack_type.is_attack() {
            let mut roll = self.rules.attack(&AttackQuery {
                attacker: actor,
                target,
                attack_type: def.attack_type,
                attack_bonus,
                defense: armor_class,
                context: context.clone(),
            });
            if roll.outcome.is_hit() {
                let ctx = TriggerContext::new(ReactionTrigger::ATTACK_HIT, actor, actor_position)
                    .with_target(target)
                    .with_action(def.id.clone(), def.attack_type, def.spell);
                let reaction = self.resolve_trigger(ctx, decider);
                if reaction.defense_bonus != 0 {
                    roll = roll.with_defense_bonus(reaction.defense_bonus);
                    outcome.modified_by_reaction = true;
                }
                if reaction.is_cancelled() {
                    roll.outcome = HitOutcome::Miss;
                    outcome.modified_by_reaction = true;
                }
            }
            hit = Some(roll.outcome);
            outcome.attack = Some(roll);
        }

        let mut saved = None;
        if let (Some(spec), Some(save_bonus)) = (def.save, save_bonus) {
            let roll = self.rules.save(&SaveQuery {
                target,
                ability: spec.ability,
                save_bonus,
                dc: spec.dc.unwrap_or(spell_dc),
                context: context.clone(),
            });
            saved = Some(roll.success);
            outcome.save = Some(roll);
        }

        let critical = hit == Some(HitOutcome::Critical);
        for effect in &def.effects {
            if !effect.condition.holds(hit, saved) {
                continue;
            }
            if self
                .state
                .combatant(target)
                .is_none_or(|c| c.life_state.is_dead())
            {
                break;
            }
            match &effect.kind {
                EffectKind::Damage {
                    dice,
                    damage_type,
                    half_on_save,
                    instant_death,
                } => {
                    let roll = self.rules.damage(&DamageQuery {
                        source: actor,
                        target,
                        dice: *dice,
                        damage_type: *damage_type,
                        critical,
                        context: context.clone().with_damage_type(*damage_type),
                    });
                    let mut amount = roll.total;
                    if *half_on_save && saved == Some(true) {
                        amount /= 2;
                    }
                    let (dealt, modified) = self.damage_with_reactions(
                        def,
                        actor,
                        target,
                        amount,
                        *damage_type,
                        critical,
                        *instant_death,
                        decider,
                    );
                    outcome.damage += dealt;
                    outcome.modified_by_reaction |= modified;
                }
                EffectKind::Heal { dice } => {
                    let rolled = dice.roll(self.rules.stream_mut()).total.max(0) as u32;
                    outcome.healed += self.heal(target, rolled);
                }
                EffectKind::ForcedMove {
                    distance,
                    direction,
                } => {
                    if let Some(to) = self.forced_move(actor, target, *distance, *direction) {
                        outcome.moved_to = Some(to);
                    }
                }
                EffectKind::ApplyStatus {
                    status,
                    duration,
                    stacks,
                } => {
                    let mut application = StatusApplication::new(status.clone(), target)
                        .from_source(actor)
                        .with_stacks(*stacks);
                    if let Some(turns) = duration {
                        application = application.for_turns(*turns);
                    }
                    match self.apply_status(application) {
                        Ok(change) => {
                            outcome.applied.push(status.clone());
                            outcome.removed.extend(change.removed);
                        }
                        Err(err) => {
                            debug!(target: "tactics::action", %target, %status, %err, "status not applied");
                        }
                    }
                }
                EffectKind::RemoveStatus { status } => {
                    if self.statuses.remove_status(
                        &mut self.rules,
                        &mut self.events,
                        target,
                        status,
                        RemovalReason::Removed,
                    ) {
                        outcome.removed.push(status.clone());
                    }
                }
            }
        }

        outcome.life_state = self
            .state
            .combatant(target)
            .map(|c| c.life_state)
            .unwrap_or(outcome.life_state);
        outcome
    }

    /// `INCOMING_DAMAGE` reactions, then damage, then `DAMAGED` reactions.
    #[allow(clippy::too_many_arguments)]
    fn damage_with_reactions(
        &mut self,
        def: &ActionDefinition,
        actor: CombatantId,
        target: CombatantId,
        amount: u32,
        damage_type: DamageType,
        critical: bool,
        instant_death: bool,
        decider: &mut dyn ReactionDecider,
    ) -> (u32, bool) {
        let position = self
            .state
            .combatant(actor)
            .map(|c| c.position)
            .unwrap_or_default();
        let base = TriggerContext::new(ReactionTrigger::INCOMING_DAMAGE, actor, position)
            .with_target(target)
            .with_action(def.id.clone(), def.attack_type, def.spell);

        let incoming = self.resolve_trigger(base.clone().with_amount(amount), decider);
        let amount = if incoming.is_cancelled() {
            0
        } else {
            incoming.adjust_damage(amount)
        };
        let modified = incoming.is_modified() || incoming.is_cancelled();

        let dealt = self.deal_damage(Some(actor), target, amount, damage_type, critical, instant_death);
        if dealt > 0 {
            let mut damaged = base.with_amount(dealt);
            damaged.trigger = ReactionTrigger::DAMAGED;
            self.resolve_trigger(damaged, decider);
        }
        (dealt, modified)
    }
}
