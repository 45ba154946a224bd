//! The combat engine aggregate.
//!
//! [`CombatEngine`] owns every subsystem (state, turn queue, phase machine,
//! rules, statuses, reactions and the correlation layer) and is the only
//! place state changes. Its operations are spread over several files by
//! concern: lifecycle (turns and rounds), the action pipeline, effect
//! application, reaction resolution and movement.
mod builder;
mod correlation;
mod effects;
mod lifecycle;
mod movement;
mod phase;
mod pipeline;
mod reactions;
mod snapshot;
mod turns;

use std::collections::BTreeMap;

use crate::action::ActionDefinition;
use crate::config::CombatConfig;
use crate::events::{CombatEvent, EventLog};
use crate::reaction::ReactionSystem;
use crate::rules::{HitChanceQuery, Modifier, RollContext, RulesEngine};
use crate::state::{ActionId, CombatState, CombatantId, Controller, StatusId};
use crate::status::{RemovalReason, StatusApplication, StatusChange, StatusError, StatusManager};

pub use builder::{CombatEngineBuilder, ScenarioError};
pub use correlation::{ActionCorrelator, ActionToken};
pub use phase::{CombatPhase, PhaseMachine};
pub use snapshot::CombatSnapshot;
pub use turns::{TurnEntry, TurnError, TurnQueue};

/// Deterministic combat engine.
///
/// Built by [`CombatEngineBuilder`] (or [`CombatEngine::from_scenario`]) and
/// driven by the host through `start_combat`, `execute_action`, `move_to`,
/// `end_turn`, `complete_action` and `tick`. Notifications accumulate in an
/// outbox read with [`CombatEngine::drain_events`].
#[derive(Clone, Debug)]
pub struct CombatEngine {
    config: CombatConfig,
    state: CombatState,
    turns: TurnQueue,
    phase: PhaseMachine,
    correlator: ActionCorrelator,
    rules: RulesEngine,
    statuses: StatusManager,
    reactions: ReactionSystem,
    actions: BTreeMap<ActionId, ActionDefinition>,
    events: EventLog,
}

impl CombatEngine {
    pub fn builder(seed: u64) -> CombatEngineBuilder {
        CombatEngineBuilder::new(seed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase.current()
    }

    pub fn turns(&self) -> &TurnQueue {
        &self.turns
    }

    pub fn round(&self) -> u32 {
        self.turns.round()
    }

    pub fn current_combatant(&self) -> Option<CombatantId> {
        self.turns.current()
    }

    pub fn rules(&self) -> &RulesEngine {
        &self.rules
    }

    pub fn statuses(&self) -> &StatusManager {
        &self.statuses
    }

    pub fn reactions(&self) -> &ReactionSystem {
        &self.reactions
    }

    pub fn action(&self, id: &ActionId) -> Option<&ActionDefinition> {
        self.actions.get(id)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.values()
    }

    /// Token of the action or movement awaiting its completion signal.
    pub fn outstanding_token(&self) -> Option<ActionToken> {
        self.correlator.outstanding()
    }

    /// Events not yet drained.
    pub fn pending_events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    pub fn has_status(&self, combatant: CombatantId, status: &StatusId) -> bool {
        self.statuses.has_status(combatant, status)
    }

    /// Alive and not incapacitated.
    pub fn can_act(&self, combatant: CombatantId) -> bool {
        self.state
            .combatant(combatant)
            .is_some_and(|c| c.life_state.is_alive())
            && !self.statuses.flags_of(combatant).blocks_actions()
    }

    /// True once fewer than two sides field an `Alive` member.
    pub fn should_end_combat(&self) -> bool {
        self.state.standing_sides().len() < 2
    }

    /// Phase the machine should settle in for the combatant currently queued.
    pub fn decision_state_for_current(&self) -> CombatPhase {
        if self.should_end_combat() {
            return CombatPhase::CombatEnd;
        }
        let Some(current) = self.turns.current() else {
            return CombatPhase::CombatEnd;
        };
        if !self.can_act(current) {
            return CombatPhase::TurnEnd;
        }
        match self.state.combatant(current).map(|c| c.controller) {
            Some(Controller::Player) => CombatPhase::PlayerDecision,
            _ => CombatPhase::AiDecision,
        }
    }

    /// Analytic chance that `attacker` hits `target` with `action`.
    /// `None` if the action makes no attack roll or either combatant is missing.
    pub fn hit_chance(&self, attacker: CombatantId, target: CombatantId, action: &ActionId) -> Option<f32> {
        let def = self.actions.get(action)?;
        if !def.attack_type.is_attack() {
            return None;
        }
        let a = self.state.combatant(attacker)?;
        let t = self.state.combatant(target)?;
        Some(self.rules.hit_chance(&HitChanceQuery {
            attacker,
            target,
            attack_bonus: a.stats.attack_bonus(def.attack_type),
            defense: t.stats.armor_class,
            context: self
                .roll_context(attacker, target)
                .with_attack_type(def.attack_type),
        }))
    }

    // ========================================================================
    // Statuses and modifiers
    // ========================================================================

    /// Applies a status outside of an action (scenario setup, host scripting).
    pub fn apply_status(&mut self, application: StatusApplication) -> Result<StatusChange, StatusError> {
        let target = self
            .state
            .combatant(application.target)
            .ok_or(StatusError::TargetNotFound(application.target))?;
        if target.life_state.is_dead() {
            return Err(StatusError::TargetDead(application.target));
        }
        self.statuses
            .apply_status(&mut self.rules, &mut self.events, application)
    }

    pub fn remove_status(&mut self, target: CombatantId, status: &StatusId) -> bool {
        self.statuses.remove_status(
            &mut self.rules,
            &mut self.events,
            target,
            status,
            RemovalReason::Removed,
        )
    }

    pub fn add_modifier(&mut self, combatant: CombatantId, modifier: Modifier) {
        self.rules.add_modifier(combatant, modifier);
    }

    /// Context for a roll made by `source` against `target`.
    pub(crate) fn roll_context(&self, source: CombatantId, target: CombatantId) -> RollContext {
        let distance = match (self.state.combatant(source), self.state.combatant(target)) {
            (Some(s), Some(t)) => Some(s.position.distance(t.position)),
            _ => None,
        };
        RollContext {
            attack_type: None,
            damage_type: None,
            source_statuses: self.statuses.status_ids(source),
            target_statuses: self.statuses.status_ids(target),
            distance,
        }
    }
}
