//! Combat start, turn rotation, round bookkeeping and completion signals.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::CombatConfig;
use crate::events::CombatEvent;
use crate::rules::RollCategory;
use crate::state::{Ability, CombatantId, LifeState};
use crate::status::TickTiming;

use super::{ActionToken, CombatEngine, CombatPhase, TurnEntry, TurnError, TurnQueue};

impl CombatEngine {
    // ========================================================================
    // Combat start and end
    // ========================================================================

    /// Rolls initiative, seeds the turn queue and opens the first turn.
    /// Returns the initiative order.
    pub fn start_combat(&mut self) -> Result<Vec<CombatantId>, TurnError> {
        let phase = self.phase.current();
        if phase != CombatPhase::CombatStart {
            return Err(TurnError::PhaseDisallows(phase));
        }

        let roster: Vec<(CombatantId, i32, u32)> = self
            .state
            .present()
            .map(|c| {
                (
                    c.id,
                    c.stats.abilities.modifier(Ability::Dexterity),
                    c.spawn_order,
                )
            })
            .collect();
        let mut entries = Vec::with_capacity(roster.len());
        for (combatant, dex, spawn_order) in roster {
            let ctx = self.roll_context(combatant, combatant);
            let roll = self.rules.initiative(combatant, dex, &ctx);
            debug!(target: "tactics::turn", %combatant, initiative = roll.total, "initiative rolled");
            entries.push(TurnEntry {
                combatant,
                initiative: roll.total,
                spawn_order,
            });
        }

        self.turns = TurnQueue::seed(entries)?;
        let order = self.turns.order();
        info!(target: "tactics::turn", combatants = order.len(), "combat started");
        self.events.push(CombatEvent::CombatStarted {
            order: order.clone(),
        });

        if self.should_end_combat() {
            self.finish_combat("one side left standing");
        } else {
            self.phase
                .try_transition(CombatPhase::TurnStart, "combat started", &mut self.events);
            self.run_turns();
        }
        Ok(order)
    }

    /// Moves to `CombatEnd` and reports the winning side, if any.
    pub(crate) fn finish_combat(&mut self, reason: &str) {
        if self.phase.current().is_terminal() {
            return;
        }
        if let Some(token) = self.correlator.cancel() {
            debug!(target: "tactics::engine", %token, "outstanding token dropped at combat end");
        }
        self.phase
            .try_transition(CombatPhase::CombatEnd, reason, &mut self.events);

        let standing = self.state.standing_sides();
        let winner = match standing.as_slice() {
            [side] => Some(*side),
            _ => None,
        };
        let round = self.turns.round();
        info!(target: "tactics::engine", ?winner, round, reason, "combat ended");
        self.events.push(CombatEvent::CombatEnded { winner, round });
    }

    // ========================================================================
    // Turns
    // ========================================================================

    /// Ends the current combatant's turn and opens the next one.
    ///
    /// Accepted from a decision phase or while an action is still being
    /// presented; in the latter case the outstanding token is dropped.
    pub fn end_turn(&mut self) -> Result<(), TurnError> {
        let phase = self.phase.current();
        if !phase.is_decision() && phase != CombatPhase::ActionExecution {
            return Err(TurnError::PhaseDisallows(phase));
        }
        if let Some(token) = self.correlator.cancel() {
            debug!(target: "tactics::turn", %token, "turn ended before presentation completed");
        }
        self.phase
            .try_transition(CombatPhase::TurnEnd, "turn ended", &mut self.events);
        self.close_turn();
        self.run_turns();
        Ok(())
    }

    /// Opens turns until one lands in a decision phase or the combat ends.
    fn run_turns(&mut self) {
        let limit = self
            .turns
            .entries()
            .len()
            .saturating_mul(CombatConfig::MAX_IDLE_ROUNDS);
        let mut opened = 0;
        while self.phase.current() == CombatPhase::TurnStart {
            if opened >= limit {
                warn!(target: "tactics::turn", opened, "nobody able to act, calling the combat off");
                self.finish_combat("no combatant able to act");
                return;
            }
            opened += 1;
            self.open_turn();
        }
    }

    fn open_turn(&mut self) {
        let Some(current) = self.turns.current() else {
            self.finish_combat("turn queue exhausted");
            return;
        };
        let round = self.turns.round();
        debug!(target: "tactics::turn", round, %current, "turn started");
        self.events.push(CombatEvent::TurnChanged { round, current });

        self.refresh_budget(current);
        if self
            .state
            .combatant(current)
            .is_some_and(|c| c.life_state == LifeState::Downed)
        {
            self.roll_death_save(current);
        }
        self.resolve_ticks(current, TickTiming::TurnStart);

        match self.decision_state_for_current() {
            CombatPhase::CombatEnd => self.finish_combat("one side left standing"),
            CombatPhase::TurnEnd => {
                self.phase.try_transition(
                    CombatPhase::TurnEnd,
                    "combatant cannot act",
                    &mut self.events,
                );
                self.close_turn();
            }
            decision => {
                self.phase
                    .try_transition(decision, "awaiting decision", &mut self.events);
            }
        }
    }

    /// Turn-end ticks and expiry, then rotation to the next living entry.
    fn close_turn(&mut self) {
        if let Some(current) = self.turns.current() {
            self.resolve_ticks(current, TickTiming::TurnEnd);
            self.statuses
                .expire_turn(&mut self.rules, &mut self.events, current);
        }
        if self.should_end_combat() {
            self.finish_combat("one side left standing");
            return;
        }

        let state = &self.state;
        let advanced = self
            .turns
            .advance(|id| state.combatant(id).is_some_and(|c| !c.life_state.is_dead()));
        match advanced {
            Ok(true) => {
                self.phase
                    .try_transition(CombatPhase::RoundEnd, "round complete", &mut self.events);
                self.end_round();
                if self.should_end_combat() {
                    self.finish_combat("one side left standing");
                } else {
                    self.phase
                        .try_transition(CombatPhase::TurnStart, "new round", &mut self.events);
                }
            }
            Ok(false) => {
                self.phase
                    .try_transition(CombatPhase::TurnStart, "next turn", &mut self.events);
            }
            Err(err) => {
                warn!(target: "tactics::turn", %err, "turn rotation failed");
                self.finish_combat("no living combatant");
            }
        }
    }

    /// Round-end ticks, reaction refresh and zone ageing.
    fn end_round(&mut self) {
        let present: Vec<CombatantId> = self.state.present().map(|c| c.id).collect();
        for combatant in present {
            self.resolve_ticks(combatant, TickTiming::RoundEnd);
        }
        for combatant in &mut self.state.combatants {
            if !combatant.life_state.is_dead() {
                combatant.budget.reaction = 1;
            }
        }
        self.age_zones();
        debug!(target: "tactics::turn", round = self.turns.round(), "round ended");
    }

    /// Resets action, bonus action and movement. The reaction charge is
    /// only restored at round end.
    fn refresh_budget(&mut self, combatant: CombatantId) {
        let ctx = self.roll_context(combatant, combatant);
        let Some(speed) = self.state.combatant(combatant).map(|c| c.stats.speed) else {
            return;
        };
        let speed = i32::try_from(speed).unwrap_or(i32::MAX);
        let movement = self
            .rules
            .apply(speed, RollCategory::Movement, &[combatant], &ctx)
            .max(0) as u32;
        if let Some(c) = self.state.combatant_mut(combatant) {
            c.budget.action = 1;
            c.budget.bonus_action = 1;
            c.budget.movement = movement;
        }
    }

    fn roll_death_save(&mut self, combatant: CombatantId) {
        let natural = self.rules.stream_mut().d20();
        let Some(c) = self.state.combatant_mut(combatant) else {
            return;
        };
        let settle = CombatConfig::DEATH_SAVES_TO_SETTLE;
        let saves = &mut c.death_saves;
        let next = if natural == 20 {
            saves.reset();
            c.resources.hp = 1;
            LifeState::Alive
        } else {
            if natural == 1 {
                saves.failures = saves.failures.saturating_add(2);
            } else if natural >= CombatConfig::DEATH_SAVE_THRESHOLD {
                saves.successes = saves.successes.saturating_add(1);
            } else {
                saves.failures = saves.failures.saturating_add(1);
            }
            if saves.failures >= settle {
                LifeState::Dead
            } else if saves.successes >= settle {
                LifeState::Unconscious
            } else {
                LifeState::Downed
            }
        };
        debug!(
            target: "tactics::combatant",
            %combatant,
            natural,
            successes = c.death_saves.successes,
            failures = c.death_saves.failures,
            "death saving throw"
        );
        self.set_life_state(combatant, next);
    }

    // ========================================================================
    // Presentation correlation
    // ========================================================================

    /// Signals that the presentation of `token` finished. Stale or unknown
    /// tokens are ignored and return false.
    pub fn complete_action(&mut self, token: ActionToken) -> bool {
        self.resume_decision_state_if_executing("presentation complete", token)
    }

    /// Leaves `ActionExecution` if `token` is the outstanding one.
    pub fn resume_decision_state_if_executing(&mut self, reason: &str, token: ActionToken) -> bool {
        let phase = self.phase.current();
        if phase != CombatPhase::ActionExecution {
            debug!(target: "tactics::engine", %token, %phase, "completion outside action execution ignored");
            return false;
        }
        if !self.correlator.complete(token) {
            debug!(
                target: "tactics::engine",
                %token,
                outstanding = ?self.correlator.outstanding(),
                "stale completion ignored"
            );
            return false;
        }
        self.resume_decision_state(reason);
        true
    }

    /// Forces recovery when the outstanding token outlived its deadline.
    /// Returns true if a timeout fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(token) = self.correlator.expired(now) else {
            return false;
        };
        warn!(target: "tactics::engine", %token, "presentation timed out, forcing recovery");
        if self.phase.current() == CombatPhase::ActionExecution {
            self.resume_decision_state("presentation timed out");
        }
        true
    }

    /// Returns from `ActionExecution` to wherever the current turn belongs.
    pub(crate) fn resume_decision_state(&mut self, reason: &str) {
        match self.decision_state_for_current() {
            CombatPhase::CombatEnd => self.finish_combat(reason),
            CombatPhase::TurnEnd => {
                self.phase
                    .try_transition(CombatPhase::TurnEnd, reason, &mut self.events);
                self.close_turn();
                self.run_turns();
            }
            decision => {
                self.phase.try_transition(decision, reason, &mut self.events);
            }
        }
    }
}
