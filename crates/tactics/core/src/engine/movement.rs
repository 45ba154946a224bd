//! Voluntary movement with opportunity reactions.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::events::CombatEvent;
use crate::movement::{MoveError, MoveOutcome, PathPreview, find_path};
use crate::reaction::{ReactionDecider, ReactionTrigger, TriggerContext};
use crate::state::{CombatantId, Position};
use crate::status::StatusFlags;

use super::{CombatEngine, CombatPhase};

impl CombatEngine {
    /// Cheapest route for `mover`, ignoring phase and budget.
    pub fn preview_path(&self, mover: CombatantId, destination: Position) -> Result<PathPreview, MoveError> {
        let combatant = self
            .state
            .combatant(mover)
            .ok_or(MoveError::MoverNotFound(mover))?;
        find_path(&self.state, combatant, destination)
    }

    /// Checks everything `move_to` would, without moving.
    pub fn can_move_to(&self, mover: CombatantId, destination: Position) -> Result<PathPreview, MoveError> {
        let phase = self.phase.current();
        if !phase.is_decision() {
            return Err(MoveError::PhaseDisallows(phase));
        }
        if self.turns.current() != Some(mover) {
            return Err(MoveError::NotMoversTurn(mover));
        }
        self.validate_move(mover, destination)
    }

    fn validate_move(&self, mover: CombatantId, destination: Position) -> Result<PathPreview, MoveError> {
        let combatant = self
            .state
            .combatant(mover)
            .ok_or(MoveError::MoverNotFound(mover))?;
        if !combatant.life_state.is_alive() || self.statuses.flags_of(mover).blocks_movement() {
            return Err(MoveError::CannotMove(mover));
        }
        let path = find_path(&self.state, combatant, destination)?;
        let available = combatant.budget.movement;
        if path.cost > available {
            return Err(MoveError::InsufficientMovement {
                needed: path.cost,
                available,
            });
        }
        Ok(path)
    }

    /// Walks `mover` to `destination` one tile at a time.
    ///
    /// Each enemy whose reach the mover leaves is prompted at most once per
    /// move. A cancelling reaction, or the mover dropping, ends the walk
    /// early and the outcome is marked interrupted. A walk cut short on a
    /// tile an ally holds falls back to the last free tile, refunding the
    /// movement spent beyond it. Like actions, a
    /// successful move leaves the engine in `ActionExecution` until its
    /// token is completed.
    pub fn move_to(
        &mut self,
        mover: CombatantId,
        destination: Position,
        now: Instant,
        decider: &mut dyn ReactionDecider,
    ) -> Result<MoveOutcome, MoveError> {
        let phase = self.phase.current();
        if !phase.is_decision() {
            return Err(MoveError::PhaseDisallows(phase));
        }
        if self.turns.current() != Some(mover) {
            return Err(MoveError::NotMoversTurn(mover));
        }

        let token = self.correlator.begin(now, self.config.execution_timeout);
        self.phase.try_transition(
            CombatPhase::ActionExecution,
            "movement started",
            &mut self.events,
        );

        let path = match self.validate_move(mover, destination) {
            Ok(path) => path,
            Err(error) => {
                debug!(target: "tactics::movement", %token, %mover, %destination, %error, "move rejected");
                self.events.push(CombatEvent::MovementFailed {
                    token,
                    mover,
                    error: error.clone(),
                });
                self.correlator.complete(token);
                self.resume_decision_state("movement failed, decision phase restored");
                return Err(error);
            }
        };

        let disengaged = self
            .statuses
            .flags_of(mover)
            .contains(StatusFlags::DISENGAGED);
        let steps: Vec<(Position, u32)> = path.step_costs(&self.state).collect();
        let mut prompted: BTreeSet<CombatantId> = BTreeSet::new();
        let mut position = path.start;
        let mut walked = Vec::with_capacity(steps.len());
        let mut distance = 0;
        // Last tile the walk may end on, with the movement spent to reach it.
        let mut settled = (position, 0u32, 0usize);

        for (tile, cost) in steps {
            if !disengaged {
                let ctx = TriggerContext::new(ReactionTrigger::LEAVES_REACH, mover, position)
                    .with_destination(tile);
                let candidates: Vec<_> = self
                    .reaction_candidates(&ctx)
                    .into_iter()
                    .filter(|(reactor, _)| prompted.insert(*reactor))
                    .collect();
                let outcome = self.resolve_candidates(ctx, candidates, decider);
                if outcome.is_cancelled() {
                    debug!(target: "tactics::movement", %mover, %position, "move stopped by reaction");
                    break;
                }
            }
            let stopped = !self.can_act(mover) || self.statuses.flags_of(mover).blocks_movement();
            if stopped {
                break;
            }

            if let Some(c) = self.state.combatant_mut(mover) {
                c.budget.movement = c.budget.movement.saturating_sub(cost);
            }
            self.relocate(mover, tile);
            walked.push(tile);
            distance += cost;
            position = tile;

            if !self.shares_tile(mover, tile) {
                settled = (tile, distance, walked.len());
            }

            // Zone statuses applied on entry may stop the walk too.
            if !self.can_act(mover) || self.statuses.flags_of(mover).blocks_movement() {
                break;
            }
        }

        // Allies may be passed through but never shared.
        if position != settled.0 {
            let (tile, spent, entered) = settled;
            debug!(target: "tactics::movement", %mover, from = %position, to = %tile, "interrupted on an occupied tile, stepping back");
            if let Some(c) = self.state.combatant_mut(mover) {
                c.budget.movement += distance - spent;
            }
            self.relocate(mover, tile);
            walked.truncate(entered);
            distance = spent;
            position = tile;
        }

        let outcome = MoveOutcome {
            token,
            mover,
            start: path.start,
            end: position,
            waypoints: walked,
            distance,
            interrupted: position != destination,
        };
        info!(
            target: "tactics::movement",
            %token,
            %mover,
            from = %outcome.start,
            to = %outcome.end,
            distance,
            interrupted = outcome.interrupted,
            "movement completed"
        );
        self.events.push(CombatEvent::MovementCompleted {
            outcome: outcome.clone(),
        });

        if self.should_end_combat() {
            self.finish_combat("one side left standing");
        }
        Ok(outcome)
    }

    fn shares_tile(&self, mover: CombatantId, tile: Position) -> bool {
        self.state
            .present()
            .any(|c| c.id != mover && c.position == tile)
    }
}
