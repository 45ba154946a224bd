//! Enumerates the concrete choices a combatant could make.

use tactics_core::{ActionDefinition, ActionTarget, Combatant, Position, TargetType};
use tracing::debug;

use super::AiContext;
use crate::api::Choice;

/// Generates every candidate choice for the actor.
///
/// For each affordable action this yields one candidate per plausible
/// target, based on the action's [`TargetType`]. Move candidates aim at the
/// tiles around each enemy, along the way to the nearest one, and straight
/// away from it.
pub struct ActionCandidateGenerator;

impl ActionCandidateGenerator {
    pub fn generate(ctx: &AiContext) -> Vec<Choice> {
        let mut candidates = Vec::new();
        for def in ctx.affordable_actions() {
            Self::action_candidates(def, ctx, &mut candidates);
        }
        if ctx.actor.budget.movement > 0 {
            Self::move_candidates(ctx, &mut candidates);
        }
        debug!(
            target: "tactics::runtime",
            actor = %ctx.actor.id,
            candidates = candidates.len(),
            "candidates generated"
        );
        candidates
    }

    fn action_candidates(def: &ActionDefinition, ctx: &AiContext, out: &mut Vec<Choice>) {
        let in_range = |range: u32| -> Vec<&Combatant> {
            ctx.snapshot
                .combatants
                .iter()
                .filter(|c| !c.life_state.is_dead())
                .filter(|c| ctx.admits(def.filter, c))
                .filter(|c| ctx.distance_to(c) <= range)
                .collect()
        };
        let enemy_points = |range: u32| -> Vec<Position> {
            ctx.enemies()
                .filter(|c| ctx.distance_to(c) <= range)
                .map(|c| c.position)
                .collect()
        };

        match def.target_type {
            TargetType::SelfOnly | TargetType::None | TargetType::All => {
                out.push(Choice::use_action(def.id.clone(), ActionTarget::None));
            }
            TargetType::SingleUnit { range } => {
                for target in in_range(range) {
                    out.push(Choice::use_action(def.id.clone(), ActionTarget::Unit(target.id)));
                }
            }
            TargetType::Charge { distance } => {
                for target in in_range(distance + 1) {
                    out.push(Choice::use_action(def.id.clone(), ActionTarget::Unit(target.id)));
                }
            }
            TargetType::MultiUnit { range, max_targets } => {
                let mut targets = in_range(range);
                targets.sort_by_key(|c| (ctx.distance_to(c), c.id));
                let ids: Vec<_> = targets
                    .into_iter()
                    .take(usize::from(max_targets))
                    .map(|c| c.id)
                    .collect();
                if !ids.is_empty() {
                    out.push(Choice::use_action(def.id.clone(), ActionTarget::Units(ids)));
                }
            }
            TargetType::Circle { range, .. }
            | TargetType::Point { range }
            | TargetType::WallSegment { range, .. } => {
                for point in enemy_points(range) {
                    out.push(Choice::use_action(def.id.clone(), ActionTarget::Point(point)));
                }
            }
            TargetType::Cone { length } | TargetType::Line { length, .. } => {
                for point in enemy_points(length) {
                    out.push(Choice::use_action(def.id.clone(), ActionTarget::Point(point)));
                }
            }
        }
    }

    fn move_candidates(ctx: &AiContext, out: &mut Vec<Choice>) {
        let start = ctx.actor.position;
        let occupied = |p: Position| {
            ctx.snapshot
                .combatants
                .iter()
                .any(|c| c.position == p && !c.life_state.is_dead())
        };
        let mut destinations: Vec<Position> = ctx
            .enemies()
            .flat_map(|enemy| enemy.position.neighbours())
            .filter(|&p| p != start && !occupied(p))
            .collect();

        if let Some(threat) = ctx.nearest_enemy() {
            let reach = i32::try_from(ctx.actor.budget.movement).unwrap_or(i32::MAX);
            let (tx, ty) = (threat.position.x - start.x, threat.position.y - start.y);
            for steps in 1..=reach.min(tx.abs().max(ty.abs())) {
                let toward = start.offset(tx.clamp(-steps, steps), ty.clamp(-steps, steps));
                if !occupied(toward) {
                    destinations.push(toward);
                }
            }

            let (dx, dy) = threat.position.direction_to(start);
            for steps in [reach, reach / 2] {
                let away = start.offset(dx * steps, dy * steps);
                if away != start && !occupied(away) {
                    destinations.push(away);
                }
            }
        }

        // Paths never cost less than the straight-line distance.
        destinations.retain(|p| start.distance(*p) <= ctx.actor.budget.movement);
        destinations.sort();
        destinations.dedup();
        out.extend(destinations.into_iter().map(Choice::move_to));
    }
}
