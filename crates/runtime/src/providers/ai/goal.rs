//! Goal definition, selection and candidate scoring.

use tactics_core::{ActionTarget, AttackType, CombatantId, Position, TargetType};
use tracing::debug;

use super::AiContext;
use super::context::{expected_damage_tenths, heals};
use crate::api::{Choice, Profile};

/// A concrete objective that drives choice selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Damage a specific enemy.
    Attack { target: CombatantId },
    /// Restore HP to an ally (possibly the actor).
    Heal { ally: CombatantId },
    /// Get away from a specific enemy.
    Retreat { threat: CombatantId },
    /// Nothing worth doing; end the turn.
    Hold,
}

impl Goal {
    /// Scores how well `choice` serves this goal, from 0 (useless) to 100.
    pub fn evaluate(&self, choice: &Choice, ctx: &AiContext) -> u32 {
        match *self {
            Goal::Attack { target } => score_attack(choice, target, ctx),
            Goal::Heal { ally } => score_heal(choice, ally, ctx)
                .max(score_fallback_attack(choice, ctx) / 2),
            Goal::Retreat { threat } => score_retreat(choice, threat, ctx),
            Goal::Hold => 0,
        }
    }
}

/// Picks a goal from the situation and the actor's profile.
pub struct GoalSelector;

impl GoalSelector {
    /// # Decision process
    ///
    /// 1. **Support**: a bloodied ally and a heal available → heal it
    /// 2. **Survival**: cautious, below 30% HP, enemy within two tiles → retreat
    /// 3. **Combat**: any enemy left → attack the nearest
    /// 4. **Default**: hold
    pub fn select(ctx: &AiContext) -> Goal {
        let nearest = ctx.nearest_enemy();
        debug!(
            target: "tactics::runtime",
            actor = %ctx.actor.id,
            hp = ctx.hp_percent(),
            profile = ?ctx.profile,
            nearest = ?nearest.map(|c| c.id),
            "selecting goal"
        );

        let wants_to_heal = match ctx.profile {
            Profile::Support => true,
            Profile::Aggressive | Profile::Cautious => ctx.hp_percent() < 30,
        };
        if wants_to_heal
            && ctx.can_heal()
            && let Some(ally) = ctx.most_wounded_ally()
        {
            return Goal::Heal { ally: ally.id };
        }

        if ctx.profile == Profile::Cautious
            && ctx.hp_percent() < 30
            && let Some(threat) = nearest
            && ctx.distance_to(threat) <= 2
        {
            return Goal::Retreat { threat: threat.id };
        }

        match nearest {
            Some(enemy) => Goal::Attack { target: enemy.id },
            None => Goal::Hold,
        }
    }
}

/// Whether `target` sits where the action's target would land.
fn aims_at(target: &ActionTarget, id: CombatantId, position: Position) -> bool {
    match target {
        ActionTarget::Unit(unit) => *unit == id,
        ActionTarget::Units(units) => units.contains(&id),
        ActionTarget::Point(point) => *point == position,
        ActionTarget::None => false,
    }
}

fn score_attack(choice: &Choice, target: CombatantId, ctx: &AiContext) -> u32 {
    let Some(enemy) = ctx.snapshot.combatant(target) else {
        return 0;
    };
    match choice {
        Choice::UseAction { action, target: aim } => {
            let Some(def) = ctx.definition(action) else {
                return 0;
            };
            let damage = expected_damage_tenths(def);
            if damage > 0 && aims_at(aim, target, enemy.position) {
                let mut score = 60 + (damage / 10).clamp(0, 25) as u32;
                score += match (ctx.profile, def.attack_type) {
                    (Profile::Aggressive, t) if t.is_melee() => 10,
                    (Profile::Cautious, t) if t.is_ranged() => 10,
                    _ => 0,
                };
                if def.cost.action == 0 {
                    score += 5;
                }
                score.min(100)
            } else if damage > 0 {
                score_fallback_attack(choice, ctx)
            } else if aims_at(aim, target, enemy.position) && def.effects.iter().any(|e| e.status().is_some()) {
                40
            } else {
                0
            }
        }
        Choice::Move { destination } => {
            let before = ctx.distance_to(enemy);
            let after = destination.distance(enemy.position);
            if after >= before || ctx.actor.budget.action == 0 {
                return 0;
            }
            // Only close in if nothing reaches from here.
            let reaches = ctx.affordable_actions().any(|def| {
                expected_damage_tenths(def) > 0 && reach(def.target_type) >= before
            });
            if reaches {
                0
            } else {
                50u32.saturating_sub(after * 3).max(1)
            }
        }
        Choice::EndTurn => 0,
    }
}

/// Damage aimed at any enemy other than the chosen one.
fn score_fallback_attack(choice: &Choice, ctx: &AiContext) -> u32 {
    let Choice::UseAction { action, target } = choice else {
        return 0;
    };
    let Some(def) = ctx.definition(action) else {
        return 0;
    };
    if expected_damage_tenths(def) == 0 {
        return 0;
    }
    let hits_enemy = ctx.enemies().any(|e| aims_at(target, e.id, e.position));
    let hits_ally = ctx.allies().any(|a| aims_at(target, a.id, a.position));
    if hits_enemy && !hits_ally { 45 } else { 0 }
}

fn score_heal(choice: &Choice, ally: CombatantId, ctx: &AiContext) -> u32 {
    let Choice::UseAction { action, target } = choice else {
        return 0;
    };
    let (Some(def), Some(wounded)) = (ctx.definition(action), ctx.snapshot.combatant(ally)) else {
        return 0;
    };
    if heals(def) && aims_at(target, ally, wounded.position) {
        if def.cost.action == 0 { 100 } else { 90 }
    } else {
        0
    }
}

fn score_retreat(choice: &Choice, threat: CombatantId, ctx: &AiContext) -> u32 {
    let Some(enemy) = ctx.snapshot.combatant(threat) else {
        return 0;
    };
    match choice {
        Choice::Move { destination } => {
            let gained = destination
                .distance(enemy.position)
                .saturating_sub(ctx.distance_to(enemy));
            if gained == 0 { 0 } else { 30 + gained * 5 }
        }
        Choice::UseAction { action, .. } => ctx
            .definition(action)
            .filter(|def| def.attack_type == AttackType::None && expected_damage_tenths(def) == 0)
            .filter(|def| matches!(def.target_type, TargetType::SelfOnly))
            .map_or(0, |_| 60),
        Choice::EndTurn => 0,
    }
}

/// How far an action reaches from the actor's tile.
fn reach(target_type: TargetType) -> u32 {
    match target_type {
        TargetType::SingleUnit { range }
        | TargetType::MultiUnit { range, .. }
        | TargetType::Point { range }
        | TargetType::WallSegment { range, .. } => range,
        TargetType::Circle { range, radius } => range + radius,
        TargetType::Charge { distance } => distance + 1,
        TargetType::Cone { length } | TargetType::Line { length, .. } => length,
        TargetType::SelfOnly | TargetType::None => 0,
        TargetType::All => u32::MAX,
    }
}
