use crate::engine::ActionToken;
use crate::rules::{AttackRoll, HitOutcome, SaveRoll};
use crate::state::{ActionId, CombatantId, LifeState, Position, ReactionId, StatusId, ZoneId};

use super::definition::AttackType;

/// What one pass of an action did to one target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOutcome {
    pub target: CombatantId,
    /// Zero-based attack index; extra attacks produce later passes.
    pub pass: u8,
    pub attack: Option<AttackRoll>,
    pub save: Option<SaveRoll>,
    pub damage: u32,
    pub healed: u32,
    pub applied: Vec<StatusId>,
    pub removed: Vec<StatusId>,
    pub moved_to: Option<Position>,
    pub life_state: LifeState,
    /// A reaction changed the defence or the damage of this outcome.
    pub modified_by_reaction: bool,
}

impl TargetOutcome {
    pub fn new(target: CombatantId, pass: u8, life_state: LifeState) -> Self {
        Self {
            target,
            pass,
            attack: None,
            save: None,
            damage: 0,
            healed: 0,
            applied: Vec::new(),
            removed: Vec::new(),
            moved_to: None,
            life_state,
            modified_by_reaction: false,
        }
    }

    pub fn hit(&self) -> Option<HitOutcome> {
        self.attack.map(|a| a.outcome)
    }

    pub fn saved(&self) -> Option<bool> {
        self.save.map(|s| s.success)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub token: ActionToken,
    pub actor: CombatantId,
    pub action: ActionId,
    pub attack_type: AttackType,
    /// Reaction that cancelled the action before it resolved.
    pub cancelled_by: Option<(CombatantId, ReactionId)>,
    pub outcomes: Vec<TargetOutcome>,
    pub point: Option<Position>,
    pub zone: Option<ZoneId>,
    /// Tiles walked by a charge before striking.
    pub approach: Vec<Position>,
}

impl ActionResult {
    pub fn new(token: ActionToken, actor: CombatantId, action: ActionId, attack_type: AttackType) -> Self {
        Self {
            token,
            actor,
            action,
            attack_type,
            cancelled_by: None,
            outcomes: Vec::new(),
            point: None,
            zone: None,
            approach: Vec::new(),
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled_by.is_some()
    }

    pub fn total_damage(&self) -> u32 {
        self.outcomes.iter().map(|o| o.damage).sum()
    }

    pub fn hits(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.hit().is_some_and(HitOutcome::is_hit))
            .count()
    }

    /// Outcomes for `target` across every pass.
    pub fn outcomes_for(&self, target: CombatantId) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(move |o| o.target == target)
    }
}
