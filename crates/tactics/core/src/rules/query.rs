//! Roll queries answered by [`super::RulesEngine`] and their results.

use crate::action::AttackType;
use crate::state::{Ability, CombatantId};

use super::damage::DamageType;
use super::dice::DiceExpr;
use super::modifier::{AdvantageState, RollContext};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackQuery {
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub attack_type: AttackType,
    pub attack_bonus: i32,
    /// Target's base armour class, before `ArmorClass` modifiers.
    pub defense: i32,
    pub context: RollContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageQuery {
    pub source: CombatantId,
    pub target: CombatantId,
    pub dice: DiceExpr,
    pub damage_type: DamageType,
    pub critical: bool,
    pub context: RollContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveQuery {
    pub target: CombatantId,
    pub ability: Ability,
    pub save_bonus: i32,
    pub dc: i32,
    pub context: RollContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitChanceQuery {
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub attack_bonus: i32,
    pub defense: i32,
    pub context: RollContext,
}

/// A single d20 test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct D20Roll {
    /// The die that counts.
    pub natural: u32,
    /// The other die when rolled with advantage or disadvantage.
    pub discarded: Option<u32>,
    pub advantage: AdvantageState,
    pub modifier: i32,
    pub total: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOutcome {
    Miss,
    Hit,
    Critical,
}

impl HitOutcome {
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit | Self::Critical)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRoll {
    pub d20: D20Roll,
    /// Armour class after modifiers and reaction adjustments.
    pub defense: i32,
    pub outcome: HitOutcome,
}

impl AttackRoll {
    pub(crate) fn classify(d20: &D20Roll, defense: i32, critical_threshold: u32) -> HitOutcome {
        if d20.natural == 1 {
            HitOutcome::Miss
        } else if d20.natural >= critical_threshold {
            HitOutcome::Critical
        } else if d20.total >= defense {
            HitOutcome::Hit
        } else {
            HitOutcome::Miss
        }
    }

    /// Re-evaluates the roll after a reaction raised (or lowered) the defence.
    /// Critical hits are unaffected.
    #[must_use]
    pub fn with_defense_bonus(mut self, bonus: i32) -> Self {
        self.defense += bonus;
        if self.outcome == HitOutcome::Hit && self.d20.total < self.defense {
            self.outcome = HitOutcome::Miss;
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    pub dice: Vec<u32>,
    pub damage_type: DamageType,
    pub critical: bool,
    /// Rolled amount after `DamageRoll` modifiers, never negative.
    pub total: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveRoll {
    pub ability: Ability,
    pub d20: D20Roll,
    pub dc: i32,
    pub success: bool,
}
