//! Roll modifiers and the fold that combines them.
//!
//! A [`Modifier`] belongs to one combatant and targets one [`RollCategory`].
//! When a roll is resolved, every modifier of the involved owners whose
//! [`ModifierCondition`] accepts the [`RollContext`] is folded into a
//! [`ModifierFold`]:
//!
//! 1. Flat modifiers (summed)
//! 2. Percent modifiers (summed, then multiplied)
//! 3. Floors (highest wins)
//! 4. Advantage / disadvantage (cancelled pairwise)

use crate::action::AttackType;
use crate::state::StatusId;

use super::damage::DamageType;

/// Which roll or derived value a modifier adjusts.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollCategory {
    /// Attacks made by the owner.
    AttackRoll,
    /// Attacks made against the owner.
    AttackRollAgainst,
    ArmorClass,
    /// Damage dealt by the owner.
    DamageRoll,
    /// Damage received by the owner (resistance, vulnerability).
    DamageTaken,
    SavingThrow,
    Initiative,
    Movement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKind {
    Flat(i32),
    /// Percentage change: -50 halves, +100 doubles.
    Percent(i32),
    /// Lower bound on the final value.
    Floor(i32),
    Advantage,
    Disadvantage,
}

/// Declarative predicate over a [`RollContext`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierCondition {
    AttackTypeIs(AttackType),
    Melee,
    Ranged,
    DamageTypeIs(DamageType),
    TargetHasStatus(StatusId),
    SourceHasStatus(StatusId),
    /// Source and target are at most this many tiles apart.
    WithinRange(u32),
    All(Vec<ModifierCondition>),
    Any(Vec<ModifierCondition>),
    Not(Box<ModifierCondition>),
}

impl ModifierCondition {
    pub fn matches(&self, ctx: &RollContext) -> bool {
        match self {
            Self::AttackTypeIs(kind) => ctx.attack_type == Some(*kind),
            Self::Melee => ctx.attack_type.is_some_and(AttackType::is_melee),
            Self::Ranged => ctx.attack_type.is_some_and(AttackType::is_ranged),
            Self::DamageTypeIs(kind) => ctx.damage_type == Some(*kind),
            Self::TargetHasStatus(status) => ctx.target_statuses.contains(status),
            Self::SourceHasStatus(status) => ctx.source_statuses.contains(status),
            Self::WithinRange(range) => ctx.distance.is_some_and(|d| d <= *range),
            Self::All(conditions) => conditions.iter().all(|c| c.matches(ctx)),
            Self::Any(conditions) => conditions.iter().any(|c| c.matches(ctx)),
            Self::Not(condition) => !condition.matches(ctx),
        }
    }
}

/// Tag recording who installed a modifier, for scoped removal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierOwner {
    Status(StatusId),
    /// Installed by the scenario (racial traits, equipment).
    Scenario,
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub category: RollCategory,
    pub kind: ModifierKind,
    pub condition: Option<ModifierCondition>,
    pub owner: ModifierOwner,
}

impl Modifier {
    pub fn new(category: RollCategory, kind: ModifierKind, owner: ModifierOwner) -> Self {
        Self {
            category,
            kind,
            condition: None,
            owner,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: ModifierCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn applies(&self, category: RollCategory, ctx: &RollContext) -> bool {
        self.category == category && self.condition.as_ref().is_none_or(|c| c.matches(ctx))
    }
}

/// Facts about a roll that conditions are evaluated against.
///
/// "Source" is whoever makes the attack or deals the damage; "target" is the
/// one receiving it. For saving throws the saver is the target.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RollContext {
    pub attack_type: Option<AttackType>,
    pub damage_type: Option<DamageType>,
    pub source_statuses: Vec<StatusId>,
    pub target_statuses: Vec<StatusId>,
    pub distance: Option<u32>,
}

impl RollContext {
    #[must_use]
    pub fn with_attack_type(mut self, attack_type: AttackType) -> Self {
        self.attack_type = Some(attack_type);
        self
    }

    #[must_use]
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = Some(damage_type);
        self
    }
}

/// Net advantage after pairwise cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvantageState {
    Advantage,
    Disadvantage,
    #[default]
    Neither,
}

/// Accumulated effect of every applicable modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ModifierFold {
    pub flat: i32,
    pub percent: i32,
    pub floor: Option<i32>,
    pub advantages: u32,
    pub disadvantages: u32,
}

impl ModifierFold {
    pub fn add(&mut self, kind: ModifierKind) {
        match kind {
            ModifierKind::Flat(v) => self.flat += v,
            ModifierKind::Percent(p) => self.percent += p,
            ModifierKind::Floor(f) => self.floor = Some(self.floor.map_or(f, |cur| cur.max(f))),
            ModifierKind::Advantage => self.advantages += 1,
            ModifierKind::Disadvantage => self.disadvantages += 1,
        }
    }

    /// `net = advantages - disadvantages`; positive is advantage.
    pub fn advantage(&self) -> AdvantageState {
        match self.advantages.cmp(&self.disadvantages) {
            std::cmp::Ordering::Greater => AdvantageState::Advantage,
            std::cmp::Ordering::Less => AdvantageState::Disadvantage,
            std::cmp::Ordering::Equal => AdvantageState::Neither,
        }
    }

    /// `max((base + flat) * (100 + percent) / 100, floor)`
    pub fn apply(&self, base: i32) -> i32 {
        let flat = base + self.flat;
        let scaled = if self.percent == 0 {
            flat
        } else {
            let multiplier = (100 + self.percent).max(0);
            (flat * multiplier) / 100
        };
        match self.floor {
            Some(floor) => scaled.max(floor),
            None => scaled,
        }
    }
}

impl FromIterator<ModifierKind> for ModifierFold {
    fn from_iter<T: IntoIterator<Item = ModifierKind>>(iter: T) -> Self {
        let mut fold = Self::default();
        for kind in iter {
            fold.add(kind);
        }
        fold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_advantages_and_one_disadvantage_is_advantage() {
        let fold: ModifierFold = [
            ModifierKind::Advantage,
            ModifierKind::Advantage,
            ModifierKind::Disadvantage,
        ]
        .into_iter()
        .collect();
        assert_eq!(fold.advantage(), AdvantageState::Advantage);

        let even: ModifierFold = [ModifierKind::Advantage, ModifierKind::Disadvantage]
            .into_iter()
            .collect();
        assert_eq!(even.advantage(), AdvantageState::Neither);
    }

    #[test]
    fn flat_then_percent_then_floor() {
        let fold: ModifierFold = [
            ModifierKind::Flat(4),
            ModifierKind::Percent(-50),
            ModifierKind::Floor(1),
            ModifierKind::Floor(3),
        ]
        .into_iter()
        .collect();
        assert_eq!(fold.apply(10), 7);
        assert_eq!(fold.apply(0), 3);
    }

    #[test]
    fn conditions_compose() {
        let ctx = RollContext {
            attack_type: Some(AttackType::MeleeWeapon),
            distance: Some(1),
            target_statuses: vec![StatusId::new("prone")],
            ..RollContext::default()
        };
        let prone_melee = ModifierCondition::All(vec![
            ModifierCondition::Melee,
            ModifierCondition::TargetHasStatus(StatusId::new("prone")),
        ]);
        assert!(prone_melee.matches(&ctx));
        assert!(!ModifierCondition::Not(Box::new(prone_melee)).matches(&ctx));
        assert!(!ModifierCondition::WithinRange(0).matches(&ctx));
        assert!(!ModifierCondition::Ranged.matches(&ctx));
    }
}
