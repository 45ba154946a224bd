//! Action definitions: what an action costs, whom it targets and what it does.

use crate::rules::{DamageType, DiceExpr, HitOutcome};
use crate::state::{Ability, ActionId, StatusId};

/// Resources an action consumes from the actor's budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCost {
    pub action: u8,
    pub bonus_action: u8,
    pub reaction: u8,
    pub movement: u32,
}

impl ActionCost {
    pub const FREE: Self = Self {
        action: 0,
        bonus_action: 0,
        reaction: 0,
        movement: 0,
    };
    pub const ACTION: Self = Self {
        action: 1,
        ..Self::FREE
    };
    pub const BONUS_ACTION: Self = Self {
        bonus_action: 1,
        ..Self::FREE
    };
    pub const REACTION: Self = Self {
        reaction: 1,
        ..Self::FREE
    };
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackType {
    /// No attack roll; the action hits automatically or calls for a save.
    #[default]
    None,
    MeleeWeapon,
    RangedWeapon,
    MeleeSpell,
    RangedSpell,
}

impl AttackType {
    pub const fn is_attack(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn is_melee(self) -> bool {
        matches!(self, Self::MeleeWeapon | Self::MeleeSpell)
    }

    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::RangedWeapon | Self::RangedSpell)
    }

    pub const fn is_weapon(self) -> bool {
        matches!(self, Self::MeleeWeapon | Self::RangedWeapon)
    }
}

/// Targeting shape. Ranges and sizes are in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetType {
    SelfOnly,
    SingleUnit { range: u32 },
    MultiUnit { range: u32, max_targets: u8 },
    /// Every combatant passing the filter, wherever it stands.
    All,
    /// No target at all (a shout, a stance).
    None,
    Circle { range: u32, radius: u32 },
    /// 90 degree cone from the actor toward a point or unit.
    Cone { length: u32 },
    /// Line from the actor toward a point or unit.
    Line { length: u32, width: u32 },
    /// The single tile at a point.
    Point { range: u32 },
    /// Move straight at a unit, up to `distance` tiles, then strike it.
    Charge { distance: u32 },
    /// Segment of `length` tiles centred on a point, perpendicular to the caster.
    WallSegment { range: u32, length: u32 },
}

/// Which combatants an action may affect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetFilter {
    #[default]
    Any,
    Enemies,
    /// Non-hostile combatants, including the actor.
    Allies,
    /// Anyone except the actor.
    Others,
}

/// Saving throw an action calls for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveSpec {
    pub ability: Ability,
    /// Fixed DC; `None` uses the actor's spell save DC.
    pub dc: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCondition {
    #[default]
    Always,
    OnHit,
    OnMiss,
    OnCritical,
    OnSaveFailed,
    OnSaveSucceeded,
}

impl EffectCondition {
    /// `hit` is `None` when no attack was rolled (the action hits automatically);
    /// `save_success` is `None` when no save was rolled (treated as failed).
    pub fn holds(self, hit: Option<HitOutcome>, save_success: Option<bool>) -> bool {
        match self {
            Self::Always => true,
            Self::OnHit => hit.is_none_or(HitOutcome::is_hit),
            Self::OnMiss => hit == Some(HitOutcome::Miss),
            Self::OnCritical => hit == Some(HitOutcome::Critical),
            Self::OnSaveFailed => save_success != Some(true),
            Self::OnSaveSucceeded => save_success == Some(true),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForcedMoveDirection {
    /// Away from the actor.
    Push,
    /// Toward the actor.
    Pull,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Damage {
        dice: DiceExpr,
        damage_type: DamageType,
        /// A successful save halves the damage instead of negating it.
        half_on_save: bool,
        /// Reducing the target to 0 HP kills it outright.
        instant_death: bool,
    },
    Heal {
        dice: DiceExpr,
    },
    ForcedMove {
        distance: u32,
        direction: ForcedMoveDirection,
    },
    ApplyStatus {
        status: StatusId,
        duration: Option<u32>,
        stacks: u8,
    },
    RemoveStatus {
        status: StatusId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub kind: EffectKind,
    pub condition: EffectCondition,
}

impl Effect {
    pub fn damage(dice: DiceExpr, damage_type: DamageType) -> Self {
        Self {
            kind: EffectKind::Damage {
                dice,
                damage_type,
                half_on_save: false,
                instant_death: false,
            },
            condition: EffectCondition::Always,
        }
    }

    pub fn heal(dice: DiceExpr) -> Self {
        Self {
            kind: EffectKind::Heal { dice },
            condition: EffectCondition::Always,
        }
    }

    pub fn apply_status(status: impl Into<StatusId>) -> Self {
        Self {
            kind: EffectKind::ApplyStatus {
                status: status.into(),
                duration: None,
                stacks: 1,
            },
            condition: EffectCondition::Always,
        }
    }

    pub fn remove_status(status: impl Into<StatusId>) -> Self {
        Self {
            kind: EffectKind::RemoveStatus {
                status: status.into(),
            },
            condition: EffectCondition::Always,
        }
    }

    pub fn push(distance: u32) -> Self {
        Self {
            kind: EffectKind::ForcedMove {
                distance,
                direction: ForcedMoveDirection::Push,
            },
            condition: EffectCondition::Always,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: EffectCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Marks a damage effect as halved on a successful save.
    #[must_use]
    pub fn half_on_save(mut self) -> Self {
        if let EffectKind::Damage { half_on_save, .. } = &mut self.kind {
            *half_on_save = true;
        }
        self
    }

    #[must_use]
    pub fn instant_death(mut self) -> Self {
        if let EffectKind::Damage { instant_death, .. } = &mut self.kind {
            *instant_death = true;
        }
        self
    }

    #[must_use]
    pub fn for_turns(mut self, turns: u32) -> Self {
        if let EffectKind::ApplyStatus { duration, .. } = &mut self.kind {
            *duration = Some(turns);
        }
        self
    }

    /// Status this effect applies or removes, if any.
    pub fn status(&self) -> Option<&StatusId> {
        match &self.kind {
            EffectKind::ApplyStatus { status, .. } | EffectKind::RemoveStatus { status } => {
                Some(status)
            }
            _ => None,
        }
    }
}

/// Persistent area an action leaves behind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneSpec {
    pub rounds: u32,
    pub status_on_enter: Option<StatusId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: String,
    pub cost: ActionCost,
    pub target_type: TargetType,
    pub filter: TargetFilter,
    pub attack_type: AttackType,
    pub save: Option<SaveSpec>,
    /// Spells can be countered by reactions that only answer spellcasting.
    pub spell: bool,
    pub effects: Vec<Effect>,
    pub zone: Option<ZoneSpec>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<ActionId>, name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost: ActionCost::ACTION,
            target_type,
            filter: TargetFilter::Any,
            attack_type: AttackType::None,
            save: None,
            spell: false,
            effects: Vec::new(),
            zone: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: ActionCost) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_attack(mut self, attack_type: AttackType) -> Self {
        self.attack_type = attack_type;
        self
    }

    #[must_use]
    pub fn with_save(mut self, ability: Ability, dc: Option<i32>) -> Self {
        self.save = Some(SaveSpec { ability, dc });
        self
    }

    #[must_use]
    pub fn spell(mut self) -> Self {
        self.spell = true;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_zone(mut self, rounds: u32, status_on_enter: Option<StatusId>) -> Self {
        self.zone = Some(ZoneSpec {
            rounds,
            status_on_enter,
        });
        self
    }

    /// Weapon attacks against units repeat for each extra attack.
    pub fn allows_extra_attacks(&self) -> bool {
        self.attack_type.is_weapon()
            && matches!(
                self.target_type,
                TargetType::SingleUnit { .. } | TargetType::MultiUnit { .. }
            )
    }

    /// Statuses referenced by effects or the zone spec.
    pub fn referenced_statuses(&self) -> impl Iterator<Item = &StatusId> {
        self.effects
            .iter()
            .filter_map(Effect::status)
            .chain(self.zone.iter().filter_map(|z| z.status_on_enter.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_conditions_follow_rolls() {
        use HitOutcome::*;
        assert!(EffectCondition::OnHit.holds(Some(Critical), None));
        assert!(EffectCondition::OnHit.holds(None, None));
        assert!(!EffectCondition::OnHit.holds(Some(Miss), None));
        assert!(EffectCondition::OnMiss.holds(Some(Miss), None));
        assert!(!EffectCondition::OnCritical.holds(Some(Hit), None));
        assert!(EffectCondition::OnSaveFailed.holds(None, Some(false)));
        assert!(EffectCondition::OnSaveFailed.holds(None, None));
        assert!(!EffectCondition::OnSaveSucceeded.holds(None, None));
    }

    #[test]
    fn only_weapon_unit_attacks_repeat() {
        let sword = ActionDefinition::new("sword", "Sword", TargetType::SingleUnit { range: 1 })
            .with_attack(AttackType::MeleeWeapon);
        let bolt = ActionDefinition::new("bolt", "Bolt", TargetType::SingleUnit { range: 12 })
            .with_attack(AttackType::RangedSpell);
        let sweep = ActionDefinition::new("sweep", "Sweep", TargetType::Cone { length: 2 })
            .with_attack(AttackType::MeleeWeapon);
        assert!(sword.allows_extra_attacks());
        assert!(!bolt.allows_extra_attacks());
        assert!(!sweep.allows_extra_attacks());
    }
}
