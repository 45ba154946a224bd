//! Standard statuses and the interaction table between them.

use tactics_core::status::ModifierTemplate;
use tactics_core::{
    AttackType, DamageType, DiceExpr, ModifierCondition, ModifierKind, RollCategory,
    StatusDefinition, StatusFlags, StatusInteraction, TickEffect, TickTiming,
};

pub const BURNING: &str = "burning";
pub const WET: &str = "wet";
pub const BLESSED: &str = "blessed";
pub const DODGING: &str = "dodging";
pub const DISENGAGED: &str = "disengaged";
pub const HELD: &str = "held";
pub const RESTRAINED: &str = "restrained";
pub const POISONED: &str = "poisoned";
pub const ASLEEP: &str = "asleep";
pub const REGENERATING: &str = "regenerating";

pub fn burning() -> StatusDefinition {
    StatusDefinition::new(BURNING, "Burning")
        .with_duration(3)
        .with_max_stacks(3)
        .with_tick(
            TickTiming::TurnStart,
            TickEffect::Damage {
                dice: DiceExpr::new(1, 4, 0),
                damage_type: DamageType::Fire,
            },
        )
}

/// Soaked: fire damage taken is halved.
pub fn wet() -> StatusDefinition {
    StatusDefinition::new(WET, "Wet")
        .with_duration(2)
        .with_modifier(
            ModifierTemplate::new(RollCategory::DamageTaken, ModifierKind::Percent(-50))
                .when(ModifierCondition::DamageTypeIs(DamageType::Fire)),
        )
}

pub fn blessed() -> StatusDefinition {
    StatusDefinition::new(BLESSED, "Blessed")
        .with_duration(3)
        .with_modifier(ModifierTemplate::new(RollCategory::AttackRoll, ModifierKind::Flat(2)))
        .with_modifier(ModifierTemplate::new(RollCategory::SavingThrow, ModifierKind::Flat(2)))
}

pub fn dodging() -> StatusDefinition {
    StatusDefinition::new(DODGING, "Dodging")
        .with_duration(1)
        .with_modifier(ModifierTemplate::new(
            RollCategory::AttackRollAgainst,
            ModifierKind::Disadvantage,
        ))
}

pub fn disengaged() -> StatusDefinition {
    StatusDefinition::new(DISENGAGED, "Disengaged")
        .with_duration(1)
        .with_flags(StatusFlags::DISENGAGED)
}

pub fn held() -> StatusDefinition {
    StatusDefinition::new(HELD, "Held")
        .with_duration(2)
        .with_flags(StatusFlags::INCAPACITATED | StatusFlags::PREVENTS_MOVEMENT)
        .with_modifier(
            ModifierTemplate::new(RollCategory::AttackRollAgainst, ModifierKind::Advantage)
                .when(ModifierCondition::Melee),
        )
}

pub fn restrained() -> StatusDefinition {
    StatusDefinition::new(RESTRAINED, "Restrained")
        .with_duration(1)
        .with_flags(StatusFlags::PREVENTS_MOVEMENT)
        .with_modifier(ModifierTemplate::new(
            RollCategory::AttackRollAgainst,
            ModifierKind::Advantage,
        ))
        .with_modifier(ModifierTemplate::new(RollCategory::AttackRoll, ModifierKind::Disadvantage))
}

pub fn poisoned() -> StatusDefinition {
    StatusDefinition::new(POISONED, "Poisoned")
        .with_duration(2)
        .with_modifier(ModifierTemplate::new(RollCategory::AttackRoll, ModifierKind::Disadvantage))
        .with_tick(
            TickTiming::TurnEnd,
            TickEffect::Damage {
                dice: DiceExpr::new(1, 4, 0),
                damage_type: DamageType::Poison,
            },
        )
}

/// Incapacitated until the duration runs out or the sleeper is hurt.
pub fn asleep() -> StatusDefinition {
    StatusDefinition::new(ASLEEP, "Asleep")
        .with_duration(3)
        .with_flags(StatusFlags::INCAPACITATED | StatusFlags::BREAKS_ON_DAMAGE)
        .with_modifier(
            ModifierTemplate::new(RollCategory::AttackRollAgainst, ModifierKind::Advantage)
                .when(ModifierCondition::AttackTypeIs(AttackType::MeleeWeapon)),
        )
}

pub fn regenerating() -> StatusDefinition {
    StatusDefinition::new(REGENERATING, "Regenerating").with_tick(
        TickTiming::RoundEnd,
        TickEffect::Heal {
            dice: DiceExpr::new(1, 4, 1),
        },
    )
}

pub fn all() -> Vec<StatusDefinition> {
    vec![
        burning(),
        wet(),
        blessed(),
        dodging(),
        disengaged(),
        held(),
        restrained(),
        poisoned(),
        asleep(),
        regenerating(),
    ]
}

/// Water puts fires out, and a soaked target does not catch fire.
pub fn interactions() -> Vec<StatusInteraction> {
    vec![
        StatusInteraction::removes(WET, BURNING),
        StatusInteraction::prevented_by(BURNING, WET),
    ]
}
