//! Standard action catalogue: weapon attacks, spells and tactical options.

use tactics_core::{
    Ability, ActionCost, ActionDefinition, AttackType, DamageType, DiceExpr, Effect,
    EffectCondition, TargetFilter, TargetType,
};

use crate::statuses::{BLESSED, BURNING, DISENGAGED, DODGING, HELD, RESTRAINED, WET};

pub const LONGSWORD: &str = "longsword";
pub const SHORTBOW: &str = "shortbow";
pub const GREATAXE: &str = "greataxe";
pub const CHARGE: &str = "charge";
pub const SHOVE: &str = "shove";
pub const DODGE: &str = "dodge";
pub const DISENGAGE: &str = "disengage";
pub const FIRE_BOLT: &str = "fire_bolt";
pub const BURNING_HANDS: &str = "burning_hands";
pub const LIGHTNING_BOLT: &str = "lightning_bolt";
pub const WEB: &str = "web";
pub const WALL_OF_FIRE: &str = "wall_of_fire";
pub const CREATE_WATER: &str = "create_water";
pub const CURE_WOUNDS: &str = "cure_wounds";
pub const HEALING_WORD: &str = "healing_word";
pub const BLESS: &str = "bless";
pub const HOLD_PERSON: &str = "hold_person";
pub const OPPORTUNITY_STRIKE: &str = "opportunity_strike";
pub const REBUKE: &str = "rebuke";

// ============================================================================
// Weapons
// ============================================================================

pub fn longsword() -> ActionDefinition {
    ActionDefinition::new(LONGSWORD, "Longsword", TargetType::SingleUnit { range: 1 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::MeleeWeapon)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 8, 3), DamageType::Slashing)
                .when(EffectCondition::OnHit),
        )
}

pub fn shortbow() -> ActionDefinition {
    ActionDefinition::new(SHORTBOW, "Shortbow", TargetType::SingleUnit { range: 16 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::RangedWeapon)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 6, 2), DamageType::Piercing)
                .when(EffectCondition::OnHit),
        )
}

pub fn greataxe() -> ActionDefinition {
    ActionDefinition::new(GREATAXE, "Greataxe", TargetType::SingleUnit { range: 1 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::MeleeWeapon)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 12, 3), DamageType::Slashing)
                .when(EffectCondition::OnHit),
        )
}

/// Straight-line rush that ends in a melee swing.
pub fn charge() -> ActionDefinition {
    ActionDefinition::new(CHARGE, "Charge", TargetType::Charge { distance: 4 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::MeleeWeapon)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 8, 2), DamageType::Bludgeoning)
                .when(EffectCondition::OnHit),
        )
}

/// Reaction-only swing used by opportunity attacks.
pub fn opportunity_strike() -> ActionDefinition {
    ActionDefinition::new(
        OPPORTUNITY_STRIKE,
        "Opportunity Strike",
        TargetType::SingleUnit { range: 1 },
    )
    .with_cost(ActionCost::REACTION)
    .with_filter(TargetFilter::Enemies)
    .with_attack(AttackType::MeleeWeapon)
    .with_effect(
        Effect::damage(DiceExpr::new(1, 8, 2), DamageType::Slashing).when(EffectCondition::OnHit),
    )
}

// ============================================================================
// Tactical options
// ============================================================================

pub fn shove() -> ActionDefinition {
    ActionDefinition::new(SHOVE, "Shove", TargetType::SingleUnit { range: 1 })
        .with_filter(TargetFilter::Enemies)
        .with_save(Ability::Strength, Some(13))
        .with_effect(Effect::push(2).when(EffectCondition::OnSaveFailed))
}

pub fn dodge() -> ActionDefinition {
    ActionDefinition::new(DODGE, "Dodge", TargetType::SelfOnly)
        .with_effect(Effect::apply_status(DODGING))
}

pub fn disengage() -> ActionDefinition {
    ActionDefinition::new(DISENGAGE, "Disengage", TargetType::SelfOnly)
        .with_cost(ActionCost::BONUS_ACTION)
        .with_effect(Effect::apply_status(DISENGAGED))
}

// ============================================================================
// Spells
// ============================================================================

pub fn fire_bolt() -> ActionDefinition {
    ActionDefinition::new(FIRE_BOLT, "Fire Bolt", TargetType::SingleUnit { range: 24 })
        .spell()
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::RangedSpell)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 10, 0), DamageType::Fire).when(EffectCondition::OnHit),
        )
        .with_effect(
            Effect::apply_status(BURNING)
                .for_turns(2)
                .when(EffectCondition::OnCritical),
        )
}

pub fn burning_hands() -> ActionDefinition {
    ActionDefinition::new(BURNING_HANDS, "Burning Hands", TargetType::Cone { length: 3 })
        .spell()
        .with_save(Ability::Dexterity, None)
        .with_effect(Effect::damage(DiceExpr::new(3, 6, 0), DamageType::Fire).half_on_save())
        .with_effect(Effect::apply_status(BURNING).when(EffectCondition::OnSaveFailed))
}

pub fn lightning_bolt() -> ActionDefinition {
    ActionDefinition::new(
        LIGHTNING_BOLT,
        "Lightning Bolt",
        TargetType::Line {
            length: 20,
            width: 1,
        },
    )
    .spell()
    .with_save(Ability::Dexterity, None)
    .with_effect(Effect::damage(DiceExpr::new(8, 6, 0), DamageType::Lightning).half_on_save())
}

/// Sticky strands: anyone inside or walking in is restrained.
pub fn web() -> ActionDefinition {
    ActionDefinition::new(WEB, "Web", TargetType::Circle { range: 12, radius: 1 })
        .spell()
        .with_save(Ability::Dexterity, None)
        .with_effect(Effect::apply_status(RESTRAINED).when(EffectCondition::OnSaveFailed))
        .with_zone(3, Some(RESTRAINED.into()))
}

pub fn wall_of_fire() -> ActionDefinition {
    ActionDefinition::new(
        WALL_OF_FIRE,
        "Wall of Fire",
        TargetType::WallSegment {
            range: 12,
            length: 5,
        },
    )
    .spell()
    .with_save(Ability::Dexterity, None)
    .with_effect(Effect::damage(DiceExpr::new(3, 8, 0), DamageType::Fire).half_on_save())
    .with_zone(3, Some(BURNING.into()))
}

pub fn create_water() -> ActionDefinition {
    ActionDefinition::new(CREATE_WATER, "Create Water", TargetType::Circle { range: 6, radius: 1 })
        .spell()
        .with_effect(Effect::apply_status(WET))
}

pub fn cure_wounds() -> ActionDefinition {
    ActionDefinition::new(CURE_WOUNDS, "Cure Wounds", TargetType::SingleUnit { range: 1 })
        .spell()
        .with_filter(TargetFilter::Allies)
        .with_effect(Effect::heal(DiceExpr::new(1, 8, 3)))
}

pub fn healing_word() -> ActionDefinition {
    ActionDefinition::new(HEALING_WORD, "Healing Word", TargetType::SingleUnit { range: 12 })
        .spell()
        .with_cost(ActionCost::BONUS_ACTION)
        .with_filter(TargetFilter::Allies)
        .with_effect(Effect::heal(DiceExpr::new(1, 4, 3)))
}

pub fn bless() -> ActionDefinition {
    ActionDefinition::new(
        BLESS,
        "Bless",
        TargetType::MultiUnit {
            range: 6,
            max_targets: 3,
        },
    )
    .spell()
    .with_filter(TargetFilter::Allies)
    .with_effect(Effect::apply_status(BLESSED))
}

pub fn hold_person() -> ActionDefinition {
    ActionDefinition::new(HOLD_PERSON, "Hold Person", TargetType::SingleUnit { range: 12 })
        .spell()
        .with_filter(TargetFilter::Enemies)
        .with_save(Ability::Wisdom, None)
        .with_effect(Effect::apply_status(HELD).when(EffectCondition::OnSaveFailed))
}

/// Fiery retort cast in reaction to being hurt.
pub fn rebuke() -> ActionDefinition {
    ActionDefinition::new(REBUKE, "Rebuke", TargetType::SingleUnit { range: 12 })
        .spell()
        .with_cost(ActionCost::REACTION)
        .with_filter(TargetFilter::Enemies)
        .with_save(Ability::Dexterity, None)
        .with_effect(Effect::damage(DiceExpr::new(2, 10, 0), DamageType::Fire).half_on_save())
}

pub fn all() -> Vec<ActionDefinition> {
    vec![
        longsword(),
        shortbow(),
        greataxe(),
        charge(),
        opportunity_strike(),
        shove(),
        dodge(),
        disengage(),
        fire_bolt(),
        burning_hands(),
        lightning_bolt(),
        web(),
        wall_of_fire(),
        create_water(),
        cure_wounds(),
        healing_word(),
        bless(),
        hold_person(),
        rebuke(),
    ]
}
