//! Standard reactions.

use tactics_core::{
    OutcomeModifier, ReactionDefinition, ReactionResponse, ReactionTrigger,
};

use crate::actions::{OPPORTUNITY_STRIKE, REBUKE};

pub const OPPORTUNITY_ATTACK: &str = "opportunity_attack";
pub const SHIELD: &str = "shield";
pub const COUNTERSPELL: &str = "counterspell";
pub const UNCANNY_DODGE: &str = "uncanny_dodge";
pub const HELLISH_REBUKE: &str = "hellish_rebuke";

pub fn opportunity_attack() -> ReactionDefinition {
    ReactionDefinition::new(
        OPPORTUNITY_ATTACK,
        "Opportunity Attack",
        ReactionTrigger::LEAVES_REACH,
        ReactionResponse::ExecuteAction(OPPORTUNITY_STRIKE.into()),
    )
}

/// +5 armour class against the triggering hit.
pub fn shield() -> ReactionDefinition {
    ReactionDefinition::new(
        SHIELD,
        "Shield",
        ReactionTrigger::ATTACK_HIT,
        ReactionResponse::Modify(OutcomeModifier::DefenseBonus(5)),
    )
    .self_target()
    .with_priority(5)
}

pub fn counterspell() -> ReactionDefinition {
    ReactionDefinition::new(
        COUNTERSPELL,
        "Counterspell",
        ReactionTrigger::ACTION_DECLARED,
        ReactionResponse::Cancel,
    )
    .spell_only()
    .with_range(12)
    .with_priority(10)
}

pub fn uncanny_dodge() -> ReactionDefinition {
    ReactionDefinition::new(
        UNCANNY_DODGE,
        "Uncanny Dodge",
        ReactionTrigger::INCOMING_DAMAGE,
        ReactionResponse::Modify(OutcomeModifier::DamagePercent(-50)),
    )
    .self_target()
}

pub fn hellish_rebuke() -> ReactionDefinition {
    ReactionDefinition::new(
        HELLISH_REBUKE,
        "Hellish Rebuke",
        ReactionTrigger::DAMAGED,
        ReactionResponse::ExecuteAction(REBUKE.into()),
    )
    .self_target()
    .with_range(12)
}

pub fn all() -> Vec<ReactionDefinition> {
    vec![
        opportunity_attack(),
        shield(),
        counterspell(),
        uncanny_dodge(),
        hellish_rebuke(),
    ]
}
