#![allow(dead_code)]

use tactics_core::status::ModifierTemplate;
use tactics_core::{
    ActionDefinition, AttackType, Battlefield, CombatEngine, CombatEngineBuilder, Combatant,
    CombatantId, CombatantStats, Controller, DamageType, DiceExpr, Effect, EffectCondition,
    Faction, Modifier, ModifierKind, ModifierOwner, Position, ReactionDefinition,
    ReactionResponse, ReactionTrigger, RollCategory, StatusDefinition, TargetFilter, TargetType,
};

pub const FIGHTER: CombatantId = CombatantId(1);
pub const GOBLIN: CombatantId = CombatantId(2);
pub const ORC: CombatantId = CombatantId(3);

pub fn strike() -> ActionDefinition {
    ActionDefinition::new("strike", "Strike", TargetType::SingleUnit { range: 1 })
        .with_filter(TargetFilter::Enemies)
        .with_attack(AttackType::MeleeWeapon)
        .with_effect(
            Effect::damage(DiceExpr::new(1, 6, 0), DamageType::Slashing)
                .when(EffectCondition::OnHit),
        )
}

/// Never misses and always deals 4.
pub fn smite() -> ActionDefinition {
    ActionDefinition::new("smite", "Smite", TargetType::SingleUnit { range: 6 })
        .with_filter(TargetFilter::Enemies)
        .with_effect(Effect::damage(DiceExpr::flat(4), DamageType::Force))
}

pub fn bless() -> ActionDefinition {
    ActionDefinition::new("bless", "Bless", TargetType::SingleUnit { range: 6 })
        .with_filter(TargetFilter::Allies)
        .with_effect(Effect::apply_status("blessed"))
}

pub fn blessed() -> StatusDefinition {
    StatusDefinition::new("blessed", "Blessed")
        .with_duration(2)
        .with_modifier(ModifierTemplate::new(
            RollCategory::SavingThrow,
            ModifierKind::Flat(2),
        ))
}

pub fn opportunity_attack() -> ReactionDefinition {
    ReactionDefinition::new(
        "opportunity_attack",
        "Opportunity Attack",
        ReactionTrigger::LEAVES_REACH,
        ReactionResponse::ExecuteAction("strike".into()),
    )
}

pub fn fighter() -> Combatant {
    let stats = CombatantStats {
        max_hp: 40,
        ..CombatantStats::default()
    };
    Combatant::new(FIGHTER, "Fighter", Faction::Party, Position::new(1, 1), stats)
        .with_controller(Controller::Player)
        .with_actions(["strike", "smite", "bless"])
}

pub fn goblin() -> Combatant {
    Combatant::new(
        GOBLIN,
        "Goblin",
        Faction::Hostile,
        Position::new(2, 1),
        CombatantStats::default(),
    )
    .with_actions(["strike"])
}

pub fn orc() -> Combatant {
    Combatant::new(
        ORC,
        "Orc",
        Faction::Hostile,
        Position::new(2, 2),
        CombatantStats::default(),
    )
    .with_actions(["strike"])
}

fn initiative(bonus: i32) -> Modifier {
    Modifier::new(
        RollCategory::Initiative,
        ModifierKind::Flat(bonus),
        ModifierOwner::Scenario,
    )
}

/// Definitions plus an initiative edge that fixes the order to
/// fighter, goblin, orc. Combatants are added by the caller.
pub fn builder(seed: u64) -> CombatEngineBuilder {
    CombatEngine::builder(seed)
        .battlefield(Battlefield::new(8, 8))
        .actions([strike(), smite(), bless()])
        .status(blessed())
        .reaction(opportunity_attack())
}

pub fn with_roster(
    builder: CombatEngineBuilder,
    fighter: Combatant,
    goblin: Combatant,
    orc: Combatant,
) -> CombatEngineBuilder {
    builder
        .combatant(fighter)
        .combatant(goblin)
        .combatant(orc)
        .modifier(FIGHTER, initiative(100))
        .modifier(GOBLIN, initiative(50))
        .grant(GOBLIN, "opportunity_attack")
        .grant(ORC, "opportunity_attack")
}

pub fn engine(seed: u64) -> CombatEngine {
    with_roster(builder(seed), fighter(), goblin(), orc())
        .build()
        .expect("fixture is valid")
}

/// Engine with combat already started; the fighter is deciding.
pub fn started(seed: u64) -> CombatEngine {
    let mut engine = engine(seed);
    engine.start_combat().expect("combat starts");
    engine
}
