//! Combatant templates for the bundled encounters.
//!
//! Each template takes the id and starting tile; everything else is fixed.

use tactics_core::{
    Ability, AbilityScores, Combatant, CombatantId, CombatantStats, Controller, Faction, Position,
};

use crate::actions::{
    BLESS, BURNING_HANDS, CHARGE, CREATE_WATER, CURE_WOUNDS, DISENGAGE, DODGE, FIRE_BOLT,
    GREATAXE, HEALING_WORD, HOLD_PERSON, LONGSWORD, SHORTBOW, SHOVE, WALL_OF_FIRE, WEB,
};

pub fn fighter(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(16, 14, 15, 10, 12, 8),
        proficiency: 2,
        armor_class: 18,
        max_hp: 28,
        extra_attacks: 1,
        save_proficiencies: vec![Ability::Strength, Ability::Constitution],
        ..CombatantStats::default()
    };
    Combatant::new(id, "Fighter", Faction::Party, position, stats)
        .with_controller(Controller::Player)
        .with_actions([LONGSWORD, CHARGE, SHOVE, DODGE, DISENGAGE])
}

pub fn wizard(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(8, 14, 12, 17, 12, 10),
        armor_class: 12,
        max_hp: 16,
        spellcasting: Ability::Intelligence,
        save_proficiencies: vec![Ability::Intelligence, Ability::Wisdom],
        ..CombatantStats::default()
    };
    Combatant::new(id, "Wizard", Faction::Party, position, stats)
        .with_controller(Controller::Player)
        .with_actions([FIRE_BOLT, BURNING_HANDS, WEB, WALL_OF_FIRE, CREATE_WATER, DODGE])
}

pub fn cleric(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(14, 10, 14, 10, 16, 12),
        armor_class: 16,
        max_hp: 22,
        spellcasting: Ability::Wisdom,
        save_proficiencies: vec![Ability::Wisdom, Ability::Charisma],
        ..CombatantStats::default()
    };
    Combatant::new(id, "Cleric", Faction::Party, position, stats)
        .with_controller(Controller::Player)
        .with_actions([LONGSWORD, CURE_WOUNDS, HEALING_WORD, BLESS, HOLD_PERSON])
}

pub fn goblin_archer(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(8, 14, 10, 10, 8, 8),
        armor_class: 13,
        max_hp: 7,
        dies_at_zero: true,
        ..CombatantStats::default()
    };
    Combatant::new(id, "Goblin Archer", Faction::Hostile, position, stats)
        .with_actions([SHORTBOW, DISENGAGE])
}

pub fn orc_brute(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(16, 12, 16, 7, 11, 10),
        armor_class: 13,
        max_hp: 15,
        dies_at_zero: true,
        ..CombatantStats::default()
    };
    Combatant::new(id, "Orc Brute", Faction::Hostile, position, stats)
        .with_actions([GREATAXE, CHARGE, SHOVE])
}

pub fn cultist(id: CombatantId, position: Position) -> Combatant {
    let stats = CombatantStats {
        abilities: AbilityScores::new(11, 12, 10, 10, 11, 14),
        armor_class: 12,
        max_hp: 12,
        spellcasting: Ability::Charisma,
        dies_at_zero: true,
        ..CombatantStats::default()
    };
    Combatant::new(id, "Cultist", Faction::Hostile, position, stats)
        .with_actions([FIRE_BOLT, HOLD_PERSON, DODGE])
}
