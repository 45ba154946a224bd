//! Combatant records and their per-turn resource pools.

use crate::action::{ActionCost, AttackType};

use super::common::{ActionId, CombatantId, Faction, Position};

/// Who chooses a combatant's actions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    Player,
    #[default]
    Ai,
}

/// Coarse life-state of a combatant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeState {
    #[default]
    Alive,
    /// At 0 HP and rolling death saving throws.
    Downed,
    /// At 0 HP but stable.
    Unconscious,
    Dead,
}

impl LifeState {
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Downed or unconscious: on the field, but at 0 HP.
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Downed | Self::Unconscious)
    }
}

/// The six ability scores.
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
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub const AVERAGE: Self = Self::uniform(10);

    pub const fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub const fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    pub const fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Ability modifier, rounded toward negative infinity: 9 gives -1, 12 gives +1.
    pub const fn modifier(&self, ability: Ability) -> i32 {
        (self.score(ability) - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::AVERAGE
    }
}

/// Static combat statistics of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantStats {
    pub abilities: AbilityScores,
    pub proficiency: i32,
    pub armor_class: i32,
    pub max_hp: u32,
    /// Movement per turn, in tiles.
    pub speed: u32,
    /// Melee reach, in tiles.
    pub reach: u32,
    /// Additional weapon attacks granted per attack action.
    pub extra_attacks: u8,
    pub spellcasting: Ability,
    pub save_proficiencies: Vec<Ability>,
    /// Creatures without death saves die as soon as they reach 0 HP.
    pub dies_at_zero: bool,
}

impl CombatantStats {
    pub fn save_bonus(&self, ability: Ability) -> i32 {
        let proficient = self.save_proficiencies.contains(&ability);
        self.abilities.modifier(ability) + if proficient { self.proficiency } else { 0 }
    }

    /// Flat bonus added to the d20 for an attack of the given type.
    pub fn attack_bonus(&self, attack_type: AttackType) -> i32 {
        let ability = match attack_type {
            AttackType::None => return 0,
            AttackType::MeleeWeapon => Ability::Strength,
            AttackType::RangedWeapon => Ability::Dexterity,
            AttackType::MeleeSpell | AttackType::RangedSpell => self.spellcasting,
        };
        self.abilities.modifier(ability) + self.proficiency
    }

    pub fn spell_save_dc(&self) -> i32 {
        8 + self.proficiency + self.abilities.modifier(self.spellcasting)
    }
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self {
            abilities: AbilityScores::AVERAGE,
            proficiency: 2,
            armor_class: 10,
            max_hp: 10,
            speed: 6,
            reach: 1,
            extra_attacks: 0,
            spellcasting: Ability::Intelligence,
            save_proficiencies: Vec::new(),
            dies_at_zero: false,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourcePool {
    Action,
    BonusAction,
    Reaction,
    Movement,
}

/// Per-turn action economy. All pools are unsigned and only ever reduced
/// through checked subtraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBudget {
    pub action: u8,
    pub bonus_action: u8,
    pub reaction: u8,
    pub movement: u32,
}

impl ActionBudget {
    pub const fn full(movement: u32) -> Self {
        Self {
            action: 1,
            bonus_action: 1,
            reaction: 1,
            movement,
        }
    }

    /// Returns the first pool that cannot cover `cost`.
    pub fn shortfall(&self, cost: &ActionCost) -> Option<ResourcePool> {
        if self.action < cost.action {
            Some(ResourcePool::Action)
        } else if self.bonus_action < cost.bonus_action {
            Some(ResourcePool::BonusAction)
        } else if self.reaction < cost.reaction {
            Some(ResourcePool::Reaction)
        } else if self.movement < cost.movement {
            Some(ResourcePool::Movement)
        } else {
            None
        }
    }

    /// Deducts `cost` from every pool, or nothing if any pool falls short.
    pub fn spend(&mut self, cost: &ActionCost) -> Result<(), ResourcePool> {
        let action = self.action.checked_sub(cost.action).ok_or(ResourcePool::Action)?;
        let bonus_action = self
            .bonus_action
            .checked_sub(cost.bonus_action)
            .ok_or(ResourcePool::BonusAction)?;
        let reaction = self
            .reaction
            .checked_sub(cost.reaction)
            .ok_or(ResourcePool::Reaction)?;
        let movement = self
            .movement
            .checked_sub(cost.movement)
            .ok_or(ResourcePool::Movement)?;

        *self = Self {
            action,
            bonus_action,
            reaction,
            movement,
        };
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resources {
    pub hp: u32,
    pub temp_hp: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

impl DeathSaves {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A participant in the combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub faction: Faction,
    pub controller: Controller,
    pub position: Position,
    pub stats: CombatantStats,
    pub resources: Resources,
    pub budget: ActionBudget,
    pub known_actions: Vec<ActionId>,
    pub life_state: LifeState,
    pub death_saves: DeathSaves,
    /// Roster position, used to break initiative ties.
    pub spawn_order: u32,
}

impl Combatant {
    /// Creates a combatant at full HP with a full budget.
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        faction: Faction,
        position: Position,
        stats: CombatantStats,
    ) -> Self {
        let resources = Resources {
            hp: stats.max_hp,
            temp_hp: 0,
        };
        let budget = ActionBudget::full(stats.speed);
        Self {
            id,
            name: name.into(),
            faction,
            controller: Controller::default(),
            position,
            stats,
            resources,
            budget,
            known_actions: Vec::new(),
            life_state: LifeState::Alive,
            death_saves: DeathSaves::default(),
            spawn_order: id.0,
        }
    }

    #[must_use]
    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    #[must_use]
    pub fn with_actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionId>,
    {
        self.known_actions.extend(actions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_spawn_order(mut self, spawn_order: u32) -> Self {
        self.spawn_order = spawn_order;
        self
    }

    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.resources.hp = hp.min(self.stats.max_hp);
        self
    }

    pub fn knows(&self, action: &ActionId) -> bool {
        self.known_actions.contains(action)
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.faction.is_hostile_to(other.faction)
    }

    pub fn is_bloodied(&self) -> bool {
        self.resources.hp * 2 <= self.stats.max_hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifier_rounds_down() {
        let scores = AbilityScores::new(9, 12, 10, 1, 20, 15);
        assert_eq!(scores.modifier(Ability::Strength), -1);
        assert_eq!(scores.modifier(Ability::Dexterity), 1);
        assert_eq!(scores.modifier(Ability::Constitution), 0);
        assert_eq!(scores.modifier(Ability::Intelligence), -5);
        assert_eq!(scores.modifier(Ability::Wisdom), 5);
        assert_eq!(scores.modifier(Ability::Charisma), 2);
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let mut budget = ActionBudget::full(6);
        let too_far = ActionCost {
            action: 1,
            movement: 7,
            ..ActionCost::FREE
        };

        assert_eq!(budget.spend(&too_far), Err(ResourcePool::Movement));
        assert_eq!(budget, ActionBudget::full(6));

        assert_eq!(budget.spend(&ActionCost::ACTION), Ok(()));
        assert_eq!(budget.action, 0);
        assert_eq!(budget.shortfall(&ActionCost::ACTION), Some(ResourcePool::Action));
        assert_eq!(budget.shortfall(&ActionCost::BONUS_ACTION), None);
    }

    #[test]
    fn spell_attack_uses_spellcasting_ability() {
        let stats = CombatantStats {
            abilities: AbilityScores::new(8, 14, 10, 16, 10, 10),
            proficiency: 2,
            ..CombatantStats::default()
        };
        assert_eq!(stats.attack_bonus(AttackType::MeleeWeapon), 1);
        assert_eq!(stats.attack_bonus(AttackType::RangedWeapon), 4);
        assert_eq!(stats.attack_bonus(AttackType::RangedSpell), 5);
        assert_eq!(stats.spell_save_dc(), 13);
    }
}
