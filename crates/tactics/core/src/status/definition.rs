//! Status definitions: what a status does while it is on a combatant.

use bitflags::bitflags;

use crate::rules::{DamageType, DiceExpr, Modifier, ModifierCondition, ModifierKind, ModifierOwner, RollCategory};
use crate::state::StatusId;

bitflags! {
    /// Behavioural switches a status imposes on its bearer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u8 {
        /// Bearer cannot take actions or reactions.
        const INCAPACITATED = 1 << 0;
        /// Bearer cannot take reactions.
        const PREVENTS_REACTIONS = 1 << 1;
        /// Bearer cannot move voluntarily.
        const PREVENTS_MOVEMENT = 1 << 2;
        /// Leaving an enemy's reach does not provoke.
        const DISENGAGED = 1 << 3;
        /// Removed as soon as the bearer takes damage.
        const BREAKS_ON_DAMAGE = 1 << 4;
    }
}

impl StatusFlags {
    pub fn blocks_actions(self) -> bool {
        self.contains(Self::INCAPACITATED)
    }

    pub fn blocks_reactions(self) -> bool {
        self.intersects(Self::INCAPACITATED | Self::PREVENTS_REACTIONS)
    }

    pub fn blocks_movement(self) -> bool {
        self.intersects(Self::INCAPACITATED | Self::PREVENTS_MOVEMENT)
    }
}

/// When a status's tick effects fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickTiming {
    #[default]
    TurnStart,
    TurnEnd,
    RoundEnd,
}

/// Periodic effect of a status, scaled by its stack count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickEffect {
    Damage {
        dice: DiceExpr,
        damage_type: DamageType,
    },
    Heal {
        dice: DiceExpr,
    },
}

/// A modifier the status grants its bearer while active.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierTemplate {
    pub category: RollCategory,
    pub kind: ModifierKind,
    pub condition: Option<ModifierCondition>,
}

impl ModifierTemplate {
    pub fn new(category: RollCategory, kind: ModifierKind) -> Self {
        Self {
            category,
            kind,
            condition: None,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: ModifierCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Concrete modifier tagged with the granting status.
    pub fn instantiate(&self, status: &StatusId) -> Modifier {
        Modifier {
            category: self.category,
            kind: self.kind,
            condition: self.condition.clone(),
            owner: ModifierOwner::Status(status.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusDefinition {
    pub id: StatusId,
    pub name: String,
    pub max_stacks: u8,
    /// Duration in the bearer's turns; `None` is permanent until removed.
    pub default_duration: Option<u32>,
    pub tick_timing: TickTiming,
    pub tick_effects: Vec<TickEffect>,
    pub modifiers: Vec<ModifierTemplate>,
    pub flags: StatusFlags,
}

impl StatusDefinition {
    pub fn new(id: impl Into<StatusId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_stacks: 1,
            default_duration: None,
            tick_timing: TickTiming::default(),
            tick_effects: Vec::new(),
            modifiers: Vec::new(),
            flags: StatusFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_max_stacks(mut self, max_stacks: u8) -> Self {
        self.max_stacks = max_stacks.max(1);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, turns: u32) -> Self {
        self.default_duration = Some(turns);
        self
    }

    #[must_use]
    pub fn with_tick(mut self, timing: TickTiming, effect: TickEffect) -> Self {
        self.tick_timing = timing;
        self.tick_effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, template: ModifierTemplate) -> Self {
        self.modifiers.push(template);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: StatusFlags) -> Self {
        self.flags |= flags;
        self
    }
}
