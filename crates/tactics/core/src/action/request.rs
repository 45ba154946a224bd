use crate::state::{ActionId, CombatantId, Position};

/// What the actor pointed the action at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTarget {
    #[default]
    None,
    Unit(CombatantId),
    Units(Vec<CombatantId>),
    Point(Position),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOptions {
    /// Resolve without checking or spending the actor's budget.
    pub skip_cost_validation: bool,
    /// Executed as a reaction's response: the actor need not know the action.
    pub as_reaction: bool,
}

impl ActionOptions {
    pub const REACTION: Self = Self {
        skip_cost_validation: true,
        as_reaction: true,
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub actor: CombatantId,
    pub action: ActionId,
    pub target: ActionTarget,
    pub options: ActionOptions,
}

impl ActionRequest {
    pub fn new(actor: CombatantId, action: impl Into<ActionId>, target: ActionTarget) -> Self {
        Self {
            actor,
            action: action.into(),
            target,
            options: ActionOptions::default(),
        }
    }

    pub fn at_unit(actor: CombatantId, action: impl Into<ActionId>, target: CombatantId) -> Self {
        Self::new(actor, action, ActionTarget::Unit(target))
    }

    pub fn at_point(actor: CombatantId, action: impl Into<ActionId>, point: Position) -> Self {
        Self::new(actor, action, ActionTarget::Point(point))
    }

    #[must_use]
    pub fn with_options(mut self, options: ActionOptions) -> Self {
        self.options = options;
        self
    }
}
