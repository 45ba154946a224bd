use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::action::ActionDefinition;
use crate::config::CombatConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::events::EventLog;
use crate::reaction::{ReactionDefinition, ReactionSystem};
use crate::rules::{Modifier, RulesEngine};
use crate::scenario::{ReactionGrant, Scenario};
use crate::state::{
    ActionId, Battlefield, CombatState, Combatant, CombatantId, Position, ReactionId, StatusId,
};
use crate::status::{StatusDefinition, StatusInteraction, StatusManager};

use super::correlation::ActionCorrelator;
use super::phase::PhaseMachine;
use super::turns::TurnQueue;
use super::CombatEngine;

/// Rejected engine setup. Returned before any combat state exists.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    #[error("roster is empty")]
    EmptyRoster,

    #[error("combatant {0} appears more than once")]
    DuplicateCombatant(CombatantId),

    #[error("action `{0}` is registered more than once")]
    DuplicateAction(ActionId),

    #[error("status `{0}` is registered more than once")]
    DuplicateStatus(StatusId),

    #[error("reaction `{0}` is registered more than once")]
    DuplicateReaction(ReactionId),

    #[error("unknown action `{0}`")]
    UnknownAction(ActionId),

    #[error("status `{0}` allows zero stacks")]
    ZeroStacks(StatusId),

    #[error("unknown status `{0}`")]
    UnknownStatus(StatusId),

    #[error("unknown reaction `{0}`")]
    UnknownReaction(ReactionId),

    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("combatant {combatant} starts at unusable tile {position}")]
    InvalidPosition {
        combatant: CombatantId,
        position: Position,
    },

    #[error("combatants {first} and {second} share tile {position}")]
    SharedPosition {
        first: CombatantId,
        second: CombatantId,
        position: Position,
    },
}

impl GameError for ScenarioError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRoster => "SCENARIO_EMPTY_ROSTER",
            Self::DuplicateCombatant(_) => "SCENARIO_DUPLICATE_COMBATANT",
            Self::DuplicateAction(_) => "SCENARIO_DUPLICATE_ACTION",
            Self::DuplicateStatus(_) => "SCENARIO_DUPLICATE_STATUS",
            Self::DuplicateReaction(_) => "SCENARIO_DUPLICATE_REACTION",
            Self::UnknownAction(_) => "SCENARIO_UNKNOWN_ACTION",
            Self::ZeroStacks(_) => "SCENARIO_ZERO_STACKS",
            Self::UnknownStatus(_) => "SCENARIO_UNKNOWN_STATUS",
            Self::UnknownReaction(_) => "SCENARIO_UNKNOWN_REACTION",
            Self::UnknownCombatant(_) => "SCENARIO_UNKNOWN_COMBATANT",
            Self::InvalidPosition { .. } => "SCENARIO_INVALID_POSITION",
            Self::SharedPosition { .. } => "SCENARIO_SHARED_POSITION",
        }
    }
}

/// Two-phase construction: register everything, then [`build`](Self::build)
/// checks every cross reference and wires the engine.
#[derive(Clone, Debug, Default)]
pub struct CombatEngineBuilder {
    seed: u64,
    config: CombatConfig,
    battlefield: Battlefield,
    combatants: Vec<Combatant>,
    actions: Vec<ActionDefinition>,
    statuses: Vec<StatusDefinition>,
    interactions: Vec<StatusInteraction>,
    reactions: Vec<ReactionDefinition>,
    grants: Vec<ReactionGrant>,
    modifiers: Vec<(CombatantId, Modifier)>,
}

impl CombatEngineBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn battlefield(mut self, battlefield: Battlefield) -> Self {
        self.battlefield = battlefield;
        self
    }

    #[must_use]
    pub fn combatant(mut self, combatant: Combatant) -> Self {
        self.combatants.push(combatant);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionDefinition) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionDefinition>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn status(mut self, status: StatusDefinition) -> Self {
        self.statuses.push(status);
        self
    }

    #[must_use]
    pub fn statuses(mut self, statuses: impl IntoIterator<Item = StatusDefinition>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    #[must_use]
    pub fn interaction(mut self, interaction: StatusInteraction) -> Self {
        self.interactions.push(interaction);
        self
    }

    #[must_use]
    pub fn reaction(mut self, reaction: ReactionDefinition) -> Self {
        self.reactions.push(reaction);
        self
    }

    #[must_use]
    pub fn grant(mut self, combatant: CombatantId, reaction: impl Into<ReactionId>) -> Self {
        self.grants.push(ReactionGrant {
            combatant,
            reaction: reaction.into(),
        });
        self
    }

    /// Installs a modifier owned by the scenario (traits, equipment).
    #[must_use]
    pub fn modifier(mut self, combatant: CombatantId, modifier: Modifier) -> Self {
        self.modifiers.push((combatant, modifier));
        self
    }

    pub fn build(self) -> Result<CombatEngine, ScenarioError> {
        self.validate()?;

        let mut statuses = StatusManager::new();
        for status in self.statuses {
            statuses.register(status);
        }
        for interaction in self.interactions {
            statuses.add_interaction(interaction);
        }

        let mut reactions = ReactionSystem::new();
        for reaction in self.reactions {
            reactions.register(reaction);
        }
        for grant in self.grants {
            reactions.grant(grant.combatant, grant.reaction);
        }

        let mut rules = RulesEngine::new(self.seed, self.config.critical_threshold);
        for (combatant, modifier) in self.modifiers {
            rules.add_modifier(combatant, modifier);
        }

        let actions: BTreeMap<ActionId, ActionDefinition> = self
            .actions
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect();

        debug!(
            target: "tactics::engine",
            seed = self.seed,
            combatants = self.combatants.len(),
            actions = actions.len(),
            "combat engine built"
        );

        Ok(CombatEngine {
            config: self.config,
            state: CombatState::new(self.battlefield, self.combatants),
            turns: TurnQueue::default(),
            phase: PhaseMachine::new(),
            correlator: ActionCorrelator::default(),
            rules,
            statuses,
            reactions,
            actions,
            events: EventLog::default(),
        })
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.combatants.is_empty() {
            return Err(ScenarioError::EmptyRoster);
        }

        let mut action_ids = BTreeSet::new();
        for def in &self.actions {
            if !action_ids.insert(&def.id) {
                return Err(ScenarioError::DuplicateAction(def.id.clone()));
            }
        }
        let mut status_ids = BTreeSet::new();
        for def in &self.statuses {
            if !status_ids.insert(&def.id) {
                return Err(ScenarioError::DuplicateStatus(def.id.clone()));
            }
            if def.max_stacks == 0 {
                return Err(ScenarioError::ZeroStacks(def.id.clone()));
            }
        }
        let mut reaction_ids = BTreeSet::new();
        for def in &self.reactions {
            if !reaction_ids.insert(&def.id) {
                return Err(ScenarioError::DuplicateReaction(def.id.clone()));
            }
        }

        let known_status = |id: &StatusId| {
            if status_ids.contains(id) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownStatus(id.clone()))
            }
        };
        for def in &self.actions {
            def.referenced_statuses().try_for_each(known_status)?;
        }
        for interaction in &self.interactions {
            known_status(&interaction.trigger)?;
            known_status(interaction.other())?;
        }
        for def in &self.reactions {
            if let Some(action) = def.action()
                && !action_ids.contains(action)
            {
                return Err(ScenarioError::UnknownAction(action.clone()));
            }
        }

        let mut seen: BTreeMap<CombatantId, &Combatant> = BTreeMap::new();
        let mut tiles: BTreeMap<Position, CombatantId> = BTreeMap::new();
        for combatant in &self.combatants {
            if seen.insert(combatant.id, combatant).is_some() {
                return Err(ScenarioError::DuplicateCombatant(combatant.id));
            }
            if !self.battlefield.is_walkable(combatant.position) {
                return Err(ScenarioError::InvalidPosition {
                    combatant: combatant.id,
                    position: combatant.position,
                });
            }
            if !combatant.life_state.is_dead()
                && let Some(first) = tiles.insert(combatant.position, combatant.id)
            {
                return Err(ScenarioError::SharedPosition {
                    first,
                    second: combatant.id,
                    position: combatant.position,
                });
            }
            if let Some(action) = combatant.known_actions.iter().find(|a| !action_ids.contains(a)) {
                return Err(ScenarioError::UnknownAction(action.clone()));
            }
        }

        for grant in &self.grants {
            if !seen.contains_key(&grant.combatant) {
                return Err(ScenarioError::UnknownCombatant(grant.combatant));
            }
            if !reaction_ids.contains(&grant.reaction) {
                return Err(ScenarioError::UnknownReaction(grant.reaction.clone()));
            }
        }
        if let Some((combatant, _)) = self.modifiers.iter().find(|(c, _)| !seen.contains_key(c)) {
            return Err(ScenarioError::UnknownCombatant(*combatant));
        }
        Ok(())
    }
}

impl CombatEngine {
    /// Builds an engine from a scenario bundle.
    pub fn from_scenario(scenario: Scenario, config: CombatConfig) -> Result<Self, ScenarioError> {
        let Scenario {
            seed,
            battlefield,
            roster,
            actions,
            statuses,
            interactions,
            reactions,
            grants,
        } = scenario;

        let mut builder = CombatEngineBuilder::new(seed)
            .config(config)
            .battlefield(battlefield)
            .actions(actions)
            .statuses(statuses);
        for combatant in roster {
            builder = builder.combatant(combatant);
        }
        for interaction in interactions {
            builder = builder.interaction(interaction);
        }
        for reaction in reactions {
            builder = builder.reaction(reaction);
        }
        for grant in grants {
            builder = builder.grant(grant.combatant, grant.reaction);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Effect, TargetType};
    use crate::state::{CombatantStats, Faction};

    fn unit(id: u32, x: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("unit-{id}"),
            Faction::Party,
            Position::new(x, 0),
            CombatantStats::default(),
        )
    }

    fn builder() -> CombatEngineBuilder {
        CombatEngineBuilder::new(7).battlefield(Battlefield::new(5, 5))
    }

    #[test]
    fn rejects_duplicate_combatants_and_shared_tiles() {
        let duplicate = builder().combatant(unit(1, 0)).combatant(unit(1, 2)).build();
        assert_eq!(duplicate.err(), Some(ScenarioError::DuplicateCombatant(CombatantId(1))));

        let shared = builder().combatant(unit(1, 0)).combatant(unit(2, 0)).build();
        assert!(matches!(shared, Err(ScenarioError::SharedPosition { .. })));
    }

    #[test]
    fn rejects_dangling_references() {
        let unknown_action = builder()
            .combatant(unit(1, 0).with_actions(["slash"]))
            .build();
        assert_eq!(
            unknown_action.err(),
            Some(ScenarioError::UnknownAction(ActionId::new("slash")))
        );

        let unknown_status = builder()
            .combatant(unit(1, 0))
            .action(
                ActionDefinition::new("hex", "Hex", TargetType::SingleUnit { range: 6 })
                    .with_effect(Effect::apply_status("hexed")),
            )
            .build();
        assert_eq!(
            unknown_status.err(),
            Some(ScenarioError::UnknownStatus(StatusId::new("hexed")))
        );

        let unknown_grant = builder()
            .combatant(unit(1, 0))
            .grant(CombatantId(1), "parry")
            .build();
        assert_eq!(
            unknown_grant.err(),
            Some(ScenarioError::UnknownReaction(ReactionId::new("parry")))
        );
    }

    #[test]
    fn rejects_statuses_without_stacks() {
        let mut stackless = StatusDefinition::new("dazed", "Dazed");
        stackless.max_stacks = 0;
        let result = builder().combatant(unit(1, 0)).status(stackless).build();
        assert_eq!(
            result.err(),
            Some(ScenarioError::ZeroStacks(StatusId::new("dazed")))
        );
    }

    #[test]
    fn rejects_out_of_bounds_start() {
        let result = builder().combatant(unit(1, 9)).build();
        assert!(matches!(result, Err(ScenarioError::InvalidPosition { .. })));
    }
}
