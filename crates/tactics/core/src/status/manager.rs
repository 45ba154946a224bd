use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ErrorSeverity, GameError};
use crate::events::{CombatEvent, EventLog};
use crate::rules::{ModifierOwner, RulesEngine};
use crate::state::{CombatantId, StatusId};

use super::definition::{StatusDefinition, StatusFlags, TickEffect, TickTiming};
use super::instance::{StatusInstance, StatusSet};
use super::interaction::{InteractionTable, StatusInteraction};

/// Request to put a status on a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusApplication {
    pub status: StatusId,
    pub target: CombatantId,
    pub source: Option<CombatantId>,
    /// Overrides the definition's default duration.
    pub duration: Option<u32>,
    pub stacks: u8,
}

impl StatusApplication {
    pub fn new(status: impl Into<StatusId>, target: CombatantId) -> Self {
        Self {
            status: status.into(),
            target,
            source: None,
            duration: None,
            stacks: 1,
        }
    }

    #[must_use]
    pub fn from_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn for_turns(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }

    #[must_use]
    pub fn with_stacks(mut self, stacks: u8) -> Self {
        self.stacks = stacks;
        self
    }
}

/// Result of a successful application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub stacks: u8,
    pub remaining: Option<u32>,
    pub refreshed: bool,
    /// Statuses removed by interaction rules.
    pub removed: Vec<StatusId>,
}

/// Why a status instance went away.
#[derive(Clone, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalReason {
    Expired,
    Removed,
    /// Removed by an interaction rule when this status was applied.
    Interaction(StatusId),
    Damaged,
    Died,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusError {
    #[error("unknown status `{0}`")]
    UnknownStatus(StatusId),

    #[error("status `{status}` is prevented by `{by}`")]
    Prevented { status: StatusId, by: StatusId },

    #[error("combatant {0} cannot hold more statuses")]
    TooManyStatuses(CombatantId),

    #[error("combatant {0} not found")]
    TargetNotFound(CombatantId),

    #[error("combatant {0} is dead")]
    TargetDead(CombatantId),
}

impl GameError for StatusError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownStatus(_) | Self::TargetNotFound(_) => ErrorSeverity::Validation,
            Self::Prevented { .. } | Self::TooManyStatuses(_) | Self::TargetDead(_) => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStatus(_) => "STATUS_UNKNOWN",
            Self::Prevented { .. } => "STATUS_PREVENTED",
            Self::TooManyStatuses(_) => "STATUS_TOO_MANY",
            Self::TargetNotFound(_) => "STATUS_TARGET_NOT_FOUND",
            Self::TargetDead(_) => "STATUS_TARGET_DEAD",
        }
    }
}

/// A tick effect due on one combatant, to be resolved by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTick {
    pub status: StatusId,
    pub target: CombatantId,
    pub source: Option<CombatantId>,
    pub stacks: u8,
    pub effect: TickEffect,
}

/// Owns status definitions, interaction rules and live instances.
///
/// Methods that change instances also keep the rules engine's modifier store
/// in sync (modifiers are tagged `ModifierOwner::Status(id)`) and append the
/// matching notifications to the event log.
#[derive(Clone, Debug, Default)]
pub struct StatusManager {
    definitions: BTreeMap<StatusId, StatusDefinition>,
    interactions: InteractionTable,
    instances: BTreeMap<CombatantId, StatusSet>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: StatusDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn add_interaction(&mut self, interaction: StatusInteraction) {
        self.interactions.add(interaction);
    }

    pub fn definition(&self, status: &StatusId) -> Option<&StatusDefinition> {
        self.definitions.get(status)
    }

    pub fn is_registered(&self, status: &StatusId) -> bool {
        self.definitions.contains_key(status)
    }

    pub fn interactions(&self) -> &InteractionTable {
        &self.interactions
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn has_status(&self, target: CombatantId, status: &StatusId) -> bool {
        self.instances
            .get(&target)
            .is_some_and(|set| set.contains(status))
    }

    pub fn instance(&self, target: CombatantId, status: &StatusId) -> Option<&StatusInstance> {
        self.instances.get(&target).and_then(|set| set.get(status))
    }

    pub fn statuses_of(&self, target: CombatantId) -> &[StatusInstance] {
        self.instances
            .get(&target)
            .map(StatusSet::as_slice)
            .unwrap_or_default()
    }

    pub fn status_ids(&self, target: CombatantId) -> Vec<StatusId> {
        self.instances
            .get(&target)
            .map(StatusSet::ids)
            .unwrap_or_default()
    }

    /// Union of the flags of every status on `target`.
    pub fn flags_of(&self, target: CombatantId) -> StatusFlags {
        self.statuses_of(target)
            .iter()
            .filter_map(|i| self.definitions.get(&i.status))
            .fold(StatusFlags::empty(), |acc, def| acc | def.flags)
    }

    pub fn all_instances(&self) -> impl Iterator<Item = &StatusInstance> {
        self.instances.values().flat_map(StatusSet::iter)
    }

    /// Tick effects of `target`'s statuses that fire at `timing`.
    pub fn pending_ticks(&self, target: CombatantId, timing: TickTiming) -> Vec<PendingTick> {
        self.statuses_of(target)
            .iter()
            .filter_map(|instance| {
                let def = self.definitions.get(&instance.status)?;
                (def.tick_timing == timing).then_some((instance, def))
            })
            .flat_map(|(instance, def)| {
                def.tick_effects.iter().map(move |effect| PendingTick {
                    status: instance.status.clone(),
                    target: instance.target,
                    source: instance.source,
                    stacks: instance.stacks,
                    effect: *effect,
                })
            })
            .collect()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Creates or refreshes an instance, then applies interaction rules.
    pub fn apply_status(
        &mut self,
        rules: &mut RulesEngine,
        events: &mut EventLog,
        application: StatusApplication,
    ) -> Result<StatusChange, StatusError> {
        let StatusApplication {
            status,
            target,
            source,
            duration,
            stacks,
        } = application;

        let def = self
            .definitions
            .get(&status)
            .ok_or_else(|| StatusError::UnknownStatus(status.clone()))?;
        // Hand-built definitions can bypass `with_max_stacks`.
        let max_stacks = def.max_stacks.max(1);
        let duration = duration.or(def.default_duration);
        let stacks = stacks.clamp(1, max_stacks);
        let templates = def.modifiers.clone();

        let present = self.instances.get(&target);
        if let Some(by) = self
            .interactions
            .blocker(&status, |other| present.is_some_and(|set| set.contains(other)))
        {
            debug!(
                target: "tactics::status",
                combatant = %target,
                %status,
                %by,
                "status application prevented"
            );
            return Err(StatusError::Prevented {
                status: status.clone(),
                by: by.clone(),
            });
        }

        let set = self.instances.entry(target).or_default();
        let (stacks, remaining, refreshed) = match set.get_mut(&status) {
            Some(existing) => {
                existing.refresh(duration, stacks, max_stacks);
                (existing.stacks, existing.remaining, true)
            }
            None => {
                set.insert(StatusInstance {
                    status: status.clone(),
                    target,
                    source,
                    remaining: duration,
                    stacks,
                })
                .map_err(|_| StatusError::TooManyStatuses(target))?;
                for template in &templates {
                    rules.add_modifier(target, template.instantiate(&status));
                }
                (stacks, duration, false)
            }
        };

        debug!(
            target: "tactics::status",
            combatant = %target,
            %status,
            stacks,
            refreshed,
            "status applied"
        );
        events.push(CombatEvent::StatusApplied {
            target,
            status: status.clone(),
            source,
            stacks,
            refreshed,
        });

        let removals: Vec<StatusId> = self.interactions.removals(&status).cloned().collect();
        let mut removed = Vec::new();
        for other in removals {
            if other != status
                && self.remove_status(
                    rules,
                    events,
                    target,
                    &other,
                    RemovalReason::Interaction(status.clone()),
                )
            {
                removed.push(other);
            }
        }

        Ok(StatusChange {
            stacks,
            remaining,
            refreshed,
            removed,
        })
    }

    /// Removes one instance. Returns false (and emits nothing) if absent.
    pub fn remove_status(
        &mut self,
        rules: &mut RulesEngine,
        events: &mut EventLog,
        target: CombatantId,
        status: &StatusId,
        reason: RemovalReason,
    ) -> bool {
        let Some(removed) = self
            .instances
            .get_mut(&target)
            .and_then(|set| set.remove(status))
        else {
            return false;
        };

        rules.remove_by_owner(target, &ModifierOwner::Status(removed.status.clone()));
        debug!(
            target: "tactics::status",
            combatant = %target,
            status = %removed.status,
            %reason,
            "status removed"
        );
        events.push(CombatEvent::StatusRemoved {
            target,
            status: removed.status,
            reason,
        });
        true
    }

    /// Removes every status on `target`.
    pub fn clear(
        &mut self,
        rules: &mut RulesEngine,
        events: &mut EventLog,
        target: CombatantId,
        reason: RemovalReason,
    ) -> Vec<StatusId> {
        let ids = self.status_ids(target);
        ids.into_iter()
            .filter(|id| self.remove_status(rules, events, target, id, reason.clone()))
            .collect()
    }

    /// Decrements `target`'s timed statuses and removes the expired ones.
    pub fn expire_turn(
        &mut self,
        rules: &mut RulesEngine,
        events: &mut EventLog,
        target: CombatantId,
    ) -> Vec<StatusId> {
        let expired = self
            .instances
            .get_mut(&target)
            .map(StatusSet::decrement)
            .unwrap_or_default();
        expired
            .into_iter()
            .filter(|id| self.remove_status(rules, events, target, id, RemovalReason::Expired))
            .collect()
    }

    /// Removes statuses flagged `BREAKS_ON_DAMAGE` from `target`.
    pub fn break_on_damage(
        &mut self,
        rules: &mut RulesEngine,
        events: &mut EventLog,
        target: CombatantId,
    ) -> Vec<StatusId> {
        let fragile: Vec<StatusId> = self
            .statuses_of(target)
            .iter()
            .filter(|i| {
                self.definitions
                    .get(&i.status)
                    .is_some_and(|d| d.flags.contains(StatusFlags::BREAKS_ON_DAMAGE))
            })
            .map(|i| i.status.clone())
            .collect();
        fragile
            .into_iter()
            .filter(|id| self.remove_status(rules, events, target, id, RemovalReason::Damaged))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ModifierKind, RollCategory, RollContext};
    use crate::status::ModifierTemplate;

    const TARGET: CombatantId = CombatantId(4);

    fn manager() -> StatusManager {
        let mut manager = StatusManager::new();
        manager.register(
            StatusDefinition::new("blessed", "Blessed")
                .with_duration(3)
                .with_modifier(ModifierTemplate::new(
                    RollCategory::SavingThrow,
                    ModifierKind::Flat(2),
                )),
        );
        manager.register(
            StatusDefinition::new("burning", "Burning")
                .with_max_stacks(3)
                .with_duration(2),
        );
        manager.register(StatusDefinition::new("wet", "Wet").with_duration(2));
        manager.add_interaction(StatusInteraction::removes("wet", "burning"));
        manager.add_interaction(StatusInteraction::prevented_by("burning", "wet"));
        manager
    }

    #[test]
    fn apply_then_remove_fires_one_notification_each() {
        let mut manager = manager();
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();
        let blessed = StatusId::new("blessed");

        assert!(
            manager
                .apply_status(&mut rules, &mut events, StatusApplication::new("blessed", TARGET))
                .is_ok()
        );
        assert!(manager.has_status(TARGET, &blessed));
        assert_eq!(
            rules.apply(0, RollCategory::SavingThrow, &[TARGET], &RollContext::default()),
            2
        );

        assert!(manager.remove_status(&mut rules, &mut events, TARGET, &blessed, RemovalReason::Removed));
        assert!(!manager.remove_status(&mut rules, &mut events, TARGET, &blessed, RemovalReason::Removed));
        assert!(!manager.has_status(TARGET, &blessed));
        assert!(rules.modifiers(TARGET).is_empty());

        let applied = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::StatusApplied { .. }))
            .count();
        let removed = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::StatusRemoved { .. }))
            .count();
        assert_eq!((applied, removed), (1, 1));
    }

    #[test]
    fn reapplication_clamps_stacks() {
        let mut manager = manager();
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();

        for _ in 0..5 {
            let change = manager
                .apply_status(
                    &mut rules,
                    &mut events,
                    StatusApplication::new("burning", TARGET).with_stacks(2),
                )
                .map(|c| c.stacks);
            assert!(change.is_ok());
        }
        let instance = manager.instance(TARGET, &StatusId::new("burning"));
        assert_eq!(instance.map(|i| i.stacks), Some(3));
    }

    #[test]
    fn interactions_remove_and_prevent() {
        let mut manager = manager();
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();

        let _ = manager.apply_status(&mut rules, &mut events, StatusApplication::new("burning", TARGET));
        let change = manager.apply_status(&mut rules, &mut events, StatusApplication::new("wet", TARGET));
        assert_eq!(change.map(|c| c.removed), Ok(vec![StatusId::new("burning")]));

        let blocked = manager.apply_status(&mut rules, &mut events, StatusApplication::new("burning", TARGET));
        assert_eq!(
            blocked,
            Err(StatusError::Prevented {
                status: StatusId::new("burning"),
                by: StatusId::new("wet"),
            })
        );
    }

    #[test]
    fn durations_expire_at_zero() {
        let mut manager = manager();
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();
        let _ = manager.apply_status(
            &mut rules,
            &mut events,
            StatusApplication::new("wet", TARGET).for_turns(1),
        );

        assert_eq!(
            manager.expire_turn(&mut rules, &mut events, TARGET),
            vec![StatusId::new("wet")]
        );
        assert!(manager.statuses_of(TARGET).is_empty());
    }

    #[test]
    fn zero_max_stacks_still_applies_one() {
        let mut manager = StatusManager::new();
        let mut dazed = StatusDefinition::new("dazed", "Dazed");
        dazed.max_stacks = 0;
        manager.register(dazed);
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();

        let change = manager
            .apply_status(
                &mut rules,
                &mut events,
                StatusApplication::new("dazed", TARGET).with_stacks(4),
            )
            .unwrap();
        assert_eq!(change.stacks, 1);
        assert!(manager.has_status(TARGET, &StatusId::new("dazed")));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut manager = manager();
        let mut rules = RulesEngine::new(0, 20);
        let mut events = EventLog::default();
        let result = manager.apply_status(&mut rules, &mut events, StatusApplication::new("nope", TARGET));
        assert_eq!(result, Err(StatusError::UnknownStatus(StatusId::new("nope"))));
        assert!(events.is_empty());
    }
}
