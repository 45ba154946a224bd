use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::state::{CombatantId, StatusId};

/// A status currently applied to a combatant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub status: StatusId,
    pub target: CombatantId,
    pub source: Option<CombatantId>,
    /// Turns left; `None` never expires on its own.
    pub remaining: Option<u32>,
    pub stacks: u8,
}

impl StatusInstance {
    /// Merges a reapplication: keeps the longer duration, adds stacks up to `max_stacks`.
    pub fn refresh(&mut self, duration: Option<u32>, stacks: u8, max_stacks: u8) {
        self.remaining = match (self.remaining, duration) {
            (None, _) | (_, None) => None,
            (Some(current), Some(new)) => Some(current.max(new)),
        };
        self.stacks = self.stacks.saturating_add(stacks).min(max_stacks);
    }
}

/// Bounded set of statuses on one combatant, at most one instance per id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSet {
    instances: ArrayVec<StatusInstance, { CombatConfig::MAX_STATUSES }>,
}

impl StatusSet {
    pub fn get(&self, status: &StatusId) -> Option<&StatusInstance> {
        self.instances.iter().find(|i| &i.status == status)
    }

    pub fn get_mut(&mut self, status: &StatusId) -> Option<&mut StatusInstance> {
        self.instances.iter_mut().find(|i| &i.status == status)
    }

    pub fn contains(&self, status: &StatusId) -> bool {
        self.get(status).is_some()
    }

    /// Returns the instance back if the set is full.
    pub fn insert(&mut self, instance: StatusInstance) -> Result<(), StatusInstance> {
        self.instances
            .try_push(instance)
            .map_err(|err| err.element())
    }

    pub fn remove(&mut self, status: &StatusId) -> Option<StatusInstance> {
        let index = self.instances.iter().position(|i| &i.status == status)?;
        Some(self.instances.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusInstance> {
        self.instances.iter()
    }

    pub fn as_slice(&self) -> &[StatusInstance] {
        &self.instances
    }

    pub fn ids(&self) -> Vec<StatusId> {
        self.instances.iter().map(|i| i.status.clone()).collect()
    }

    /// Decrements every timed instance and returns the ids that reached zero.
    pub fn decrement(&mut self) -> Vec<StatusId> {
        let mut expired = Vec::new();
        for instance in self.instances.iter_mut() {
            if let Some(remaining) = instance.remaining.as_mut()
                && *remaining > 0
            {
                *remaining -= 1;
                if *remaining == 0 {
                    expired.push(instance.status.clone());
                }
            }
        }
        expired
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, remaining: Option<u32>) -> StatusInstance {
        StatusInstance {
            status: StatusId::new(id),
            target: CombatantId(0),
            source: None,
            remaining,
            stacks: 1,
        }
    }

    #[test]
    fn refresh_keeps_longer_duration_and_clamps_stacks() {
        let mut burning = instance("burning", Some(2));
        burning.refresh(Some(1), 3, 3);
        assert_eq!(burning.remaining, Some(2));
        assert_eq!(burning.stacks, 3);

        burning.refresh(Some(5), 1, 3);
        assert_eq!(burning.remaining, Some(5));
        assert_eq!(burning.stacks, 3);

        burning.refresh(None, 0, 3);
        assert_eq!(burning.remaining, None);
    }

    #[test]
    fn decrement_reports_expired() {
        let mut set = StatusSet::default();
        assert!(set.insert(instance("a", Some(1))).is_ok());
        assert!(set.insert(instance("b", Some(2))).is_ok());
        assert!(set.insert(instance("c", None)).is_ok());

        assert_eq!(set.decrement(), vec![StatusId::new("a")]);
        assert_eq!(set.decrement(), vec![StatusId::new("b")]);
    }

    #[test]
    fn insert_fails_when_full() {
        let mut set = StatusSet::default();
        for i in 0..CombatConfig::MAX_STATUSES {
            assert!(set.insert(instance(&format!("s{i}"), None)).is_ok());
        }
        assert!(set.insert(instance("overflow", None)).is_err());
        assert_eq!(set.len(), CombatConfig::MAX_STATUSES);
    }
}
