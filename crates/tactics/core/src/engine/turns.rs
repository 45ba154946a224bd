use crate::error::{ErrorSeverity, GameError};
use crate::state::CombatantId;

use super::phase::CombatPhase;

/// One slot in the initiative order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnEntry {
    pub combatant: CombatantId,
    pub initiative: i32,
    pub spawn_order: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("turn queue is empty")]
    Empty,

    #[error("no living combatant left in the turn queue")]
    NoLivingCombatant,

    #[error("not allowed during the {0} phase")]
    PhaseDisallows(CombatPhase),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PhaseDisallows(_) => ErrorSeverity::Recoverable,
            Self::Empty | Self::NoLivingCombatant => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "TURN_EMPTY",
            Self::NoLivingCombatant => "TURN_NO_LIVING_COMBATANT",
            Self::PhaseDisallows(_) => "TURN_PHASE_DISALLOWS",
        }
    }
}

/// Initiative-ordered turn rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnQueue {
    order: Vec<TurnEntry>,
    index: usize,
    round: u32,
}

impl TurnQueue {
    /// Sorts by initiative descending, ties by spawn order, and starts round 1.
    pub fn seed(entries: impl IntoIterator<Item = TurnEntry>) -> Result<Self, TurnError> {
        let mut order: Vec<TurnEntry> = entries.into_iter().collect();
        if order.is_empty() {
            return Err(TurnError::Empty);
        }
        order.sort_by(|a, b| {
            b.initiative
                .cmp(&a.initiative)
                .then(a.spawn_order.cmp(&b.spawn_order))
        });
        Ok(Self {
            order,
            index: 0,
            round: 1,
        })
    }

    pub fn current(&self) -> Option<CombatantId> {
        self.order.get(self.index).map(|e| e.combatant)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_started(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn entries(&self) -> &[TurnEntry] {
        &self.order
    }

    pub fn order(&self) -> Vec<CombatantId> {
        self.order.iter().map(|e| e.combatant).collect()
    }

    /// Position in the initiative order; unknown combatants sort last.
    pub fn rank_of(&self, combatant: CombatantId) -> usize {
        self.order
            .iter()
            .position(|e| e.combatant == combatant)
            .unwrap_or(usize::MAX)
    }

    /// Moves to the next entry accepted by `is_living`.
    /// Returns whether the rotation wrapped into a new round. On error the
    /// queue is left where it was.
    pub fn advance(&mut self, is_living: impl Fn(CombatantId) -> bool) -> Result<bool, TurnError> {
        if self.order.is_empty() {
            return Err(TurnError::Empty);
        }
        let len = self.order.len();
        let mut index = self.index;
        let mut wrapped = false;
        for _ in 0..len {
            index += 1;
            if index >= len {
                index = 0;
                wrapped = true;
            }
            if is_living(self.order[index].combatant) {
                self.index = index;
                if wrapped {
                    self.round += 1;
                }
                return Ok(wrapped);
            }
        }
        Err(TurnError::NoLivingCombatant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, initiative: i32) -> TurnEntry {
        TurnEntry {
            combatant: CombatantId(id),
            initiative,
            spawn_order: id,
        }
    }

    #[test]
    fn seeds_by_initiative_then_spawn_order() {
        let queue = TurnQueue::seed([entry(0, 10), entry(1, 15), entry(2, 10)]).expect("entries");
        assert_eq!(
            queue.order(),
            vec![CombatantId(1), CombatantId(0), CombatantId(2)]
        );
        assert_eq!(queue.round(), 1);
        assert_eq!(queue.current(), Some(CombatantId(1)));
    }

    #[test]
    fn advance_cycles_living_and_counts_rounds() {
        let mut queue = TurnQueue::seed([entry(0, 3), entry(1, 2), entry(2, 1)]).expect("entries");
        let dead = CombatantId(1);
        let living = |id: CombatantId| id != dead;

        assert_eq!(queue.advance(living), Ok(false));
        assert_eq!(queue.current(), Some(CombatantId(2)));
        assert_eq!(queue.advance(living), Ok(true));
        assert_eq!(queue.current(), Some(CombatantId(0)));
        assert_eq!(queue.round(), 2);
    }

    #[test]
    fn advance_without_survivors_fails() {
        let mut queue = TurnQueue::seed([entry(0, 3), entry(1, 2)]).expect("entries");
        queue.advance(|_| true).expect("second entry lives");
        assert_eq!(queue.advance(|_| false), Err(TurnError::NoLivingCombatant));
        assert_eq!(queue.current(), Some(CombatantId(1)));
        assert_eq!(queue.round(), 1);
        assert_eq!(TurnQueue::seed([]), Err(TurnError::Empty));
    }
}
