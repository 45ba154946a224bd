use tracing::{debug, warn};

use crate::events::{CombatEvent, EventLog};

/// Combat flow states.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatPhase {
    #[default]
    CombatStart,
    TurnStart,
    PlayerDecision,
    AiDecision,
    ActionExecution,
    ReactionPrompt,
    TurnEnd,
    RoundEnd,
    CombatEnd,
}

impl CombatPhase {
    /// States reachable in one transition.
    pub const fn successors(self) -> &'static [CombatPhase] {
        use CombatPhase::*;
        match self {
            CombatStart => &[TurnStart, CombatEnd],
            TurnStart => &[PlayerDecision, AiDecision, TurnEnd, CombatEnd],
            PlayerDecision => &[ActionExecution, TurnEnd, CombatEnd],
            AiDecision => &[ActionExecution, TurnEnd, CombatEnd],
            ActionExecution => &[ReactionPrompt, PlayerDecision, AiDecision, TurnEnd, CombatEnd],
            ReactionPrompt => &[ActionExecution, CombatEnd],
            TurnEnd => &[TurnStart, RoundEnd, CombatEnd],
            RoundEnd => &[TurnStart, CombatEnd],
            CombatEnd => &[],
        }
    }

    pub fn can_transition_to(self, next: CombatPhase) -> bool {
        self.successors().contains(&next)
    }

    pub const fn is_decision(self) -> bool {
        matches!(self, Self::PlayerDecision | Self::AiDecision)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CombatEnd)
    }
}

/// Current phase plus the guarded transition operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseMachine {
    current: CombatPhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CombatPhase {
        self.current
    }

    /// Moves to `next` if the edge exists. Failure leaves the phase unchanged.
    pub fn try_transition(
        &mut self,
        next: CombatPhase,
        reason: &str,
        events: &mut EventLog,
    ) -> bool {
        let from = self.current;
        if !from.can_transition_to(next) {
            warn!(
                target: "tactics::phase",
                %from,
                to = %next,
                reason,
                "rejected phase transition"
            );
            return false;
        }

        self.current = next;
        debug!(target: "tactics::phase", %from, to = %next, reason, "phase changed");
        events.push(CombatEvent::PhaseChanged {
            from,
            to: next,
            reason: reason.to_owned(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn transitions_follow_adjacency_only() {
        for from in CombatPhase::iter() {
            for to in CombatPhase::iter() {
                let mut machine = PhaseMachine { current: from };
                let mut events = EventLog::default();
                let moved = machine.try_transition(to, "test", &mut events);

                assert_eq!(moved, from.successors().contains(&to), "{from} -> {to}");
                if moved {
                    assert_eq!(machine.current(), to);
                    assert_eq!(events.len(), 1);
                } else {
                    assert_eq!(machine.current(), from);
                    assert!(events.is_empty());
                }
            }
        }
    }

    #[test]
    fn combat_end_is_terminal() {
        assert!(CombatPhase::CombatEnd.successors().is_empty());
        assert!(CombatPhase::iter().all(|p| p.is_terminal() || p.can_transition_to(CombatPhase::CombatEnd)));
    }
}
