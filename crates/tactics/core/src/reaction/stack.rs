use crate::config::CombatConfig;
use crate::state::{CombatantId, ReactionId};

use super::definition::ReactionTrigger;
use super::prompt::PromptId;

/// A reaction being resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionFrame {
    pub prompt: PromptId,
    pub reactor: CombatantId,
    pub reaction: ReactionId,
    pub trigger: ReactionTrigger,
    pub depth: usize,
}

/// Reactions currently resolving, innermost last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionStack {
    frames: Vec<ResolutionFrame>,
}

impl ResolutionStack {
    /// Pushes a frame, or hands it back once the depth bound is reached.
    pub fn push(&mut self, frame: ResolutionFrame) -> Result<(), ResolutionFrame> {
        if self.frames.len() >= CombatConfig::MAX_RESOLUTION_DEPTH {
            return Err(frame);
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<ResolutionFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= CombatConfig::MAX_RESOLUTION_DEPTH
    }

    pub fn involves(&self, reactor: CombatantId) -> bool {
        self.frames.iter().any(|f| f.reactor == reactor)
    }

    pub fn frames(&self) -> &[ResolutionFrame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(reactor: u32) -> ResolutionFrame {
        ResolutionFrame {
            prompt: PromptId(u64::from(reactor)),
            reactor: CombatantId(reactor),
            reaction: ReactionId::new("riposte"),
            trigger: ReactionTrigger::ATTACK_HIT,
            depth: 0,
        }
    }

    #[test]
    fn push_stops_at_max_depth() {
        let mut stack = ResolutionStack::default();
        for i in 0..CombatConfig::MAX_RESOLUTION_DEPTH {
            assert!(stack.push(frame(i as u32)).is_ok());
        }
        assert!(stack.is_full());
        assert!(stack.push(frame(99)).is_err());
        assert!(stack.involves(CombatantId(0)));
        assert!(!stack.involves(CombatantId(99)));

        assert_eq!(stack.pop().map(|f| f.reactor), Some(CombatantId(3)));
        assert_eq!(stack.depth(), CombatConfig::MAX_RESOLUTION_DEPTH - 1);
    }
}
