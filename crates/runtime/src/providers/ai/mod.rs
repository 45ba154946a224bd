//! Goal-based AI for combatants.
//!
//! Decision-making runs in three steps:
//!
//! 1. **Goal selection**: pick a concrete objective from the situation and
//!    the combatant's [`crate::Profile`], e.g. "attack the nearest enemy" or
//!    "heal the most wounded ally".
//! 2. **Candidate generation**: enumerate every affordable action with each
//!    target it could plausibly take, plus a handful of move destinations.
//! 3. **Evaluation**: score each candidate against the goal and hand the
//!    best ones to the runtime as a ranked decision.
//!
//! The AI only sees a [`tactics_core::CombatSnapshot`]; it does not know the
//! battlefield's walls, so some candidates are rejected by the engine. The
//! runtime then falls through to the next alternate.

pub mod context;
pub mod generator;
pub mod goal;
pub mod provider;

pub use context::AiContext;
pub use generator::ActionCandidateGenerator;
pub use goal::{Goal, GoalSelector};
pub use provider::GoalBasedAiProvider;
