//! Stock content for `tactics-core`: actions, statuses, reactions,
//! combatant templates and a ready-made skirmish.
//!
//! Everything here is plain data built in code. Hosts either take a whole
//! [`skirmish_scenario`] or pick pieces to assemble their own
//! [`tactics_core::Scenario`].
pub mod actions;
pub mod reactions;
pub mod roster;
pub mod scenario;
pub mod statuses;

pub use scenario::{skirmish_battlefield, skirmish_scenario};
