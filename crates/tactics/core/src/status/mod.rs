//! Status effects: definitions, live instances and interaction rules.
//!
//! [`StatusManager`] owns every live [`StatusInstance`]. Applying a status
//! installs the modifiers it grants into the rules engine under the owner tag
//! `ModifierOwner::Status(id)`; removing it takes them out again.
mod definition;
mod instance;
mod interaction;
mod manager;

pub use definition::{ModifierTemplate, StatusDefinition, StatusFlags, TickEffect, TickTiming};
pub use instance::{StatusInstance, StatusSet};
pub use interaction::{InteractionRule, InteractionTable, StatusInteraction};
pub use manager::{
    PendingTick, RemovalReason, StatusApplication, StatusChange, StatusError, StatusManager,
};
