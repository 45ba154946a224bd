//! Topic-based event bus for runtime events.
//!
//! Engine notifications are published to the [`tactics_core::Topic`] they
//! belong to, and consumers subscribe only to the topics they need.

mod bus;

pub use bus::{Event, EventBus};
pub use tactics_core::Topic;
