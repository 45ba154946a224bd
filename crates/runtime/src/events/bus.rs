//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use tactics_core::{CombatEvent, CombatSnapshot, ReactionPrompt, Topic};

/// Event wrapper carried on every topic channel.
#[derive(Debug, Clone)]
pub enum Event {
    /// Engine notification, routed by [`CombatEvent::topic`].
    Combat(CombatEvent),

    /// A player-controlled reactor must answer before the worker continues.
    /// Answer with [`crate::RuntimeHandle::resolve_prompt`].
    ReactionAwaiting {
        prompt: ReactionPrompt,
        snapshot: Box<CombatSnapshot>,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(event) => event.topic(),
            Event::ReactionAwaiting { .. } => Topic::Reaction,
        }
    }
}

impl From<CombatEvent> for Event {
    fn from(event: CombatEvent) -> Self {
        Event::Combat(event)
    }
}

struct Channels {
    phase: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
    status: broadcast::Sender<Event>,
    reaction: broadcast::Sender<Event>,
    area: broadcast::Sender<Event>,
    combatant: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Phase => &self.phase,
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Status => &self.status,
            Topic::Reaction => &self.reaction,
            Topic::Area => &self.area,
            Topic::Combatant => &self.combatant,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Every topic has its own bounded broadcast
/// channel; slow subscribers lag rather than block the worker.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus whose topic channels each buffer `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channel = || broadcast::channel(capacity).0;
        Self {
            channels: Arc::new(Channels {
                phase: channel(),
                turn: channel(),
                action: channel(),
                status: channel(),
                reaction: channel(),
                area: channel(),
                combatant: channel(),
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "tactics::runtime", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::{CombatantId, CombatPhase};

    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turns = bus.subscribe(Topic::Turn);
        let mut phases = bus.subscribe(Topic::Phase);

        bus.publish(CombatEvent::TurnChanged {
            round: 1,
            current: CombatantId(4),
        });

        let received = turns.recv().await.unwrap();
        assert!(matches!(
            received,
            Event::Combat(CombatEvent::TurnChanged { current: CombatantId(4), .. })
        ));
        assert!(phases.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(CombatEvent::PhaseChanged {
            from: CombatPhase::CombatStart,
            to: CombatPhase::TurnStart,
            reason: "combat started".into(),
        });
    }
}
