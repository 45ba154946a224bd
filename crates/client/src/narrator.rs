//! Human-readable combat log on stdout.

use std::collections::HashMap;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

use tactics_core::{CombatEvent, CombatSnapshot, CombatantId, HitOutcome};
use tactics_runtime::{Event, RuntimeHandle, Topic};

/// Turns combat events into one-line descriptions.
pub struct Narrator {
    names: HashMap<CombatantId, String>,
}

impl Narrator {
    pub fn new(snapshot: &CombatSnapshot) -> Self {
        Self {
            names: snapshot
                .combatants
                .iter()
                .map(|c| (c.id, c.name.clone()))
                .collect(),
        }
    }

    fn name(&self, id: CombatantId) -> String {
        match self.names.get(&id) {
            Some(name) => format!("{name} {id}"),
            None => id.to_string(),
        }
    }

    pub fn line(&self, event: &CombatEvent) -> Option<String> {
        let line = match event {
            CombatEvent::CombatStarted { order } => {
                let order: Vec<_> = order.iter().map(|id| self.name(*id)).collect();
                format!("Initiative: {}", order.join(", "))
            }
            CombatEvent::CombatEnded { winner, round } => match winner {
                Some(side) => format!("Combat over after round {round}: {side} win"),
                None => format!("Combat over after round {round}: nobody left standing"),
            },
            CombatEvent::TurnChanged { round, current } => {
                format!("-- round {round}, {} to act", self.name(*current))
            }
            CombatEvent::ActionExecuted { result } => {
                if let Some((reactor, reaction)) = &result.cancelled_by {
                    return Some(format!(
                        "{} tries {} but {} answers with {reaction}",
                        self.name(result.actor),
                        result.action,
                        self.name(*reactor)
                    ));
                }
                let mut parts = Vec::new();
                for outcome in &result.outcomes {
                    let verdict = match outcome.hit() {
                        Some(HitOutcome::Critical) => "crits",
                        Some(HitOutcome::Miss) => "misses",
                        Some(HitOutcome::Hit) | None => "hits",
                    };
                    let mut part = format!("{verdict} {}", self.name(outcome.target));
                    if outcome.damage > 0 {
                        part.push_str(&format!(" for {}", outcome.damage));
                    }
                    if outcome.healed > 0 {
                        part.push_str(&format!(", healing {}", outcome.healed));
                    }
                    parts.push(part);
                }
                if parts.is_empty() {
                    format!("{} uses {}", self.name(result.actor), result.action)
                } else {
                    format!(
                        "{} uses {}: {}",
                        self.name(result.actor),
                        result.action,
                        parts.join("; ")
                    )
                }
            }
            CombatEvent::MovementCompleted { outcome } => {
                let suffix = if outcome.interrupted { " (stopped)" } else { "" };
                format!(
                    "{} moves {} -> {}{suffix}",
                    self.name(outcome.mover),
                    outcome.start,
                    outcome.end
                )
            }
            CombatEvent::StatusApplied {
                target,
                status,
                refreshed: false,
                ..
            } => format!("{} is {status}", self.name(*target)),
            CombatEvent::StatusRemoved { target, status, .. } => {
                format!("{} is no longer {status}", self.name(*target))
            }
            CombatEvent::LifeStateChanged { combatant, to, .. } => {
                format!("{} is {to}", self.name(*combatant))
            }
            _ => return None,
        };
        Some(line)
    }

    /// Prints every narrated event until the combat ends or the bus closes.
    ///
    /// Lines from different topics may interleave out of engine order.
    pub fn spawn(self, handle: &RuntimeHandle) -> JoinHandle<()> {
        let mut phase = handle.subscribe(Topic::Phase);
        let mut turn = handle.subscribe(Topic::Turn);
        let mut action = handle.subscribe(Topic::Action);
        let mut status = handle.subscribe(Topic::Status);
        let mut combatant = handle.subscribe(Topic::Combatant);

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    event = next(&mut phase) => event,
                    event = next(&mut turn) => event,
                    event = next(&mut action) => event,
                    event = next(&mut status) => event,
                    event = next(&mut combatant) => event,
                };
                let event = match received {
                    Some(Event::Combat(event)) => event,
                    Some(_) => continue,
                    None => return,
                };
                if let Some(line) = self.line(&event) {
                    println!("{line}");
                }
                if matches!(event, CombatEvent::CombatEnded { .. }) {
                    return;
                }
            }
        })
    }
}

/// Next event from `rx`, skipping over lag. `None` once the bus is gone.
async fn next(rx: &mut broadcast::Receiver<Event>) -> Option<Event> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "tactics::client", skipped, "narrator lagged behind");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
