//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the combat or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use tactics_core::reaction::PromptId;
use tactics_core::{
    ActionResult, ActionToken, CombatSnapshot, CombatantId, MoveOutcome, ReactionDecision, Side,
};

use super::errors::{Result, RuntimeError};
use super::providers::Choice;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Where the combat stands when a decision is asked for.
#[derive(Debug, Clone)]
pub enum DecisionPoint {
    /// `actor` is in a decision phase and may submit a choice.
    Decide {
        actor: CombatantId,
        snapshot: Box<CombatSnapshot>,
    },
    Finished {
        winner: Option<Side>,
        snapshot: Box<CombatSnapshot>,
    },
}

/// What an accepted choice produced.
#[derive(Debug, Clone)]
pub enum Submitted {
    Action(ActionResult),
    Moved(MoveOutcome),
    TurnEnded,
}

impl Submitted {
    /// Token awaiting a presentation completion, if any.
    pub fn token(&self) -> Option<ActionToken> {
        match self {
            Submitted::Action(result) => Some(result.token),
            Submitted::Moved(outcome) => Some(outcome.token),
            Submitted::TurnEnded => None,
        }
    }
}

/// Client-facing handle to interact with the runtime
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Rolls initiative and opens the first turn. Returns the initiative order.
    pub async fn start_combat(&self) -> Result<Vec<CombatantId>> {
        self.request(|reply| Command::StartCombat { reply }).await?
    }

    /// Waits until the combat is back in a decision phase (any outstanding
    /// presentation completed or timed out) or has ended.
    pub async fn await_decision(&self) -> Result<DecisionPoint> {
        self.request(|reply| Command::AwaitDecision { reply }).await?
    }

    /// Submits one choice for `actor`. Engine rejections come back as
    /// [`RuntimeError::ActionRejected`] or [`RuntimeError::MoveRejected`].
    pub async fn submit(&self, actor: CombatantId, choice: Choice) -> Result<Submitted> {
        self.request(|reply| Command::Submit {
            actor,
            choice,
            reply,
        })
        .await?
    }

    pub async fn end_turn(&self, actor: CombatantId) -> Result<()> {
        self.submit(actor, Choice::EndTurn).await.map(|_| ())
    }

    /// Reports a finished presentation. Returns false for stale tokens.
    pub async fn complete_action(&self, token: ActionToken) -> Result<bool> {
        self.request(|reply| Command::CompleteAction {
            token,
            reply: Some(reply),
        })
        .await?
    }

    /// Answers the reaction prompt announced by [`Event::ReactionAwaiting`].
    pub async fn resolve_prompt(&self, prompt: PromptId, decision: ReactionDecision) -> Result<()> {
        self.request(|reply| Command::ResolvePrompt {
            prompt,
            decision,
            reply,
        })
        .await?
    }

    /// Query the current combat (read-only snapshot)
    pub async fn snapshot(&self) -> Result<CombatSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use tactics_runtime::Topic;
    ///
    /// let mut reactions = handle.subscribe(Topic::Reaction);
    /// while let Ok(event) = reactions.recv().await {
    ///     // Answer prompts, animate responses...
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
