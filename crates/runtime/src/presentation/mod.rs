//! Presentation hand-off.
//!
//! After every successful action or movement the worker builds a
//! [`Timeline`] and gives it to the configured [`Presenter`] together with a
//! [`Completer`]. The engine stays in its executing phase until the
//! completer fires or the execution timeout recovers it.

mod timeline;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use tactics_core::ActionToken;

use crate::workers::Command;

pub use timeline::{AnimationShape, Marker, MarkerKind, Timeline};

/// One-shot callback that reports a finished presentation to the worker.
#[derive(Debug)]
pub struct Completer {
    token: ActionToken,
    command_tx: mpsc::Sender<Command>,
}

impl Completer {
    pub(crate) fn new(token: ActionToken, command_tx: mpsc::Sender<Command>) -> Self {
        Self { token, command_tx }
    }

    pub fn token(&self) -> ActionToken {
        self.token
    }

    /// Delivers the token back. Stale tokens are ignored by the engine.
    pub async fn complete(self) {
        let command = Command::CompleteAction {
            token: self.token,
            reply: None,
        };
        if self.command_tx.send(command).await.is_err() {
            debug!(target: "tactics::runtime", token = %self.token, "worker gone before completion");
        }
    }
}

/// Plays timelines and eventually calls [`Completer::complete`].
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, timeline: Timeline, completer: Completer);
}

/// Completes as soon as it is handed a timeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediatePresenter;

#[async_trait]
impl Presenter for ImmediatePresenter {
    async fn present(&self, _timeline: Timeline, completer: Completer) {
        completer.complete().await;
    }
}

/// Waits a fixed delay before completing, standing in for real playback.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelayPresenter {
    delay: Duration,
}

impl FixedDelayPresenter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Presenter for FixedDelayPresenter {
    async fn present(&self, timeline: Timeline, completer: Completer) {
        debug!(
            target: "tactics::runtime",
            token = %timeline.token,
            shape = %timeline.shape,
            delay_ms = self.delay.as_millis() as u64,
            "presenting"
        );
        tokio::time::sleep(self.delay).await;
        completer.complete().await;
    }
}

/// Never completes; the engine's execution timeout has to recover.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentPresenter;

#[async_trait]
impl Presenter for SilentPresenter {
    async fn present(&self, timeline: Timeline, completer: Completer) {
        debug!(target: "tactics::runtime", token = %timeline.token, "presentation dropped");
        drop(completer);
    }
}
