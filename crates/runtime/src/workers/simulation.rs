//! Simulation worker that owns the authoritative [`CombatEngine`].
//!
//! Runs on a dedicated thread. Commands from [`crate::RuntimeHandle`] are
//! applied one at a time, engine events are drained after each and published
//! to the [`EventBus`], and timelines for accepted actions are handed to the
//! presentation task. A periodic tick drives the engine's execution timeout.

use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use tactics_core::reaction::PromptId;
use tactics_core::{
    ActionRequest, ActionToken, CombatEngine, CombatEvent, CombatSnapshot, CombatantId,
    Controller, ReactionDecider, ReactionDecision, ReactionPrompt, Side,
};

use crate::api::{Choice, DecisionPoint, Result, RuntimeError, Submitted};
use crate::events::{Event, EventBus};
use crate::presentation::Timeline;

/// Commands that can be sent to the simulation worker
#[derive(Debug)]
pub(crate) enum Command {
    StartCombat {
        reply: oneshot::Sender<Result<Vec<CombatantId>>>,
    },
    /// Answered once the engine is in a decision phase or has ended.
    AwaitDecision {
        reply: oneshot::Sender<Result<DecisionPoint>>,
    },
    Submit {
        actor: CombatantId,
        choice: Choice,
        reply: oneshot::Sender<Result<Submitted>>,
    },
    /// Presentation finished. Presenters send these without a reply.
    CompleteAction {
        token: ActionToken,
        reply: Option<oneshot::Sender<Result<bool>>>,
    },
    ResolvePrompt {
        prompt: PromptId,
        decision: ReactionDecision,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<CombatSnapshot>,
    },
    Shutdown,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct WorkerConfig {
    pub tick_interval: Duration,
    pub interactive_reactions: bool,
}

enum Wake {
    Command(Option<Command>),
    Tick,
}

type DecisionWaiter = oneshot::Sender<Result<DecisionPoint>>;

/// Single writer for the combat.
pub(crate) struct SimulationWorker {
    engine: CombatEngine,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    presentations: mpsc::UnboundedSender<Timeline>,
    waiters: Vec<DecisionWaiter>,
    winner: Option<Side>,
    /// Set when a shutdown arrives while a reaction prompt is pending.
    stopping: bool,
    config: WorkerConfig,
}

impl SimulationWorker {
    pub fn new(
        engine: CombatEngine,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        presentations: mpsc::UnboundedSender<Timeline>,
        config: WorkerConfig,
    ) -> Self {
        info!(
            target: "tactics::runtime",
            combatants = engine.state().combatants.len(),
            interactive_reactions = config.interactive_reactions,
            "simulation worker initialized"
        );
        Self {
            engine,
            command_rx,
            event_bus,
            presentations,
            waiters: Vec::new(),
            winner: None,
            stopping: false,
            config,
        }
    }

    /// Main worker loop. Returns when shut down or when every handle is gone.
    ///
    /// The wait for the next command or tick runs on a private
    /// current-thread runtime; commands themselves are handled outside it so
    /// a pending reaction prompt may block on the command channel.
    pub fn run(mut self) {
        let clock = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(clock) => clock,
            Err(err) => {
                error!(target: "tactics::runtime", %err, "failed to build worker clock");
                return;
            }
        };
        let mut interval = {
            let _guard = clock.enter();
            tokio::time::interval(self.config.tick_interval.max(Duration::from_millis(1)))
        };
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = clock.block_on(async {
                tokio::select! {
                    command = self.command_rx.recv() => Wake::Command(command),
                    _ = interval.tick() => Wake::Tick,
                }
            });
            match wake {
                Wake::Command(Some(Command::Shutdown)) | Wake::Command(None) => break,
                Wake::Command(Some(command)) => self.handle_command(command),
                Wake::Tick => {
                    if self.engine.tick(Instant::now()) {
                        self.publish_events();
                    }
                }
            }
            self.flush_waiters();
            if self.stopping {
                break;
            }
        }

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Err(RuntimeError::CommandChannelClosed));
        }
        info!(target: "tactics::runtime", "simulation worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartCombat { reply } => {
                let result = self.engine.start_combat().map_err(RuntimeError::from);
                self.publish_events();
                if reply.send(result).is_err() {
                    debug!(target: "tactics::runtime", "StartCombat reply channel closed (caller dropped)");
                }
            }
            Command::AwaitDecision { reply } => self.waiters.push(reply),
            Command::Submit {
                actor,
                choice,
                reply,
            } => {
                let result = self.submit(actor, choice);
                self.publish_events();
                if let Ok(submitted) = &result {
                    self.present(submitted);
                }
                if reply.send(result).is_err() {
                    debug!(target: "tactics::runtime", "Submit reply channel closed (caller dropped)");
                }
            }
            Command::CompleteAction { token, reply } => {
                let completed = self.engine.complete_action(token);
                self.publish_events();
                if let Some(reply) = reply
                    && reply.send(Ok(completed)).is_err()
                {
                    debug!(target: "tactics::runtime", "CompleteAction reply channel closed (caller dropped)");
                }
            }
            Command::ResolvePrompt { prompt, reply, .. } => {
                let _ = reply.send(Err(RuntimeError::UnknownPrompt(prompt)));
            }
            Command::Snapshot { reply } => {
                if reply.send(self.engine.snapshot()).is_err() {
                    debug!(target: "tactics::runtime", "Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn submit(&mut self, actor: CombatantId, choice: Choice) -> Result<Submitted> {
        if self.engine.phase().is_terminal() {
            return Err(RuntimeError::CombatOver);
        }
        let expected = self.engine.current_combatant();
        if expected != Some(actor) {
            return Err(RuntimeError::WrongActor {
                expected,
                provided: actor,
            });
        }

        let Self {
            engine,
            command_rx,
            event_bus,
            waiters,
            stopping,
            config,
            ..
        } = self;
        let mut decider = WorkerDecider {
            interactive: config.interactive_reactions,
            command_rx,
            event_bus,
            waiters,
            stopping,
        };

        debug!(target: "tactics::runtime", %actor, ?choice, "choice submitted");
        match choice {
            Choice::UseAction { action, target } => engine
                .execute_action(
                    ActionRequest::new(actor, action, target),
                    Instant::now(),
                    &mut decider,
                )
                .map(Submitted::Action)
                .map_err(RuntimeError::from),
            Choice::Move { destination } => engine
                .move_to(actor, destination, Instant::now(), &mut decider)
                .map(Submitted::Moved)
                .map_err(RuntimeError::from),
            Choice::EndTurn => engine
                .end_turn()
                .map(|()| Submitted::TurnEnded)
                .map_err(RuntimeError::from),
        }
    }

    /// Hands a timeline to the presentation task while the engine waits on
    /// the token.
    fn present(&self, submitted: &Submitted) {
        let Some(token) = submitted.token() else {
            return;
        };
        if self.engine.outstanding_token() != Some(token) {
            return;
        }
        let timeline = match submitted {
            Submitted::Action(result) => {
                let spell = self
                    .engine
                    .action(&result.action)
                    .is_some_and(|def| def.spell);
                Timeline::for_action(result, spell)
            }
            Submitted::Moved(outcome) => Timeline::for_movement(outcome),
            Submitted::TurnEnded => return,
        };
        if self.presentations.send(timeline).is_err() {
            warn!(target: "tactics::runtime", %token, "presentation task gone, relying on timeout");
        }
    }

    fn publish_events(&mut self) {
        for event in self.engine.drain_events() {
            if let CombatEvent::CombatEnded { winner, .. } = &event {
                self.winner = *winner;
            }
            self.event_bus.publish(event);
        }
    }

    fn flush_waiters(&mut self) {
        if self.waiters.is_empty() {
            return;
        }
        let phase = self.engine.phase();
        let point = if phase.is_terminal() {
            DecisionPoint::Finished {
                winner: self.winner,
                snapshot: Box::new(self.engine.snapshot()),
            }
        } else if phase.is_decision()
            && let Some(actor) = self.engine.current_combatant()
        {
            DecisionPoint::Decide {
                actor,
                snapshot: Box::new(self.engine.snapshot()),
            }
        } else {
            return;
        };
        for waiter in self.waiters.drain(..) {
            if waiter.send(Ok(point.clone())).is_err() {
                debug!(target: "tactics::runtime", "AwaitDecision reply channel closed (caller dropped)");
            }
        }
    }
}

/// Answers reaction prompts for the worker.
///
/// AI reactors, and every reactor when interactive reactions are off, use
/// their reaction. Player reactors in interactive mode are announced on the
/// bus and the worker blocks until the matching `ResolvePrompt` arrives.
struct WorkerDecider<'a> {
    interactive: bool,
    command_rx: &'a mut mpsc::Receiver<Command>,
    event_bus: &'a EventBus,
    waiters: &'a mut Vec<DecisionWaiter>,
    stopping: &'a mut bool,
}

impl ReactionDecider for WorkerDecider<'_> {
    fn decide(&mut self, prompt: &ReactionPrompt, snapshot: &CombatSnapshot) -> ReactionDecision {
        let controller = snapshot.combatant(prompt.reactor).map(|c| c.controller);
        if !self.interactive || *self.stopping || controller != Some(Controller::Player) {
            return ReactionDecision::Use;
        }

        info!(
            target: "tactics::reaction",
            prompt = %prompt.id,
            reactor = %prompt.reactor,
            reaction = %prompt.reaction,
            "awaiting reaction decision"
        );
        self.event_bus.publish(Event::ReactionAwaiting {
            prompt: prompt.clone(),
            snapshot: Box::new(snapshot.clone()),
        });

        loop {
            let Some(command) = self.command_rx.blocking_recv() else {
                warn!(target: "tactics::reaction", prompt = %prompt.id, "command channel closed, declining");
                *self.stopping = true;
                return ReactionDecision::Decline;
            };
            match command {
                Command::ResolvePrompt {
                    prompt: id,
                    decision,
                    reply,
                } if id == prompt.id => {
                    let _ = reply.send(Ok(()));
                    return decision;
                }
                Command::ResolvePrompt { prompt: id, reply, .. } => {
                    let _ = reply.send(Err(RuntimeError::UnknownPrompt(id)));
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(snapshot.clone());
                }
                Command::AwaitDecision { reply } => self.waiters.push(reply),
                Command::StartCombat { reply } => {
                    let _ = reply.send(Err(RuntimeError::AwaitingReaction));
                }
                Command::Submit { reply, .. } => {
                    let _ = reply.send(Err(RuntimeError::AwaitingReaction));
                }
                Command::CompleteAction { token, reply } => {
                    debug!(target: "tactics::reaction", %token, "completion rejected while awaiting reaction");
                    if let Some(reply) = reply {
                        let _ = reply.send(Err(RuntimeError::AwaitingReaction));
                    }
                }
                Command::Shutdown => {
                    warn!(target: "tactics::reaction", prompt = %prompt.id, "shutdown while awaiting reaction, declining");
                    *self.stopping = true;
                    return ReactionDecision::Decline;
                }
            }
        }
    }
}
