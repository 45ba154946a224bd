//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker and the presentation task, wires
//! up command/event channels, and exposes a builder-based API for clients to
//! drive the combat.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tactics_core::{CombatConfig, CombatEngine, CombatantId, Scenario, Side};

use crate::api::{
    Choice, DecisionPoint, DecisionProvider, DecisionRequest, Profile, ProviderKind, Result,
    RuntimeError, RuntimeHandle, ScenarioProvider, StaticScenario,
};
use crate::events::EventBus;
use crate::presentation::{
    Completer, FixedDelayPresenter, ImmediatePresenter, Presenter, Timeline,
};
use crate::workers::{Command, SimulationWorker, WorkerConfig};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Capacity of each topic channel on the event bus.
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// How often the worker drives the engine's execution timeout.
    pub tick_interval: Duration,
    pub execution_timeout: Duration,
    /// Ask player-controlled reactors instead of always reacting.
    pub interactive_reactions: bool,
    /// Delay used by the default presenter; zero completes immediately.
    pub presentation_delay: Duration,
    /// Choices accepted per turn before the runtime ends the turn itself.
    pub max_choices_per_turn: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: EventBus::DEFAULT_CAPACITY,
            command_buffer_size: 32,
            tick_interval: Duration::from_millis(50),
            execution_timeout: CombatConfig::DEFAULT_EXECUTION_TIMEOUT,
            interactive_reactions: false,
            presentation_delay: Duration::ZERO,
            max_choices_per_turn: 8,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TACTICS_EVENT_BUFFER` - Per-topic event buffer (default: 256)
    /// - `TACTICS_TICK_MS` - Worker tick interval in ms (default: 50)
    /// - `TACTICS_EXECUTION_TIMEOUT_MS` - Presentation timeout in ms (default: 5000)
    /// - `TACTICS_INTERACTIVE_REACTIONS` - Prompt player reactors (default: false)
    /// - `TACTICS_PRESENTATION_DELAY_MS` - Default presenter delay in ms (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("TACTICS_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(ms) = read_env::<u64>("TACTICS_TICK_MS") {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("TACTICS_EXECUTION_TIMEOUT_MS") {
            config.execution_timeout = Duration::from_millis(ms);
        }
        if let Some(enable) = read_env::<bool>("TACTICS_INTERACTIVE_REACTIONS") {
            config.interactive_reactions = enable;
        } else if env::var("TACTICS_INTERACTIVE_REACTIONS").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.interactive_reactions = true;
        }
        if let Some(ms) = read_env::<u64>("TACTICS_PRESENTATION_DELAY_MS") {
            config.presentation_delay = Duration::from_millis(ms);
        }

        config
    }

    fn combat_config(&self) -> CombatConfig {
        CombatConfig::default().with_execution_timeout(self.execution_timeout)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Result of one [`Runtime::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished { winner: Option<Side> },
}

/// Main runtime that orchestrates a combat
///
/// Runtime owns the worker thread and asks decision providers for choices.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    config: RuntimeConfig,
    handle: RuntimeHandle,

    player_provider: Option<Arc<dyn DecisionProvider>>,
    ai_provider: Option<Arc<dyn DecisionProvider>>,
    profiles: HashMap<CombatantId, Profile>,

    /// Turn the choice counter belongs to, as (round, actor).
    turn: Option<(u32, CombatantId)>,
    choices: u32,

    worker: Option<JoinHandle<()>>,
    presentation_task: tokio::task::JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Asks the current combatant's provider for one choice and submits it.
    ///
    /// Waits for any outstanding presentation first. Rejected choices fall
    /// through to the alternates, then to ending the turn.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        let (actor, snapshot) = match self.handle.await_decision().await? {
            DecisionPoint::Finished { winner, .. } => {
                return Ok(StepOutcome::Finished { winner });
            }
            DecisionPoint::Decide { actor, snapshot } => (actor, snapshot),
        };

        let turn = (snapshot.round, actor);
        if self.turn != Some(turn) {
            self.turn = Some(turn);
            self.choices = 0;
        }
        self.choices += 1;
        if self.choices > self.config.max_choices_per_turn {
            warn!(target: "tactics::runtime", %actor, choices = self.choices, "choice limit reached, ending turn");
            self.handle.end_turn(actor).await?;
            return Ok(StepOutcome::Continue);
        }

        let kind = snapshot
            .combatant(actor)
            .map(|c| ProviderKind::from(c.controller))
            .unwrap_or(ProviderKind::Ai);
        let provider = self.provider(kind)?;
        let request = DecisionRequest {
            actor,
            profile: self.profiles.get(&actor).copied().unwrap_or_default(),
            snapshot: *snapshot,
        };

        let choices: Vec<Choice> = match provider.decide(request).await {
            Ok(decision) => decision.into_choices().collect(),
            Err(err) => {
                warn!(target: "tactics::runtime", %actor, %err, "decision provider failed, ending turn");
                Vec::new()
            }
        };
        for choice in choices {
            match self.handle.submit(actor, choice.clone()).await {
                Ok(_) => return Ok(StepOutcome::Continue),
                Err(err) if err.is_rejection() => {
                    debug!(target: "tactics::runtime", %actor, ?choice, %err, "choice rejected, trying next");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(target: "tactics::runtime", %actor, "no choice accepted, ending turn");
        self.handle.end_turn(actor).await?;
        Ok(StepOutcome::Continue)
    }

    /// Starts the combat and steps until it ends. Returns the winning side.
    pub async fn run(&mut self) -> Result<Option<Side>> {
        let order = self.handle.start_combat().await?;
        info!(target: "tactics::runtime", combatants = order.len(), "combat running");
        loop {
            if let StepOutcome::Finished { winner } = self.step().await? {
                info!(target: "tactics::runtime", ?winner, "combat finished");
                return Ok(winner);
            }
        }
    }

    fn provider(&self, kind: ProviderKind) -> Result<Arc<dyn DecisionProvider>> {
        let provider = match kind {
            ProviderKind::Player => self.player_provider.as_ref(),
            ProviderKind::Ai => self.ai_provider.as_ref(),
        };
        provider
            .cloned()
            .ok_or(RuntimeError::ProviderNotSet { kind })
    }

    /// Set the player decision provider
    pub fn set_player_provider(&mut self, provider: impl DecisionProvider + 'static) {
        self.player_provider = Some(Arc::new(provider));
    }

    /// Set the AI decision provider
    pub fn set_ai_provider(&mut self, provider: impl DecisionProvider + 'static) {
        self.ai_provider = Some(Arc::new(provider));
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(mut self) -> Result<()> {
        if let Err(err) = self.handle.shutdown().await {
            debug!(target: "tactics::runtime", %err, "worker already stopped");
        }
        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(RuntimeError::WorkerJoin)?
                .map_err(|_| RuntimeError::WorkerPanicked)?;
        }
        self.presentation_task.abort();
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    scenario: Option<Box<dyn ScenarioProvider>>,
    player_provider: Option<Arc<dyn DecisionProvider>>,
    ai_provider: Option<Arc<dyn DecisionProvider>>,
    profiles: HashMap<CombatantId, Profile>,
    presenter: Option<Arc<dyn Presenter>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            scenario: None,
            player_provider: None,
            ai_provider: None,
            profiles: HashMap::new(),
            presenter: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the provider of the initial scenario (required)
    pub fn scenario_provider(mut self, provider: impl ScenarioProvider + 'static) -> Self {
        self.scenario = Some(Box::new(provider));
        self
    }

    /// Shorthand for a [`StaticScenario`].
    pub fn scenario(self, scenario: Scenario) -> Self {
        self.scenario_provider(StaticScenario(scenario))
    }

    /// Provider for `Controller::Player` combatants (optional)
    pub fn player_provider(mut self, provider: impl DecisionProvider + 'static) -> Self {
        self.player_provider = Some(Arc::new(provider));
        self
    }

    /// Provider for `Controller::Ai` combatants (optional)
    pub fn ai_provider(mut self, provider: impl DecisionProvider + 'static) -> Self {
        self.ai_provider = Some(Arc::new(provider));
        self
    }

    /// Profile handed to providers for `combatant`. Unlisted combatants get
    /// the default profile.
    pub fn profile(mut self, combatant: CombatantId, profile: Profile) -> Self {
        self.profiles.insert(combatant, profile);
        self
    }

    /// Replace the default presenter chosen from `presentation_delay`.
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Arc::new(presenter));
        self
    }

    /// Build the runtime
    ///
    /// Must be called inside a tokio runtime: the presentation task is
    /// spawned on it.
    pub async fn build(self) -> Result<Runtime> {
        let provider = self.scenario.ok_or(RuntimeError::MissingScenario)?;
        let scenario = provider.scenario().await?;
        let seed = scenario.seed;
        let engine = CombatEngine::from_scenario(scenario, self.config.combat_config())?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let (presentation_tx, presentation_rx) = mpsc::unbounded_channel::<Timeline>();
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx.clone(), event_bus.clone());

        let presenter: Arc<dyn Presenter> = match self.presenter {
            Some(presenter) => presenter,
            None if self.config.presentation_delay.is_zero() => Arc::new(ImmediatePresenter),
            None => Arc::new(FixedDelayPresenter::new(self.config.presentation_delay)),
        };
        let presentation_task = tokio::spawn(run_presentations(presenter, presentation_rx, command_tx));

        let worker = SimulationWorker::new(
            engine,
            command_rx,
            event_bus,
            presentation_tx,
            WorkerConfig {
                tick_interval: self.config.tick_interval,
                interactive_reactions: self.config.interactive_reactions,
            },
        );
        let worker = std::thread::Builder::new()
            .name("tactics-simulation".into())
            .spawn(move || worker.run())
            .map_err(RuntimeError::WorkerSpawn)?;

        info!(target: "tactics::runtime", seed, "runtime built");
        Ok(Runtime {
            config: self.config,
            handle,
            player_provider: self.player_provider,
            ai_provider: self.ai_provider,
            profiles: self.profiles,
            turn: None,
            choices: 0,
            worker: Some(worker),
            presentation_task,
        })
    }
}

/// Forwards each timeline to the presenter on its own task so a slow
/// presentation never holds up the next one.
async fn run_presentations(
    presenter: Arc<dyn Presenter>,
    mut timelines: mpsc::UnboundedReceiver<Timeline>,
    command_tx: mpsc::Sender<Command>,
) {
    while let Some(timeline) = timelines.recv().await {
        let completer = Completer::new(timeline.token, command_tx.clone());
        let presenter = Arc::clone(&presenter);
        tokio::spawn(async move {
            presenter.present(timeline, completer).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RuntimeConfig::default();
        assert!(!config.interactive_reactions);
        assert_eq!(config.presentation_delay, Duration::ZERO);
        assert_eq!(config.combat_config().execution_timeout, config.execution_timeout);
    }
}
