//! Headless tactics client.
//!
//! Runs the bundled skirmish with the goal-based AI on both sides and prints
//! the combat log. Configuration comes from the environment (a `.env` file
//! is honoured):
//!
//! ```bash
//! TACTICS_SEED=42 RUST_LOG=tactics=debug cargo run -p tactics-client
//! ```

mod config;
mod logging;
mod narrator;

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use tactics_content::{actions, skirmish_scenario};
use tactics_core::{CombatantId, ReactionDecision};
use tactics_runtime::{Event, GoalBasedAiProvider, Profile, Runtime, RuntimeHandle, Topic};

use config::ClientConfig;
use narrator::Narrator;

/// Profiles for the skirmish roster; everyone else fights aggressively.
const PROFILES: [(CombatantId, Profile); 4] = [
    (CombatantId(2), Profile::Cautious),
    (CombatantId(3), Profile::Support),
    (CombatantId(4), Profile::Cautious),
    (CombatantId(5), Profile::Cautious),
];

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _log_guard = logging::setup_logging(&config)?;

    info!(
        target: "tactics::client",
        seed = config.seed,
        session = %config.session_id,
        interactive_reactions = config.runtime.interactive_reactions,
        "starting skirmish"
    );

    let ai = GoalBasedAiProvider::new(actions::all());
    let mut builder = Runtime::builder()
        .config(config.runtime.clone())
        .scenario(skirmish_scenario(config.seed))
        .player_provider(ai.clone())
        .ai_provider(ai);
    for (combatant, profile) in PROFILES {
        builder = builder.profile(combatant, profile);
    }
    let mut runtime = builder.build().await.context("building runtime")?;

    if config.runtime.interactive_reactions {
        answer_prompts(runtime.handle());
    }
    let narration = if config.narrate {
        let snapshot = runtime.handle().snapshot().await?;
        Some(Narrator::new(&snapshot).spawn(&runtime.handle()))
    } else {
        None
    };

    let winner = runtime.run().await.context("running combat")?;
    let snapshot = runtime.handle().snapshot().await?;
    info!(target: "tactics::client", ?winner, rounds = snapshot.round, draws = snapshot.draws, "skirmish finished");

    if let Some(narration) = narration {
        // The narrator stops on the combat end event; don't hang if it lagged past it.
        if tokio::time::timeout(Duration::from_secs(1), narration).await.is_err() {
            warn!(target: "tactics::client", "narrator did not catch up");
        }
    }
    runtime.shutdown().await?;
    Ok(())
}

/// Nobody sits at the keyboard, so every player prompt is taken.
fn answer_prompts(handle: RuntimeHandle) {
    let mut prompts = handle.subscribe(Topic::Reaction);
    tokio::spawn(async move {
        loop {
            match prompts.recv().await {
                Ok(Event::ReactionAwaiting { prompt, .. }) => {
                    info!(target: "tactics::client", prompt = %prompt.id, reactor = %prompt.reactor, reaction = %prompt.reaction, "taking reaction");
                    if let Err(err) = handle.resolve_prompt(prompt.id, ReactionDecision::Use).await {
                        warn!(target: "tactics::client", %err, "failed to answer prompt");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "tactics::client", skipped, "reaction prompts lagged");
                }
                Err(RecvError::Closed) => return,
            }
        }
    });
}
