//! Goal-based AI decision provider.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use tactics_core::{ActionDefinition, ActionId};

use super::{ActionCandidateGenerator, AiContext, GoalSelector};
use crate::api::{
    Choice, DecisionProvider, DecisionRequest, RankedDecision, Result, RuntimeError,
};

/// Alternates handed back besides the best choice.
const MAX_ALTERNATES: usize = 4;

/// Goal-based AI provider.
///
/// Needs the action catalogue the combat was built with, since snapshots
/// only carry action ids. Every choice it returns is still validated by the
/// engine.
#[derive(Debug, Clone, Default)]
pub struct GoalBasedAiProvider {
    catalogue: HashMap<ActionId, ActionDefinition>,
}

impl GoalBasedAiProvider {
    pub fn new(actions: impl IntoIterator<Item = ActionDefinition>) -> Self {
        Self {
            catalogue: actions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }

    /// Synchronous core of [`DecisionProvider::decide`].
    pub fn rank(&self, request: &DecisionRequest) -> Result<RankedDecision> {
        let ctx = AiContext::new(request.actor, &request.snapshot, request.profile, &self.catalogue)
            .ok_or_else(|| {
                RuntimeError::Provider(format!("combatant {} not in snapshot", request.actor))
            })?;

        let goal = GoalSelector::select(&ctx);
        let mut scored: Vec<(u32, Choice)> = ActionCandidateGenerator::generate(&ctx)
            .into_iter()
            .map(|choice| (goal.evaluate(&choice, &ctx), choice))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps generation order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(
            target: "tactics::runtime",
            actor = %request.actor,
            ?goal,
            best = ?scored.first(),
            "choice ranked"
        );

        let mut ranked = scored.into_iter().map(|(_, choice)| choice);
        let Some(best) = ranked.next() else {
            return Ok(RankedDecision::end_turn());
        };
        Ok(ranked
            .take(MAX_ALTERNATES)
            .fold(RankedDecision::new(best), RankedDecision::with_alternate))
    }
}

#[async_trait]
impl DecisionProvider for GoalBasedAiProvider {
    async fn decide(&self, request: DecisionRequest) -> Result<RankedDecision> {
        self.rank(&request)
    }
}
