use crate::state::{Combatant, CombatantId, Zone};
use crate::status::StatusInstance;

use super::{ActionToken, CombatEngine, CombatPhase};

/// Read-only copy of everything observable about a combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSnapshot {
    pub phase: CombatPhase,
    pub round: u32,
    pub current: Option<CombatantId>,
    pub turn_order: Vec<CombatantId>,
    pub combatants: Vec<Combatant>,
    pub statuses: Vec<StatusInstance>,
    pub zones: Vec<Zone>,
    /// Random draws consumed so far.
    pub draws: u64,
    pub outstanding: Option<ActionToken>,
}

impl CombatSnapshot {
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.current.and_then(|id| self.combatant(id))
    }

    pub fn statuses_of(&self, id: CombatantId) -> impl Iterator<Item = &StatusInstance> {
        self.statuses.iter().filter(move |s| s.target == id)
    }

    /// SHA-256 of the bincode encoding. Equal digests mean equal combats.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> Result<[u8; 32], bincode::Error> {
        use sha2::{Digest, Sha256};

        let bytes = bincode::serialize(self)?;
        Ok(Sha256::digest(&bytes).into())
    }
}

impl CombatEngine {
    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            phase: self.phase.current(),
            round: self.turns.round(),
            current: self.turns.current(),
            turn_order: self.turns.order(),
            combatants: self.state.combatants.clone(),
            statuses: self.statuses.all_instances().cloned().collect(),
            zones: self.state.zones.clone(),
            draws: self.rules.stream().draws(),
            outstanding: self.correlator.outstanding(),
        }
    }
}
