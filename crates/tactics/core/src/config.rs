use std::time::Duration;

/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// How long the engine waits for a presentation completion before it
    /// forces the phase machine out of `ActionExecution`.
    pub execution_timeout: Duration,

    /// Lowest natural d20 result that counts as a critical hit.
    pub critical_threshold: u32,

    /// When set, damage that leaves an overflow of at least max HP kills outright.
    pub massive_damage: bool,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of simultaneous status instances per combatant.
    pub const MAX_STATUSES: usize = 12;
    /// Maximum nesting of reaction resolutions before further reactions are skipped.
    pub const MAX_RESOLUTION_DEPTH: usize = 4;
    /// Upper bound on tiles expanded by a single path search.
    pub const MAX_PATH_SEARCH: usize = 4096;
    /// Natural d20 result a death saving throw must meet to count as a success.
    pub const DEATH_SAVE_THRESHOLD: u32 = 10;
    /// Successes or failures needed to settle a death saving throw tally.
    pub const DEATH_SAVES_TO_SETTLE: u8 = 3;
    /// Full rotations with nobody able to act before a combat is called off.
    pub const MAX_IDLE_ROUNDS: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 20;

    pub fn new() -> Self {
        Self {
            execution_timeout: Self::DEFAULT_EXECUTION_TIMEOUT,
            critical_threshold: Self::DEFAULT_CRITICAL_THRESHOLD,
            massive_damage: true,
        }
    }

    #[must_use]
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_critical_threshold(mut self, threshold: u32) -> Self {
        self.critical_threshold = threshold.clamp(2, 20);
        self
    }

    #[must_use]
    pub fn with_massive_damage(mut self, enabled: bool) -> Self {
        self.massive_damage = enabled;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
