//! Deterministic random number generation.
//!
//! Every roll the engine makes is drawn from a [`RollStream`]: a PCG-XSH-RR
//! step applied to the combat seed mixed with a monotonically increasing draw
//! counter. Two engines built from the same seed that make the same sequence
//! of queries therefore observe bit-identical dice.

/// Stateless generator mapping a seed to a 32-bit output.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides.max(1)) + 1
    }
}

/// PCG random number generator (Permuted Congruential Generator), XSH-RR
/// variant producing 32-bit output from 64-bit state.
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        // XOR upper bits with lower bits, shift right
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the combat seed with a draw index into a per-draw seed.
///
/// `stream` separates independent consumers sharing one combat seed
/// (initiative rolls versus in-combat rolls, for instance).
pub fn compute_seed(combat_seed: u64, draw: u64, stream: u32) -> u64 {
    // SplitMix64 / FxHash style combiners
    let mut hash = combat_seed;
    hash ^= draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(stream).wrapping_mul(0x517cc1b727220a95);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Seeded sequence of draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollStream {
    seed: u64,
    stream: u32,
    draws: u64,
}

impl RollStream {
    pub const COMBAT: u32 = 0;

    pub const fn new(seed: u64) -> Self {
        Self::with_stream(seed, Self::COMBAT)
    }

    pub const fn with_stream(seed: u64, stream: u32) -> Self {
        Self {
            seed,
            stream,
            draws: 0,
        }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    pub fn next_u32(&mut self) -> u32 {
        let seed = compute_seed(self.seed, self.draws, self.stream);
        self.draws += 1;
        PcgRng.next_u32(seed)
    }

    /// Roll a die with N sides (1-N inclusive).
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        (self.next_u32() % sides.max(1)) + 1
    }

    pub fn d20(&mut self) -> u32 {
        self.roll_die(20)
    }
}
