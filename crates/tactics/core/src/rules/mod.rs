//! Dice, modifiers and roll resolution.
//!
//! [`RulesEngine`] answers attack, damage, save, initiative and hit-chance
//! queries. It owns the per-combatant modifier store and the seeded
//! [`RollStream`] every random outcome is drawn from.
mod damage;
mod dice;
mod engine;
mod modifier;
mod query;
mod rng;

pub use damage::DamageType;
pub use dice::{DiceError, DiceExpr, DiceRoll};
pub use engine::RulesEngine;
pub use modifier::{
    AdvantageState, Modifier, ModifierCondition, ModifierFold, ModifierKind, ModifierOwner,
    RollCategory, RollContext,
};
pub use query::{
    AttackQuery, AttackRoll, D20Roll, DamageQuery, DamageRoll, HitChanceQuery, HitOutcome,
    SaveQuery, SaveRoll,
};
pub use rng::{PcgRng, RngOracle, RollStream, compute_seed};
