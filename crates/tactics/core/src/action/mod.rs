//! Action definitions, requests, targeting and results.
//!
//! Resolution itself lives in the engine's pipeline; this module only
//! describes actions and works out whom they affect.
mod definition;
mod error;
mod request;
mod result;
mod targeting;

pub use definition::{
    ActionCost, ActionDefinition, AttackType, Effect, EffectCondition, EffectKind,
    ForcedMoveDirection, SaveSpec, TargetFilter, TargetType, ZoneSpec,
};
pub use error::ActionError;
pub use request::{ActionOptions, ActionRequest, ActionTarget};
pub use result::{ActionResult, TargetOutcome};
pub use targeting::{ResolvedTargets, passes_filter, resolve_targets};
