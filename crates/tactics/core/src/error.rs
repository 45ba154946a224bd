//! Common error infrastructure for tactics-core.
//!
//! Shared types and traits used by every error enum in the crate. Domain errors
//! (`ActionError`, `MoveError`, `StatusError`, ...) live next to the code that
//! produces them and implement [`GameError`] so hosts can classify failures
//! uniformly.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later or with another choice
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted combat state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: not enough movement left, target out of range.
    Recoverable,

    /// Examples: unknown action id, target filter mismatch.
    Validation,

    /// Examples: combatant listed in the turn queue but missing from state.
    Internal,

    /// Examples: combat state invariant violated.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all tactics-core errors.
///
/// # Implementation Guidelines
///
/// - Derive `thiserror::Error` for the Display/Error impl
/// - Classify severity by recoverability, not impact
/// - Return a stable `SCREAMING_CASE` code from `error_code`
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
