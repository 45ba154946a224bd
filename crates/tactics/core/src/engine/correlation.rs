use std::fmt;
use std::time::{Duration, Instant};

/// Generation token identifying one attempted action or movement.
///
/// Only an [`ActionCorrelator`] mints tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionToken(u64);

impl ActionToken {
    /// Never issued; carried by work that does not expect a completion.
    pub const UNCORRELATED: Self = Self(0);
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Outstanding {
    token: ActionToken,
    deadline: Instant,
}

/// Issues monotonic tokens and tracks the single outstanding one.
#[derive(Clone, Debug, Default)]
pub struct ActionCorrelator {
    last: u64,
    outstanding: Option<Outstanding>,
}

impl ActionCorrelator {
    /// Issues the next token and makes it the outstanding one.
    pub fn begin(&mut self, now: Instant, timeout: Duration) -> ActionToken {
        self.last += 1;
        let token = ActionToken(self.last);
        self.outstanding = Some(Outstanding {
            token,
            deadline: now + timeout,
        });
        token
    }

    /// Clears the outstanding token if it matches. Stale tokens return false.
    pub fn complete(&mut self, token: ActionToken) -> bool {
        match self.outstanding {
            Some(current) if current.token == token => {
                self.outstanding = None;
                true
            }
            _ => false,
        }
    }

    /// Takes the outstanding token if its deadline passed.
    pub fn expired(&mut self, now: Instant) -> Option<ActionToken> {
        let current = self.outstanding?;
        if now < current.deadline {
            return None;
        }
        self.outstanding = None;
        Some(current.token)
    }

    /// Drops the outstanding token without completing it.
    pub fn cancel(&mut self) -> Option<ActionToken> {
        self.outstanding.take().map(|o| o.token)
    }

    pub fn outstanding(&self) -> Option<ActionToken> {
        self.outstanding.map(|o| o.token)
    }

    pub fn last_issued(&self) -> ActionToken {
        ActionToken(self.last)
    }
}
