use std::fmt;

use super::area::Area;
use super::common::{ActionId, CombatantId, StatusId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

/// Persistent area left behind by an action (a wall of fire, a cloud).
///
/// Zones age at round end and disappear when `remaining_rounds` reaches zero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub id: ZoneId,
    pub owner: CombatantId,
    pub source_action: ActionId,
    pub area: Area,
    pub status_on_enter: Option<StatusId>,
    pub remaining_rounds: u32,
}
