use std::fmt;

/// Unique identifier for a combatant tracked in the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// The eight neighbour offsets in a fixed scan order.
    pub const NEIGHBOURS: [(i32, i32); 8] = [
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
    ];

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Grid distance with diagonal steps costing one tile (Chebyshev).
    pub fn distance(self, other: Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Unit step (each axis in -1..=1) pointing from `self` toward `other`.
    pub fn direction_to(self, other: Position) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    pub fn neighbours(self) -> impl Iterator<Item = Position> {
        Self::NEIGHBOURS
            .into_iter()
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Allegiance of a combatant.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    #[default]
    Party,
    Ally,
    Hostile,
    /// Bystanders; hostile to nobody and never keep a combat alive.
    Neutral,
}

/// The two opposing sides a combat is fought between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Party,
    Enemies,
}

impl Faction {
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Party | Self::Ally => Some(Side::Party),
            Self::Hostile => Some(Side::Enemies),
            Self::Neutral => None,
        }
    }

    pub fn is_hostile_to(self, other: Faction) -> bool {
        match (self.side(), other.side()) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a registered action definition.
    ActionId
);
string_id!(
    /// Identifier of a registered status definition.
    StatusId
);
string_id!(
    /// Identifier of a registered reaction definition.
    ReactionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_counts_diagonals_as_one() {
        assert_eq!(Position::new(0, 0).distance(Position::new(3, 2)), 3);
        assert_eq!(Position::new(-1, 4).distance(Position::new(-1, 4)), 0);
        assert_eq!(Position::new(2, 2).distance(Position::new(1, 1)), 1);
    }

    #[test]
    fn neutral_faction_is_hostile_to_nobody() {
        assert!(Faction::Party.is_hostile_to(Faction::Hostile));
        assert!(!Faction::Party.is_hostile_to(Faction::Ally));
        assert!(!Faction::Neutral.is_hostile_to(Faction::Hostile));
    }

    #[test]
    fn ids_render_plainly() {
        assert_eq!(CombatantId(3).to_string(), "#3");
        assert_eq!(ActionId::from("fire_bolt").to_string(), "fire_bolt");
    }
}
