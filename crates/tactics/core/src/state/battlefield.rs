use std::collections::BTreeSet;

use super::common::Position;

/// Static grid the combat is fought on.
///
/// Tiles outside `0..width` x `0..height` do not exist. Blocked tiles can never
/// be entered; difficult tiles cost two movement to enter.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battlefield {
    pub width: i32,
    pub height: i32,
    pub blocked: BTreeSet<Position>,
    pub difficult: BTreeSet<Position>,
}

impl Battlefield {
    pub const DIFFICULT_STEP_COST: u32 = 2;

    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            blocked: BTreeSet::new(),
            difficult: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_blocked(mut self, tiles: impl IntoIterator<Item = Position>) -> Self {
        self.blocked.extend(tiles);
        self
    }

    #[must_use]
    pub fn with_difficult(mut self, tiles: impl IntoIterator<Item = Position>) -> Self {
        self.difficult.extend(tiles);
        self
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    pub fn is_blocked(&self, position: Position) -> bool {
        self.blocked.contains(&position)
    }

    /// In bounds and not blocked.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.contains(position) && !self.is_blocked(position)
    }

    /// Movement cost of stepping onto `position`.
    pub fn step_cost(&self, position: Position) -> u32 {
        if self.difficult.contains(&position) {
            Self::DIFFICULT_STEP_COST
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_terrain() {
        let field = Battlefield::new(4, 3)
            .with_blocked([Position::new(1, 1)])
            .with_difficult([Position::new(2, 2)]);

        assert!(field.contains(Position::new(3, 2)));
        assert!(!field.contains(Position::new(4, 0)));
        assert!(!field.contains(Position::new(0, -1)));
        assert!(!field.is_walkable(Position::new(1, 1)));
        assert_eq!(field.step_cost(Position::new(2, 2)), 2);
        assert_eq!(field.step_cost(Position::new(0, 0)), 1);
    }
}
