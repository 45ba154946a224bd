//! Integer area geometry used by area-of-effect targeting and zones.
//!
//! All tests are exact: no floating point is involved, so an area contains the
//! same tiles on every platform.

use super::common::Position;

/// A set of tiles described by a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Area {
    /// Every tile within `radius` (Chebyshev) of `center`.
    Circle { center: Position, radius: u32 },
    /// A 90 degree cone from `origin` toward `toward`, excluding the origin tile.
    Cone {
        origin: Position,
        toward: Position,
        length: u32,
    },
    /// Tiles whose centre lies within `width / 2` of the segment `from..=to`.
    Line {
        from: Position,
        to: Position,
        width: u32,
    },
}

impl Area {
    pub fn contains(&self, position: Position) -> bool {
        match *self {
            Area::Circle { center, radius } => center.distance(position) <= radius,
            Area::Cone {
                origin,
                toward,
                length,
            } => cone_contains(origin, toward, length, position),
            Area::Line { from, to, width } => line_contains(from, to, width, position),
        }
    }

    /// Tile the area is anchored on.
    pub fn anchor(&self) -> Position {
        match *self {
            Area::Circle { center, .. } => center,
            Area::Cone { origin, .. } => origin,
            Area::Line { from, .. } => from,
        }
    }
}

/// Endpoint reached by walking `length` tiles from `from` toward `toward`.
pub fn project(from: Position, toward: Position, length: u32) -> Position {
    let dx = toward.x - from.x;
    let dy = toward.y - from.y;
    let span = dx.abs().max(dy.abs());
    if span == 0 {
        return from;
    }
    let length = i32::try_from(length).unwrap_or(i32::MAX);
    from.offset(dx * length / span, dy * length / span)
}

fn cone_contains(origin: Position, toward: Position, length: u32, position: Position) -> bool {
    if position == origin || origin.distance(position) > length {
        return false;
    }
    let (dx, dy) = (
        i64::from(toward.x - origin.x),
        i64::from(toward.y - origin.y),
    );
    let (vx, vy) = (
        i64::from(position.x - origin.x),
        i64::from(position.y - origin.y),
    );
    if dx == 0 && dy == 0 {
        return false;
    }
    let dot = dx * vx + dy * vy;
    if dot <= 0 {
        return false;
    }
    // cos^2(angle) >= 1/2 keeps the half-angle within 45 degrees.
    2 * dot * dot >= (dx * dx + dy * dy) * (vx * vx + vy * vy)
}

fn line_contains(from: Position, to: Position, width: u32, position: Position) -> bool {
    let (ax, ay) = (i64::from(to.x - from.x), i64::from(to.y - from.y));
    let (px, py) = (
        i64::from(position.x - from.x),
        i64::from(position.y - from.y),
    );
    let len_sq = ax * ax + ay * ay;
    if len_sq == 0 {
        return position == from;
    }
    let t = ax * px + ay * py;
    if t < 0 || t > len_sq {
        return false;
    }
    let cross = ax * py - ay * px;
    let width = i64::from(width.max(1));
    4 * cross * cross <= width * width * len_sq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_uses_grid_distance() {
        let area = Area::Circle {
            center: Position::new(5, 5),
            radius: 2,
        };
        assert!(area.contains(Position::new(7, 7)));
        assert!(area.contains(Position::new(5, 5)));
        assert!(!area.contains(Position::new(8, 5)));
    }

    #[test]
    fn cone_spreads_ninety_degrees() {
        let area = Area::Cone {
            origin: Position::new(0, 0),
            toward: Position::new(3, 0),
            length: 3,
        };
        assert!(area.contains(Position::new(1, 0)));
        assert!(area.contains(Position::new(2, 2)));
        assert!(area.contains(Position::new(3, -3)));
        assert!(!area.contains(Position::new(1, 2)));
        assert!(!area.contains(Position::new(0, 0)));
        assert!(!area.contains(Position::new(-1, 0)));
        assert!(!area.contains(Position::new(4, 0)));
    }

    #[test]
    fn straight_and_diagonal_lines() {
        let straight = Area::Line {
            from: Position::new(0, 0),
            to: Position::new(4, 0),
            width: 1,
        };
        assert!(straight.contains(Position::new(3, 0)));
        assert!(!straight.contains(Position::new(3, 1)));
        assert!(!straight.contains(Position::new(5, 0)));

        let diagonal = Area::Line {
            from: Position::new(0, 0),
            to: Position::new(3, 3),
            width: 1,
        };
        assert!(diagonal.contains(Position::new(2, 2)));
        assert!(!diagonal.contains(Position::new(1, 0)));
    }

    #[test]
    fn projection_scales_to_length() {
        assert_eq!(
            project(Position::new(1, 1), Position::new(2, 1), 5),
            Position::new(6, 1)
        );
        assert_eq!(
            project(Position::new(0, 0), Position::new(2, 2), 4),
            Position::new(4, 4)
        );
        assert_eq!(
            project(Position::new(0, 0), Position::new(0, 0), 4),
            Position::new(0, 0)
        );
    }
}
