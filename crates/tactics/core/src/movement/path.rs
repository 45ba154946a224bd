use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::config::CombatConfig;
use crate::state::{CombatState, Combatant, Position};

use super::MoveError;

/// A planned route. `waypoints` excludes the start and ends on the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPreview {
    pub start: Position,
    pub destination: Position,
    pub waypoints: Vec<Position>,
    pub cost: u32,
}

impl PathPreview {
    /// Movement cost of each waypoint, in order.
    pub fn step_costs<'a>(&'a self, state: &'a CombatState) -> impl Iterator<Item = (Position, u32)> + 'a {
        self.waypoints
            .iter()
            .map(move |&tile| (tile, state.battlefield.step_cost(tile)))
    }
}

/// Cheapest 8-directional route for `mover` to `destination`.
///
/// Hostile occupants block; allies can be passed through but not ended on.
/// Ties resolve in favour of the lexicographically smallest frontier tile and
/// the first neighbour in scan order, so equal inputs give equal paths.
pub fn find_path(
    state: &CombatState,
    mover: &Combatant,
    destination: Position,
) -> Result<PathPreview, MoveError> {
    let start = mover.position;
    let field = &state.battlefield;

    if !field.contains(destination) {
        return Err(MoveError::OutOfBounds(destination));
    }
    if field.is_blocked(destination) {
        return Err(MoveError::Blocked(destination));
    }
    if state
        .occupant_at(destination)
        .is_some_and(|c| c.id != mover.id)
    {
        return Err(MoveError::Occupied(destination));
    }
    if destination == start {
        return Ok(PathPreview {
            start,
            destination,
            waypoints: Vec::new(),
            cost: 0,
        });
    }

    let passable = |tile: Position| {
        field.is_walkable(tile)
            && !state
                .occupant_at(tile)
                .is_some_and(|c| c.id != mover.id && c.is_hostile_to(mover))
    };

    let mut best: BTreeMap<Position, u32> = BTreeMap::from([(start, 0)]);
    let mut came_from: BTreeMap<Position, Position> = BTreeMap::new();
    let mut frontier = BinaryHeap::from([Reverse((0u32, start))]);
    let mut expanded = 0usize;

    while let Some(Reverse((cost, tile))) = frontier.pop() {
        if tile == destination {
            let mut waypoints = vec![tile];
            let mut cursor = tile;
            while let Some(&previous) = came_from.get(&cursor) {
                if previous == start {
                    break;
                }
                waypoints.push(previous);
                cursor = previous;
            }
            waypoints.reverse();
            return Ok(PathPreview {
                start,
                destination,
                waypoints,
                cost,
            });
        }
        if best.get(&tile).is_some_and(|&known| known < cost) {
            continue;
        }
        expanded += 1;
        if expanded > CombatConfig::MAX_PATH_SEARCH {
            break;
        }

        for next in tile.neighbours().filter(|&n| passable(n)) {
            let next_cost = cost + field.step_cost(next);
            if best.get(&next).is_none_or(|&known| next_cost < known) {
                best.insert(next, next_cost);
                came_from.insert(next, tile);
                frontier.push(Reverse((next_cost, next)));
            }
        }
    }

    Err(MoveError::NoPath(destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Battlefield, CombatantId, CombatantStats, Faction};

    fn unit(id: u32, faction: Faction, x: i32, y: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("unit-{id}"),
            faction,
            Position::new(x, y),
            CombatantStats::default(),
        )
    }

    #[test]
    fn straight_path_costs_one_per_tile() {
        let state = CombatState::new(Battlefield::new(8, 8), vec![unit(0, Faction::Party, 0, 0)]);
        let path = find_path(&state, &state.combatants[0], Position::new(3, 3)).expect("open field");
        assert_eq!(path.cost, 3);
        assert_eq!(
            path.waypoints,
            vec![Position::new(1, 1), Position::new(2, 2), Position::new(3, 3)]
        );
    }

    #[test]
    fn difficult_terrain_is_avoided_when_cheaper() {
        let field = Battlefield::new(5, 3).with_difficult([Position::new(1, 0), Position::new(2, 0)]);
        let state = CombatState::new(field, vec![unit(0, Faction::Party, 0, 0)]);
        let path = find_path(&state, &state.combatants[0], Position::new(3, 0)).expect("route");
        assert_eq!(path.cost, 3);
        assert!(!path.waypoints.contains(&Position::new(1, 0)));
    }

    #[test]
    fn hostiles_block_and_allies_pass() {
        let field = Battlefield::new(3, 1);
        let blocked = CombatState::new(
            field.clone(),
            vec![unit(0, Faction::Party, 0, 0), unit(1, Faction::Hostile, 1, 0)],
        );
        assert_eq!(
            find_path(&blocked, &blocked.combatants[0], Position::new(2, 0)),
            Err(MoveError::NoPath(Position::new(2, 0)))
        );

        let open = CombatState::new(
            field,
            vec![unit(0, Faction::Party, 0, 0), unit(1, Faction::Ally, 1, 0)],
        );
        let path = find_path(&open, &open.combatants[0], Position::new(2, 0)).expect("pass ally");
        assert_eq!(path.cost, 2);
        assert_eq!(
            find_path(&open, &open.combatants[0], Position::new(1, 0)),
            Err(MoveError::Occupied(Position::new(1, 0)))
        );
    }

    #[test]
    fn rejects_bad_destinations() {
        let field = Battlefield::new(4, 4).with_blocked([Position::new(2, 2)]);
        let state = CombatState::new(field, vec![unit(0, Faction::Party, 0, 0)]);
        let mover = &state.combatants[0];
        assert_eq!(
            find_path(&state, mover, Position::new(9, 9)),
            Err(MoveError::OutOfBounds(Position::new(9, 9)))
        );
        assert_eq!(
            find_path(&state, mover, Position::new(2, 2)),
            Err(MoveError::Blocked(Position::new(2, 2)))
        );
    }
}
