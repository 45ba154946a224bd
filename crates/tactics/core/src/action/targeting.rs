//! Turns an [`ActionTarget`] into the concrete set of affected combatants.

use crate::state::{Area, CombatState, Combatant, CombatantId, Position, project};

use super::definition::{ActionDefinition, TargetFilter, TargetType};
use super::error::ActionError;
use super::request::ActionTarget;

/// Targets an action will resolve against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    pub units: Vec<CombatantId>,
    pub point: Option<Position>,
    pub area: Option<Area>,
    /// Tiles a charge walks before striking, in order.
    pub approach: Vec<Position>,
}

impl ResolvedTargets {
    fn units(units: Vec<CombatantId>) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }
}

pub fn passes_filter(actor: &Combatant, unit: &Combatant, filter: TargetFilter) -> bool {
    match filter {
        TargetFilter::Any => true,
        TargetFilter::Enemies => actor.is_hostile_to(unit),
        TargetFilter::Allies => !actor.is_hostile_to(unit),
        TargetFilter::Others => actor.id != unit.id,
    }
}

/// Resolves targets for `actor` using `def`'s targeting shape.
///
/// Fails without side effects when the target is missing, dead, filtered
/// out, out of range or of the wrong kind for the shape.
pub fn resolve_targets(
    state: &CombatState,
    actor: &Combatant,
    def: &ActionDefinition,
    target: &ActionTarget,
) -> Result<ResolvedTargets, ActionError> {
    let filter = def.filter;
    let reach_range = |range: u32| {
        if def.attack_type.is_melee() {
            range.max(actor.stats.reach)
        } else {
            range
        }
    };

    match def.target_type {
        TargetType::None => Ok(ResolvedTargets::default()),

        TargetType::SelfOnly => match target {
            ActionTarget::None => Ok(ResolvedTargets::units(vec![actor.id])),
            ActionTarget::Unit(id) if *id == actor.id => Ok(ResolvedTargets::units(vec![actor.id])),
            ActionTarget::Unit(id) => Err(ActionError::InvalidTarget(*id)),
            _ => Err(ActionError::WrongTargetKind),
        },

        TargetType::SingleUnit { range } => {
            let ActionTarget::Unit(id) = target else {
                return Err(ActionError::WrongTargetKind);
            };
            let unit = check_unit(state, actor, *id, filter, reach_range(range))?;
            Ok(ResolvedTargets::units(vec![unit.id]))
        }

        TargetType::MultiUnit { range, max_targets } => {
            let ids: &[CombatantId] = match target {
                ActionTarget::Unit(id) => std::slice::from_ref(id),
                ActionTarget::Units(ids) if !ids.is_empty() => ids,
                _ => return Err(ActionError::WrongTargetKind),
            };
            if ids.len() > usize::from(max_targets) {
                return Err(ActionError::TooManyTargets {
                    given: ids.len(),
                    max: max_targets,
                });
            }
            let units = ids
                .iter()
                .map(|id| check_unit(state, actor, *id, filter, reach_range(range)).map(|u| u.id))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ResolvedTargets::units(units))
        }

        TargetType::All => Ok(ResolvedTargets::units(
            state
                .present()
                .filter(|unit| passes_filter(actor, unit, filter))
                .map(|unit| unit.id)
                .collect(),
        )),

        TargetType::Point { range } => {
            let point = checked_point(state, actor, target, range)?;
            let units = state
                .occupant_at(point)
                .filter(|unit| passes_filter(actor, unit, filter))
                .map(|unit| vec![unit.id])
                .unwrap_or_default();
            Ok(ResolvedTargets {
                units,
                point: Some(point),
                ..ResolvedTargets::default()
            })
        }

        TargetType::Circle { range, radius } => {
            let center = checked_point(state, actor, target, range)?;
            Ok(area_targets(
                state,
                actor,
                filter,
                Area::Circle { center, radius },
                Some(center),
                false,
            ))
        }

        TargetType::Cone { length } => {
            let toward = aim(state, actor, target)?;
            let area = Area::Cone {
                origin: actor.position,
                toward,
                length,
            };
            Ok(area_targets(state, actor, filter, area, Some(toward), true))
        }

        TargetType::Line { length, width } => {
            let toward = aim(state, actor, target)?;
            let area = Area::Line {
                from: actor.position,
                to: project(actor.position, toward, length),
                width,
            };
            Ok(area_targets(state, actor, filter, area, Some(toward), true))
        }

        TargetType::WallSegment { range, length } => {
            let center = checked_point(state, actor, target, range)?;
            let (dx, dy) = actor.position.direction_to(center);
            if (dx, dy) == (0, 0) || length == 0 {
                return Err(ActionError::WrongTargetKind);
            }
            let (px, py) = (-dy, dx);
            let length = i32::try_from(length).unwrap_or(i32::MAX);
            let before = length / 2;
            let after = length - 1 - before;
            let area = Area::Line {
                from: center.offset(-px * before, -py * before),
                to: center.offset(px * after, py * after),
                width: 1,
            };
            Ok(area_targets(state, actor, filter, area, Some(center), false))
        }

        TargetType::Charge { distance } => {
            let ActionTarget::Unit(id) = target else {
                return Err(ActionError::WrongTargetKind);
            };
            let unit = check_unit(state, actor, *id, filter, u32::MAX)?;
            let approach = charge_path(state, actor, unit, distance)?;
            Ok(ResolvedTargets {
                units: vec![unit.id],
                approach,
                ..ResolvedTargets::default()
            })
        }
    }
}

fn check_unit<'a>(
    state: &'a CombatState,
    actor: &Combatant,
    id: CombatantId,
    filter: TargetFilter,
    range: u32,
) -> Result<&'a Combatant, ActionError> {
    let unit = state
        .combatant(id)
        .ok_or(ActionError::TargetNotFound(id))?;
    if unit.life_state.is_dead() {
        return Err(ActionError::TargetDead(id));
    }
    if !passes_filter(actor, unit, filter) {
        return Err(ActionError::InvalidTarget(id));
    }
    let distance = actor.position.distance(unit.position);
    if distance > range {
        return Err(ActionError::OutOfRange { distance, range });
    }
    Ok(unit)
}

/// Direction target for cones and lines: a point or a unit's tile.
fn aim(state: &CombatState, actor: &Combatant, target: &ActionTarget) -> Result<Position, ActionError> {
    let toward = match target {
        ActionTarget::Point(point) => *point,
        ActionTarget::Unit(id) => {
            state
                .combatant(*id)
                .ok_or(ActionError::TargetNotFound(*id))?
                .position
        }
        _ => return Err(ActionError::WrongTargetKind),
    };
    if toward == actor.position {
        return Err(ActionError::WrongTargetKind);
    }
    Ok(toward)
}

fn checked_point(
    state: &CombatState,
    actor: &Combatant,
    target: &ActionTarget,
    range: u32,
) -> Result<Position, ActionError> {
    let ActionTarget::Point(point) = target else {
        return Err(ActionError::WrongTargetKind);
    };
    if !state.battlefield.contains(*point) {
        return Err(ActionError::PointOutOfBounds(*point));
    }
    let distance = actor.position.distance(*point);
    if distance > range {
        return Err(ActionError::OutOfRange { distance, range });
    }
    Ok(*point)
}

fn area_targets(
    state: &CombatState,
    actor: &Combatant,
    filter: TargetFilter,
    area: Area,
    point: Option<Position>,
    exclude_actor: bool,
) -> ResolvedTargets {
    let units = state
        .present()
        .filter(|unit| !(exclude_actor && unit.id == actor.id))
        .filter(|unit| area.contains(unit.position))
        .filter(|unit| passes_filter(actor, unit, filter))
        .map(|unit| unit.id)
        .collect();
    ResolvedTargets {
        units,
        point,
        area: Some(area),
        approach: Vec::new(),
    }
}

/// Straight-line approach until `target` is within reach.
fn charge_path(
    state: &CombatState,
    actor: &Combatant,
    target: &Combatant,
    distance: u32,
) -> Result<Vec<Position>, ActionError> {
    let reach = actor.stats.reach.max(1);
    let mut position = actor.position;
    let mut path = Vec::new();

    while position.distance(target.position) > reach {
        if path.len() as u32 >= distance {
            return Err(ActionError::OutOfRange {
                distance: actor.position.distance(target.position),
                range: distance + reach,
            });
        }
        let (dx, dy) = position.direction_to(target.position);
        let next = position.offset(dx, dy);
        let occupied = state.occupant_at(next).is_some_and(|c| c.id != actor.id);
        if !state.battlefield.is_walkable(next) || occupied {
            return Err(ActionError::PathBlocked);
        }
        path.push(next);
        position = next;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::AttackType;
    use crate::state::{Battlefield, CombatantStats, Faction};

    fn unit(id: u32, faction: Faction, x: i32, y: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("unit-{id}"),
            faction,
            Position::new(x, y),
            CombatantStats::default(),
        )
    }

    fn state() -> CombatState {
        CombatState::new(
            Battlefield::new(10, 10).with_blocked([Position::new(3, 5)]),
            vec![
                unit(0, Faction::Party, 0, 0),
                unit(1, Faction::Hostile, 1, 0),
                unit(2, Faction::Hostile, 4, 4),
                unit(3, Faction::Party, 0, 1),
                unit(4, Faction::Hostile, 3, 7),
            ],
        )
    }

    #[test]
    fn melee_uses_reach_and_filter() {
        let state = state();
        let actor = &state.combatants[0];
        let strike = ActionDefinition::new("strike", "Strike", TargetType::SingleUnit { range: 0 })
            .with_attack(AttackType::MeleeWeapon)
            .with_filter(TargetFilter::Enemies);

        let ok = resolve_targets(&state, actor, &strike, &ActionTarget::Unit(CombatantId(1)));
        assert_eq!(ok.map(|r| r.units), Ok(vec![CombatantId(1)]));

        let far = resolve_targets(&state, actor, &strike, &ActionTarget::Unit(CombatantId(2)));
        assert_eq!(far, Err(ActionError::OutOfRange { distance: 4, range: 1 }));

        let friend = resolve_targets(&state, actor, &strike, &ActionTarget::Unit(CombatantId(3)));
        assert_eq!(friend, Err(ActionError::InvalidTarget(CombatantId(3))));
    }

    #[test]
    fn circle_collects_everyone_inside() {
        let state = state();
        let actor = &state.combatants[0];
        let blast = ActionDefinition::new("blast", "Blast", TargetType::Circle { range: 10, radius: 1 });
        let resolved =
            resolve_targets(&state, actor, &blast, &ActionTarget::Point(Position::new(0, 0)))
                .expect("in range");
        assert_eq!(
            resolved.units,
            vec![CombatantId(0), CombatantId(1), CombatantId(3)]
        );

        let outside = resolve_targets(&state, actor, &blast, &ActionTarget::Point(Position::new(20, 0)));
        assert_eq!(outside, Err(ActionError::PointOutOfBounds(Position::new(20, 0))));
    }

    #[test]
    fn cone_excludes_actor() {
        let state = state();
        let actor = &state.combatants[0];
        let cone = ActionDefinition::new("cone", "Cone", TargetType::Cone { length: 5 });
        let resolved = resolve_targets(&state, actor, &cone, &ActionTarget::Unit(CombatantId(2)))
            .expect("aimed");
        assert!(!resolved.units.contains(&CombatantId(0)));
        assert!(resolved.units.contains(&CombatantId(2)));
    }

    #[test]
    fn multi_unit_caps_targets() {
        let state = state();
        let actor = &state.combatants[0];
        let volley = ActionDefinition::new(
            "volley",
            "Volley",
            TargetType::MultiUnit { range: 10, max_targets: 1 },
        );
        let many = ActionTarget::Units(vec![CombatantId(1), CombatantId(2)]);
        assert_eq!(
            resolve_targets(&state, actor, &volley, &many),
            Err(ActionError::TooManyTargets { given: 2, max: 1 })
        );
    }

    #[test]
    fn charge_walks_until_adjacent() {
        let state = state();
        let actor = &state.combatants[0];
        let charge = ActionDefinition::new("charge", "Charge", TargetType::Charge { distance: 4 })
            .with_attack(AttackType::MeleeWeapon)
            .with_filter(TargetFilter::Enemies);
        let resolved = resolve_targets(&state, actor, &charge, &ActionTarget::Unit(CombatantId(2)))
            .expect("reachable");
        assert_eq!(
            resolved.approach,
            vec![Position::new(1, 1), Position::new(2, 2), Position::new(3, 3)]
        );

        let blocked = ActionDefinition::new("charge", "Charge", TargetType::Charge { distance: 8 });
        let mover = unit(9, Faction::Party, 3, 3);
        let result = resolve_targets(&state, &mover, &blocked, &ActionTarget::Unit(CombatantId(4)));
        assert_eq!(result, Err(ActionError::PathBlocked));
    }

    #[test]
    fn wall_runs_perpendicular() {
        let state = state();
        let actor = &state.combatants[0];
        let wall = ActionDefinition::new("wall", "Wall", TargetType::WallSegment { range: 10, length: 3 });
        let resolved = resolve_targets(&state, actor, &wall, &ActionTarget::Point(Position::new(4, 0)))
            .expect("in range");
        let area = resolved.area.expect("wall area");
        assert!(area.contains(Position::new(4, 0)));
        assert!(area.contains(Position::new(4, 1)));
        assert!(area.contains(Position::new(4, -1)));
        assert!(!area.contains(Position::new(3, 0)));
    }
}
