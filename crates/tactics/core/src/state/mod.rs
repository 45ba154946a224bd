//! Combat state: combatants, the battlefield and persistent zones.
//!
//! [`CombatState`] is plain data. Every mutation goes through
//! [`crate::engine::CombatEngine`], which keeps statuses, modifiers and the
//! phase machine consistent with it.
mod area;
mod battlefield;
mod combatant;
mod common;
mod zone;

pub use area::{Area, project};
pub use battlefield::Battlefield;
pub use combatant::{
    Ability, AbilityScores, ActionBudget, Combatant, CombatantStats, Controller, DeathSaves,
    LifeState, ResourcePool, Resources,
};
pub use common::{ActionId, CombatantId, Faction, Position, ReactionId, Side, StatusId};
pub use zone::{Zone, ZoneId};

/// Mutable combat state owned by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub combatants: Vec<Combatant>,
    pub battlefield: Battlefield,
    pub zones: Vec<Zone>,
    next_zone_id: u32,
}

impl CombatState {
    pub fn new(battlefield: Battlefield, combatants: Vec<Combatant>) -> Self {
        Self {
            combatants,
            battlefield,
            zones: Vec::new(),
            next_zone_id: 0,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    /// Combatants that have not died.
    pub fn present(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| !c.life_state.is_dead())
    }

    /// The non-dead combatant standing on `position`, if any.
    pub fn occupant_at(&self, position: Position) -> Option<&Combatant> {
        self.present().find(|c| c.position == position)
    }

    pub fn are_hostile(&self, a: CombatantId, b: CombatantId) -> bool {
        match (self.combatant(a), self.combatant(b)) {
            (Some(a), Some(b)) => a.is_hostile_to(b),
            _ => false,
        }
    }

    /// Sides that still field at least one `Alive` member.
    pub fn standing_sides(&self) -> Vec<Side> {
        let mut sides: Vec<Side> = self
            .combatants
            .iter()
            .filter(|c| c.life_state.is_alive())
            .filter_map(|c| c.faction.side())
            .collect();
        sides.sort();
        sides.dedup();
        sides
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub(crate) fn add_zone(
        &mut self,
        owner: CombatantId,
        source_action: ActionId,
        area: Area,
        status_on_enter: Option<StatusId>,
        rounds: u32,
    ) -> ZoneId {
        let id = ZoneId(self.next_zone_id);
        self.next_zone_id = self.next_zone_id.wrapping_add(1);
        self.zones.push(Zone {
            id,
            owner,
            source_action,
            area,
            status_on_enter,
            remaining_rounds: rounds,
        });
        id
    }

    /// Zones covering `position`.
    pub fn zones_at(&self, position: Position) -> impl Iterator<Item = &Zone> {
        self.zones
            .iter()
            .filter(move |z| z.area.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(id: u32, faction: Faction, x: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("c{id}"),
            faction,
            Position::new(x, 0),
            CombatantStats::default(),
        )
    }

    #[test]
    fn standing_sides_ignore_downed_and_neutral() {
        let mut state = CombatState::new(
            Battlefield::new(8, 8),
            vec![
                fighter(0, Faction::Party, 0),
                fighter(1, Faction::Hostile, 1),
                fighter(2, Faction::Neutral, 2),
            ],
        );
        assert_eq!(state.standing_sides(), vec![Side::Party, Side::Enemies]);

        if let Some(enemy) = state.combatant_mut(CombatantId(1)) {
            enemy.life_state = LifeState::Downed;
        }
        assert_eq!(state.standing_sides(), vec![Side::Party]);
    }

    #[test]
    fn dead_combatants_do_not_occupy_tiles() {
        let mut state = CombatState::new(
            Battlefield::new(8, 8),
            vec![fighter(0, Faction::Party, 3)],
        );
        assert!(state.occupant_at(Position::new(3, 0)).is_some());

        if let Some(c) = state.combatant_mut(CombatantId(0)) {
            c.life_state = LifeState::Dead;
        }
        assert!(state.occupant_at(Position::new(3, 0)).is_none());
    }
}
