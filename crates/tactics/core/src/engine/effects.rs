//! State changes shared by actions, reactions, ticks and movement.

use tracing::{debug, info};

use crate::action::{ActionDefinition, ForcedMoveDirection, ZoneSpec};
use crate::config::CombatConfig;
use crate::events::{CombatEvent, TickResult};
use crate::rules::DamageType;
use crate::state::{Area, CombatantId, LifeState, Position, StatusId, ZoneId};
use crate::status::{RemovalReason, StatusApplication, TickEffect, TickTiming};

use super::CombatEngine;

impl CombatEngine {
    /// Applies damage after reactions have had their say.
    ///
    /// Runs `DamageTaken` mitigation, then temporary HP, then HP, then the
    /// life-state rules. Returns the mitigated amount.
    pub(crate) fn deal_damage(
        &mut self,
        source: Option<CombatantId>,
        target: CombatantId,
        amount: u32,
        damage_type: DamageType,
        critical: bool,
        instant_death: bool,
    ) -> u32 {
        let ctx = self
            .roll_context(source.unwrap_or(target), target)
            .with_damage_type(damage_type);
        let amount = self.rules.mitigate(amount, target, &ctx);
        let massive_damage = self.config.massive_damage;

        let Some(combatant) = self.state.combatant_mut(target) else {
            return 0;
        };
        let before = combatant.life_state;
        let after = match before {
            LifeState::Dead => return 0,
            LifeState::Alive => {
                let absorbed = combatant.resources.temp_hp.min(amount);
                combatant.resources.temp_hp -= absorbed;
                let rest = amount - absorbed;
                if rest < combatant.resources.hp {
                    combatant.resources.hp -= rest;
                    LifeState::Alive
                } else {
                    let overflow = rest - combatant.resources.hp;
                    combatant.resources.hp = 0;
                    if instant_death
                        || combatant.stats.dies_at_zero
                        || (massive_damage && overflow >= combatant.stats.max_hp)
                    {
                        LifeState::Dead
                    } else {
                        combatant.death_saves.reset();
                        LifeState::Downed
                    }
                }
            }
            LifeState::Downed | LifeState::Unconscious if amount > 0 => {
                let saves = &mut combatant.death_saves;
                saves.failures = saves.failures.saturating_add(if critical { 2 } else { 1 });
                if instant_death
                    || (massive_damage && amount >= combatant.stats.max_hp)
                    || saves.failures >= CombatConfig::DEATH_SAVES_TO_SETTLE
                {
                    LifeState::Dead
                } else {
                    LifeState::Downed
                }
            }
            settled => settled,
        };

        debug!(
            target: "tactics::action",
            %target,
            amount,
            %damage_type,
            hp = combatant.resources.hp,
            "damage applied"
        );
        if after != before {
            self.set_life_state(target, after);
        }
        if amount > 0 {
            self.statuses
                .break_on_damage(&mut self.rules, &mut self.events, target);
        }
        amount
    }

    /// Restores HP, reviving a downed or unconscious combatant. Returns HP gained.
    pub(crate) fn heal(&mut self, target: CombatantId, amount: u32) -> u32 {
        let Some(combatant) = self.state.combatant_mut(target) else {
            return 0;
        };
        if combatant.life_state.is_dead() || amount == 0 {
            return 0;
        }
        let before = combatant.resources.hp;
        combatant.resources.hp = before.saturating_add(amount).min(combatant.stats.max_hp);
        let healed = combatant.resources.hp - before;
        let revived = combatant.life_state.is_down() && healed > 0;
        if revived {
            combatant.death_saves.reset();
            self.set_life_state(target, LifeState::Alive);
        }
        healed
    }

    /// Records a life-state change. Death clears every status.
    pub(crate) fn set_life_state(&mut self, combatant: CombatantId, to: LifeState) {
        let Some(c) = self.state.combatant_mut(combatant) else {
            return;
        };
        let from = c.life_state;
        if from == to {
            return;
        }
        c.life_state = to;
        info!(target: "tactics::combatant", %combatant, ?from, ?to, "life state changed");
        self.events.push(CombatEvent::LifeStateChanged { combatant, from, to });

        if to.is_dead() {
            self.statuses
                .clear(&mut self.rules, &mut self.events, combatant, RemovalReason::Died);
        }
    }

    /// Pushes or pulls `target` in a straight line, stopping at obstacles.
    pub(crate) fn forced_move(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        distance: u32,
        direction: ForcedMoveDirection,
    ) -> Option<Position> {
        let origin = self.state.combatant(actor)?.position;
        let mut position = self.state.combatant(target)?.position;
        let (dx, dy) = match direction {
            ForcedMoveDirection::Push => origin.direction_to(position),
            ForcedMoveDirection::Pull => position.direction_to(origin),
        };
        if (dx, dy) == (0, 0) {
            return None;
        }

        let start = position;
        for _ in 0..distance {
            let next = position.offset(dx, dy);
            if !self.state.battlefield.is_walkable(next) || self.state.occupant_at(next).is_some() {
                break;
            }
            self.relocate(target, next);
            position = next;
        }
        (position != start).then_some(position)
    }

    /// Moves `combatant` to `to`, reporting zone entry and exit.
    pub(crate) fn relocate(&mut self, combatant: CombatantId, to: Position) {
        let Some(c) = self.state.combatant_mut(combatant) else {
            return;
        };
        let from = c.position;
        c.position = to;

        let left: Vec<ZoneId> = self
            .state
            .zones_at(from)
            .filter(|z| !z.area.contains(to))
            .map(|z| z.id)
            .collect();
        let entered: Vec<(ZoneId, CombatantId, Option<StatusId>)> = self
            .state
            .zones_at(to)
            .filter(|z| !z.area.contains(from))
            .map(|z| (z.id, z.owner, z.status_on_enter.clone()))
            .collect();

        for zone in left {
            self.events.push(CombatEvent::AreaLeft { zone, combatant });
        }
        for (zone, owner, status) in entered {
            self.enter_zone(zone, owner, combatant, status);
        }
    }

    fn enter_zone(
        &mut self,
        zone: ZoneId,
        owner: CombatantId,
        combatant: CombatantId,
        status: Option<StatusId>,
    ) {
        debug!(target: "tactics::area", %zone, %combatant, "area entered");
        self.events.push(CombatEvent::AreaEntered { zone, combatant });
        if let Some(status) = status {
            let application = StatusApplication::new(status, combatant).from_source(owner);
            if let Err(err) = self.apply_status(application) {
                debug!(target: "tactics::area", %zone, %combatant, %err, "zone status not applied");
            }
        }
    }

    /// Leaves a persistent zone behind; combatants already inside are entered.
    pub(crate) fn create_zone(
        &mut self,
        owner: CombatantId,
        def: &ActionDefinition,
        area: Area,
        spec: &ZoneSpec,
    ) -> ZoneId {
        let zone = self.state.add_zone(
            owner,
            def.id.clone(),
            area,
            spec.status_on_enter.clone(),
            spec.rounds,
        );
        info!(target: "tactics::area", %zone, action = %def.id, rounds = spec.rounds, "zone created");

        let inside: Vec<CombatantId> = self
            .state
            .present()
            .filter(|c| area.contains(c.position))
            .map(|c| c.id)
            .collect();
        for combatant in inside {
            self.enter_zone(zone, owner, combatant, spec.status_on_enter.clone());
        }
        zone
    }

    /// Counts zone lifetimes down by one round and removes the spent ones.
    pub(crate) fn age_zones(&mut self) {
        for zone in &mut self.state.zones {
            zone.remaining_rounds = zone.remaining_rounds.saturating_sub(1);
        }
        let (spent, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.zones)
            .into_iter()
            .partition(|z| z.remaining_rounds == 0);
        self.state.zones = kept;

        for zone in spent {
            let inside: Vec<CombatantId> = self
                .state
                .present()
                .filter(|c| zone.area.contains(c.position))
                .map(|c| c.id)
                .collect();
            for combatant in inside {
                self.events.push(CombatEvent::AreaLeft {
                    zone: zone.id,
                    combatant,
                });
            }
            debug!(target: "tactics::area", zone = %zone.id, "zone expired");
        }
    }

    /// Fires `target`'s status ticks for `timing`.
    pub(crate) fn resolve_ticks(&mut self, target: CombatantId, timing: TickTiming) {
        for tick in self.statuses.pending_ticks(target, timing) {
            if self
                .state
                .combatant(target)
                .is_none_or(|c| c.life_state.is_dead())
            {
                return;
            }
            let stacks = u32::from(tick.stacks.max(1));
            let result = match tick.effect {
                TickEffect::Damage { dice, damage_type } => {
                    let rolled = dice.roll(self.rules.stream_mut()).total.max(0) as u32;
                    let amount = self.deal_damage(
                        tick.source,
                        target,
                        rolled.saturating_mul(stacks),
                        damage_type,
                        false,
                        false,
                    );
                    TickResult::Damage {
                        amount,
                        damage_type,
                    }
                }
                TickEffect::Heal { dice } => {
                    let rolled = dice.roll(self.rules.stream_mut()).total.max(0) as u32;
                    TickResult::Heal {
                        amount: self.heal(target, rolled.saturating_mul(stacks)),
                    }
                }
            };
            debug!(target: "tactics::status", %target, status = %tick.status, ?result, "status ticked");
            self.events.push(CombatEvent::StatusTicked {
                target,
                status: tick.status,
                result,
            });
        }
    }
}
