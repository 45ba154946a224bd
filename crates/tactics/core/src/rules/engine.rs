use std::collections::BTreeMap;

use tracing::trace;

use crate::state::CombatantId;

use super::modifier::{AdvantageState, Modifier, ModifierFold, ModifierOwner, RollCategory, RollContext};
use super::query::{
    AttackQuery, AttackRoll, D20Roll, DamageQuery, DamageRoll, HitChanceQuery, SaveQuery, SaveRoll,
};
use super::rng::RollStream;

/// Per-combatant modifier store plus the seeded roll stream.
///
/// Every random outcome in a combat is drawn here, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesEngine {
    modifiers: BTreeMap<CombatantId, Vec<Modifier>>,
    stream: RollStream,
    critical_threshold: u32,
}

impl RulesEngine {
    pub fn new(seed: u64, critical_threshold: u32) -> Self {
        Self {
            modifiers: BTreeMap::new(),
            stream: RollStream::new(seed),
            critical_threshold,
        }
    }

    pub fn stream(&self) -> &RollStream {
        &self.stream
    }

    pub(crate) fn stream_mut(&mut self) -> &mut RollStream {
        &mut self.stream
    }

    // ========================================================================
    // Modifier store
    // ========================================================================

    pub fn add_modifier(&mut self, combatant: CombatantId, modifier: Modifier) {
        self.modifiers.entry(combatant).or_default().push(modifier);
    }

    /// Removes every modifier on `combatant` installed by `owner`.
    pub fn remove_by_owner(&mut self, combatant: CombatantId, owner: &ModifierOwner) -> usize {
        let Some(list) = self.modifiers.get_mut(&combatant) else {
            return 0;
        };
        let before = list.len();
        list.retain(|m| &m.owner != owner);
        before - list.len()
    }

    pub fn modifiers(&self, combatant: CombatantId) -> &[Modifier] {
        self.modifiers
            .get(&combatant)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Folds the modifiers of each `(owner, category)` pair that accept `ctx`.
    pub fn fold(&self, sources: &[(CombatantId, RollCategory)], ctx: &RollContext) -> ModifierFold {
        sources
            .iter()
            .flat_map(|&(owner, category)| {
                self.modifiers(owner)
                    .iter()
                    .filter(move |m| m.applies(category, ctx))
                    .map(|m| m.kind)
            })
            .collect()
    }

    /// Applies the `category` modifiers of `owners` to `base`.
    pub fn apply(
        &self,
        base: i32,
        category: RollCategory,
        owners: &[CombatantId],
        ctx: &RollContext,
    ) -> i32 {
        let sources: Vec<(CombatantId, RollCategory)> =
            owners.iter().map(|&owner| (owner, category)).collect();
        self.fold(&sources, ctx).apply(base)
    }

    // ========================================================================
    // Roll queries
    // ========================================================================

    fn roll_d20(&mut self, fold: &ModifierFold, bonus: i32) -> D20Roll {
        let first = self.stream.d20();
        let advantage = fold.advantage();
        let (natural, discarded) = match advantage {
            AdvantageState::Neither => (first, None),
            AdvantageState::Advantage => {
                let second = self.stream.d20();
                (first.max(second), Some(first.min(second)))
            }
            AdvantageState::Disadvantage => {
                let second = self.stream.d20();
                (first.min(second), Some(first.max(second)))
            }
        };
        let total = fold.apply(natural as i32 + bonus);
        D20Roll {
            natural,
            discarded,
            advantage,
            modifier: total - natural as i32,
            total,
        }
    }

    pub fn attack(&mut self, query: &AttackQuery) -> AttackRoll {
        let fold = self.fold(
            &[
                (query.attacker, RollCategory::AttackRoll),
                (query.target, RollCategory::AttackRollAgainst),
            ],
            &query.context,
        );
        let defense = self.apply(
            query.defense,
            RollCategory::ArmorClass,
            &[query.target],
            &query.context,
        );
        let d20 = self.roll_d20(&fold, query.attack_bonus);
        let outcome = AttackRoll::classify(&d20, defense, self.critical_threshold);
        trace!(
            target: "tactics::rules",
            attacker = %query.attacker,
            target_id = %query.target,
            natural = d20.natural,
            total = d20.total,
            defense,
            %outcome,
            "attack roll"
        );
        AttackRoll {
            d20,
            defense,
            outcome,
        }
    }

    pub fn damage(&mut self, query: &DamageQuery) -> DamageRoll {
        let ctx = query.context.clone().with_damage_type(query.damage_type);
        let fold = self.fold(&[(query.source, RollCategory::DamageRoll)], &ctx);
        let dice = if query.critical {
            query.dice.doubled()
        } else {
            query.dice
        };
        let rolled = dice.roll(&mut self.stream);
        let total = fold.apply(rolled.total).max(0) as u32;
        DamageRoll {
            dice: rolled.dice,
            damage_type: query.damage_type,
            critical: query.critical,
            total,
        }
    }

    pub fn save(&mut self, query: &SaveQuery) -> SaveRoll {
        let fold = self.fold(&[(query.target, RollCategory::SavingThrow)], &query.context);
        let d20 = self.roll_d20(&fold, query.save_bonus);
        SaveRoll {
            ability: query.ability,
            d20,
            dc: query.dc,
            success: d20.total >= query.dc,
        }
    }

    /// Damage remaining after the target's `DamageTaken` modifiers.
    pub fn mitigate(&self, amount: u32, target: CombatantId, ctx: &RollContext) -> u32 {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.apply(amount, RollCategory::DamageTaken, &[target], ctx)
            .max(0) as u32
    }

    pub fn initiative(&mut self, combatant: CombatantId, dex_modifier: i32, ctx: &RollContext) -> D20Roll {
        let fold = self.fold(&[(combatant, RollCategory::Initiative)], ctx);
        self.roll_d20(&fold, dex_modifier)
    }

    /// Probability that the described attack hits. Consumes no draws.
    pub fn hit_chance(&self, query: &HitChanceQuery) -> f32 {
        let fold = self.fold(
            &[
                (query.attacker, RollCategory::AttackRoll),
                (query.target, RollCategory::AttackRollAgainst),
            ],
            &query.context,
        );
        let defense = self.apply(
            query.defense,
            RollCategory::ArmorClass,
            &[query.target],
            &query.context,
        );
        let hits = (1..=20u32)
            .filter(|&natural| {
                let d20 = D20Roll {
                    natural,
                    discarded: None,
                    advantage: AdvantageState::Neither,
                    modifier: 0,
                    total: fold.apply(natural as i32 + query.attack_bonus),
                };
                AttackRoll::classify(&d20, defense, self.critical_threshold).is_hit()
            })
            .count();
        let single = hits as f32 / 20.0;
        match fold.advantage() {
            AdvantageState::Neither => single,
            AdvantageState::Advantage => 1.0 - (1.0 - single) * (1.0 - single),
            AdvantageState::Disadvantage => single * single,
        }
    }
}
