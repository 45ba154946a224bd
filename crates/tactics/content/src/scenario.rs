//! Ready-made encounters.

use tactics_core::{Battlefield, CombatantId, Position, Scenario};

use crate::reactions::{COUNTERSPELL, HELLISH_REBUKE, OPPORTUNITY_ATTACK, SHIELD, UNCANNY_DODGE};
use crate::{actions, reactions, roster, statuses};

pub const SKIRMISH_WIDTH: i32 = 12;
pub const SKIRMISH_HEIGHT: i32 = 10;

/// A ruined courtyard: a broken wall down the middle and rubble on the flanks.
pub fn skirmish_battlefield() -> Battlefield {
    let wall = (2..=4).chain(6..=7).map(|y| Position::new(6, y));
    let rubble = [(3, 2), (3, 3), (4, 7), (8, 1), (9, 6), (9, 7)]
        .into_iter()
        .map(|(x, y)| Position::new(x, y));
    Battlefield::new(SKIRMISH_WIDTH, SKIRMISH_HEIGHT)
        .with_blocked(wall)
        .with_difficult(rubble)
}

/// Three adventurers against an orc warband across the courtyard.
pub fn skirmish_scenario(seed: u64) -> Scenario {
    let mut scenario = Scenario::new(seed, skirmish_battlefield());
    scenario.actions = actions::all();
    scenario.statuses = statuses::all();
    scenario.interactions = statuses::interactions();
    scenario.reactions = reactions::all();

    let (fighter, wizard, cleric) = (CombatantId(1), CombatantId(2), CombatantId(3));
    let (archer_a, archer_b, brute, cultist) =
        (CombatantId(4), CombatantId(5), CombatantId(6), CombatantId(7));
    scenario.roster = vec![
        roster::fighter(fighter, Position::new(2, 5)),
        roster::wizard(wizard, Position::new(0, 4)),
        roster::cleric(cleric, Position::new(1, 6)),
        roster::goblin_archer(archer_a, Position::new(10, 2)),
        roster::goblin_archer(archer_b, Position::new(10, 8)),
        roster::orc_brute(brute, Position::new(8, 5)),
        roster::cultist(cultist, Position::new(11, 5)),
    ];

    for melee in [fighter, cleric, brute] {
        scenario.grant(melee, OPPORTUNITY_ATTACK);
    }
    scenario.grant(fighter, UNCANNY_DODGE);
    scenario.grant(wizard, SHIELD);
    scenario.grant(wizard, COUNTERSPELL);
    scenario.grant(cultist, HELLISH_REBUKE);
    scenario
}
