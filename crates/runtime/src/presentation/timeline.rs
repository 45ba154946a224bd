//! Engine-agnostic description of how an action should be shown.

use std::time::Duration;

use tactics_core::{ActionId, ActionResult, ActionToken, AttackType, CombatantId, MoveOutcome, Position};

/// Broad animation family a presentation layer maps to its own assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationShape {
    Swing,
    Shot,
    Touch,
    Bolt,
    /// Spell with no attack roll: area or save effects.
    Cast,
    /// Non-spell without an attack roll: stances, shoves.
    Gesture,
    Walk,
}

impl AnimationShape {
    pub fn for_action(attack_type: AttackType, spell: bool) -> Self {
        match attack_type {
            AttackType::MeleeWeapon => Self::Swing,
            AttackType::RangedWeapon => Self::Shot,
            AttackType::MeleeSpell => Self::Touch,
            AttackType::RangedSpell => Self::Bolt,
            AttackType::None if spell => Self::Cast,
            AttackType::None => Self::Gesture,
        }
    }

    /// Offset of the hit marker and the total length.
    fn timing(self) -> (Duration, Duration) {
        let ms = Duration::from_millis;
        match self {
            Self::Swing => (ms(250), ms(450)),
            Self::Shot => (ms(400), ms(600)),
            Self::Touch => (ms(300), ms(500)),
            Self::Bolt => (ms(450), ms(700)),
            Self::Cast => (ms(600), ms(900)),
            Self::Gesture => (ms(200), ms(350)),
            Self::Walk => (Duration::ZERO, Duration::ZERO),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerKind {
    Start,
    Hit,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub kind: MarkerKind,
    pub at: Duration,
}

/// What a presenter is asked to play for one token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    pub token: ActionToken,
    pub actor: CombatantId,
    pub action: Option<ActionId>,
    pub shape: AnimationShape,
    pub targets: Vec<CombatantId>,
    pub path: Vec<Position>,
    pub markers: Vec<Marker>,
}

impl Timeline {
    pub const STEP_DURATION: Duration = Duration::from_millis(150);

    /// Timeline for a resolved action. A cancelled action has no hit marker.
    pub fn for_action(result: &ActionResult, spell: bool) -> Self {
        let shape = AnimationShape::for_action(result.attack_type, spell);
        let (hit, end) = shape.timing();
        let approach = Self::STEP_DURATION * result.approach.len() as u32;
        let mut markers = vec![Marker {
            kind: MarkerKind::Start,
            at: Duration::ZERO,
        }];
        let end = if result.cancelled_by.is_some() {
            approach
        } else {
            markers.push(Marker {
                kind: MarkerKind::Hit,
                at: approach + hit,
            });
            approach + end
        };
        markers.push(Marker {
            kind: MarkerKind::End,
            at: end,
        });

        let mut targets: Vec<CombatantId> = Vec::new();
        for outcome in &result.outcomes {
            if !targets.contains(&outcome.target) {
                targets.push(outcome.target);
            }
        }
        Self {
            token: result.token,
            actor: result.actor,
            action: Some(result.action.clone()),
            shape,
            targets,
            path: result.approach.clone(),
            markers,
        }
    }

    pub fn for_movement(outcome: &MoveOutcome) -> Self {
        let end = Self::STEP_DURATION * outcome.waypoints.len() as u32;
        Self {
            token: outcome.token,
            actor: outcome.mover,
            action: None,
            shape: AnimationShape::Walk,
            targets: Vec::new(),
            path: outcome.waypoints.clone(),
            markers: vec![
                Marker {
                    kind: MarkerKind::Start,
                    at: Duration::ZERO,
                },
                Marker {
                    kind: MarkerKind::End,
                    at: end,
                },
            ],
        }
    }

    pub fn duration(&self) -> Duration {
        self.markers.iter().map(|m| m.at).max().unwrap_or_default()
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<Duration> {
        self.markers.iter().find(|m| m.kind == kind).map(|m| m.at)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tactics_core::ReactionId;
    use tactics_core::engine::ActionCorrelator;

    use super::*;

    fn token() -> ActionToken {
        ActionCorrelator::default().begin(Instant::now(), Duration::from_secs(1))
    }

    fn result(attack_type: AttackType) -> ActionResult {
        ActionResult::new(token(), CombatantId(1), ActionId::new("strike"), attack_type)
    }

    #[test]
    fn shape_follows_attack_type() {
        assert_eq!(AnimationShape::for_action(AttackType::MeleeWeapon, false), AnimationShape::Swing);
        assert_eq!(AnimationShape::for_action(AttackType::RangedSpell, true), AnimationShape::Bolt);
        assert_eq!(AnimationShape::for_action(AttackType::None, true), AnimationShape::Cast);
        assert_eq!(AnimationShape::for_action(AttackType::None, false), AnimationShape::Gesture);
    }

    #[test]
    fn markers_are_ordered_start_hit_end() {
        let timeline = Timeline::for_action(&result(AttackType::MeleeWeapon), false);
        let kinds: Vec<_> = timeline.markers.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::Start, MarkerKind::Hit, MarkerKind::End]);
        assert!(timeline.marker(MarkerKind::Hit) < timeline.marker(MarkerKind::End));
        assert_eq!(timeline.token, token());
    }

    #[test]
    fn cancelled_action_has_no_hit() {
        let mut cancelled = result(AttackType::RangedSpell);
        cancelled.cancelled_by = Some((CombatantId(2), ReactionId::new("counterspell")));
        let timeline = Timeline::for_action(&cancelled, true);
        assert_eq!(timeline.marker(MarkerKind::Hit), None);
        assert_eq!(timeline.duration(), Duration::ZERO);
    }
}
