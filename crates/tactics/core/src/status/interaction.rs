use crate::state::StatusId;

/// How applying one status relates to another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InteractionRule {
    /// Applying the trigger status removes this one (wet puts out burning).
    Removes(StatusId),
    /// The trigger status is rejected while this one is present.
    PreventedBy(StatusId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInteraction {
    pub trigger: StatusId,
    pub rule: InteractionRule,
}

impl StatusInteraction {
    pub fn removes(trigger: impl Into<StatusId>, other: impl Into<StatusId>) -> Self {
        Self {
            trigger: trigger.into(),
            rule: InteractionRule::Removes(other.into()),
        }
    }

    pub fn prevented_by(trigger: impl Into<StatusId>, other: impl Into<StatusId>) -> Self {
        Self {
            trigger: trigger.into(),
            rule: InteractionRule::PreventedBy(other.into()),
        }
    }

    /// The status on the other side of the rule.
    pub fn other(&self) -> &StatusId {
        match &self.rule {
            InteractionRule::Removes(other) | InteractionRule::PreventedBy(other) => other,
        }
    }
}

/// Table of declarative interaction pairs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InteractionTable {
    rules: Vec<StatusInteraction>,
}

impl InteractionTable {
    pub fn add(&mut self, interaction: StatusInteraction) {
        if !self.rules.contains(&interaction) {
            self.rules.push(interaction);
        }
    }

    pub fn rules(&self) -> &[StatusInteraction] {
        &self.rules
    }

    /// First present status that blocks `applied`, if any.
    pub fn blocker<'a>(
        &'a self,
        applied: &StatusId,
        mut is_present: impl FnMut(&StatusId) -> bool,
    ) -> Option<&'a StatusId> {
        self.rules.iter().find_map(|interaction| match &interaction.rule {
            InteractionRule::PreventedBy(other)
                if &interaction.trigger == applied && is_present(other) =>
            {
                Some(other)
            }
            _ => None,
        })
    }

    /// Statuses removed when `applied` lands.
    pub fn removals<'a>(&'a self, applied: &'a StatusId) -> impl Iterator<Item = &'a StatusId> + 'a {
        self.rules
            .iter()
            .filter(move |interaction| &interaction.trigger == applied)
            .filter_map(|interaction| match &interaction.rule {
                InteractionRule::Removes(other) => Some(other),
                InteractionRule::PreventedBy(_) => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_match_trigger_only() {
        let mut table = InteractionTable::default();
        table.add(StatusInteraction::removes("wet", "burning"));
        table.add(StatusInteraction::prevented_by("burning", "wet"));
        table.add(StatusInteraction::removes("wet", "burning"));
        assert_eq!(table.rules().len(), 2);

        let wet = StatusId::new("wet");
        let burning = StatusId::new("burning");
        let removed: Vec<_> = table.removals(&wet).collect();
        assert_eq!(removed, vec![&burning]);
        assert_eq!(table.removals(&burning).count(), 0);

        assert_eq!(table.blocker(&burning, |s| s == &wet), Some(&wet));
        assert_eq!(table.blocker(&burning, |_| false), None);
        assert_eq!(table.blocker(&wet, |_| true), None);
    }
}
