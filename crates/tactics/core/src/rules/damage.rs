/// Damage types. Resistances and vulnerabilities are expressed as
/// `DamageTaken` modifiers conditioned on one of these.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Psychic,
    Force,
}

impl DamageType {
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::Slashing | Self::Piercing | Self::Bludgeoning)
    }
}
