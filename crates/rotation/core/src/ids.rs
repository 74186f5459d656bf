//! Identifiers shared between the core and its collaborators.
//!
//! The core refers to pools, effects and actions only by these ids; the
//! collaborators that own the actual state resolve them.

use core::fmt;

/// Resource pools the agent draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PoolId {
    /// Continuously regenerating pool.
    Energy,
    /// Discrete threshold resource built by the builder and consumed by finishers.
    ComboPoints,
    BloodRunes,
    FrostRunes,
    UnholyRunes,
    /// Units that changed kind when spent; usable in place of any rune.
    DeathRunes,
}

impl PoolId {
    /// Returns true for pools made of independently recharging units.
    pub const fn is_charge(self) -> bool {
        matches!(
            self,
            Self::BloodRunes | Self::FrostRunes | Self::UnholyRunes | Self::DeathRunes
        )
    }
}

/// Timed effects the planner watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EffectId {
    // ========================================================================
    // Self buffs
    // ========================================================================
    SliceAndDice,
    HungerForBlood,
    Envenom,

    // ========================================================================
    // Target debuffs
    // ========================================================================
    ExposeArmor,
    Rupture,
    FrostFever,
    BloodPlague,
}

impl EffectId {
    /// Action that applies or refreshes this effect.
    pub const fn applied_by(self) -> ActionId {
        match self {
            Self::SliceAndDice => ActionId::SliceAndDice,
            Self::HungerForBlood => ActionId::HungerForBlood,
            Self::Envenom => ActionId::Envenom,
            Self::ExposeArmor => ActionId::ExposeArmor,
            Self::Rupture => ActionId::Rupture,
            Self::FrostFever => ActionId::IcyTouch,
            Self::BloodPlague => ActionId::PlagueStrike,
        }
    }
}

/// Actions the core may ask the executor to attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionId {
    // ========================================================================
    // Threshold builders
    // ========================================================================
    SinisterStrike,
    Mutilate,

    // ========================================================================
    // Objectives
    // ========================================================================
    SliceAndDice,
    ExposeArmor,
    HungerForBlood,
    /// Releases the agent's major cooldowns; no resource cost, never misses.
    EnableCooldowns,
    Rupture,
    Eviscerate,
    Envenom,
    FanOfKnives,

    // ========================================================================
    // Periodic pair
    // ========================================================================
    IcyTouch,
    PlagueStrike,
    /// Refreshes or spreads both periodic effects in one action.
    Pestilence,
    ScourgeStrike,
    BloodStrike,
}

impl ActionId {
    /// Actions that spend every threshold point and need at least one.
    pub const fn is_finisher(self) -> bool {
        matches!(
            self,
            Self::SliceAndDice | Self::ExposeArmor | Self::Rupture | Self::Eviscerate | Self::Envenom
        )
    }

    /// Effect applied or refreshed when this action lands, if any.
    pub const fn applies(self) -> Option<EffectId> {
        match self {
            Self::SliceAndDice => Some(EffectId::SliceAndDice),
            Self::ExposeArmor => Some(EffectId::ExposeArmor),
            Self::HungerForBlood => Some(EffectId::HungerForBlood),
            Self::Rupture => Some(EffectId::Rupture),
            Self::Envenom => Some(EffectId::Envenom),
            Self::IcyTouch => Some(EffectId::FrostFever),
            Self::PlagueStrike => Some(EffectId::BloodPlague),
            _ => None,
        }
    }
}

/// Target an action or effect is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u32);

impl TargetId {
    /// The agent's current (first) target.
    pub const PRIMARY: Self = Self(0);
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}
