//! Rotation configuration constants and tunable parameters.
//!
//! [`RotationConfig`] is supplied once, at catalogue construction time, and is
//! never mutated during a trial. Durations are stored as milliseconds so the
//! struct reads naturally from TOML and RON; accessors return
//! [`SimDuration`].

use crate::ids::EffectId;
use crate::time::SimDuration;

/// Complete configuration for one agent's rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RotationConfig {
    pub timing: TimingConfig,
    pub catalogue: CatalogueConfig,
    pub sync: SyncConfig,
}

impl RotationConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of objectives in a catalogue.
    pub const MAX_OBJECTIVES: usize = 8;
    /// Maximum number of scheduled instances (every objective plus one injection).
    pub const MAX_SCHEDULED: usize = Self::MAX_OBJECTIVES + 1;
    /// Cap of the threshold resource.
    pub const MAX_POINTS: u32 = 5;

    pub fn new() -> Self {
        Self::default()
    }
}

/// Timing windows used by the planner and evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Fixed short window used by the skip rule: another scheduled objective
    /// expiring within it pre-empts the head.
    pub decision_tick_ms: i64,
    /// Window before expiry in which an objective already at its threshold
    /// ceiling is cast.
    pub clipping_window_ms: i64,
    /// Window before expiry in which an objective inside its threshold band is
    /// cast instead of built further.
    pub near_expiry_ms: i64,
    /// Global cooldown between actions; one build step costs at least this.
    pub global_cooldown_ms: i64,
    /// Instant after which major cooldowns are released unconditionally.
    pub cooldown_release_ms: i64,
}

impl TimingConfig {
    pub const DEFAULT_DECISION_TICK_MS: i64 = 1_000;
    pub const DEFAULT_CLIPPING_WINDOW_MS: i64 = 2_000;
    pub const DEFAULT_NEAR_EXPIRY_MS: i64 = 1_000;
    pub const DEFAULT_GLOBAL_COOLDOWN_MS: i64 = 1_000;
    pub const DEFAULT_COOLDOWN_RELEASE_MS: i64 = 10_000;

    pub const fn decision_tick(&self) -> SimDuration {
        SimDuration::from_millis(self.decision_tick_ms)
    }

    pub const fn clipping_window(&self) -> SimDuration {
        SimDuration::from_millis(self.clipping_window_ms)
    }

    pub const fn near_expiry(&self) -> SimDuration {
        SimDuration::from_millis(self.near_expiry_ms)
    }

    pub const fn global_cooldown(&self) -> SimDuration {
        SimDuration::from_millis(self.global_cooldown_ms)
    }

    pub const fn cooldown_release(&self) -> SimDuration {
        SimDuration::from_millis(self.cooldown_release_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            decision_tick_ms: Self::DEFAULT_DECISION_TICK_MS,
            clipping_window_ms: Self::DEFAULT_CLIPPING_WINDOW_MS,
            near_expiry_ms: Self::DEFAULT_NEAR_EXPIRY_MS,
            global_cooldown_ms: Self::DEFAULT_GLOBAL_COOLDOWN_MS,
            cooldown_release_ms: Self::DEFAULT_COOLDOWN_RELEASE_MS,
        }
    }
}

/// How often an optional objective is maintained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Frequency {
    Never,
    Once,
    #[default]
    Maintain,
}

/// Finisher order when poison-finisher talents are present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PoisonFinisherPriority {
    #[default]
    EnvenomRupture,
    RuptureEnvenom,
}

/// Finisher order without poison-finisher talents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum DirectFinisherPriority {
    #[default]
    RuptureEviscerate,
    EviscerateRupture,
}

/// Priority-ordering choices consumed by the catalogue builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CatalogueConfig {
    /// Target count above which multi-target rules apply.
    pub multi_target_above: u32,
    pub multi_target_buff_frequency: Frequency,
    pub min_points_multi_target_buff: u32,
    pub armor_debuff_frequency: Frequency,
    pub min_points_armor_debuff: u32,
    pub poison_finisher_priority: PoisonFinisherPriority,
    pub direct_finisher_priority: DirectFinisherPriority,
    pub min_points_primary_finisher: u32,
    /// Zero disables the secondary finisher.
    pub min_points_secondary_finisher: u32,
}

impl CatalogueConfig {
    pub const DEFAULT_MULTI_TARGET_ABOVE: u32 = 3;
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            multi_target_above: Self::DEFAULT_MULTI_TARGET_ABOVE,
            multi_target_buff_frequency: Frequency::Maintain,
            min_points_multi_target_buff: 1,
            armor_debuff_frequency: Frequency::Never,
            min_points_armor_debuff: 5,
            poison_finisher_priority: PoisonFinisherPriority::default(),
            direct_finisher_priority: DirectFinisherPriority::default(),
            min_points_primary_finisher: 4,
            min_points_secondary_finisher: 5,
        }
    }
}

/// Which of the two periodic effects leads the pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PairLead {
    #[default]
    FrostFever,
    BloodPlague,
}

impl PairLead {
    /// Effects in (primary, secondary) order.
    pub const fn effects(self) -> (EffectId, EffectId) {
        match self {
            Self::FrostFever => (EffectId::FrostFever, EffectId::BloodPlague),
            Self::BloodPlague => (EffectId::BloodPlague, EffectId::FrostFever),
        }
    }
}

/// Periodic-pair controller settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    pub lead: PairLead,
    /// A tick landing within this buffer after the intended refresh defers it,
    /// regardless of the pool's grace window.
    pub min_clip_buffer_ms: i64,
    /// Delay after a natural tick before a deferred refresh is issued.
    pub tick_settle_ms: i64,
    /// Use the combined refresh action once the pair is in sync.
    pub combined_refresh: bool,
}

impl SyncConfig {
    pub const DEFAULT_MIN_CLIP_BUFFER_MS: i64 = 400;
    pub const DEFAULT_TICK_SETTLE_MS: i64 = 50;

    pub const fn min_clip_buffer(&self) -> SimDuration {
        SimDuration::from_millis(self.min_clip_buffer_ms)
    }

    pub const fn tick_settle(&self) -> SimDuration {
        SimDuration::from_millis(self.tick_settle_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lead: PairLead::default(),
            min_clip_buffer_ms: Self::DEFAULT_MIN_CLIP_BUFFER_MS,
            tick_settle_ms: Self::DEFAULT_TICK_SETTLE_MS,
            combined_refresh: false,
        }
    }
}
