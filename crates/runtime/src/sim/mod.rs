//! Reference collaborators for the planning core.
//!
//! - [`pools`] regenerating energy, threshold points and recharging runes
//! - [`effects`] timed effects with tick schedules and coverage tracking
//! - [`actions`] per-action costs, point yields and effect durations
//! - [`agent`] the [`SimAgent`] tying them together behind the core's views
pub mod actions;
pub mod agent;
pub mod effects;
pub mod pools;

pub use actions::{ActionRules, PeriodicTiming, effect_timing, rules_for};
pub use agent::{AgentSetup, EnergySetup, RuneSetup, SimAgent};
pub use effects::{EffectBook, TimedEffect};
pub use pools::{ComboPool, EnergyPool, MAX_RUNE_GRACE, RuneBank, RuneCost, RuneState};
