//! Timed effect queries.
//!
//! Effects store an absolute expiration so several decision points can pass
//! between queries; an effect is active while `now < expires_at`.

use crate::ids::{EffectId, TargetId};
use crate::time::{SimDuration, SimTime};

/// Read-only queries against timed effects attached to the agent or a target.
pub trait EffectView {
    /// Whether `effect` is currently active on `target`.
    fn is_active(&self, effect: EffectId, target: TargetId, now: SimTime) -> bool;

    /// Time left before `effect` lapses; zero when inactive.
    fn remaining_duration(&self, effect: EffectId, target: TargetId, now: SimTime)
    -> SimDuration;

    /// Instant of the next natural tick, or `None` when the effect does not
    /// tick or has no ticks left.
    fn next_tick_at(&self, effect: EffectId, target: TargetId, now: SimTime) -> Option<SimTime>;

    /// Absolute expiration (`now + remaining_duration`).
    fn expires_at(&self, effect: EffectId, target: TargetId, now: SimTime) -> SimTime {
        now + self.remaining_duration(effect, target, now)
    }
}

/// Capture of one effect at a decision point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSnapshot {
    pub effect: EffectId,
    pub active: bool,
    pub expires_at: SimTime,
    pub next_tick_at: Option<SimTime>,
}

impl EffectSnapshot {
    pub fn capture<V: EffectView + ?Sized>(
        view: &V,
        effect: EffectId,
        target: TargetId,
        now: SimTime,
    ) -> Self {
        let active = view.is_active(effect, target, now);
        Self {
            effect,
            active,
            // A lapsed effect is due immediately.
            expires_at: if active {
                view.expires_at(effect, target, now)
            } else {
                now
            },
            next_tick_at: if active {
                view.next_tick_at(effect, target, now)
            } else {
                None
            },
        }
    }

    /// Time left at `now`, clamped at zero.
    pub fn remaining(&self, now: SimTime) -> SimDuration {
        if !self.active {
            return SimDuration::ZERO;
        }
        self.expires_at.saturating_since(now)
    }
}
