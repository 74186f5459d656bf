//! Clipping guard: never truncate a tick that is about to land.

use crate::config::SyncConfig;
use crate::env::EffectSnapshot;
use crate::time::{SimDuration, SimTime};

/// Instant a refresh of `effect` should be issued when it is wanted at `now`.
///
/// If the effect's next natural tick lands after `now` but within `grace`
/// (or within the configured minimum buffer), the refresh is pushed to just
/// after that tick. Otherwise it is issued at `now`.
pub fn guarded_issue_at(
    effect: &EffectSnapshot,
    grace: SimDuration,
    now: SimTime,
    config: &SyncConfig,
) -> SimTime {
    let Some(tick) = effect.next_tick_at else {
        return now;
    };
    let window = grace.max(config.min_clip_buffer());
    if tick > now && tick < now + window {
        tick + config.tick_settle()
    } else {
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EffectId;

    fn ticking(next_tick_ms: i64, expires_ms: i64) -> EffectSnapshot {
        EffectSnapshot {
            effect: EffectId::FrostFever,
            active: true,
            expires_at: SimTime::from_millis(expires_ms),
            next_tick_at: Some(SimTime::from_millis(next_tick_ms)),
        }
    }

    #[test]
    fn defers_past_final_tick_inside_min_buffer() {
        let config = SyncConfig::default();
        let at = guarded_issue_at(
            &ticking(1_000, 1_000),
            SimDuration::ZERO,
            SimTime::from_millis(900),
            &config,
        );
        assert_eq!(at, SimTime::from_millis(1_050));
        assert!(at > SimTime::from_millis(1_000));
    }

    #[test]
    fn grace_window_extends_the_buffer() {
        let config = SyncConfig::default();
        let effect = ticking(2_200, 9_000);
        let now = SimTime::from_millis(1_000);

        assert_eq!(
            guarded_issue_at(&effect, SimDuration::ZERO, now, &config),
            now
        );
        assert_eq!(
            guarded_issue_at(&effect, SimDuration::from_millis(2_000), now, &config),
            SimTime::from_millis(2_250)
        );
    }

    #[test]
    fn tick_at_or_before_now_is_ignored() {
        let config = SyncConfig::default();
        let now = SimTime::from_millis(3_000);
        assert_eq!(
            guarded_issue_at(&ticking(3_000, 6_000), SimDuration::from_secs(2), now, &config),
            now
        );
    }

    #[test]
    fn effect_without_ticks_is_never_deferred() {
        let config = SyncConfig::default();
        let effect = EffectSnapshot {
            next_tick_at: None,
            ..ticking(0, 500)
        };
        let now = SimTime::from_millis(100);
        assert_eq!(
            guarded_issue_at(&effect, SimDuration::from_secs(1), now, &config),
            now
        );
    }
}
