//! Timed effects and their coverage bookkeeping.

use std::collections::BTreeMap;

use rotation_core::{EffectId, SimDuration, SimTime, TargetId};

use crate::report::EffectCoverage;

/// One application of an effect.
///
/// Ticks land every `tick_interval` after `applied_at`, up to and including
/// `expires_at`; the effect is active while `now < expires_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedEffect {
    pub applied_at: SimTime,
    pub expires_at: SimTime,
    pub tick_interval: Option<SimDuration>,
}

impl TimedEffect {
    pub fn new(now: SimTime, duration: SimDuration, tick_interval: Option<SimDuration>) -> Self {
        Self {
            applied_at: now,
            expires_at: now + duration,
            tick_interval: tick_interval.filter(|interval| interval.as_millis() > 0),
        }
    }

    pub fn is_active(&self, now: SimTime) -> bool {
        now < self.expires_at
    }

    pub fn remaining(&self, now: SimTime) -> SimDuration {
        if self.is_active(now) {
            self.expires_at.saturating_since(now)
        } else {
            SimDuration::ZERO
        }
    }

    /// Total ticks this application delivers.
    pub fn ticks_total(&self) -> u32 {
        self.tick_interval.map_or(0, |interval| {
            (self.expires_at.saturating_since(self.applied_at).as_millis() / interval.as_millis())
                as u32
        })
    }

    /// Ticks landed strictly before or at `now`.
    pub fn ticks_elapsed(&self, now: SimTime) -> u32 {
        self.tick_interval.map_or(0, |interval| {
            let elapsed = now.min(self.expires_at).saturating_since(self.applied_at);
            (elapsed.as_millis() / interval.as_millis()) as u32
        })
    }

    pub fn next_tick_at(&self, now: SimTime) -> Option<SimTime> {
        let interval = self.tick_interval?;
        if !self.is_active(now) || self.ticks_elapsed(now) >= self.ticks_total() {
            return None;
        }
        Some(self.applied_at + interval * i64::from(self.ticks_elapsed(now) + 1))
    }

    /// Time since the last landed tick (or the application), which a refresh
    /// at `now` discards.
    pub fn tick_progress(&self, now: SimTime) -> SimDuration {
        let Some(interval) = self.tick_interval else {
            return SimDuration::ZERO;
        };
        if !self.is_active(now) {
            return SimDuration::ZERO;
        }
        let last = self.applied_at + interval * i64::from(self.ticks_elapsed(now));
        now.saturating_since(last)
    }
}

/// Running coverage of one watched effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Coverage {
    /// Start and current end of the contiguous window being tracked.
    window: Option<(SimTime, SimTime)>,
    covered: SimDuration,
    longest_gap: SimDuration,
    applications: u32,
    lost_progress: SimDuration,
}

impl Coverage {
    fn apply(&mut self, now: SimTime, effect: &TimedEffect) {
        self.applications += 1;
        self.window = Some(match self.window {
            Some((start, end)) if now <= end => (start, effect.expires_at),
            Some((start, end)) => {
                self.covered = self.covered + (end - start);
                self.longest_gap = self.longest_gap.max(now - end);
                (now, effect.expires_at)
            }
            None => (now, effect.expires_at),
        });
    }

    fn finish(&self, end: SimTime, duration: SimDuration) -> EffectCoverage {
        let mut covered = self.covered;
        let mut longest_gap = self.longest_gap;
        if let Some((start, until)) = self.window {
            covered = covered + (until.min(end) - start.min(end)).max(SimDuration::ZERO);
            longest_gap = longest_gap.max(end.saturating_since(until));
        }
        let uptime = if duration.as_millis() > 0 {
            (covered.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
        } else {
            0.0
        };
        EffectCoverage {
            uptime,
            longest_gap_ms: longest_gap.as_millis(),
            applications: self.applications,
            lost_tick_progress_ms: self.lost_progress.as_millis(),
        }
    }
}

/// Every effect currently applied, keyed by effect and target.
///
/// Coverage is tracked for the watched effects on the primary target only.
#[derive(Clone, Debug, Default)]
pub struct EffectBook {
    effects: BTreeMap<(EffectId, TargetId), TimedEffect>,
    coverage: BTreeMap<EffectId, Coverage>,
}

impl EffectBook {
    pub fn watching(effects: impl IntoIterator<Item = EffectId>) -> Self {
        Self {
            effects: BTreeMap::new(),
            coverage: effects
                .into_iter()
                .map(|effect| (effect, Coverage::default()))
                .collect(),
        }
    }

    pub fn get(&self, effect: EffectId, target: TargetId) -> Option<&TimedEffect> {
        self.effects.get(&(effect, target))
    }

    pub fn active(&self, effect: EffectId, target: TargetId, now: SimTime) -> Option<&TimedEffect> {
        self.get(effect, target).filter(|e| e.is_active(now))
    }

    /// Applies or refreshes `effect` on `target`, replacing any running
    /// application.
    pub fn apply(
        &mut self,
        effect: EffectId,
        target: TargetId,
        now: SimTime,
        duration: SimDuration,
        tick_interval: Option<SimDuration>,
    ) {
        let fresh = TimedEffect::new(now, duration, tick_interval);
        let previous = self.effects.insert((effect, target), fresh);

        if target != TargetId::PRIMARY {
            return;
        }
        if let Some(coverage) = self.coverage.get_mut(&effect) {
            if let Some(previous) = previous {
                coverage.lost_progress = coverage.lost_progress + previous.tick_progress(now);
            }
            coverage.apply(now, &fresh);
        }
    }

    /// Coverage of every watched effect over a trial that ran until `end`.
    pub fn coverage(&self, end: SimTime) -> BTreeMap<EffectId, EffectCoverage> {
        let duration = end.saturating_since(SimTime::ZERO);
        self.coverage
            .iter()
            .map(|(effect, coverage)| (*effect, coverage.finish(end, duration)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISEASE: SimDuration = SimDuration::from_millis(15_000);
    const TICK: SimDuration = SimDuration::from_millis(3_000);

    fn ms(value: i64) -> SimTime {
        SimTime::from_millis(value)
    }

    #[test]
    fn final_tick_lands_at_expiry() {
        let effect = TimedEffect::new(SimTime::ZERO, DISEASE, Some(TICK));
        assert_eq!(effect.ticks_total(), 5);
        assert_eq!(effect.next_tick_at(ms(0)), Some(ms(3_000)));
        assert_eq!(effect.next_tick_at(ms(3_000)), Some(ms(6_000)));
        assert_eq!(effect.next_tick_at(ms(12_100)), Some(ms(15_000)));
        assert_eq!(effect.next_tick_at(ms(15_000)), None);
        assert!(!effect.is_active(ms(15_000)));
    }

    #[test]
    fn tick_progress_since_last_tick() {
        let effect = TimedEffect::new(SimTime::ZERO, DISEASE, Some(TICK));
        assert_eq!(effect.tick_progress(ms(6_050)), SimDuration::from_millis(50));
        assert_eq!(effect.tick_progress(ms(8_700)), SimDuration::from_millis(2_700));

        let buff = TimedEffect::new(SimTime::ZERO, DISEASE, None);
        assert_eq!(buff.tick_progress(ms(8_700)), SimDuration::ZERO);
        assert_eq!(buff.next_tick_at(ms(0)), None);
    }

    #[test]
    fn coverage_measures_gaps_after_first_application() {
        let mut book = EffectBook::watching([EffectId::SliceAndDice]);
        let buff = EffectId::SliceAndDice;
        let secs = SimDuration::from_secs;

        book.apply(buff, TargetId::PRIMARY, ms(2_000), secs(10), None);
        // Refresh while active extends the window.
        book.apply(buff, TargetId::PRIMARY, ms(8_000), secs(10), None);
        // Lapsed at 18s, reapplied at 18.5s.
        book.apply(buff, TargetId::PRIMARY, ms(18_500), secs(10), None);

        let report = book.coverage(ms(30_000));
        let coverage = report[&buff];
        assert_eq!(coverage.applications, 3);
        assert_eq!(coverage.longest_gap_ms, 1_500);
        // 2..18 and 18.5..28.5 covered out of 30s.
        assert!((coverage.uptime - 26.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn refreshing_a_ticking_effect_records_lost_progress() {
        let mut book = EffectBook::watching([EffectId::FrostFever]);
        book.apply(EffectId::FrostFever, TargetId::PRIMARY, ms(0), DISEASE, Some(TICK));
        book.apply(EffectId::FrostFever, TargetId::PRIMARY, ms(7_000), DISEASE, Some(TICK));
        book.apply(EffectId::FrostFever, TargetId(1), ms(7_000), DISEASE, Some(TICK));

        let coverage = book.coverage(ms(10_000))[&EffectId::FrostFever];
        assert_eq!(coverage.lost_tick_progress_ms, 1_000);
        assert_eq!(coverage.applications, 2);
        assert!(book.active(EffectId::FrostFever, TargetId(1), ms(9_000)).is_some());
    }
}
