//! Resource pools owned by a simulated agent.
//!
//! Pools never go negative: a spend that cannot be covered is refused and
//! leaves the pool untouched.

use arrayvec::ArrayVec;
use rotation_core::{PoolId, SimDuration, SimTime};

/// Continuously regenerating pool with a hard cap.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyPool {
    amount: f64,
    cap: f64,
    rate: f64,
}

impl EnergyPool {
    pub fn new(amount: f64, cap: f64, rate: f64) -> Self {
        Self {
            amount: amount.clamp(0.0, cap.max(0.0)),
            cap: cap.max(0.0),
            rate: rate.max(0.0),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn regenerate(&mut self, elapsed: SimDuration) {
        if elapsed.is_negative() {
            return;
        }
        self.amount = (self.amount + self.rate * elapsed.as_secs_f64()).min(self.cap);
    }

    /// Pays `cost` if covered; returns whether it was paid.
    pub fn spend(&mut self, cost: f64) -> bool {
        if cost > self.amount {
            return false;
        }
        self.amount = (self.amount - cost).max(0.0);
        true
    }

    /// Time until the pool holds `level`; `None` when it never will.
    pub fn time_until(&self, level: f64) -> Option<SimDuration> {
        if self.amount >= level {
            return Some(SimDuration::ZERO);
        }
        if level > self.cap || self.rate <= 0.0 {
            return None;
        }
        Some(SimDuration::from_secs_f64((level - self.amount) / self.rate))
    }
}

/// Discrete threshold resource built by builders and consumed by finishers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboPool {
    points: u32,
    cap: u32,
}

impl ComboPool {
    pub fn new(cap: u32) -> Self {
        Self { points: 0, cap }
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn add(&mut self, points: u32) {
        self.points = (self.points + points).min(self.cap);
    }

    /// Consumes every point and returns how many were spent.
    pub fn spend_all(&mut self) -> u32 {
        core::mem::take(&mut self.points)
    }
}

/// Lifecycle of one rune.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuneState {
    Ready { since: SimTime },
    Recharging { ready_at: SimTime, converts: bool },
    /// Spent and converted: usable in place of any kind.
    Death { since: SimTime },
}

pub const RUNES_PER_KIND: usize = 2;

/// Longest time a ready rune counts toward grace.
pub const MAX_RUNE_GRACE: SimDuration = SimDuration::from_millis(2_500);

/// Two independently recharging runes of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunePool {
    units: ArrayVec<RuneState, RUNES_PER_KIND>,
}

impl RunePool {
    fn full(now: SimTime) -> Self {
        Self {
            units: [RuneState::Ready { since: now }; RUNES_PER_KIND].into(),
        }
    }

    fn ready(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u, RuneState::Ready { .. }))
            .count()
    }

    fn death(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u, RuneState::Death { .. }))
            .count()
    }

    fn advance(&mut self, now: SimTime) {
        for unit in &mut self.units {
            let RuneState::Recharging { ready_at, converts } = *unit else {
                continue;
            };
            if ready_at <= now {
                *unit = if converts {
                    RuneState::Death { since: ready_at }
                } else {
                    RuneState::Ready { since: ready_at }
                };
            }
        }
    }

    /// Spends the oldest unit matching `pick`.
    fn spend_where(
        &mut self,
        pick: impl Fn(&RuneState) -> Option<SimTime>,
        now: SimTime,
        recharge: SimDuration,
        converts: bool,
    ) -> bool {
        let oldest = self
            .units
            .iter_mut()
            .filter_map(|unit| pick(&*unit).map(|since| (since, unit)))
            .min_by_key(|(since, _)| *since);
        match oldest {
            Some((_, unit)) => {
                *unit = RuneState::Recharging {
                    ready_at: now + recharge,
                    converts,
                };
                true
            }
            None => false,
        }
    }

    fn next_ready_at(&self) -> Option<SimTime> {
        self.units
            .iter()
            .filter_map(|u| match u {
                RuneState::Recharging { ready_at, .. } => Some(*ready_at),
                _ => None,
            })
            .min()
    }

    fn oldest_ready(&self) -> Option<SimTime> {
        self.units
            .iter()
            .filter_map(|u| match u {
                RuneState::Ready { since } => Some(*since),
                _ => None,
            })
            .min()
    }
}

/// Rune kinds an action can cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuneCost {
    pub blood: u32,
    pub frost: u32,
    pub unholy: u32,
}

impl RuneCost {
    pub const NONE: Self = Self {
        blood: 0,
        frost: 0,
        unholy: 0,
    };

    pub const fn is_free(&self) -> bool {
        self.blood == 0 && self.frost == 0 && self.unholy == 0
    }

    pub const fn of(&self, pool: PoolId) -> u32 {
        match pool {
            PoolId::BloodRunes => self.blood,
            PoolId::FrostRunes => self.frost,
            PoolId::UnholyRunes => self.unholy,
            _ => 0,
        }
    }
}

/// Blood, frost and unholy rune pools with death-rune conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuneBank {
    blood: RunePool,
    frost: RunePool,
    unholy: RunePool,
    recharge: SimDuration,
    /// Spent blood runes come back as death runes.
    convert_blood: bool,
}

impl RuneBank {
    pub fn new(recharge: SimDuration, convert_blood: bool) -> Self {
        Self {
            blood: RunePool::full(SimTime::ZERO),
            frost: RunePool::full(SimTime::ZERO),
            unholy: RunePool::full(SimTime::ZERO),
            recharge,
            convert_blood,
        }
    }

    /// A bank with no runes at all, for agents that do not use them.
    pub fn empty() -> Self {
        let spent = RunePool {
            units: ArrayVec::new(),
        };
        Self {
            blood: spent.clone(),
            frost: spent.clone(),
            unholy: spent,
            recharge: SimDuration::ZERO,
            convert_blood: false,
        }
    }

    fn pool(&self, pool: PoolId) -> Option<&RunePool> {
        match pool {
            PoolId::BloodRunes => Some(&self.blood),
            PoolId::FrostRunes => Some(&self.frost),
            PoolId::UnholyRunes => Some(&self.unholy),
            _ => None,
        }
    }

    fn pools(&self) -> [&RunePool; 3] {
        [&self.blood, &self.frost, &self.unholy]
    }

    pub fn advance(&mut self, now: SimTime) {
        self.blood.advance(now);
        self.frost.advance(now);
        self.unholy.advance(now);
    }

    /// Ready units of `pool`; for `DeathRunes`, converted units of every kind.
    pub fn ready(&self, pool: PoolId) -> u32 {
        let count = match pool {
            PoolId::DeathRunes => self.pools().iter().map(|p| p.death()).sum(),
            _ => self.pool(pool).map_or(0, RunePool::ready),
        };
        count as u32
    }

    pub fn capacity(&self, pool: PoolId) -> u32 {
        match pool {
            PoolId::DeathRunes => self.pools().iter().map(|p| p.units.len()).sum::<usize>() as u32,
            _ => self.pool(pool).map_or(0, |p| p.units.len() as u32),
        }
    }

    pub fn recharge(&self) -> SimDuration {
        self.recharge
    }

    /// Whether `cost` can be paid, counting death runes as wildcards.
    pub fn can_pay(&self, cost: RuneCost) -> bool {
        let shortfall = [
            (PoolId::BloodRunes, cost.blood),
            (PoolId::FrostRunes, cost.frost),
            (PoolId::UnholyRunes, cost.unholy),
        ]
        .into_iter()
        .map(|(pool, need)| need.saturating_sub(self.ready(pool)))
        .sum::<u32>();
        shortfall <= self.ready(PoolId::DeathRunes)
    }

    /// Pays `cost`, own kind first and death runes for any shortfall.
    pub fn spend(&mut self, cost: RuneCost, now: SimTime) -> bool {
        if !self.can_pay(cost) {
            return false;
        }
        let recharge = self.recharge;
        let convert_blood = self.convert_blood;
        for (kind, need) in [
            (PoolId::BloodRunes, cost.blood),
            (PoolId::FrostRunes, cost.frost),
            (PoolId::UnholyRunes, cost.unholy),
        ] {
            for _ in 0..need {
                let converts = kind == PoolId::BloodRunes && convert_blood;
                let paid = self.pool_mut(kind).is_some_and(|pool| {
                    pool.spend_where(ready_since, now, recharge, converts)
                });
                if !paid {
                    self.spend_death(now);
                }
            }
        }
        true
    }

    fn spend_death(&mut self, now: SimTime) {
        let recharge = self.recharge;
        // Oldest death rune across all kinds; it reverts to its own kind.
        let oldest = [&self.blood, &self.frost, &self.unholy]
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                p.units
                    .iter()
                    .filter_map(|u| match u {
                        RuneState::Death { since } => Some(*since),
                        _ => None,
                    })
                    .min()
                    .map(|since| (since, i))
            })
            .min();
        if let Some((_, index)) = oldest {
            let pool = match index {
                0 => &mut self.blood,
                1 => &mut self.frost,
                _ => &mut self.unholy,
            };
            pool.spend_where(death_since, now, recharge, false);
        }
    }

    fn pool_mut(&mut self, pool: PoolId) -> Option<&mut RunePool> {
        match pool {
            PoolId::BloodRunes => Some(&mut self.blood),
            PoolId::FrostRunes => Some(&mut self.frost),
            PoolId::UnholyRunes => Some(&mut self.unholy),
            _ => None,
        }
    }

    /// Time until a unit of `pool` is ready; zero when one already is.
    pub fn time_to_next_unit(&self, pool: PoolId, now: SimTime) -> SimDuration {
        if self.ready(pool) > 0 {
            return SimDuration::ZERO;
        }
        let next = match pool {
            PoolId::DeathRunes => self
                .pools()
                .iter()
                .flat_map(|p| p.units.iter())
                .filter_map(|u| match u {
                    RuneState::Recharging {
                        ready_at,
                        converts: true,
                    } => Some(*ready_at),
                    _ => None,
                })
                .min(),
            _ => self.pool(pool).and_then(RunePool::next_ready_at),
        };
        next.map_or(SimDuration::from_millis(i64::MAX), |at| at.saturating_since(now))
    }

    /// How long the oldest ready unit of `pool` has been waiting, capped.
    pub fn grace(&self, pool: PoolId, now: SimTime) -> SimDuration {
        self.pool(pool)
            .and_then(RunePool::oldest_ready)
            .map_or(SimDuration::ZERO, |since| {
                now.saturating_since(since).min(MAX_RUNE_GRACE)
            })
    }

    /// Units of `pool` left and the next-ready instant after paying `cost`.
    pub fn project(&self, cost: RuneCost, pool: PoolId, now: SimTime) -> (u32, SimTime) {
        let mut after = self.clone();
        after.spend(cost, now);
        let units = after.ready(pool) + after.ready(PoolId::DeathRunes);
        let next = now + after.time_to_next_unit(pool, now);
        (units, next)
    }
}

fn ready_since(unit: &RuneState) -> Option<SimTime> {
    match unit {
        RuneState::Ready { since } => Some(*since),
        _ => None,
    }
}

fn death_since(unit: &RuneState) -> Option<SimTime> {
    match unit {
        RuneState::Death { since } => Some(*since),
        _ => None,
    }
}
