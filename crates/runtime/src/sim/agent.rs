//! The simulated agent: pools, effects, outcome rolls and the clock.
//!
//! [`SimAgent`] is the single collaborator handed to the core. It answers
//! resource and effect queries, performs actions (paying costs, rolling for
//! a hit, applying effects), and owns the trial clock the drivers advance.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rotation_core::{
    ActionExecutor, ActionId, AttemptOutcome, Clock, CostTable, EffectId, EffectView, PoolId,
    ResourceView, SimDuration, SimTime, TargetId,
};

use super::actions::{PeriodicTiming, effect_timing, rules_for};
use super::effects::EffectBook;
use super::pools::{ComboPool, EnergyPool, RuneBank, RuneCost};
use crate::report::{CastTally, EffectCoverage};

/// Continuous pool settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergySetup {
    pub cap: f64,
    pub rate: f64,
}

/// Charge pool settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuneSetup {
    pub recharge: SimDuration,
    pub convert_blood: bool,
}

/// Everything needed to construct an agent for one trial.
#[derive(Clone, Debug)]
pub struct AgentSetup {
    pub energy: Option<EnergySetup>,
    pub runes: Option<RuneSetup>,
    pub periodic: PeriodicTiming,
    /// Probability in `0.0..=1.0` that a rolled action lands.
    pub hit_chance: f64,
    pub costs: CostTable,
    pub global_cooldown: SimDuration,
    pub targets: u32,
    /// Effects whose coverage on the primary target is reported.
    pub watched: Vec<EffectId>,
}

impl Default for AgentSetup {
    fn default() -> Self {
        Self {
            energy: None,
            runes: None,
            periodic: PeriodicTiming::default(),
            hit_chance: 1.0,
            costs: CostTable::default(),
            global_cooldown: SimDuration::from_secs(1),
            targets: 1,
            watched: Vec::new(),
        }
    }
}

/// Threshold-point cap shared by every agent.
const COMBO_CAP: u32 = 5;

pub struct SimAgent {
    now: SimTime,
    energy: EnergyPool,
    combo: ComboPool,
    runes: RuneBank,
    effects: EffectBook,
    rng: StdRng,
    hit_chance: f64,
    costs: CostTable,
    periodic: PeriodicTiming,
    global_cooldown: SimDuration,
    gcd_ready_at: SimTime,
    targets: u32,
    tracked: Vec<PoolId>,
    min_pool: BTreeMap<PoolId, f64>,
    casts: BTreeMap<ActionId, CastTally>,
}

impl SimAgent {
    pub fn new(setup: AgentSetup, seed: u64) -> Self {
        let energy = setup
            .energy
            .map_or(EnergyPool::new(0.0, 0.0, 0.0), |e| EnergyPool::new(e.cap, e.cap, e.rate));
        let runes = setup
            .runes
            .map_or_else(RuneBank::empty, |r| RuneBank::new(r.recharge, r.convert_blood));

        let mut tracked = Vec::new();
        if setup.energy.is_some() {
            tracked.extend([PoolId::Energy, PoolId::ComboPoints]);
        }
        if setup.runes.is_some() {
            tracked.extend([PoolId::BloodRunes, PoolId::FrostRunes, PoolId::UnholyRunes]);
        }

        let mut agent = Self {
            now: SimTime::ZERO,
            energy,
            combo: ComboPool::new(COMBO_CAP),
            runes,
            effects: EffectBook::watching(setup.watched),
            rng: StdRng::seed_from_u64(seed),
            hit_chance: setup.hit_chance.clamp(0.0, 1.0),
            costs: setup.costs,
            periodic: setup.periodic,
            global_cooldown: setup.global_cooldown,
            gcd_ready_at: SimTime::ZERO,
            targets: setup.targets.max(1),
            tracked,
            min_pool: BTreeMap::new(),
            casts: BTreeMap::new(),
        };
        agent.observe_pools();
        agent
    }

    pub fn gcd_ready_at(&self) -> SimTime {
        self.gcd_ready_at
    }

    pub fn global_cooldown(&self) -> SimDuration {
        self.global_cooldown
    }

    pub fn targets(&self) -> u32 {
        self.targets
    }

    pub fn runes(&self) -> &RuneBank {
        &self.runes
    }

    pub fn effects(&self) -> &EffectBook {
        &self.effects
    }

    pub fn casts(&self) -> &BTreeMap<ActionId, CastTally> {
        &self.casts
    }

    /// Lowest amount observed per tracked pool so far.
    pub fn min_pool(&self) -> &BTreeMap<PoolId, f64> {
        &self.min_pool
    }

    pub fn coverage(&self) -> BTreeMap<EffectId, EffectCoverage> {
        self.effects.coverage(self.now)
    }

    /// Whether `action` could be attempted right now without rejection.
    pub fn can_attempt(&self, action: ActionId) -> bool {
        let rules = rules_for(action);
        if rules.on_gcd && self.now < self.gcd_ready_at {
            return false;
        }
        if rules.finisher && self.combo.points() == 0 {
            return false;
        }
        self.energy.amount() >= self.costs.cost(action) && self.runes.can_pay(rules.runes)
    }

    /// Rune cost of `action`.
    pub fn rune_cost(&self, action: ActionId) -> RuneCost {
        rules_for(action).runes
    }

    /// Seeds an effect directly, bypassing costs and rolls.
    pub fn seed_effect(&mut self, effect: EffectId, target: TargetId, applied_at: SimTime) {
        let (duration, tick) = effect_timing(effect, COMBO_CAP, self.periodic);
        self.effects.apply(effect, target, applied_at, duration, tick);
    }

    fn observe_pools(&mut self) {
        for pool in &self.tracked {
            let amount = self.current_amount(*pool);
            self.min_pool
                .entry(*pool)
                .and_modify(|min| *min = min.min(amount))
                .or_insert(amount);
        }
    }

    fn roll(&mut self, always_lands: bool) -> AttemptOutcome {
        if always_lands || self.rng.gen_bool(self.hit_chance) {
            AttemptOutcome::Landed
        } else {
            AttemptOutcome::Missed
        }
    }

    fn land(&mut self, action: ActionId, target: TargetId) {
        let rules = rules_for(action);
        self.combo.add(rules.awards_points);
        let spent = if rules.finisher {
            self.combo.spend_all()
        } else {
            0
        };

        if action == ActionId::Pestilence {
            self.spread_periodic(target);
        } else if let Some(effect) = action.applies() {
            let (duration, tick) = effect_timing(effect, spent, self.periodic);
            self.effects.apply(effect, target, self.now, duration, tick);
        }
    }

    /// Refreshes the active periodic effects on `source` and copies them to
    /// every other target.
    fn spread_periodic(&mut self, source: TargetId) {
        let (duration, tick) = (self.periodic.duration, Some(self.periodic.tick));
        for effect in [EffectId::FrostFever, EffectId::BloodPlague] {
            if self.effects.active(effect, source, self.now).is_none() {
                continue;
            }
            for target in (0..self.targets).map(TargetId) {
                self.effects.apply(effect, target, self.now, duration, tick);
            }
        }
    }
}

impl ResourceView for SimAgent {
    fn current_amount(&self, pool: PoolId) -> f64 {
        match pool {
            PoolId::Energy => self.energy.amount(),
            PoolId::ComboPoints => f64::from(self.combo.points()),
            _ => f64::from(self.runes.ready(pool)),
        }
    }

    fn capacity(&self, pool: PoolId) -> f64 {
        match pool {
            PoolId::Energy => self.energy.cap(),
            PoolId::ComboPoints => f64::from(self.combo.cap()),
            _ => f64::from(self.runes.capacity(pool)),
        }
    }

    fn time_to_next_unit(&self, pool: PoolId, now: SimTime) -> SimDuration {
        match pool {
            PoolId::Energy => self
                .energy
                .time_until(self.energy.amount() + 1.0)
                .unwrap_or(SimDuration::from_millis(i64::MAX)),
            PoolId::ComboPoints => SimDuration::from_millis(i64::MAX),
            _ => self.runes.time_to_next_unit(pool, now),
        }
    }

    fn expected_rate_per_second(&self, pool: PoolId) -> f64 {
        match pool {
            PoolId::Energy => self.energy.rate(),
            PoolId::ComboPoints => 0.0,
            _ => {
                let recharge = self.runes.recharge().as_secs_f64();
                if recharge > 0.0 {
                    f64::from(self.runes.capacity(pool)) / recharge
                } else {
                    0.0
                }
            }
        }
    }
}

impl EffectView for SimAgent {
    fn is_active(&self, effect: EffectId, target: TargetId, now: SimTime) -> bool {
        self.effects.active(effect, target, now).is_some()
    }

    fn remaining_duration(&self, effect: EffectId, target: TargetId, now: SimTime) -> SimDuration {
        self.effects
            .get(effect, target)
            .map_or(SimDuration::ZERO, |e| e.remaining(now))
    }

    fn next_tick_at(&self, effect: EffectId, target: TargetId, now: SimTime) -> Option<SimTime> {
        self.effects
            .get(effect, target)
            .and_then(|e| e.next_tick_at(now))
    }
}

impl ActionExecutor for SimAgent {
    fn attempt(&mut self, action: ActionId, target: TargetId) -> AttemptOutcome {
        if !self.can_attempt(action) {
            tracing::trace!(now_ms = self.now.as_millis(), %action, "attempt rejected");
            return AttemptOutcome::Rejected;
        }

        let rules = rules_for(action);
        let cost = self.costs.cost(action);
        if !self.energy.spend(cost) || !self.runes.spend(rules.runes, self.now) {
            return AttemptOutcome::Rejected;
        }
        if rules.on_gcd {
            self.gcd_ready_at = self.now + self.global_cooldown;
        }

        let outcome = self.roll(rules.always_lands);
        if outcome.landed() {
            self.land(action, target);
        }

        let tally = self.casts.entry(action).or_default();
        match outcome {
            AttemptOutcome::Landed => tally.landed += 1,
            _ => tally.missed += 1,
        }
        self.observe_pools();
        tracing::trace!(now_ms = self.now.as_millis(), %action, %outcome, "attempt resolved");
        outcome
    }
}

impl Clock for SimAgent {
    fn now(&self) -> SimTime {
        self.now
    }

    fn advance_to(&mut self, at: SimTime) {
        if at <= self.now {
            return;
        }
        self.energy.regenerate(at - self.now);
        self.now = at;
        self.runes.advance(at);
    }

    fn advance_until_resource_at_least(
        &mut self,
        pool: PoolId,
        level: f64,
        limit: SimTime,
    ) -> SimTime {
        let reached = match pool {
            PoolId::Energy => self
                .energy
                .time_until(level)
                .map_or(SimTime::NEVER, |wait| self.now + wait),
            _ if self.current_amount(pool) >= level => self.now,
            _ if pool.is_charge() => self.now + self.runes.time_to_next_unit(pool, self.now),
            _ => SimTime::NEVER,
        };
        self.advance_to(reached.min(limit));
        self.now
    }
}
