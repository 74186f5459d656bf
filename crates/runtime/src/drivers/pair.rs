//! Driver for the periodic-pair agent.
//!
//! Each decision point consults the [`SyncController`] before anything else:
//! spreading first when the ledger allows it, then any proposed refresh
//! (waiting out a deferral), and only then the filler strike.

use rotation_core::{
    ActionExecutor, ActionId, AttemptOutcome, ChargeProjection, Clock, EffectId, EffectSnapshot,
    ErrorContext, PendingAction, PlanningError, PoolId, RefreshAction, RefreshTarget,
    ResourceSnapshot, RotationConfig, RotationError, SimDuration, SimTime, SlotSnapshot,
    SyncContext, SyncController, TargetId,
};

use super::{TrialSeed, finish_report};
use crate::error::Result;
use crate::report::{AbortDiagnostic, TrialReport};
use crate::scenario::Scenario;
use crate::sim::SimAgent;

/// Strikes cast between refreshes, in preference order.
const FILLERS: [ActionId; 2] = [ActionId::ScourgeStrike, ActionId::BloodStrike];

const RUNE_POOLS: [PoolId; 3] = [PoolId::BloodRunes, PoolId::FrostRunes, PoolId::UnholyRunes];

pub struct PairDriver {
    controller: SyncController,
    agent: SimAgent,
    end: SimTime,
    decision_tick: SimDuration,
    decisions: u64,
    id: TrialSeed,
}

impl PairDriver {
    pub fn new(scenario: &Scenario, config: &RotationConfig, id: TrialSeed) -> Self {
        let controller = SyncController::new(config.sync.clone());
        let (primary, secondary) = controller.effects();
        let agent = SimAgent::new(
            scenario.agent_setup(config, vec![primary, secondary]),
            id.seed,
        );
        Self {
            controller,
            agent,
            end: SimTime::ZERO + scenario.duration(),
            decision_tick: config.timing.decision_tick(),
            decisions: 0,
            id,
        }
    }

    /// Driver over an existing agent, for trials that start mid-fight.
    pub fn with_agent(
        agent: SimAgent,
        controller: SyncController,
        duration: SimDuration,
        decision_tick: SimDuration,
    ) -> Self {
        Self {
            controller,
            end: agent.now() + duration,
            agent,
            decision_tick,
            decisions: 0,
            id: TrialSeed { trial: 0, seed: 0 },
        }
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn agent(&self) -> &SimAgent {
        &self.agent
    }

    /// Runs the trial to completion or to the first rejected refresh.
    pub fn run(mut self) -> Result<TrialReport> {
        let aborted = self.run_until(self.end).err().map(|err| {
            tracing::error!(
                trial = self.id.trial,
                now_ms = self.agent.now().as_millis(),
                decision = self.decisions,
                code = err.error_code(),
                "trial aborted: {err}"
            );
            AbortDiagnostic::from_error(&err)
        });
        Ok(finish_report(&self.agent, self.id, self.decisions, aborted))
    }

    /// Drives decisions until `until` (capped at the trial end).
    pub fn run_until(&mut self, until: SimTime) -> std::result::Result<(), PlanningError> {
        let until = until.min(self.end);
        while self.agent.now() < until {
            let now = self.agent.now();
            let ready = self.agent.gcd_ready_at();
            if ready > now {
                self.agent.advance_to(ready.min(until));
                continue;
            }
            self.decide(now, until)?;
        }
        Ok(())
    }

    /// Makes one decision at `now`, acting or advancing the clock.
    fn decide(&mut self, now: SimTime, until: SimTime) -> std::result::Result<(), PlanningError> {
        self.decisions += 1;

        if self.controller.should_spread(self.agent.targets()) && self.spread_ready(now) {
            let outcome = self.perform(ActionId::Pestilence, now)?;
            self.controller.record_spread(outcome);
            tracing::debug!(now_ms = now.as_millis(), %outcome, "spread periodic pair");
            return Ok(());
        }

        let filler = FILLERS
            .into_iter()
            .find(|action| self.agent.can_attempt(*action));
        let context = self.context(now, filler);

        if let Some(refresh) = self.controller.plan(&context) {
            return self.refresh(refresh, now, until);
        }

        match filler {
            Some(action) => {
                self.perform(action, now)?;
            }
            None => self.idle(now, until),
        }
        Ok(())
    }

    fn refresh(
        &mut self,
        refresh: RefreshAction,
        now: SimTime,
        until: SimTime,
    ) -> std::result::Result<(), PlanningError> {
        if refresh.is_deferred(now) {
            tracing::debug!(
                now_ms = now.as_millis(),
                issue_at_ms = refresh.issue_at.as_millis(),
                target = %refresh.target,
                "refresh deferred past tick"
            );
            self.agent.advance_to(refresh.issue_at.min(until));
            return Ok(());
        }

        let outcome = self.perform(refresh.action, now)?;
        self.controller.record(refresh.target, outcome, now);
        if refresh.target == RefreshTarget::Both {
            // The combined action already spread the pair.
            self.controller.record_spread(outcome);
        }
        tracing::debug!(
            now_ms = now.as_millis(),
            action = %refresh.action,
            reason = %refresh.reason,
            %outcome,
            "refreshed periodic effect"
        );
        Ok(())
    }

    fn perform(
        &mut self,
        action: ActionId,
        now: SimTime,
    ) -> std::result::Result<AttemptOutcome, PlanningError> {
        match self.agent.attempt(action, TargetId::PRIMARY) {
            AttemptOutcome::Rejected => Err(PlanningError::AttemptRejected {
                action,
                context: ErrorContext::new(now, self.decisions)
                    .with_snapshot(ResourceSnapshot::capture(&self.agent))
                    .with_message("agent refused an action the controller chose"),
            }),
            outcome => Ok(outcome),
        }
    }

    /// Nothing castable: advance to the next rune or decision tick.
    fn idle(&mut self, now: SimTime, until: SimTime) {
        let next_rune = RUNE_POOLS
            .into_iter()
            .map(|pool| self.agent.runes().time_to_next_unit(pool, now))
            .filter(|wait| *wait > SimDuration::ZERO)
            .min()
            .unwrap_or(self.decision_tick)
            .min(self.decision_tick);
        self.agent.advance_to((now + next_rune).min(until));
    }

    fn spread_ready(&self, now: SimTime) -> bool {
        let (primary, secondary) = self.controller.effects();
        self.agent.can_attempt(ActionId::Pestilence)
            && self.agent.effects().active(primary, TargetId::PRIMARY, now).is_some()
            && self.agent.effects().active(secondary, TargetId::PRIMARY, now).is_some()
    }

    fn context(&self, now: SimTime, filler: Option<ActionId>) -> SyncContext {
        let (primary, secondary) = self.controller.effects();
        SyncContext {
            now,
            cast_gcd: self.agent.global_cooldown(),
            primary: self.slot(primary, now),
            secondary: self.slot(secondary, now),
            pending: filler.map(|action| PendingAction {
                action,
                primary_pool: self.projection(action, paying_pool(primary), now),
                secondary_pool: self.projection(action, paying_pool(secondary), now),
            }),
            combined_castable: self.spread_ready(now),
        }
    }

    fn slot(&self, effect: EffectId, now: SimTime) -> SlotSnapshot {
        SlotSnapshot {
            effect: EffectSnapshot::capture(&self.agent, effect, TargetId::PRIMARY, now),
            castable: self.agent.can_attempt(effect.applied_by()),
            grace: self.agent.runes().grace(paying_pool(effect), now),
        }
    }

    fn projection(&self, action: ActionId, pool: PoolId, now: SimTime) -> ChargeProjection {
        let cost = self.agent.rune_cost(action);
        if cost.of(pool) == 0 {
            return ChargeProjection::untouched(&self.agent, pool, now);
        }
        let (units_after, next_unit_at) = self.agent.runes().project(cost, pool, now);
        ChargeProjection {
            cost: cost.of(pool),
            units_after,
            next_unit_at,
        }
    }
}

/// Rune pool paying for the refresh of `effect`.
fn paying_pool(effect: EffectId) -> PoolId {
    match effect {
        EffectId::BloodPlague => PoolId::UnholyRunes,
        _ => PoolId::FrostRunes,
    }
}
