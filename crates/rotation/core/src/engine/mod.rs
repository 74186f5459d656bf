//! Rotation engine: the step loop tying planner, evaluator and executor.
//!
//! The [`RotationEngine`] owns the catalogue and the current plan for one
//! agent. Each [`step`](RotationEngine::step) evaluates the head of the plan,
//! performs at most one action through the [`ActionExecutor`], and replans
//! after every performed cast. Waiting is returned to the driver as an
//! instruction; the engine never advances time itself.

mod errors;

pub use errors::PlanningError;

use crate::catalogue::{Catalogue, ObjectiveIndex};
use crate::config::RotationConfig;
use crate::env::{ActionExecutor, AttemptOutcome, EffectView, ResourceSnapshot, ResourceView};
use crate::error::ErrorContext;
use crate::evaluator::{Decision, DecisionEvaluator, DecisionKind, WaitTarget};
use crate::ids::{ActionId, TargetId};
use crate::planner::{BuildModel, LookaheadPlanner, ScheduledStack};
use crate::time::SimTime;

/// What a single engine step did.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepOutcome {
    /// An action was performed.
    Acted {
        kind: DecisionKind,
        action: ActionId,
        outcome: AttemptOutcome,
    },
    /// Nothing to do yet; advance the clock as instructed and step again.
    Waiting(WaitTarget),
}

/// Per-agent planner state.
#[derive(Clone, Debug)]
pub struct RotationEngine {
    catalogue: Catalogue,
    planner: LookaheadPlanner,
    evaluator: DecisionEvaluator,
    plan: ScheduledStack,
    planned: bool,
    decisions: u64,
    target: TargetId,
}

impl RotationEngine {
    pub fn new(catalogue: Catalogue, model: BuildModel, config: &RotationConfig) -> Self {
        Self {
            catalogue,
            planner: LookaheadPlanner::new(model),
            evaluator: DecisionEvaluator::new(model, config.timing.clone()),
            plan: ScheduledStack::empty(),
            planned: false,
            decisions: 0,
            target: TargetId::PRIMARY,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn plan(&self) -> &ScheduledStack {
        &self.plan
    }

    /// Decisions evaluated so far.
    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Rebuilds the plan from the agent's current state.
    pub fn replan<A>(&mut self, agent: &A, now: SimTime)
    where
        A: ResourceView + EffectView + ?Sized,
    {
        let snapshot = ResourceSnapshot::capture(agent);
        self.plan = self
            .planner
            .advance_plan(&self.catalogue, &snapshot, agent, now);
        self.planned = true;
    }

    /// Evaluates the plan and performs at most one action.
    ///
    /// Skips are resolved within the same step. A Cast or Build whose attempt
    /// is rejected aborts with [`PlanningError::AttemptRejected`].
    pub fn step<A>(
        &mut self,
        agent: &mut A,
        now: SimTime,
        next_decision_at: SimTime,
    ) -> Result<StepOutcome, PlanningError>
    where
        A: ResourceView + EffectView + ActionExecutor + ?Sized,
    {
        if !self.planned {
            self.replan(agent, now);
        }

        self.decisions += 1;
        loop {
            let snapshot = ResourceSnapshot::capture(agent);
            let decision = self
                .evaluator
                .evaluate(&self.plan, &self.catalogue, &snapshot, now, next_decision_at)
                .map_err(|err| err.at_decision(self.decisions))?;

            match decision.kind {
                DecisionKind::Skip => {
                    self.plan.pop_head();
                }
                DecisionKind::Wait => {
                    let target = decision.wait.unwrap_or(WaitTarget::NextDecision);
                    return Ok(StepOutcome::Waiting(target));
                }
                DecisionKind::Build => {
                    let action = self.planner.model().builder;
                    let outcome = self.perform(agent, action, &snapshot, now)?;
                    tracing::trace!(now = %now, %action, %outcome, "built");
                    return Ok(StepOutcome::Acted {
                        kind: DecisionKind::Build,
                        action,
                        outcome,
                    });
                }
                DecisionKind::Cast => {
                    return self.cast(agent, &decision, &snapshot, now);
                }
            }
        }
    }

    fn cast<A>(
        &mut self,
        agent: &mut A,
        decision: &Decision,
        snapshot: &ResourceSnapshot,
        now: SimTime,
    ) -> Result<StepOutcome, PlanningError>
    where
        A: ResourceView + EffectView + ActionExecutor + ?Sized,
    {
        if let Some(injection) = decision.injected {
            self.plan = self.plan.with_injection(injection, now);
        }
        let index: ObjectiveIndex = decision.cast_objective();
        let action = self
            .catalogue
            .get(index)
            .map(|objective| objective.action)
            .ok_or_else(|| PlanningError::UnknownObjective {
                index,
                context: ErrorContext::new(now, self.decisions).with_snapshot(*snapshot),
            })?;

        let outcome = self.perform(agent, action, snapshot, now)?;
        self.catalogue.record_cast(index);
        tracing::debug!(
            now = %now,
            %action,
            %outcome,
            injected = decision.injected.is_some(),
            "cast objective"
        );
        self.replan(agent, now);
        Ok(StepOutcome::Acted {
            kind: DecisionKind::Cast,
            action,
            outcome,
        })
    }

    fn perform<A>(
        &self,
        agent: &mut A,
        action: ActionId,
        snapshot: &ResourceSnapshot,
        now: SimTime,
    ) -> Result<AttemptOutcome, PlanningError>
    where
        A: ActionExecutor + ?Sized,
    {
        match agent.attempt(action, self.target) {
            AttemptOutcome::Rejected => Err(PlanningError::AttemptRejected {
                action,
                context: ErrorContext::new(now, self.decisions)
                    .with_snapshot(*snapshot)
                    .with_message("executor refused an action the snapshot could pay for"),
            }),
            outcome => Ok(outcome),
        }
    }
}
