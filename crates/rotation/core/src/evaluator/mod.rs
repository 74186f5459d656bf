//! Decision evaluator.
//!
//! Classifies the head of the [`ScheduledStack`] into one of
//! [`DecisionKind`]. The evaluator never mutates the stack; a lower-priority
//! objective worth casting right away is returned as an [`Injection`] for the
//! caller to apply.
mod wait;

pub use wait::WaitTarget;

use crate::catalogue::{Catalogue, ObjectiveIndex};
use crate::config::TimingConfig;
use crate::engine::PlanningError;
use crate::env::ResourceSnapshot;
use crate::error::ErrorContext;
use crate::planner::{BuildModel, Injection, ScheduledObjective, ScheduledStack};
use crate::time::SimTime;

/// Classification of the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DecisionKind {
    /// Commit the head objective (or the injected one).
    Cast,
    /// Spend energy on the builder toward the head's threshold.
    Build,
    /// Let resources accrue.
    Wait,
    /// Drop the head; another scheduled objective is about to expire.
    Skip,
}

/// Output of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub kind: DecisionKind,
    /// Objective the decision is about.
    pub objective: ObjectiveIndex,
    /// Present exactly when `kind` is Wait.
    pub wait: Option<WaitTarget>,
    /// Lower-priority objective to cast ahead of the head.
    pub injected: Option<Injection>,
}

impl Decision {
    fn new(kind: DecisionKind, objective: ObjectiveIndex) -> Self {
        Self {
            kind,
            objective,
            wait: None,
            injected: None,
        }
    }

    /// The objective a Cast acts on, accounting for injection.
    pub fn cast_objective(&self) -> ObjectiveIndex {
        self.injected.map_or(self.objective, |inj| inj.objective)
    }
}

/// Stateless classifier over one scheduled stack.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionEvaluator {
    model: BuildModel,
    timing: TimingConfig,
}

impl DecisionEvaluator {
    pub fn new(model: BuildModel, timing: TimingConfig) -> Self {
        Self { model, timing }
    }

    /// Classifies the next step for the head of `stack`.
    ///
    /// Errors only when a Wait is requested while every pool is capped.
    pub fn evaluate(
        &self,
        stack: &ScheduledStack,
        catalogue: &Catalogue,
        resources: &ResourceSnapshot,
        now: SimTime,
        next_decision_at: SimTime,
    ) -> Result<Decision, PlanningError> {
        let context = || ErrorContext::new(now, 0).with_snapshot(*resources);
        let head = stack.head().ok_or_else(|| PlanningError::EmptyPlan {
            context: context(),
        })?;
        let objective = catalogue
            .get(head.objective)
            .ok_or_else(|| PlanningError::UnknownObjective {
                index: head.objective,
                context: context(),
            })?;

        let decision_tick = self.timing.decision_tick();
        if stack
            .rest()
            .iter()
            .any(|other| other.expires_at - now <= decision_tick)
        {
            return Ok(Decision::new(DecisionKind::Skip, head.objective));
        }

        let kind = self.classify(head, catalogue, resources, now, next_decision_at);
        let decision = match kind {
            Classified::Plain(DecisionKind::Wait) => {
                let desired = wait::desired_energy(objective, &self.model, resources)
                    .ok_or_else(|| PlanningError::CappedWhileWaiting {
                        context: context()
                            .with_message("no wait can raise a pool that is already capped"),
                    })?;
                Decision {
                    wait: Some(wait::wait_target(
                        head,
                        desired,
                        stack,
                        &self.timing,
                        resources,
                        now,
                    )),
                    ..Decision::new(DecisionKind::Wait, head.objective)
                }
            }
            Classified::Plain(kind) => Decision::new(kind, head.objective),
            Classified::Inject(injection) => Decision {
                injected: Some(injection),
                ..Decision::new(DecisionKind::Cast, head.objective)
            },
        };
        tracing::trace!(
            now = %now,
            action = %objective.action,
            decision = %decision.kind,
            "evaluated head"
        );
        Ok(decision)
    }

    fn classify(
        &self,
        head: &ScheduledObjective,
        catalogue: &Catalogue,
        resources: &ResourceSnapshot,
        now: SimTime,
        next_decision_at: SimTime,
    ) -> Classified {
        use DecisionKind::*;

        let Some(objective) = catalogue.get(head.objective) else {
            return Classified::Plain(Wait);
        };
        let points = resources.points;
        let energy = resources.energy;
        let can_cast = energy >= objective.cost;
        let can_build = energy >= self.model.builder_cost;
        let tte = head.time_to_expire(now);

        // Expires before the next decision point.
        if tte <= next_decision_at - now {
            return Classified::Plain(if points >= objective.min_points && can_cast {
                Cast
            } else if points < objective.min_points && can_build {
                Build
            } else {
                Wait
            });
        }

        if points >= objective.max_points {
            let clipping = tte <= self.timing.clipping_window();
            if clipping {
                return Classified::Plain(if can_cast { Cast } else { Wait });
            }
            if tte > head.min_build {
                let filler = catalogue.lower_than(head.objective).find(|(_, lower)| {
                    points > lower.min_points && energy > lower.cost && lower.is_unlimited()
                });
                if let Some((index, _)) = filler {
                    return Classified::Inject(Injection { objective: index });
                }
            }
            let overbuild = self
                .model
                .time_to_build(1, 0.0, resources.accrual_rate);
            if overbuild <= tte && can_build {
                return Classified::Plain(Build);
            }
            Classified::Plain(Wait)
        } else if points < objective.min_points {
            Classified::Plain(if can_build { Build } else { Wait })
        } else if can_cast && tte < self.timing.near_expiry() {
            Classified::Plain(Cast)
        } else if can_build {
            Classified::Plain(Build)
        } else {
            Classified::Plain(Wait)
        }
    }
}

enum Classified {
    Plain(DecisionKind),
    Inject(Injection),
}
