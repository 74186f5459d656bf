//! Lookahead planner.
//!
//! Every pass walks the catalogue in priority order with a virtual clock and a
//! virtual resource level, deciding for each objective whether it has slack,
//! fits just before its deadline, needs an urgent catch-up cast, or is
//! dropped until the next pass. The result is an ordered [`ScheduledStack`]
//! whose head is the most constrained objective.
//!
//! Planning is a pure function of its inputs: replanning from the same state
//! always yields the same stack.
mod build;

pub use build::BuildModel;

use arrayvec::ArrayVec;

use crate::catalogue::{Catalogue, Objective, ObjectiveIndex};
use crate::config::RotationConfig;
use crate::env::{EffectView, ResourceSnapshot};
use crate::ids::TargetId;
use crate::time::{SimDuration, SimTime};

/// Why an objective was placed on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleReason {
    /// Enough slack to fit the full build anywhere before the deadline.
    Slack,
    /// Just enough time to build the minimum before the deadline.
    Deadline,
    /// Cannot fit its own window; cast as soon as possible.
    CatchUp(CatchUpCause),
    /// Inserted ahead of the plan to use idle time.
    Injected,
}

/// Which escape condition forced a catch-up.
///
/// When several hold at once the first listed wins: a lapsed effect is the
/// most urgent signal, then a single-cast objective, then an empty stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CatchUpCause {
    EffectLapsed,
    SingleCast,
    EmptyStack,
}

/// An objective bound to its projected timing for one planning pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledObjective {
    pub objective: ObjectiveIndex,
    pub expires_at: SimTime,
    /// Time to build the objective's minimum threshold from empty.
    pub min_build: SimDuration,
    /// Time to build up to the objective's cast ceiling from empty.
    pub max_build: SimDuration,
    pub reason: ScheduleReason,
}

impl ScheduledObjective {
    /// Time left until expiration; negative once past due.
    pub fn time_to_expire(&self, now: SimTime) -> SimDuration {
        self.expires_at - now
    }
}

/// Instruction from the evaluator to run a lower-priority objective first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Injection {
    pub objective: ObjectiveIndex,
}

/// Ordered execution plan; the head (index 0) is acted on first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledStack {
    items: ArrayVec<ScheduledObjective, { RotationConfig::MAX_SCHEDULED }>,
}

impl ScheduledStack {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stack from items already in execution order; extras past capacity are
    /// dropped.
    pub fn from_items(items: impl IntoIterator<Item = ScheduledObjective>) -> Self {
        Self {
            items: items
                .into_iter()
                .take(RotationConfig::MAX_SCHEDULED)
                .collect(),
        }
    }

    pub fn head(&self) -> Option<&ScheduledObjective> {
        self.items.first()
    }

    /// Every scheduled objective except the head.
    pub fn rest(&self) -> &[ScheduledObjective] {
        self.items.get(1..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledObjective> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops the head after a Skip decision.
    pub fn pop_head(&mut self) -> Option<ScheduledObjective> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Earliest expiration across the stack.
    pub fn next_expiration(&self) -> Option<SimTime> {
        self.items.iter().map(|item| item.expires_at).min()
    }

    /// Copy of this stack with an injected objective due immediately.
    pub fn with_injection(&self, injection: Injection, now: SimTime) -> Self {
        let mut items = self.items.clone();
        if items.is_full() {
            items.pop();
        }
        items.insert(
            0,
            ScheduledObjective {
                objective: injection.objective,
                expires_at: now,
                min_build: SimDuration::ZERO,
                max_build: SimDuration::ZERO,
                reason: ScheduleReason::Injected,
            },
        );
        Self { items }
    }

    fn push(&mut self, item: ScheduledObjective) {
        // Capacity covers every objective; a full stack only happens with an
        // injection, which never goes through here.
        let _ = self.items.try_push(item);
    }
}

/// Builds [`ScheduledStack`]s from the catalogue and the current views.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookaheadPlanner {
    model: BuildModel,
    target: TargetId,
}

impl LookaheadPlanner {
    pub fn new(model: BuildModel) -> Self {
        Self {
            model,
            target: TargetId::PRIMARY,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = target;
        self
    }

    pub fn model(&self) -> &BuildModel {
        &self.model
    }

    /// Produces the execution order over the upcoming horizon.
    pub fn advance_plan<E: EffectView + ?Sized>(
        &self,
        catalogue: &Catalogue,
        resources: &ResourceSnapshot,
        effects: &E,
        now: SimTime,
    ) -> ScheduledStack {
        let rate = resources.accrual_rate;
        let candidates = catalogue
            .iter()
            .filter(|(_, objective)| !objective.is_exhausted())
            .map(|(index, objective)| {
                let expires_at = match objective.linked_effect {
                    Some(effect) if effects.is_active(effect, self.target, now) => {
                        effects.expires_at(effect, self.target, now)
                    }
                    _ => now,
                };
                ScheduledObjective {
                    objective: index,
                    expires_at,
                    min_build: self
                        .model
                        .time_to_build(objective.min_points, objective.cost, rate),
                    max_build: self
                        .model
                        .time_to_build(objective.max_casts, objective.cost, rate),
                    reason: ScheduleReason::Slack,
                }
            });

        let mut clock = now;
        let mut points = resources.points;
        let mut energy = resources.energy;
        let mut stack = ScheduledStack::empty();

        for mut item in candidates {
            let Some(objective) = catalogue.get(item.objective) else {
                continue;
            };

            let latest_start = if objective.linked_effect.is_some() {
                item.expires_at - item.max_build
            } else {
                // Unlinked objectives never have slack: resources on hand are
                // already owed to them.
                let banked = f64::from(points) * self.model.builder_cost
                    / f64::from(self.model.builder_points.max(1))
                    + energy;
                let banked_time = if rate > 0.0 {
                    SimDuration::from_secs_f64(banked / rate)
                } else {
                    SimDuration::ZERO
                };
                clock - item.max_build - banked_time
            };

            if clock < latest_start {
                item.reason = ScheduleReason::Slack;
                stack.push(item);
                if objective.min_points > 0 {
                    points = 0;
                }
                clock += item.max_build;
                continue;
            }

            let points_needed = objective.min_points.saturating_sub(points);
            let energy_needed = (objective.cost - energy).max(0.0);
            let min_build = self.model.time_to_build(points_needed, energy_needed, rate);

            if clock + min_build <= item.expires_at {
                item.reason = ScheduleReason::Deadline;
                stack.push(item);
                clock = item.expires_at;
            } else if let Some(cause) = self.catch_up_cause(&stack, objective, effects, now) {
                item.reason = ScheduleReason::CatchUp(cause);
                stack.push(item);
                clock += item.min_build;
            } else {
                tracing::trace!(action = %objective.action, "objective dropped from this pass");
                continue;
            }
            energy = 0.0;
            if objective.min_points > 0 {
                points = 0;
            }
        }

        stack.items.reverse();
        tracing::debug!(
            now = %now,
            depth = stack.len(),
            head = ?stack.head().and_then(|h| catalogue.get(h.objective)).map(|o| o.action),
            "planned rotation"
        );
        stack
    }

    fn catch_up_cause<E: EffectView + ?Sized>(
        &self,
        stack: &ScheduledStack,
        objective: &Objective,
        effects: &E,
        now: SimTime,
    ) -> Option<CatchUpCause> {
        let lapsed = objective
            .linked_effect
            .is_some_and(|effect| !effects.is_active(effect, self.target, now));
        if lapsed {
            return Some(CatchUpCause::EffectLapsed);
        }
        if objective.is_single_cast() {
            return Some(CatchUpCause::SingleCast);
        }
        if stack.is_empty() {
            return Some(CatchUpCause::EmptyStack);
        }
        None
    }
}
