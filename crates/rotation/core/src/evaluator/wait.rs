//! Wait targets: what the driver should advance the clock toward.

use crate::catalogue::Objective;
use crate::config::TimingConfig;
use crate::env::ResourceSnapshot;
use crate::ids::PoolId;
use crate::planner::{BuildModel, ScheduledObjective, ScheduledStack};
use crate::time::{SimDuration, SimTime};

/// Instruction carried by a Wait decision.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaitTarget {
    /// Advance until `pool` holds at least `level`.
    ResourceAtLeast { pool: PoolId, level: f64 },
    /// Advance to a fixed instant.
    Until(SimTime),
    /// Nothing worth waiting for; re-evaluate at the next decision point.
    NextDecision,
}

/// Slack added to the energy estimate before it is compared against the
/// next expiration.
const ENERGY_ESTIMATE_SLACK: SimDuration = SimDuration::from_secs(1);

/// Energy level the agent should pool to before acting again.
///
/// Returns `None` when every pool is already capped, which no Wait can fix.
pub(super) fn desired_energy(
    objective: &Objective,
    model: &BuildModel,
    resources: &ResourceSnapshot,
) -> Option<f64> {
    if resources.points >= resources.points_cap {
        if resources.energy >= resources.energy_cap {
            return None;
        }
        return Some(objective.cost);
    }
    if resources.energy < objective.cost && resources.points >= objective.min_points {
        Some(objective.cost)
    } else {
        Some(model.builder_cost)
    }
}

/// Earliest instant anything on the plan needs attention, bounded by the
/// cooldown release while it has not passed yet.
pub(super) fn next_expiration(
    stack: &ScheduledStack,
    timing: &TimingConfig,
    now: SimTime,
) -> SimTime {
    let release = SimTime::ZERO + timing.cooldown_release();
    let release = if now > release { SimTime::NEVER } else { release };
    stack
        .next_expiration()
        .map_or(release, |expiration| expiration.min(release))
}

pub(super) fn wait_target(
    head: &ScheduledObjective,
    desired: f64,
    stack: &ScheduledStack,
    timing: &TimingConfig,
    resources: &ResourceSnapshot,
    now: SimTime,
) -> WaitTarget {
    let needed = desired - resources.energy;
    if needed <= 0.0 {
        // Nothing to pool for: hold until the head's clipping window opens.
        let window_opens = head.expires_at - timing.clipping_window();
        return if window_opens > now {
            WaitTarget::Until(window_opens)
        } else {
            WaitTarget::NextDecision
        };
    }

    let next_expiration = next_expiration(stack, timing, now);
    let energy_at = if resources.accrual_rate > 0.0 {
        now + SimDuration::from_secs_f64(needed / resources.accrual_rate) + ENERGY_ESTIMATE_SLACK
    } else {
        SimTime::NEVER
    };

    if energy_at < next_expiration {
        WaitTarget::ResourceAtLeast {
            pool: PoolId::Energy,
            level: desired,
        }
    } else if next_expiration > now {
        WaitTarget::Until(next_expiration)
    } else {
        WaitTarget::NextDecision
    }
}
