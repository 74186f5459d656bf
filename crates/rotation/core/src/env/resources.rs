//! Resource pool queries and the snapshot the planner works from.

use core::fmt;

use crate::ids::PoolId;
use crate::time::{SimDuration, SimTime};

/// Read-only queries against the agent's resource pools.
///
/// Continuous pools report fractional amounts; charge pools report whole
/// units as `f64`. Implementations must never report a negative amount.
pub trait ResourceView {
    /// Amount currently available in `pool`.
    fn current_amount(&self, pool: PoolId) -> f64;

    /// Hard cap of `pool`.
    fn capacity(&self, pool: PoolId) -> f64;

    /// Time until the next whole unit of `pool` becomes available.
    ///
    /// Zero when a unit is available right now.
    fn time_to_next_unit(&self, pool: PoolId, now: SimTime) -> SimDuration;

    /// Expected accrual rate of `pool` in units per second, including
    /// expected procs and refunds.
    fn expected_rate_per_second(&self, pool: PoolId) -> f64;
}

/// Immutable capture of the pools the lookahead planner and evaluator read.
///
/// The evaluator treats this snapshot as authoritative for the immediate
/// next action; a rejected attempt that the snapshot said was affordable is
/// a fatal planning error.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceSnapshot {
    pub energy: f64,
    pub energy_cap: f64,
    /// Threshold resource (combo-point equivalent).
    pub points: u32,
    pub points_cap: u32,
    /// Expected energy accrual per second.
    pub accrual_rate: f64,
}

impl ResourceSnapshot {
    /// Captures the energy and threshold pools from a view.
    pub fn capture<V: ResourceView + ?Sized>(view: &V) -> Self {
        Self {
            energy: view.current_amount(PoolId::Energy).max(0.0),
            energy_cap: view.capacity(PoolId::Energy),
            points: view.current_amount(PoolId::ComboPoints).max(0.0) as u32,
            points_cap: view.capacity(PoolId::ComboPoints) as u32,
            accrual_rate: view.expected_rate_per_second(PoolId::Energy),
        }
    }

    /// True when every pool sits at its cap.
    pub fn is_capped(&self) -> bool {
        self.points >= self.points_cap && self.energy >= self.energy_cap
    }
}

impl fmt::Display for ResourceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "energy {:.1}/{:.0} points {}/{} rate {:.2}/s",
            self.energy, self.energy_cap, self.points, self.points_cap, self.accrual_rate
        )
    }
}

/// State of one charge pool as it would be after the pending action spends
/// its cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargeProjection {
    /// Units of this pool the pending action consumes.
    pub cost: u32,
    /// Units left available right after the spend.
    pub units_after: u32,
    /// Instant the next unit of this pool becomes available after the spend.
    pub next_unit_at: SimTime,
}

impl ChargeProjection {
    /// Projection for a pool the pending action does not touch.
    pub fn untouched<V: ResourceView + ?Sized>(view: &V, pool: PoolId, now: SimTime) -> Self {
        Self {
            cost: 0,
            units_after: view.current_amount(pool).max(0.0) as u32,
            next_unit_at: now + view.time_to_next_unit(pool, now),
        }
    }

    /// True when the spend leaves the pool empty.
    pub const fn is_starved(&self) -> bool {
        self.cost > 0 && self.units_after == 0
    }
}
