//! Action execution and clock collaborators.

use crate::ids::{ActionId, PoolId, TargetId};
use crate::time::SimTime;

/// Result of asking the executor to perform an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttemptOutcome {
    /// The action was performed and its outcome landed.
    Landed,
    /// The action was performed (costs paid) but the outcome roll missed.
    Missed,
    /// The action could not be performed at all (unaffordable, on cooldown).
    Rejected,
}

impl AttemptOutcome {
    pub const fn landed(self) -> bool {
        matches!(self, Self::Landed)
    }

    /// True when the action was actually performed, whether or not it landed.
    pub const fn performed(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Performs actions on behalf of the core.
///
/// Side effects on pools and effects are opaque to the core beyond the
/// returned outcome.
pub trait ActionExecutor {
    fn attempt(&mut self, action: ActionId, target: TargetId) -> AttemptOutcome;
}

/// Simulation clock owned by the driver.
///
/// The core never waits; a Wait decision is an instruction for the driver to
/// advance this clock and invoke the core again.
pub trait Clock {
    fn now(&self) -> SimTime;

    /// Advances to `at`. Instants in the past are ignored.
    fn advance_to(&mut self, at: SimTime);

    /// Advances until `pool` holds at least `level`, or until `limit`,
    /// whichever comes first. Returns the instant reached.
    fn advance_until_resource_at_least(&mut self, pool: PoolId, level: f64, limit: SimTime)
    -> SimTime;
}
