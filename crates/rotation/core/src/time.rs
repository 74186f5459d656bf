//! Simulated time.
//!
//! The core never reads a wall clock. All instants are expressed as
//! [`SimTime`], milliseconds since the start of a trial, and all spans as
//! [`SimDuration`]. Both are signed so that planning arithmetic such as
//! `expires_at - build_duration` may go below zero without wrapping.
//!
//! Arithmetic saturates: `SimTime::NEVER` plus any span stays `NEVER`.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Instant on the simulated timeline, in milliseconds since trial start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub i64);

/// Signed span of simulated time, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimDuration(pub i64);

impl SimTime {
    pub const ZERO: Self = Self(0);

    /// Expiration used by objectives and effects that never lapse.
    pub const NEVER: Self = Self(i64::MAX);

    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1000.0).round() as i64)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub const fn is_never(self) -> bool {
        self.0 == i64::MAX
    }

    /// Span from `earlier` to `self`, clamped at zero.
    pub fn saturating_since(self, earlier: SimTime) -> SimDuration {
        SimDuration((self.0.saturating_sub(earlier.0)).max(0))
    }
}

impl SimDuration {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Converts fractional seconds, rounding up to the next millisecond so a
    /// build estimate is never optimistic.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() {
            return if secs.is_sign_negative() {
                Self(i64::MIN)
            } else {
                Self(i64::MAX)
            };
        }
        Self((secs * 1000.0).ceil() as i64)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl Add<SimDuration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimDuration) -> SimTime {
        if self.is_never() {
            return self;
        }
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<SimDuration> for SimTime {
    fn add_assign(&mut self, rhs: SimDuration) {
        *self = *self + rhs;
    }
}

impl Sub<SimDuration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimDuration) -> SimTime {
        if self.is_never() {
            return self;
        }
        SimTime(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign<SimDuration> for SimTime {
    fn sub_assign(&mut self, rhs: SimDuration) {
        *self = *self - rhs;
    }
}

impl Sub<SimTime> for SimTime {
    type Output = SimDuration;

    fn sub(self, rhs: SimTime) -> SimDuration {
        SimDuration(self.0.saturating_sub(rhs.0))
    }
}

impl Add for SimDuration {
    type Output = SimDuration;

    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0.saturating_add(rhs.0))
    }
}

impl Sub for SimDuration {
    type Output = SimDuration;

    fn sub(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for SimDuration {
    type Output = SimDuration;

    fn mul(self, rhs: i64) -> SimDuration {
        SimDuration(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "never")
        } else {
            write!(f, "{:.3}s", self.as_secs_f64())
        }
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_absorbs_arithmetic() {
        assert_eq!(SimTime::NEVER + SimDuration::from_secs(5), SimTime::NEVER);
        assert_eq!(SimTime::NEVER - SimDuration::from_secs(5), SimTime::NEVER);
    }

    #[test]
    fn planning_arithmetic_may_go_negative() {
        let t = SimTime::from_millis(500) - SimDuration::from_secs(2);
        assert_eq!(t, SimTime(-1500));
        assert!((SimTime::ZERO - SimTime::from_millis(10)).is_negative());
    }

    #[test]
    fn fractional_seconds_round_up() {
        assert_eq!(SimDuration::from_secs_f64(0.0011), SimDuration(2));
        assert_eq!(SimDuration::from_secs_f64(2.5), SimDuration(2500));
    }

    #[test]
    fn saturating_since_clamps() {
        let a = SimTime::from_millis(100);
        let b = SimTime::from_millis(300);
        assert_eq!(b.saturating_since(a), SimDuration(200));
        assert_eq!(a.saturating_since(b), SimDuration::ZERO);
    }
}
