//! Build-duration estimates for the threshold resource.

use crate::ids::ActionId;
use crate::time::SimDuration;

/// How the agent accumulates the threshold resource.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildModel {
    pub builder: ActionId,
    /// Energy cost of one builder action.
    pub builder_cost: f64,
    /// Threshold points awarded per builder action.
    pub builder_points: u32,
    pub global_cooldown: SimDuration,
}

impl BuildModel {
    /// Builder actions required to gain `points`.
    pub fn builders_needed(&self, points: u32) -> u32 {
        points.div_ceil(self.builder_points.max(1))
    }

    /// Energy spent on builders to gain `points`.
    pub fn energy_to_build(&self, points: u32) -> f64 {
        f64::from(self.builders_needed(points)) * self.builder_cost
    }

    /// Time to gain `points` and afford `extra_cost` on top, starting empty.
    ///
    /// The greater of the energy accrual time at `rate` per second and the
    /// global cooldowns consumed (one per builder plus one for the objective).
    pub fn time_to_build(&self, points: u32, extra_cost: f64, rate: f64) -> SimDuration {
        let energy = self.energy_to_build(points) + extra_cost;
        let by_energy = if energy <= 0.0 {
            SimDuration::ZERO
        } else if rate <= 0.0 {
            SimDuration::from_secs_f64(f64::INFINITY)
        } else {
            SimDuration::from_secs_f64(energy / rate)
        };
        let globals = i64::from(self.builders_needed(points)) + 1;
        by_energy.max(self.global_cooldown * globals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(points: u32) -> BuildModel {
        BuildModel {
            builder: ActionId::SinisterStrike,
            builder_cost: 40.0,
            builder_points: points,
            global_cooldown: SimDuration::from_secs(1),
        }
    }

    #[test]
    fn energy_bound_dominates_at_low_rate() {
        // 3 builders (120) + 35 = 155 energy at 10/s
        assert_eq!(
            model(1).time_to_build(3, 35.0, 10.0),
            SimDuration::from_millis(15_500)
        );
    }

    #[test]
    fn global_cooldowns_dominate_at_high_rate() {
        // 3 builders + the objective itself
        assert_eq!(
            model(1).time_to_build(3, 0.0, 1_000.0),
            SimDuration::from_secs(4)
        );
    }

    #[test]
    fn double_point_builder_halves_builders() {
        assert_eq!(model(2).builders_needed(5), 3);
        assert!((model(2).energy_to_build(4) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_rate_never_finishes() {
        assert!(model(1).time_to_build(1, 0.0, 0.0) > SimDuration::from_secs(1_000_000));
    }
}
