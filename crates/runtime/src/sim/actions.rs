//! Static rules for every action the simulated agent can perform.

use rotation_core::{ActionId, EffectId, SimDuration};

use super::pools::RuneCost;

/// How an action interacts with pools and the global cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRules {
    /// Threshold points awarded when the action lands.
    pub awards_points: u32,
    /// Consumes every threshold point when it lands.
    pub finisher: bool,
    pub on_gcd: bool,
    /// Self-targeted; never rolls for a hit.
    pub always_lands: bool,
    pub runes: RuneCost,
}

const fn rules(awards_points: u32, finisher: bool, always_lands: bool) -> ActionRules {
    ActionRules {
        awards_points,
        finisher,
        on_gcd: true,
        always_lands,
        runes: RuneCost::NONE,
    }
}

const fn runic(blood: u32, frost: u32, unholy: u32) -> ActionRules {
    ActionRules {
        awards_points: 0,
        finisher: false,
        on_gcd: true,
        always_lands: false,
        runes: RuneCost {
            blood,
            frost,
            unholy,
        },
    }
}

pub const fn rules_for(action: ActionId) -> ActionRules {
    match action {
        ActionId::SinisterStrike => rules(1, false, false),
        ActionId::Mutilate => rules(2, false, false),
        ActionId::SliceAndDice => rules(0, true, true),
        ActionId::HungerForBlood => rules(0, false, true),
        ActionId::EnableCooldowns => ActionRules {
            on_gcd: false,
            ..rules(0, false, true)
        },
        ActionId::ExposeArmor | ActionId::Rupture | ActionId::Eviscerate | ActionId::Envenom => {
            rules(0, true, false)
        }
        ActionId::FanOfKnives => rules(0, false, false),
        ActionId::IcyTouch => runic(0, 1, 0),
        ActionId::PlagueStrike => runic(0, 0, 1),
        ActionId::Pestilence => runic(1, 0, 0),
        ActionId::ScourgeStrike => runic(0, 1, 1),
        ActionId::BloodStrike => runic(1, 0, 0),
    }
}

/// Durations of the two periodic pair effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicTiming {
    pub duration: SimDuration,
    pub tick: SimDuration,
}

impl Default for PeriodicTiming {
    fn default() -> Self {
        Self {
            duration: SimDuration::from_secs(15),
            tick: SimDuration::from_secs(3),
        }
    }
}

const RUPTURE_TICK: SimDuration = SimDuration::from_secs(2);

/// Duration and tick cadence of `effect` when applied by a finisher that
/// spent `points`.
pub fn effect_timing(
    effect: EffectId,
    points: u32,
    periodic: PeriodicTiming,
) -> (SimDuration, Option<SimDuration>) {
    let points = i64::from(points);
    let secs = SimDuration::from_secs;
    match effect {
        EffectId::SliceAndDice => (secs(6 + 3 * points), None),
        EffectId::Envenom => (secs(1 + points), None),
        EffectId::HungerForBlood => (secs(60), None),
        EffectId::ExposeArmor => (secs(6 * points), None),
        EffectId::Rupture => (secs(4 + 2 * points), Some(RUPTURE_TICK)),
        EffectId::FrostFever | EffectId::BloodPlague => (periodic.duration, Some(periodic.tick)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finisher_durations_scale_with_points() {
        let periodic = PeriodicTiming::default();
        assert_eq!(
            effect_timing(EffectId::SliceAndDice, 2, periodic).0,
            SimDuration::from_secs(12)
        );
        assert_eq!(
            effect_timing(EffectId::Rupture, 5, periodic),
            (SimDuration::from_secs(14), Some(RUPTURE_TICK))
        );
        assert_eq!(
            effect_timing(EffectId::FrostFever, 0, periodic),
            (SimDuration::from_secs(15), Some(SimDuration::from_secs(3)))
        );
    }

    #[test]
    fn cooldown_release_is_off_the_global_cooldown() {
        assert!(!rules_for(ActionId::EnableCooldowns).on_gcd);
        assert!(rules_for(ActionId::SinisterStrike).on_gcd);
        assert_eq!(rules_for(ActionId::ScourgeStrike).runes.unholy, 1);
    }

    #[test]
    fn point_spenders_match_the_catalogue_finishers() {
        use strum::IntoEnumIterator;

        for action in ActionId::iter() {
            assert_eq!(rules_for(action).finisher, action.is_finisher(), "{action}");
        }
    }
}
