//! Catalogue construction from configuration.
//!
//! Ordering encodes domain precedence: maintenance buffs first, then
//! multi-target behavior, then the finisher choice. A no-cost "allow
//! cooldowns" objective is always present, so a built catalogue is never
//! empty.

use bitflags::bitflags;

use super::{Catalogue, CatalogueError, Objective};
use crate::config::{
    CatalogueConfig, DirectFinisherPriority, Frequency, PoisonFinisherPriority, RotationConfig,
};
use crate::ids::{ActionId, EffectId};
use crate::planner::BuildModel;

bitflags! {
    /// Talents that change which objectives exist and how the builder works.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Talents: u8 {
        /// Builder awards two threshold points instead of one.
        const MUTILATE = 1 << 0;
        /// Adds the empowerment buff objective.
        const HUNGER_FOR_BLOOD = 1 << 1;
        /// Poison-finisher talent.
        const MASTER_POISONER = 1 << 2;
        /// Poison-finisher talent.
        const CUT_TO_THE_CHASE = 1 << 3;
    }
}

impl Talents {
    /// True when the poison finisher replaces the direct finisher.
    pub fn uses_poison_finisher(self) -> bool {
        self.intersects(Self::MASTER_POISONER | Self::CUT_TO_THE_CHASE)
    }
}

/// Energy cost of every action the catalogue may reference.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostTable {
    pub sinister_strike: f64,
    pub mutilate: f64,
    pub slice_and_dice: f64,
    pub expose_armor: f64,
    pub hunger_for_blood: f64,
    pub rupture: f64,
    pub eviscerate: f64,
    pub envenom: f64,
    pub fan_of_knives: f64,
}

impl CostTable {
    /// Energy cost of `action`; zero for actions outside the energy economy.
    pub fn cost(&self, action: ActionId) -> f64 {
        match action {
            ActionId::SinisterStrike => self.sinister_strike,
            ActionId::Mutilate => self.mutilate,
            ActionId::SliceAndDice => self.slice_and_dice,
            ActionId::ExposeArmor => self.expose_armor,
            ActionId::HungerForBlood => self.hunger_for_blood,
            ActionId::Rupture => self.rupture,
            ActionId::Eviscerate => self.eviscerate,
            ActionId::Envenom => self.envenom,
            ActionId::FanOfKnives => self.fan_of_knives,
            _ => 0.0,
        }
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            sinister_strike: 40.0,
            mutilate: 60.0,
            slice_and_dice: 25.0,
            expose_armor: 25.0,
            hunger_for_blood: 15.0,
            rupture: 25.0,
            eviscerate: 35.0,
            envenom: 35.0,
            fan_of_knives: 50.0,
        }
    }
}

/// Builds the priority-ordered catalogue and the matching build model.
#[derive(Clone, Debug)]
pub struct CatalogueBuilder<'a> {
    config: &'a RotationConfig,
    talents: Talents,
    costs: &'a CostTable,
    targets: u32,
}

impl<'a> CatalogueBuilder<'a> {
    pub fn new(config: &'a RotationConfig, costs: &'a CostTable) -> Self {
        Self {
            config,
            talents: Talents::empty(),
            costs,
            targets: 1,
        }
    }

    #[must_use]
    pub fn talents(mut self, talents: Talents) -> Self {
        self.talents = talents;
        self
    }

    #[must_use]
    pub fn targets(mut self, targets: u32) -> Self {
        self.targets = targets.max(1);
        self
    }

    fn is_multi_target(&self) -> bool {
        self.targets > self.config.catalogue.multi_target_above
    }

    /// Builder action and its yield, chosen by talents.
    pub fn build_model(&self) -> BuildModel {
        let (builder, points) = if self.talents.contains(Talents::MUTILATE) {
            (ActionId::Mutilate, 2)
        } else {
            (ActionId::SinisterStrike, 1)
        };
        BuildModel {
            builder,
            builder_cost: self.costs.cost(builder),
            builder_points: points,
            global_cooldown: self.config.timing.global_cooldown(),
        }
    }

    pub fn build(&self) -> Result<Catalogue, CatalogueError> {
        let rules = &self.config.catalogue;
        let cap = RotationConfig::MAX_POINTS;
        if rules.min_points_secondary_finisher > cap {
            return Err(CatalogueError::SecondaryFinisherOutOfRange {
                points: rules.min_points_secondary_finisher,
                cap,
            });
        }

        let mut objectives = Vec::with_capacity(RotationConfig::MAX_OBJECTIVES);

        // Maintenance buff
        let buff = Objective::new(ActionId::SliceAndDice, 1, cap, self.costs.slice_and_dice)
            .linked_to(EffectId::SliceAndDice);
        if self.is_multi_target() {
            match rules.multi_target_buff_frequency {
                Frequency::Never => {}
                Frequency::Once => objectives.push(Objective {
                    min_points: rules.min_points_multi_target_buff,
                    max_casts: 1,
                    ..buff
                }),
                Frequency::Maintain => objectives.push(Objective {
                    min_points: rules.min_points_multi_target_buff,
                    ..buff
                }),
            }
        } else {
            objectives.push(buff);
        }

        // Armor debuff
        match rules.armor_debuff_frequency {
            Frequency::Never => {}
            Frequency::Maintain => objectives.push(
                Objective::new(ActionId::ExposeArmor, 1, cap, self.costs.expose_armor)
                    .linked_to(EffectId::ExposeArmor),
            ),
            Frequency::Once => objectives.push(
                Objective::new(
                    ActionId::ExposeArmor,
                    rules.min_points_armor_debuff,
                    cap,
                    self.costs.expose_armor,
                )
                .linked_to(EffectId::ExposeArmor)
                .with_max_casts(1),
            ),
        }

        if self.talents.contains(Talents::HUNGER_FOR_BLOOD) {
            objectives.push(
                Objective::new(ActionId::HungerForBlood, 0, 0, self.costs.hunger_for_blood)
                    .linked_to(EffectId::HungerForBlood),
            );
        }

        objectives.push(Objective::new(ActionId::EnableCooldowns, 0, 0, 0.0).with_max_casts(1));

        if self.is_multi_target() {
            objectives.push(Objective::new(
                ActionId::FanOfKnives,
                0,
                0,
                self.costs.fan_of_knives,
            ));
        } else {
            self.push_finishers(rules, &mut objectives);
        }

        let catalogue = Catalogue::new(objectives)?;
        tracing::debug!(
            objectives = catalogue.len(),
            targets = self.targets,
            "built objective catalogue"
        );
        Ok(catalogue)
    }

    fn push_finishers(&self, rules: &CatalogueConfig, objectives: &mut Vec<Objective>) {
        let cap = RotationConfig::MAX_POINTS;
        let rupture = Objective::new(ActionId::Rupture, 3, cap, self.costs.rupture)
            .linked_to(EffectId::Rupture);
        let direct = if self.talents.uses_poison_finisher() {
            Objective::new(ActionId::Envenom, 1, cap, self.costs.envenom)
                .linked_to(EffectId::Envenom)
        } else {
            Objective::new(ActionId::Eviscerate, 1, cap, self.costs.eviscerate)
        };

        let rupture_first = if self.talents.uses_poison_finisher() {
            rules.poison_finisher_priority == PoisonFinisherPriority::RuptureEnvenom
        } else {
            rules.direct_finisher_priority == DirectFinisherPriority::RuptureEviscerate
        };
        let (primary, secondary) = if rupture_first {
            (rupture, direct)
        } else {
            (direct, rupture)
        };

        objectives.push(Objective {
            min_points: rules.min_points_primary_finisher.max(1),
            ..primary
        });
        let secondary_min = rules.min_points_secondary_finisher;
        if secondary_min > 0 && secondary_min <= cap {
            objectives.push(Objective {
                min_points: secondary_min,
                ..secondary
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(catalogue: &Catalogue) -> Vec<ActionId> {
        catalogue.iter().map(|(_, o)| o.action).collect()
    }

    #[test]
    fn single_target_orders_buff_filler_then_finishers() {
        let config = RotationConfig::default();
        let costs = CostTable::default();
        let catalogue = CatalogueBuilder::new(&config, &costs).build().unwrap();

        assert_eq!(
            actions(&catalogue),
            vec![
                ActionId::SliceAndDice,
                ActionId::EnableCooldowns,
                ActionId::Rupture,
                ActionId::Eviscerate,
            ]
        );
        assert_eq!(catalogue.get(2).unwrap().min_points, 4);
        assert_eq!(catalogue.get(3).unwrap().min_points, 5);
    }

    #[test]
    fn poison_talents_swap_in_envenom() {
        let mut config = RotationConfig::default();
        config.catalogue.poison_finisher_priority = PoisonFinisherPriority::EnvenomRupture;
        config.catalogue.min_points_primary_finisher = 0;
        let costs = CostTable::default();
        let catalogue = CatalogueBuilder::new(&config, &costs)
            .talents(Talents::MUTILATE | Talents::HUNGER_FOR_BLOOD | Talents::MASTER_POISONER)
            .build()
            .unwrap();

        assert_eq!(
            actions(&catalogue),
            vec![
                ActionId::SliceAndDice,
                ActionId::HungerForBlood,
                ActionId::EnableCooldowns,
                ActionId::Envenom,
                ActionId::Rupture,
            ]
        );
        // Primary finisher never drops below one point.
        assert_eq!(catalogue.get(3).unwrap().min_points, 1);
    }

    #[test]
    fn multi_target_replaces_finishers_with_area_filler() {
        let mut config = RotationConfig::default();
        config.catalogue.multi_target_buff_frequency = Frequency::Once;
        config.catalogue.min_points_multi_target_buff = 2;
        let costs = CostTable::default();
        let catalogue = CatalogueBuilder::new(&config, &costs)
            .targets(5)
            .build()
            .unwrap();

        assert_eq!(
            actions(&catalogue),
            vec![
                ActionId::SliceAndDice,
                ActionId::EnableCooldowns,
                ActionId::FanOfKnives,
            ]
        );
        let buff = catalogue.get(0).unwrap();
        assert_eq!(buff.min_points, 2);
        assert!(buff.is_single_cast());
    }

    #[test]
    fn disabled_secondary_finisher_is_omitted() {
        let mut config = RotationConfig::default();
        config.catalogue.min_points_secondary_finisher = 0;
        let costs = CostTable::default();
        let catalogue = CatalogueBuilder::new(&config, &costs).build().unwrap();
        assert_eq!(catalogue.position(ActionId::Eviscerate), None);
    }

    #[test]
    fn out_of_range_secondary_finisher_is_rejected() {
        let mut config = RotationConfig::default();
        config.catalogue.min_points_secondary_finisher = 7;
        let costs = CostTable::default();
        let result = CatalogueBuilder::new(&config, &costs).build();
        assert_eq!(
            result,
            Err(CatalogueError::SecondaryFinisherOutOfRange { points: 7, cap: 5 })
        );
    }

    #[test]
    fn armor_debuff_once_uses_configured_threshold() {
        let mut config = RotationConfig::default();
        config.catalogue.armor_debuff_frequency = Frequency::Once;
        config.catalogue.min_points_armor_debuff = 3;
        let costs = CostTable::default();
        let catalogue = CatalogueBuilder::new(&config, &costs).build().unwrap();
        let debuff = catalogue
            .get(catalogue.position(ActionId::ExposeArmor).unwrap())
            .unwrap();
        assert_eq!(debuff.min_points, 3);
        assert_eq!(debuff.max_casts, 1);
    }

    #[test]
    fn zero_threshold_finishers_are_rejected_at_build_time() {
        let mut config = RotationConfig::default();
        config.catalogue.armor_debuff_frequency = Frequency::Once;
        config.catalogue.min_points_armor_debuff = 0;
        let costs = CostTable::default();
        assert_eq!(
            CatalogueBuilder::new(&config, &costs).build(),
            Err(CatalogueError::FinisherWithoutThreshold {
                action: ActionId::ExposeArmor
            })
        );

        let mut config = RotationConfig::default();
        config.catalogue.min_points_multi_target_buff = 0;
        assert!(CatalogueBuilder::new(&config, &costs).build().is_ok());
        assert_eq!(
            CatalogueBuilder::new(&config, &costs).targets(5).build(),
            Err(CatalogueError::FinisherWithoutThreshold {
                action: ActionId::SliceAndDice
            })
        );
    }

    #[test]
    fn mutilate_builds_two_points() {
        let config = RotationConfig::default();
        let costs = CostTable::default();
        let model = CatalogueBuilder::new(&config, &costs)
            .talents(Talents::MUTILATE)
            .build_model();
        assert_eq!(model.builder, ActionId::Mutilate);
        assert_eq!(model.builder_points, 2);
        assert!((model.builder_cost - 60.0).abs() < f64::EPSILON);
    }
}
