//! Scenario files describing one kind of trial.
//!
//! A scenario fixes everything that is not planner configuration: how long a
//! trial runs, how many targets are present, the hit chance, and which agent
//! profile is simulated. Scenarios are stored as RON so they can carry the
//! profile enum directly.

use std::path::Path;

use ron::extensions::Extensions;
use rotation_core::{CostTable, EffectId, RotationConfig, SimDuration, Talents};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};
use crate::sim::{AgentSetup, EnergySetup, PeriodicTiming, RuneSetup};

/// Agent being simulated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AgentProfile {
    /// Energy and threshold points, driven by the rotation engine.
    Rogue {
        #[serde(default)]
        talents: Talents,
        energy_cap: f64,
        /// Energy regenerated per second.
        energy_rate: f64,
        #[serde(default)]
        costs: CostTable,
    },
    /// Recharging runes and a periodic pair, driven by the pair controller.
    Pair {
        rune_recharge_ms: i64,
        #[serde(default)]
        convert_blood: bool,
        disease_duration_ms: i64,
        disease_tick_ms: i64,
    },
}

/// Scenario configuration for a batch of trials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    /// Simulated length of each trial.
    pub duration_ms: i64,

    #[serde(default = "default_targets")]
    pub targets: u32,

    /// Probability that a rolled action lands.
    #[serde(default = "default_hit_chance")]
    pub hit_chance: f64,

    pub agent: AgentProfile,
}

fn default_targets() -> u32 {
    1
}

fn default_hit_chance() -> f64 {
    1.0
}

impl Scenario {
    pub fn duration(&self) -> SimDuration {
        SimDuration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_ms <= 0 {
            return Err(RuntimeError::InvalidScenario(format!(
                "{}: duration must be positive, got {}ms",
                self.name, self.duration_ms
            )));
        }
        if self.targets == 0 {
            return Err(RuntimeError::InvalidScenario(format!(
                "{}: at least one target is required",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.hit_chance) {
            return Err(RuntimeError::InvalidScenario(format!(
                "{}: hit chance {} outside 0..=1",
                self.name, self.hit_chance
            )));
        }
        match &self.agent {
            AgentProfile::Rogue {
                energy_cap,
                energy_rate,
                ..
            } if *energy_cap <= 0.0 || *energy_rate < 0.0 => {
                Err(RuntimeError::InvalidScenario(format!(
                    "{}: energy cap must be positive and rate non-negative",
                    self.name
                )))
            }
            AgentProfile::Pair {
                rune_recharge_ms,
                disease_duration_ms,
                disease_tick_ms,
                ..
            } if *rune_recharge_ms <= 0 || *disease_tick_ms <= 0 || *disease_duration_ms <= 0 => {
                Err(RuntimeError::InvalidScenario(format!(
                    "{}: rune recharge and disease timings must be positive",
                    self.name
                )))
            }
            _ => Ok(()),
        }
    }

    /// Replaces the energy cost table of a rogue profile.
    ///
    /// Returns false for profiles that do not spend energy.
    pub fn set_costs(&mut self, table: CostTable) -> bool {
        match &mut self.agent {
            AgentProfile::Rogue { costs, .. } => {
                *costs = table;
                true
            }
            AgentProfile::Pair { .. } => false,
        }
    }

    /// Agent construction parameters for this scenario.
    pub fn agent_setup(&self, config: &RotationConfig, watched: Vec<EffectId>) -> AgentSetup {
        let mut setup = AgentSetup {
            hit_chance: self.hit_chance,
            global_cooldown: config.timing.global_cooldown(),
            targets: self.targets,
            watched,
            ..AgentSetup::default()
        };
        match &self.agent {
            AgentProfile::Rogue {
                energy_cap,
                energy_rate,
                costs,
                ..
            } => {
                setup.energy = Some(EnergySetup {
                    cap: *energy_cap,
                    rate: *energy_rate,
                });
                setup.costs = costs.clone();
            }
            AgentProfile::Pair {
                rune_recharge_ms,
                convert_blood,
                disease_duration_ms,
                disease_tick_ms,
            } => {
                setup.runes = Some(RuneSetup {
                    recharge: SimDuration::from_millis(*rune_recharge_ms),
                    convert_blood: *convert_blood,
                });
                setup.periodic = PeriodicTiming {
                    duration: SimDuration::from_millis(*disease_duration_ms),
                    tick: SimDuration::from_millis(*disease_tick_ms),
                };
            }
        }
        setup
    }

    /// Parses a scenario from RON text and validates it.
    pub fn from_ron(content: &str) -> Result<Self> {
        // Talents are a bitflags newtype; files write the flags string bare.
        let options = ron::Options::default().with_default_extension(Extensions::UNWRAP_NEWTYPES);
        let scenario: Scenario = options.from_str(content).map_err(|e| {
            RuntimeError::InvalidScenario(format!("Failed to parse scenario RON: {}", e))
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidScenario(format!(
                "Failed to read scenario file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_ron(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROGUE: &str = r#"(
        name: "assassination",
        duration_ms: 120000,
        hit_chance: 0.95,
        agent: Rogue(
            talents: "MUTILATE | HUNGER_FOR_BLOOD",
            energy_cap: 100.0,
            energy_rate: 10.0,
        ),
    )"#;

    #[test]
    fn parses_rogue_profile_with_defaults() {
        let scenario = Scenario::from_ron(ROGUE).unwrap();
        assert_eq!(scenario.targets, 1);
        let AgentProfile::Rogue { talents, costs, .. } = &scenario.agent else {
            panic!("expected rogue profile");
        };
        assert!(talents.contains(Talents::MUTILATE | Talents::HUNGER_FOR_BLOOD));
        assert_eq!(*costs, CostTable::default());

        let setup = scenario.agent_setup(&RotationConfig::default(), Vec::new());
        assert!(setup.runes.is_none());
        assert_eq!(setup.energy.map(|e| e.rate), Some(10.0));
    }

    #[test]
    fn bundled_rogue_scenarios_parse_talent_strings() {
        let combat = Scenario::from_ron(include_str!("../../scenarios/combat_rogue.ron")).unwrap();
        let AgentProfile::Rogue { talents, .. } = &combat.agent else {
            panic!("expected rogue profile");
        };
        assert!(talents.is_empty());

        let assassination =
            Scenario::from_ron(include_str!("../../scenarios/assassination_rogue.ron")).unwrap();
        let AgentProfile::Rogue { talents, costs, .. } = &assassination.agent else {
            panic!("expected rogue profile");
        };
        assert!(talents.contains(Talents::MUTILATE | Talents::CUT_TO_THE_CHASE));
        assert!(talents.uses_poison_finisher());
        assert!((costs.mutilate - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_hit_chance() {
        let text = ROGUE.replace("0.95", "1.5");
        let err = Scenario::from_ron(&text).unwrap_err();
        assert!(err.to_string().contains("hit chance"));
    }

    #[test]
    fn cost_override_only_applies_to_energy_profiles() {
        let mut rogue = Scenario::from_ron(ROGUE).unwrap();
        let table = CostTable {
            eviscerate: 30.0,
            ..CostTable::default()
        };
        assert!(rogue.set_costs(table.clone()));
        let setup = rogue.agent_setup(&RotationConfig::default(), Vec::new());
        assert_eq!(setup.costs, table);

        let mut pair = Scenario::from_ron(include_str!("../../scenarios/unholy_pair.ron")).unwrap();
        assert!(!pair.set_costs(table));
    }

    #[test]
    fn rejects_zero_tick_pair() {
        let text = r#"(
            name: "unholy",
            duration_ms: 60000,
            agent: Pair(
                rune_recharge_ms: 10000,
                disease_duration_ms: 15000,
                disease_tick_ms: 0,
            ),
        )"#;
        assert!(matches!(
            Scenario::from_ron(text),
            Err(RuntimeError::InvalidScenario(_))
        ));
    }
}
