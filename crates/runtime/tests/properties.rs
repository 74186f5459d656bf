//! Whole-trial checks of the planner's guarantees against the simulated agent.

use rotation_core::{
    ActionExecutor, ActionId, CatalogueBuilder, Clock, CostTable, DirectFinisherPriority,
    EffectId, LookaheadPlanner, PoolId, ResourceSnapshot, ResourceView, RotationConfig,
    SimDuration, SimTime, SyncConfig, SyncController, SyncState, TargetId, Talents,
};
use rotation_runtime::sim::{AgentSetup, EnergySetup, RuneSetup};
use rotation_runtime::{AgentProfile, PairDriver, Scenario, SimAgent, TrialSeed, run_trial};

fn rogue_scenario(energy_rate: f64, hit_chance: f64) -> Scenario {
    Scenario {
        name: "rogue".into(),
        duration_ms: 120_000,
        targets: 1,
        hit_chance,
        agent: AgentProfile::Rogue {
            talents: Talents::empty(),
            energy_cap: 100.0,
            energy_rate,
            costs: CostTable::default(),
        },
    }
}

fn pair_scenario(targets: u32, hit_chance: f64) -> Scenario {
    Scenario {
        name: "pair".into(),
        duration_ms: 90_000,
        targets,
        hit_chance,
        agent: AgentProfile::Pair {
            rune_recharge_ms: 10_000,
            convert_blood: true,
            disease_duration_ms: 15_000,
            disease_tick_ms: 3_000,
        },
    }
}

/// Haste buff plus a single direct finisher, so the buff is the only
/// linked objective.
fn buff_only_config() -> RotationConfig {
    let mut config = RotationConfig::default();
    config.catalogue.direct_finisher_priority = DirectFinisherPriority::EviscerateRupture;
    config.catalogue.min_points_secondary_finisher = 0;
    config
}

#[test]
fn maintained_buff_never_lapses_longer_than_a_decision_tick() {
    let config = buff_only_config();
    let report = run_trial(
        &rogue_scenario(60.0, 1.0),
        &config,
        TrialSeed { trial: 0, seed: 1 },
    )
    .unwrap();

    assert!(report.aborted.is_none(), "aborted: {:?}", report.aborted);
    let coverage = report.effects[&EffectId::SliceAndDice];
    assert!(coverage.applications > 1);
    assert!(
        coverage.longest_gap_ms <= config.timing.decision_tick_ms,
        "gap of {}ms",
        coverage.longest_gap_ms
    );
    assert!(report.casts[&ActionId::Eviscerate].landed > 0);
}

#[test]
fn periodic_pair_never_lapses_longer_than_a_decision_tick() {
    let config = RotationConfig::default();
    let report = run_trial(
        &pair_scenario(1, 1.0),
        &config,
        TrialSeed { trial: 0, seed: 21 },
    )
    .unwrap();

    assert!(report.aborted.is_none(), "aborted: {:?}", report.aborted);
    for effect in [EffectId::FrostFever, EffectId::BloodPlague] {
        let coverage = report.effects[&effect];
        assert!(coverage.applications > 1, "{effect} applied once");
        assert!(
            coverage.longest_gap_ms <= config.timing.decision_tick_ms,
            "{effect} gap of {}ms",
            coverage.longest_gap_ms
        );
    }
}

#[test]
fn pools_never_go_negative() {
    let config = RotationConfig::default();
    let scenarios = [
        rogue_scenario(10.0, 0.8),
        rogue_scenario(25.0, 0.95),
        pair_scenario(1, 0.85),
        pair_scenario(3, 0.85),
    ];
    for (trial, scenario) in scenarios.iter().enumerate() {
        let report = run_trial(
            scenario,
            &config,
            TrialSeed {
                trial: trial as u32,
                seed: 99,
            },
        )
        .unwrap();
        assert!(
            report.aborted.is_none(),
            "{} aborted: {:?}",
            scenario.name,
            report.aborted
        );
        assert_eq!(report.duration_ms, scenario.duration_ms);
        assert!(!report.min_pool.is_empty());
        for (pool, min) in &report.min_pool {
            assert!(*min >= 0.0, "{pool} dropped to {min} in {}", scenario.name);
        }
    }
}

#[test]
fn replanning_the_same_state_is_idempotent() {
    let config = RotationConfig::default();
    let costs = CostTable::default();
    let builder = CatalogueBuilder::new(&config, &costs).talents(Talents::HUNGER_FOR_BLOOD);
    let catalogue = builder.build().unwrap();
    let planner = LookaheadPlanner::new(builder.build_model());

    let mut agent = SimAgent::new(
        AgentSetup {
            energy: Some(EnergySetup {
                cap: 100.0,
                rate: 10.0,
            }),
            ..AgentSetup::default()
        },
        5,
    );
    agent.attempt(ActionId::SinisterStrike, TargetId::PRIMARY);
    agent.advance_to(SimTime::from_millis(1_000));
    agent.attempt(ActionId::SliceAndDice, TargetId::PRIMARY);
    agent.advance_to(SimTime::from_millis(3_500));

    let now = agent.now();
    let snapshot = ResourceSnapshot::capture(&agent);
    let first = planner.advance_plan(&catalogue, &snapshot, &agent, now);
    let second = planner.advance_plan(&catalogue, &snapshot, &agent, now);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn refresh_waits_for_the_final_tick() {
    let mut agent = SimAgent::new(
        AgentSetup {
            runes: Some(RuneSetup {
                recharge: SimDuration::from_secs(10),
                convert_blood: false,
            }),
            watched: vec![EffectId::FrostFever, EffectId::BloodPlague],
            ..AgentSetup::default()
        },
        11,
    );
    // Four of five ticks elapsed; the last lands at 15s.
    agent.seed_effect(EffectId::FrostFever, TargetId::PRIMARY, SimTime::ZERO);
    agent.seed_effect(EffectId::BloodPlague, TargetId::PRIMARY, SimTime::from_millis(400));
    agent.advance_to(SimTime::from_millis(14_100));

    let mut driver = PairDriver::with_agent(
        agent,
        SyncController::new(SyncConfig::default()),
        SimDuration::from_secs(5),
        SimDuration::from_secs(1),
    );
    driver.run_until(SimTime::from_millis(16_000)).unwrap();

    let fever = driver
        .agent()
        .effects()
        .get(EffectId::FrostFever, TargetId::PRIMARY)
        .copied()
        .unwrap();
    assert!(fever.applied_at > SimTime::from_millis(15_000));
    assert_eq!(fever.applied_at, SimTime::from_millis(15_050));
    assert_eq!(
        driver.controller().state(),
        SyncState::PrimaryRefreshed {
            at: SimTime::from_millis(15_050)
        }
    );
    assert_eq!(driver.agent().casts()[&ActionId::IcyTouch].landed, 1);

    let coverage = driver.agent().coverage()[&EffectId::FrostFever];
    assert_eq!(coverage.lost_tick_progress_ms, 0);
}

#[test]
fn pair_falls_into_phase_after_opening() {
    let config = RotationConfig::default();
    let scenario = pair_scenario(1, 1.0);
    let mut driver = PairDriver::new(&scenario, &config, TrialSeed { trial: 0, seed: 3 });
    driver.run_until(SimTime::from_millis(5_000)).unwrap();

    assert_eq!(
        driver.controller().state(),
        SyncState::Synced {
            drift: SimDuration::from_secs(1)
        }
    );
    let casts = driver.agent().casts();
    assert_eq!(casts[&ActionId::IcyTouch].landed, 1);
    assert_eq!(casts[&ActionId::PlagueStrike].landed, 1);
    assert!(casts.contains_key(&ActionId::ScourgeStrike));
    assert!(driver.agent().current_amount(PoolId::FrostRunes) <= 2.0);
}
