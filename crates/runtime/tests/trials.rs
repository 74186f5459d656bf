use std::io::Write;
use std::path::{Path, PathBuf};

use rotation_content::ConfigLoader;
use rotation_core::{ActionId, RotationConfig};
use rotation_runtime::{AgentProfile, RuntimeError, Scenario, run_trials, trial_seed};

fn scenario_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn bundled_config() -> RotationConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../rotation/content/data/rotation.toml");
    ConfigLoader::load(&path).expect("bundled config should load")
}

#[test]
fn bundled_scenarios_load() {
    for name in [
        "combat_rogue.ron",
        "assassination_rogue.ron",
        "unholy_pair.ron",
    ] {
        let scenario = Scenario::load_from_file(&scenario_path(name))
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(scenario.duration_ms > 0);
    }

    let pair = Scenario::load_from_file(&scenario_path("unholy_pair.ron")).unwrap();
    assert!(matches!(
        pair.agent,
        AgentProfile::Pair {
            convert_blood: true,
            ..
        }
    ));
    assert_eq!(pair.targets, 3);
}

#[test]
fn scenario_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"(name: "short", duration_ms: 5000, agent: Rogue(energy_cap: 100.0, energy_rate: 10.0))"#
    )
    .unwrap();

    let scenario = Scenario::load_from_file(file.path()).unwrap();
    assert_eq!(scenario.name, "short");
    assert_eq!(scenario.hit_chance, 1.0);

    let missing = Scenario::load_from_file(Path::new("/nonexistent/scenario.ron"));
    assert!(matches!(missing, Err(RuntimeError::InvalidScenario(_))));
}

#[tokio::test]
async fn trials_are_ordered_and_reproducible() {
    let scenario = Scenario::load_from_file(&scenario_path("combat_rogue.ron")).unwrap();
    let config = bundled_config();

    let reports = run_trials(scenario.clone(), config.clone(), 4, 1_000)
        .await
        .unwrap();
    assert_eq!(reports.len(), 4);
    for (index, report) in reports.iter().enumerate() {
        assert_eq!(report.trial, index as u32);
        assert_eq!(report.seed, trial_seed(1_000, index as u32));
        assert!(report.decisions > 0);
        assert!(report.casts.contains_key(&ActionId::SinisterStrike));
    }

    let again = run_trials(scenario, config, 4, 1_000).await.unwrap();
    assert_eq!(reports, again);
}

#[tokio::test]
async fn pair_trials_report_disease_coverage() {
    let scenario = Scenario::load_from_file(&scenario_path("unholy_pair.ron")).unwrap();
    let reports = run_trials(scenario, bundled_config(), 2, 7).await.unwrap();

    for report in &reports {
        assert_eq!(report.effects.len(), 2);
        assert!(report.casts.contains_key(&ActionId::IcyTouch));
        let json = report.to_json().unwrap();
        assert!(json.contains("frost_fever"));
    }
}

#[tokio::test]
async fn invalid_scenario_is_rejected_before_spawning() {
    let mut scenario = Scenario::load_from_file(&scenario_path("combat_rogue.ron")).unwrap();
    scenario.duration_ms = 0;
    let err = run_trials(scenario, RotationConfig::default(), 2, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidScenario(_)));
}
