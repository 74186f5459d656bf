use std::io::Write;

use rotation_content::{ConfigLoader, CostTableLoader};
use rotation_core::{Frequency, PairLead, RotationConfig, TimingConfig};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_temp("");
    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config, RotationConfig::default());
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let file = write_temp(
        r#"
[timing]
clipping_window_ms = 1500

[catalogue]
armor_debuff_frequency = "once"

[sync]
lead = "blood_plague"
"#,
    );
    let config = ConfigLoader::load(file.path()).unwrap();

    assert_eq!(config.timing.clipping_window_ms, 1500);
    assert_eq!(
        config.timing.decision_tick_ms,
        TimingConfig::DEFAULT_DECISION_TICK_MS
    );
    assert_eq!(config.catalogue.armor_debuff_frequency, Frequency::Once);
    assert_eq!(config.sync.lead, PairLead::BloodPlague);
}

#[test]
fn bundled_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/rotation.toml");
    let config = ConfigLoader::load_validated(&path).unwrap();
    assert!(config.sync.combined_refresh);
}

#[test]
fn out_of_range_secondary_finisher_fails_validation() {
    let file = write_temp(
        r#"
[catalogue]
min_points_secondary_finisher = 9
"#,
    );
    let err = ConfigLoader::load_validated(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("secondary finisher"));
}

#[test]
fn malformed_toml_is_reported() {
    let file = write_temp("[timing\nclipping_window_ms = ");
    let err = ConfigLoader::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse rotation config TOML"));
}

#[test]
fn missing_file_is_reported() {
    let err = ConfigLoader::load(std::path::Path::new("/nonexistent/rotation.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read file"));
}

#[test]
fn cost_table_overrides_and_rejects_negatives() {
    let file = write_temp("eviscerate = 30.0\n");
    let costs = CostTableLoader::load(file.path()).unwrap();
    assert!((costs.eviscerate - 30.0).abs() < f64::EPSILON);
    assert!((costs.sinister_strike - 40.0).abs() < f64::EPSILON);

    let file = write_temp("rupture = -5.0\n");
    assert!(CostTableLoader::load(file.path()).is_err());
}

#[test]
fn zero_threshold_armor_debuff_fails_validation() {
    let file = write_temp(
        r#"
[catalogue]
armor_debuff_frequency = "once"
min_points_armor_debuff = 0
"#,
    );
    let err = ConfigLoader::load_validated(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("expose_armor spends threshold points"));
}

#[test]
fn multi_target_buff_threshold_is_validated() {
    // Only reachable once the target count crosses the multi-target line.
    let mut config = RotationConfig::default();
    config.catalogue.min_points_multi_target_buff = 0;
    let err = ConfigLoader::validate(&config).unwrap_err();
    assert!(format!("{err:#}").contains("slice_and_dice spends threshold points"));

    config.catalogue.multi_target_buff_frequency = Frequency::Never;
    assert!(ConfigLoader::validate(&config).is_ok());
}

#[test]
fn bundled_cost_table_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/costs.toml");
    let costs = CostTableLoader::load(&path).unwrap();
    assert_eq!(costs, rotation_core::CostTable::default());
}
