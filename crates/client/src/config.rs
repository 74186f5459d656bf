//! Client configuration read from the environment.

use std::env;
use std::path::PathBuf;

/// Settings for one `rotation-sim` run.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// RON scenario to simulate.
    pub scenario: PathBuf,
    /// TOML rotation config; built-in defaults when unset.
    pub config: Option<PathBuf>,
    /// TOML energy cost table replacing the scenario's costs.
    pub costs: Option<PathBuf>,
    pub trials: u32,
    pub seed: u64,
    /// File name for an additional log file under the platform log directory.
    pub log_file: Option<String>,
}

impl ClientConfig {
    pub const DEFAULT_SCENARIO: &'static str = "crates/runtime/scenarios/combat_rogue.ron";
    pub const DEFAULT_TRIALS: u32 = 8;
    pub const DEFAULT_SEED: u64 = 0x5eed;

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("ROTATION_SCENARIO") {
            config.scenario = path;
        }
        config.config = read_env::<PathBuf>("ROTATION_CONFIG");
        config.costs = read_env::<PathBuf>("ROTATION_COSTS");
        if let Some(trials) = read_env::<u32>("ROTATION_TRIALS") {
            config.trials = trials.max(1);
        }
        if let Some(seed) = read_env::<u64>("ROTATION_SEED") {
            config.seed = seed;
        }
        config.log_file = read_env::<String>("ROTATION_LOG_FILE").filter(|name| !name.is_empty());

        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from(Self::DEFAULT_SCENARIO),
            config: None,
            costs: None,
            trials: Self::DEFAULT_TRIALS,
            seed: Self::DEFAULT_SEED,
            log_file: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
