//! Rotation simulator binary.
//!
//! Runs a scenario for a number of independent trials and prints a summary
//! followed by the full JSON reports.
//!
//! # Environment
//!
//! - `ROTATION_SCENARIO`: RON scenario path
//! - `ROTATION_CONFIG`: TOML rotation config (defaults when unset)
//! - `ROTATION_COSTS`: TOML energy cost table for rogue scenarios
//! - `ROTATION_TRIALS`, `ROTATION_SEED`: batch size and base seed
//! - `ROTATION_LOG_FILE`: also log to this file under the platform log dir
//!
//! ```bash
//! ROTATION_SCENARIO=crates/runtime/scenarios/unholy_pair.ron \
//!     cargo run -p rotation-client
//! ```

mod config;
mod logging;
mod summary;

use anyhow::{Context, Result};
use rotation_content::{ConfigLoader, CostTableLoader};
use rotation_core::RotationConfig;
use rotation_runtime::{Scenario, run_trials};

use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let client = ClientConfig::from_env();
    let _guard = logging::setup_logging(client.log_file.as_deref())?;

    let rotation = match &client.config {
        Some(path) => ConfigLoader::load_validated(path)?,
        None => RotationConfig::default(),
    };
    let mut scenario = Scenario::load_from_file(&client.scenario)
        .with_context(|| format!("Failed to load scenario {}", client.scenario.display()))?;
    if let Some(path) = &client.costs {
        let costs = CostTableLoader::load(path)?;
        if !scenario.set_costs(costs) {
            tracing::warn!(path = %path.display(), "scenario spends no energy; cost table ignored");
        }
    }

    tracing::info!(
        scenario = %scenario.name,
        trials = client.trials,
        seed = client.seed,
        "Starting rotation simulation"
    );

    let reports = run_trials(scenario, rotation, client.trials, client.seed).await?;

    print!("{}", summary::render(&reports));
    println!("{}", serde_json::to_string_pretty(&reports)?);

    let aborted = reports.iter().filter(|r| r.is_aborted()).count();
    if aborted > 0 {
        tracing::warn!(aborted, "some trials aborted");
    }
    Ok(())
}
