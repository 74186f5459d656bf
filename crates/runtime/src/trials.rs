//! Concurrent trial fan-out.
//!
//! Every trial is CPU-bound and owns all of its state, so each one runs on a
//! tokio blocking task. Reports come back ordered by trial index regardless
//! of completion order.

use std::sync::Arc;

use rotation_core::RotationConfig;
use tokio::task::JoinSet;

use crate::drivers::{TrialSeed, run_trial};
use crate::error::{Result, RuntimeError};
use crate::report::TrialReport;
use crate::scenario::Scenario;

/// Seed of trial `trial` in a batch started from `base_seed`.
pub fn trial_seed(base_seed: u64, trial: u32) -> u64 {
    base_seed.wrapping_add(u64::from(trial))
}

/// Runs `trials` independent trials of `scenario` and collects their reports.
pub async fn run_trials(
    scenario: Scenario,
    config: RotationConfig,
    trials: u32,
    base_seed: u64,
) -> Result<Vec<TrialReport>> {
    scenario.validate()?;
    let scenario = Arc::new(scenario);
    let config = Arc::new(config);

    tracing::info!(
        scenario = %scenario.name,
        trials,
        base_seed,
        "starting trial batch"
    );

    let mut tasks = JoinSet::new();
    for trial in 0..trials {
        let scenario = Arc::clone(&scenario);
        let config = Arc::clone(&config);
        let id = TrialSeed {
            trial,
            seed: trial_seed(base_seed, trial),
        };
        tasks.spawn_blocking(move || {
            let report = run_trial(&scenario, &config, id)?;
            tracing::info!(
                trial = id.trial,
                seed = id.seed,
                decisions = report.decisions,
                aborted = report.is_aborted(),
                "trial finished"
            );
            Ok::<_, RuntimeError>(report)
        });
    }

    let mut reports = Vec::with_capacity(trials as usize);
    while let Some(joined) = tasks.join_next().await {
        reports.push(joined.map_err(RuntimeError::TrialJoin)??);
    }
    reports.sort_by_key(|report| report.trial);
    Ok(reports)
}
