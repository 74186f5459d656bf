//! Per-trial reports.
//!
//! A [`TrialReport`] is assembled once a trial finishes (or aborts) and is
//! plain data: it serializes straight to JSON for the client.

use std::collections::BTreeMap;

use rotation_core::{ActionId, EffectId, PoolId, RotationError};
use serde::{Deserialize, Serialize};

/// Attempts of one action, split by outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastTally {
    pub landed: u32,
    pub missed: u32,
}

impl CastTally {
    pub fn total(&self) -> u32 {
        self.landed + self.missed
    }
}

/// Coverage of one watched effect on the primary target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectCoverage {
    /// Fraction of the trial the effect was active, in `0.0..=1.0`.
    pub uptime: f64,
    /// Longest stretch without the effect after it was first applied.
    pub longest_gap_ms: i64,
    pub applications: u32,
    /// Progress toward the next tick thrown away by early refreshes.
    pub lost_tick_progress_ms: i64,
}

/// Why a trial stopped before its configured duration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortDiagnostic {
    pub code: String,
    pub severity: String,
    pub at_ms: i64,
    pub message: String,
}

impl AbortDiagnostic {
    pub fn from_error<E: RotationError>(err: &E) -> Self {
        Self {
            code: err.error_code().to_string(),
            severity: err.severity().as_str().to_string(),
            at_ms: err.context().map_or(0, |ctx| ctx.now.as_millis()),
            message: err.to_string(),
        }
    }
}

/// Outcome of one simulated trial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub trial: u32,
    pub seed: u64,
    /// Simulated time actually covered; shorter than configured on abort.
    pub duration_ms: i64,
    pub decisions: u64,
    pub casts: BTreeMap<ActionId, CastTally>,
    pub effects: BTreeMap<EffectId, EffectCoverage>,
    /// Lowest amount observed per pool over the whole trial.
    pub min_pool: BTreeMap<PoolId, f64>,
    pub aborted: Option<AbortDiagnostic>,
}

impl TrialReport {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn total_casts(&self) -> u32 {
        self.casts.values().map(CastTally::total).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
