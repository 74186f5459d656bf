//! Trial drivers.
//!
//! A driver owns the clock for one trial: it invokes the core at each
//! decision point, carries out what the core returned, and advances
//! simulated time. Drivers never share state, so trials can run on separate
//! threads.

mod pair;
mod rogue;

pub use pair::PairDriver;
pub use rogue::RogueDriver;

use rotation_core::{Clock, RotationConfig};

use crate::error::Result;
use crate::report::{AbortDiagnostic, TrialReport};
use crate::scenario::{AgentProfile, Scenario};
use crate::sim::SimAgent;

/// Identity of one trial within a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialSeed {
    pub trial: u32,
    pub seed: u64,
}

/// Runs one trial of `scenario` with the driver its profile calls for.
///
/// Setup failures are returned as errors; a fatal planning failure during
/// the trial ends it early and is recorded in the report.
pub fn run_trial(scenario: &Scenario, config: &RotationConfig, id: TrialSeed) -> Result<TrialReport> {
    match scenario.agent {
        AgentProfile::Rogue { .. } => RogueDriver::new(scenario, config, id)?.run(),
        AgentProfile::Pair { .. } => PairDriver::new(scenario, config, id).run(),
    }
}

fn finish_report(
    agent: &SimAgent,
    id: TrialSeed,
    decisions: u64,
    aborted: Option<AbortDiagnostic>,
) -> TrialReport {
    TrialReport {
        trial: id.trial,
        seed: id.seed,
        duration_ms: agent.now().as_millis(),
        decisions,
        casts: agent.casts().clone(),
        effects: agent.coverage(),
        min_pool: agent.min_pool().clone(),
        aborted,
    }
}
