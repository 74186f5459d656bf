//! Simulation runtime for the rotation planner.
//!
//! This crate provides the collaborators `rotation-core` consumes (pools,
//! timed effects, outcome rolls, the clock), the drivers that invoke the core
//! at every decision point, and the batch runner that fans trials out over
//! tokio blocking tasks.
//!
//! Modules are organized by responsibility:
//! - [`sim`] hosts the simulated agent and its pools and effects
//! - [`drivers`] run one trial for each agent profile
//! - [`scenario`] loads trial descriptions from RON
//! - [`report`] holds the per-trial results
//! - [`trials`] runs batches of independent trials concurrently
pub mod drivers;
pub mod error;
pub mod report;
pub mod scenario;
pub mod sim;
pub mod trials;

pub use drivers::{PairDriver, RogueDriver, TrialSeed, run_trial};
pub use error::{Result, RuntimeError};
pub use report::{AbortDiagnostic, CastTally, EffectCoverage, TrialReport};
pub use scenario::{AgentProfile, Scenario};
pub use sim::{AgentSetup, SimAgent};
pub use trials::{run_trials, trial_seed};
