//! Deterministic rotation planning shared by simulation runtimes.
//!
//! `rotation-core` decides, one decision point at a time, which action an
//! agent should take against competing timed objectives. It owns no clock,
//! no randomness and no resource pools: all of those are consumed through the
//! collaborator traits in [`env`]. The general planner runs through
//! [`engine::RotationEngine`]; the two-effect controller lives in [`sync`].
pub mod catalogue;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod ids;
pub mod planner;
pub mod sync;
pub mod time;

pub use catalogue::{
    Catalogue, CatalogueBuilder, CatalogueError, CostTable, Objective, ObjectiveIndex, Talents,
};
pub use config::{
    CatalogueConfig, DirectFinisherPriority, Frequency, PairLead, PoisonFinisherPriority,
    RotationConfig, SyncConfig, TimingConfig,
};
pub use engine::{PlanningError, RotationEngine, StepOutcome};
pub use env::{
    ActionExecutor, AttemptOutcome, ChargeProjection, Clock, EffectSnapshot, EffectView,
    ResourceSnapshot, ResourceView,
};
pub use error::{ErrorContext, ErrorSeverity, RotationError};
pub use evaluator::{Decision, DecisionEvaluator, DecisionKind, WaitTarget};
pub use ids::{ActionId, EffectId, PoolId, TargetId};
pub use planner::{
    BuildModel, CatchUpCause, Injection, LookaheadPlanner, ScheduleReason, ScheduledObjective,
    ScheduledStack,
};
pub use sync::{
    PendingAction, RecastLedger, RefreshAction, RefreshReason, RefreshTarget, SlotSnapshot,
    SyncContext, SyncController, SyncState,
};
pub use time::{SimDuration, SimTime};
