//! Traits describing the collaborators the core consumes.
//!
//! Views expose read-only queries against resource pools and timed effects;
//! the executor performs actions and the clock advances simulated time. The
//! core never owns or mutates pool or effect state: it reads through these
//! traits, captures snapshots, and issues attempts.
mod effects;
mod executor;
mod resources;

pub use effects::{EffectSnapshot, EffectView};
pub use executor::{ActionExecutor, AttemptOutcome, Clock};
pub use resources::{ChargeProjection, ResourceSnapshot, ResourceView};
