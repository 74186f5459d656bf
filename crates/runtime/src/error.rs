//! Errors surfaced by the runtime.
//!
//! Core planning failures abort only the trial that raised them and end up
//! in its report; the variants here are what escape to the caller.
use rotation_core::{CatalogueError, PlanningError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("catalogue construction failed")]
    Catalogue(#[from] CatalogueError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("trial task join failed")]
    TrialJoin(#[source] tokio::task::JoinError),
}
