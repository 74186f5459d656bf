//! Common error infrastructure for rotation-core.
//!
//! Domain-specific errors ([`CatalogueError`](crate::catalogue::CatalogueError),
//! [`PlanningError`](crate::engine::PlanningError)) live next to the code that
//! raises them and implement [`RotationError`] for uniform classification.
//!
//! # Design Principles
//!
//! - **Fatal means abort the trial**: planning invariant violations indicate the
//!   snapshot and the executor disagree, or the configuration is unsatisfiable.
//! - **Rich Context**: fatal errors carry the simulated time, decision index and
//!   resource snapshot at failure.
//! - **Recoverable misses are not errors**: a refresh that did not land is
//!   tracked as state by the periodic-pair controller.

use core::fmt;

use crate::env::ResourceSnapshot;
use crate::time::SimTime;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retry on the next decision point.
    Recoverable,

    /// Invalid configuration, rejected at construction time.
    ///
    /// Examples: unreachable threshold ordering, secondary finisher threshold
    /// outside the resource range.
    Validation,

    /// Unexpected state inconsistency inside the core.
    Internal,

    /// Planning invariant violated; the enclosing trial must abort.
    ///
    /// Examples: Wait while capped on every resource, rejected Cast/Build.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State captured at the point an error was raised.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorContext {
    /// Simulated time of the failing decision.
    pub now: SimTime,

    /// Number of decisions the engine had evaluated before the failure.
    pub decision: u64,

    /// Resource snapshot the failing decision was based on.
    pub snapshot: Option<ResourceSnapshot>,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(now: SimTime, decision: u64) -> Self {
        Self {
            now,
            decision,
            snapshot: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_snapshot(mut self, snapshot: ResourceSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {} (decision #{})", self.now, self.decision)?;
        if let Some(snapshot) = &self.snapshot {
            write!(f, " with {snapshot}")?;
        }
        if let Some(message) = self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Common trait for all rotation-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Include `ErrorContext` in variants raised during a trial
/// - Classify severity by what the caller must do, not by impact
pub trait RotationError: fmt::Display + fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for this error variant, used in reports and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
