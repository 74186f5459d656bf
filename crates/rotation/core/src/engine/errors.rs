//! Fatal planning errors.

use crate::catalogue::ObjectiveIndex;
use crate::error::{ErrorContext, ErrorSeverity, RotationError};
use crate::ids::ActionId;

/// Planning invariant violations; each one aborts the enclosing trial.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PlanningError {
    #[error("scheduled stack is empty {context}")]
    EmptyPlan { context: ErrorContext },

    #[error("scheduled objective #{index} is not in the catalogue {context}")]
    UnknownObjective {
        index: ObjectiveIndex,
        context: ErrorContext,
    },

    #[error("asked to wait while capped on every resource {context}")]
    CappedWhileWaiting { context: ErrorContext },

    #[error("{action} was rejected although the snapshot said it was affordable {context}")]
    AttemptRejected {
        action: ActionId,
        context: ErrorContext,
    },
}

impl PlanningError {
    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::EmptyPlan { context }
            | Self::UnknownObjective { context, .. }
            | Self::CappedWhileWaiting { context }
            | Self::AttemptRejected { context, .. } => context,
        }
    }

    /// Stamps the index of the decision that failed.
    #[must_use]
    pub fn at_decision(mut self, decision: u64) -> Self {
        self.context_mut().decision = decision;
        self
    }
}

impl RotationError for PlanningError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownObjective { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::EmptyPlan { context }
            | Self::UnknownObjective { context, .. }
            | Self::CappedWhileWaiting { context }
            | Self::AttemptRejected { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPlan { .. } => "PLANNING_EMPTY_PLAN",
            Self::UnknownObjective { .. } => "PLANNING_UNKNOWN_OBJECTIVE",
            Self::CappedWhileWaiting { .. } => "PLANNING_CAPPED_WHILE_WAITING",
            Self::AttemptRejected { .. } => "PLANNING_ATTEMPT_REJECTED",
        }
    }
}
