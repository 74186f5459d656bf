//! Objective catalogue: the ordered set of competing objectives.
//!
//! Objectives are totally ordered by priority rank (index 0 is the highest
//! priority). The order is fixed for a planning pass; only cast counters
//! change between passes.
mod builder;

pub use builder::{CatalogueBuilder, CostTable, Talents};

use arrayvec::ArrayVec;

use crate::config::RotationConfig;
use crate::error::{ErrorSeverity, RotationError};
use crate::ids::{ActionId, EffectId};

/// Position of an objective in its catalogue.
pub type ObjectiveIndex = usize;

/// A ranked candidate action with threshold requirements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub action: ActionId,
    /// Threshold resource required before the objective may be cast.
    pub min_points: u32,
    /// Threshold level past which building further is wasted.
    pub max_points: u32,
    /// Energy cost of the objective's action.
    pub cost: f64,
    /// Effect whose expiration drives urgency.
    pub linked_effect: Option<EffectId>,
    /// Cast-count ceiling; zero means unlimited.
    pub max_casts: u32,
    pub cast_count: u32,
}

impl Objective {
    pub fn new(action: ActionId, min_points: u32, max_points: u32, cost: f64) -> Self {
        Self {
            action,
            min_points,
            max_points,
            cost,
            linked_effect: None,
            max_casts: 0,
            cast_count: 0,
        }
    }

    #[must_use]
    pub fn linked_to(mut self, effect: EffectId) -> Self {
        self.linked_effect = Some(effect);
        self
    }

    #[must_use]
    pub fn with_max_casts(mut self, max_casts: u32) -> Self {
        self.max_casts = max_casts;
        self
    }

    /// True when the cast ceiling has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_casts > 0 && self.cast_count >= self.max_casts
    }

    /// True for objectives that may only ever be cast once.
    pub fn is_single_cast(&self) -> bool {
        self.max_casts == 1
    }

    /// True for unlimited objectives.
    pub fn is_unlimited(&self) -> bool {
        self.max_casts == 0
    }
}

/// Rejections raised while constructing a catalogue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    #[error("catalogue has no objectives")]
    Empty,

    #[error("catalogue holds more than {max} objectives")]
    TooManyObjectives { max: usize },

    #[error("{action} requires {min} points but caps building at {max}")]
    ThresholdOrder { action: ActionId, min: u32, max: u32 },

    #[error("{action} threshold {points} exceeds the resource cap {cap}")]
    ThresholdAboveCap {
        action: ActionId,
        points: u32,
        cap: u32,
    },

    #[error("secondary finisher threshold {points} is outside 0..={cap}")]
    SecondaryFinisherOutOfRange { points: u32, cap: u32 },

    #[error("{action} spends threshold points but requires none")]
    FinisherWithoutThreshold { action: ActionId },
}

impl RotationError for CatalogueError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use CatalogueError::*;
        match self {
            Empty => "CATALOGUE_EMPTY",
            TooManyObjectives { .. } => "CATALOGUE_TOO_MANY_OBJECTIVES",
            ThresholdOrder { .. } => "CATALOGUE_THRESHOLD_ORDER",
            ThresholdAboveCap { .. } => "CATALOGUE_THRESHOLD_ABOVE_CAP",
            SecondaryFinisherOutOfRange { .. } => "CATALOGUE_SECONDARY_FINISHER_RANGE",
            FinisherWithoutThreshold { .. } => "CATALOGUE_FINISHER_WITHOUT_THRESHOLD",
        }
    }
}

/// Priority-ordered objectives with their cast counters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalogue {
    objectives: ArrayVec<Objective, { RotationConfig::MAX_OBJECTIVES }>,
}

impl Catalogue {
    /// Validates and wraps objectives given in priority order.
    pub fn new(objectives: Vec<Objective>) -> Result<Self, CatalogueError> {
        if objectives.is_empty() {
            return Err(CatalogueError::Empty);
        }
        if objectives.len() > RotationConfig::MAX_OBJECTIVES {
            return Err(CatalogueError::TooManyObjectives {
                max: RotationConfig::MAX_OBJECTIVES,
            });
        }
        for objective in &objectives {
            Self::validate(objective)?;
        }
        Ok(Self {
            objectives: objectives.into_iter().collect(),
        })
    }

    fn validate(objective: &Objective) -> Result<(), CatalogueError> {
        let cap = RotationConfig::MAX_POINTS;
        if objective.min_points > cap || objective.max_points > cap {
            return Err(CatalogueError::ThresholdAboveCap {
                action: objective.action,
                points: objective.min_points.max(objective.max_points),
                cap,
            });
        }
        if objective.action.is_finisher() && objective.min_points == 0 {
            return Err(CatalogueError::FinisherWithoutThreshold {
                action: objective.action,
            });
        }
        if objective.min_points > objective.max_points {
            return Err(CatalogueError::ThresholdOrder {
                action: objective.action,
                min: objective.min_points,
                max: objective.max_points,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    pub fn get(&self, index: ObjectiveIndex) -> Option<&Objective> {
        self.objectives.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectiveIndex, &Objective)> {
        self.objectives.iter().enumerate()
    }

    /// Objectives strictly below `index` in priority.
    pub fn lower_than(
        &self,
        index: ObjectiveIndex,
    ) -> impl Iterator<Item = (ObjectiveIndex, &Objective)> {
        self.iter().skip(index + 1)
    }

    /// Position of the first objective for `action`.
    pub fn position(&self, action: ActionId) -> Option<ObjectiveIndex> {
        self.objectives.iter().position(|o| o.action == action)
    }

    /// Increments the cast counter after a successful cast.
    pub fn record_cast(&mut self, index: ObjectiveIndex) {
        if let Some(objective) = self.objectives.get_mut(index) {
            objective.cast_count += 1;
        }
    }
}
