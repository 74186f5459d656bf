//! Recast bookkeeping for spreading the pair to additional targets.

/// Tracks which effects of the pair were freshly reapplied since the last
/// landed spread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecastLedger {
    pub primary: bool,
    pub secondary: bool,
}

impl RecastLedger {
    /// Both effects are fresh and there is somewhere to spread them.
    pub fn should_spread(&self, targets: u32) -> bool {
        self.primary && self.secondary && targets > 1
    }

    /// A landed spread consumes the fresh applications; a miss keeps them.
    pub fn record_spread(&mut self, landed: bool) {
        if landed {
            *self = Self::default();
        }
    }
}
