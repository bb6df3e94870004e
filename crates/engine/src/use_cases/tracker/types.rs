//! Tracker result types.

use dicetally_domain::{DiceSetSummary, DieStatistics, DomainError};

use crate::stores::RollTallyStore;

/// Everything known about an open dice set after an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    pub dice_set: DiceSetSummary,
    /// In set order
    pub dice: Vec<DieStatistics>,
}

impl TrackerSnapshot {
    pub fn capture(dice_set: &DiceSetSummary, store: &RollTallyStore) -> Result<Self, DomainError> {
        Ok(Self {
            dice_set: dice_set.clone(),
            dice: store.all_statistics()?,
        })
    }
}
