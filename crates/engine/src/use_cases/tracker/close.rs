//! Close tracker use case.

use std::sync::Arc;

use dicetally_domain::{DiceSetId, UserId};

use crate::stores::TrackerRegistry;

use super::TrackerError;

/// Tear down an open tracker. Writes still waiting out their debounce window
/// are dropped.
pub struct CloseTracker {
    registry: Arc<TrackerRegistry>,
}

impl CloseTracker {
    pub fn new(registry: Arc<TrackerRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, user_id: UserId, dice_set_id: DiceSetId) -> Result<(), TrackerError> {
        if !self.registry.close(user_id, dice_set_id) {
            return Err(TrackerError::TrackerNotOpen(dice_set_id));
        }
        tracing::info!(%dice_set_id, %user_id, "Closed tracker");
        Ok(())
    }
}
