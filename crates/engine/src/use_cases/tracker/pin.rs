//! Pin face use case.

use std::sync::Arc;

use dicetally_domain::{DiceSetId, DieKind, UserId};

use crate::stores::TrackerRegistry;

use super::{require_open, TrackerError, TrackerSnapshot};

/// Select the face whose "rolling this or higher" probability is shown.
pub struct PinFace {
    registry: Arc<TrackerRegistry>,
}

impl PinFace {
    pub fn new(registry: Arc<TrackerRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        dice_set_id: DiceSetId,
        kind: DieKind,
        index: usize,
    ) -> Result<TrackerSnapshot, TrackerError> {
        let tracker = require_open(&self.registry, user_id, dice_set_id)?;
        let mut store = tracker.store().await;
        store.pin_face(kind, index)?;
        Ok(TrackerSnapshot::capture(tracker.dice_set(), &store)?)
    }
}
