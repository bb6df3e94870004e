//! Tracker use cases.
//!
//! Opening a dice set loads its tallies into a [`RollTallyStore`] that stays
//! in memory until the tracker is closed. Every later edit goes through the
//! open store, never straight to the repository.
//!
//! [`RollTallyStore`]: crate::stores::RollTallyStore

mod close;
mod edit_face;
mod error;
mod open;
mod pin;
mod types;

use std::sync::Arc;

pub use close::CloseTracker;
pub use edit_face::{EditFace, FaceEdit};
pub use error::TrackerError;
pub use open::OpenTracker;
pub use pin::PinFace;
pub use types::TrackerSnapshot;

use dicetally_domain::{DiceSetId, UserId};

use crate::stores::{Tracker, TrackerRegistry};

/// Container for tracker use cases.
pub struct TrackerUseCases {
    pub open: Arc<OpenTracker>,
    pub edit_face: Arc<EditFace>,
    pub pin: Arc<PinFace>,
    pub close: Arc<CloseTracker>,
}

impl TrackerUseCases {
    pub fn new(
        open: Arc<OpenTracker>,
        edit_face: Arc<EditFace>,
        pin: Arc<PinFace>,
        close: Arc<CloseTracker>,
    ) -> Self {
        Self {
            open,
            edit_face,
            pin,
            close,
        }
    }
}

fn require_open(
    registry: &TrackerRegistry,
    user_id: UserId,
    dice_set_id: DiceSetId,
) -> Result<Arc<Tracker>, TrackerError> {
    registry
        .get(user_id, dice_set_id)
        .ok_or(TrackerError::TrackerNotOpen(dice_set_id))
}
