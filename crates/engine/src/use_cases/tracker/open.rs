//! Open tracker use case.

use std::sync::Arc;
use std::time::Duration;

use dicetally_domain::{DiceSetId, Die, StoredDie, UserId};

use crate::infrastructure::ports::DiceRepo;
use crate::stores::{DebouncedTallyWriter, RollTallyStore, Tracker, TrackerRegistry};

use super::{TrackerError, TrackerSnapshot};

/// Load a dice set into memory, or return the already open one.
///
/// A set that is already open is not reloaded: its in-memory tallies may be
/// ahead of storage while writes are pending.
pub struct OpenTracker {
    repo: Arc<dyn DiceRepo>,
    registry: Arc<TrackerRegistry>,
    debounce: Duration,
}

impl OpenTracker {
    pub fn new(repo: Arc<dyn DiceRepo>, registry: Arc<TrackerRegistry>, debounce: Duration) -> Self {
        Self {
            repo,
            registry,
            debounce,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        dice_set_id: DiceSetId,
    ) -> Result<TrackerSnapshot, TrackerError> {
        let tracker = match self.registry.get(user_id, dice_set_id) {
            Some(tracker) => tracker,
            None => self.load(user_id, dice_set_id).await?,
        };
        let store = tracker.store().await;
        Ok(TrackerSnapshot::capture(tracker.dice_set(), &store)?)
    }

    async fn load(
        &self,
        user_id: UserId,
        dice_set_id: DiceSetId,
    ) -> Result<Arc<Tracker>, TrackerError> {
        let detail = self
            .repo
            .get_dice_set_detail(dice_set_id, user_id)
            .await?
            .ok_or(TrackerError::DiceSetNotFound(dice_set_id))?;

        let dice = detail
            .dice
            .into_iter()
            .map(StoredDie::into_die)
            .collect::<Result<Vec<Die>, _>>()?;

        let writer = Arc::new(DebouncedTallyWriter::spawn(
            self.repo.clone(),
            self.debounce,
        ));
        let store = RollTallyStore::initialize(dice, writer.clone())?;
        let tracker = self
            .registry
            .get_or_insert(user_id, Tracker::new(detail.dice_set, store, writer));

        tracing::info!(%dice_set_id, %user_id, "Opened tracker");
        Ok(tracker)
    }
}
