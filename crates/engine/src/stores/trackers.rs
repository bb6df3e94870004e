//! Open trackers, one per user and dice set.
//!
//! A tracker that nobody touches for the idle timeout is flushed and closed
//! by the registry's sweeper, so abandoned tabs and expired sessions do not
//! keep their store and writer task alive.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use dicetally_domain::{DiceSetId, DiceSetSummary, UserId};

use super::roll_tally::RollTallyStore;
use super::tally_writer::DebouncedTallyWriter;

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// A dice set opened for tallying: its store plus the writer draining it.
pub struct Tracker {
    dice_set: DiceSetSummary,
    store: Mutex<RollTallyStore>,
    writer: Arc<DebouncedTallyWriter>,
    last_touched: StdMutex<Instant>,
}

impl Tracker {
    pub fn new(
        dice_set: DiceSetSummary,
        store: RollTallyStore,
        writer: Arc<DebouncedTallyWriter>,
    ) -> Self {
        Self {
            dice_set,
            store: Mutex::new(store),
            writer,
            last_touched: StdMutex::new(Instant::now()),
        }
    }

    pub fn dice_set(&self) -> &DiceSetSummary {
        &self.dice_set
    }

    /// Exclusive access to the tally store. Edits to one set are serialized.
    ///
    /// Counts as activity for the idle sweeper.
    pub async fn store(&self) -> tokio::sync::MutexGuard<'_, RollTallyStore> {
        self.touch();
        self.store.lock().await
    }

    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Stop persisting; anything still pending is dropped.
    pub fn close(&self) {
        self.writer.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_cancelled()
    }

    /// Time since the store was last accessed.
    pub fn idle_for(&self) -> Duration {
        self.last_touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    fn touch(&self) {
        *self
            .last_touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}

/// Concurrent map of open trackers keyed by `(user, dice set)`.
pub struct TrackerRegistry {
    trackers: DashMap<(UserId, DiceSetId), Arc<Tracker>>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self {
            trackers: DashMap::new(),
        }
    }

    pub fn get(&self, user_id: UserId, dice_set_id: DiceSetId) -> Option<Arc<Tracker>> {
        self.trackers
            .get(&(user_id, dice_set_id))
            .map(|entry| entry.value().clone())
    }

    /// Register `tracker` unless one is already open for the same key. The
    /// existing tracker wins and `tracker` is closed before being dropped.
    pub fn get_or_insert(&self, user_id: UserId, tracker: Tracker) -> Arc<Tracker> {
        let key = (user_id, tracker.dice_set.id);
        match self.trackers.entry(key) {
            Entry::Occupied(existing) => {
                tracker.close();
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(Arc::new(tracker)).value().clone(),
        }
    }

    /// Remove and close a tracker. Returns whether one was open.
    pub fn close(&self, user_id: UserId, dice_set_id: DiceSetId) -> bool {
        match self.trackers.remove(&(user_id, dice_set_id)) {
            Some((_, tracker)) => {
                tracker.close();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Persist everything pending in every open tracker. Used on shutdown.
    pub async fn flush_all(&self) {
        let trackers: Vec<Arc<Tracker>> = self
            .trackers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        tracing::info!(open = trackers.len(), "Flushing open trackers");
        for tracker in trackers {
            tracker.flush().await;
        }
    }

    /// Flush and close every tracker idle for at least `idle_timeout`.
    /// Returns how many were closed.
    pub async fn sweep_idle(&self, idle_timeout: Duration) -> usize {
        let candidates: Vec<(UserId, DiceSetId)> = self
            .trackers
            .iter()
            .filter(|entry| entry.value().idle_for() >= idle_timeout)
            .map(|entry| *entry.key())
            .collect();

        let mut closed = 0;
        for key in candidates {
            let Some((_, tracker)) = self
                .trackers
                .remove_if(&key, |_, tracker| tracker.idle_for() >= idle_timeout)
            else {
                continue;
            };
            // Let an edit already holding the store finish scheduling.
            drop(tracker.store.lock().await);
            tracker.flush().await;
            tracker.close();
            closed += 1;
            tracing::info!(user_id = %key.0, dice_set_id = %key.1, "Closed idle tracker");
        }
        closed
    }

    /// Run [`sweep_idle`](Self::sweep_idle) periodically until `cancel_token`
    /// fires.
    pub fn spawn_idle_sweeper(
        self: &Arc<Self>,
        idle_timeout: Duration,
        cancel_token: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = (idle_timeout / 4).max(MIN_SWEEP_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.sweep_idle(idle_timeout).await;
                    }
                }
            }
            tracing::debug!("Idle tracker sweeper stopped");
        })
    }
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
