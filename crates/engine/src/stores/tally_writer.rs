//! Debounced persistence of face tallies.
//!
//! Every edit schedules a write for its `(die, side)` key. A key is written
//! once it has been quiet for the debounce window, with the value from its
//! most recent edit. Edits to different faces never replace each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use dicetally_domain::{DieId, DieKind};

use crate::infrastructure::ports::DiceRepo;

/// One face tally waiting to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyWrite {
    pub die_id: DieId,
    pub kind: DieKind,
    /// Canonical persisted side
    pub side: u32,
    pub count: u32,
}

impl TallyWrite {
    fn key(&self) -> TallyKey {
        TallyKey {
            die_id: self.die_id,
            side: self.side,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TallyKey {
    die_id: DieId,
    side: u32,
}

/// Receives tally writes from the tally store.
#[cfg_attr(test, mockall::automock)]
pub trait TallyScheduler: Send + Sync {
    fn schedule(&self, write: TallyWrite);
}

enum WriterCommand {
    Schedule(TallyWrite),
    Flush(oneshot::Sender<()>),
}

struct PendingWrite {
    write: TallyWrite,
    deadline: Instant,
}

/// Handle to a background task that debounces tally writes into a
/// [`DiceRepo`].
///
/// Dropping or cancelling the handle stops the task and discards whatever
/// is still pending. Call [`flush`](Self::flush) first to keep it.
pub struct DebouncedTallyWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
    cancel_token: CancellationToken,
}

impl DebouncedTallyWriter {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(repo: Arc<dyn DiceRepo>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        tokio::spawn(run_writer(repo, window, rx, cancel_token.clone()));
        Self { tx, cancel_token }
    }

    /// Write every pending tally now and wait for the writes to finish.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stop the writer. Pending writes are dropped.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl TallyScheduler for DebouncedTallyWriter {
    fn schedule(&self, write: TallyWrite) {
        if self.tx.send(WriterCommand::Schedule(write)).is_err() {
            tracing::debug!(
                die_id = %write.die_id,
                side = write.side,
                "Tally writer stopped, write dropped"
            );
        }
    }
}

impl Drop for DebouncedTallyWriter {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn run_writer(
    repo: Arc<dyn DiceRepo>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
    cancel_token: CancellationToken,
) {
    let mut pending: HashMap<TallyKey, PendingWrite> = HashMap::new();

    loop {
        let next_deadline = pending.values().map(|p| p.deadline).min();

        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                if !pending.is_empty() {
                    tracing::debug!(dropped = pending.len(), "Tally writer cancelled with pending writes");
                }
                break;
            }
            command = rx.recv() => match command {
                Some(WriterCommand::Schedule(write)) => {
                    pending.insert(
                        write.key(),
                        PendingWrite {
                            write,
                            deadline: Instant::now() + window,
                        },
                    );
                }
                Some(WriterCommand::Flush(done)) => {
                    let writes = take_due(&mut pending, None);
                    persist_all(repo.as_ref(), writes).await;
                    let _ = done.send(());
                }
                None => break,
            },
            _ = sleep_until_deadline(next_deadline) => {
                let writes = take_due(&mut pending, Some(Instant::now()));
                persist_all(repo.as_ref(), writes).await;
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Remove writes whose deadline has passed (all of them when `now` is
/// `None`), oldest first.
fn take_due(pending: &mut HashMap<TallyKey, PendingWrite>, now: Option<Instant>) -> Vec<TallyWrite> {
    let mut due: Vec<(TallyKey, Instant)> = pending
        .iter()
        .filter(|(_, p)| now.is_none_or(|now| p.deadline <= now))
        .map(|(key, p)| (*key, p.deadline))
        .collect();
    due.sort_by_key(|(_, deadline)| *deadline);
    due.into_iter()
        .filter_map(|(key, _)| pending.remove(&key))
        .map(|p| p.write)
        .collect()
}

/// Failures are logged only; the in-memory tally stays as the user left it.
async fn persist_all(repo: &dyn DiceRepo, writes: Vec<TallyWrite>) {
    for write in writes {
        match repo
            .update_face_tally(write.die_id, write.side, write.count)
            .await
        {
            Ok(()) => tracing::debug!(
                die_id = %write.die_id,
                kind = %write.kind,
                side = write.side,
                count = write.count,
                "Persisted face tally"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                die_id = %write.die_id,
                kind = %write.kind,
                side = write.side,
                count = write.count,
                "Failed to persist face tally"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockDiceRepo, RepoError};
    use std::sync::Mutex;

    const WINDOW: Duration = Duration::from_millis(500);

    type Log = Arc<Mutex<Vec<(DieId, u32, u32)>>>;

    fn recording_repo(fail: bool) -> (Arc<dyn DiceRepo>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut repo = MockDiceRepo::new();
        let sink = log.clone();
        repo.expect_update_face_tally()
            .returning(move |die_id, side, count| {
                sink.lock().unwrap().push((die_id, side, count));
                if fail {
                    Err(RepoError::database("update_face_tally", "disk full"))
                } else {
                    Ok(())
                }
            });
        (Arc::new(repo), log)
    }

    fn write(die_id: DieId, side: u32, count: u32) -> TallyWrite {
        TallyWrite {
            die_id,
            kind: DieKind::D6,
            side,
            count,
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_on_one_face_writes_last_value_once() {
        let (repo, log) = recording_repo(false);
        let writer = DebouncedTallyWriter::spawn(repo, WINDOW);
        let die = DieId::new();

        writer.schedule(write(die, 1, 1));
        advance(100).await;
        writer.schedule(write(die, 1, 2));
        advance(100).await;
        writer.schedule(write(die, 1, 3));

        advance(400).await;
        assert!(log.lock().unwrap().is_empty());

        advance(200).await;
        assert_eq!(*log.lock().unwrap(), vec![(die, 1, 3)]);

        advance(2_000).await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn different_faces_are_written_separately() {
        let (repo, log) = recording_repo(false);
        let writer = DebouncedTallyWriter::spawn(repo, WINDOW);
        let die = DieId::new();

        writer.schedule(write(die, 1, 4));
        advance(100).await;
        writer.schedule(write(die, 2, 7));

        advance(1_000).await;
        assert_eq!(*log.lock().unwrap(), vec![(die, 1, 4), (die, 2, 7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_writes() {
        let (repo, log) = recording_repo(false);
        let writer = DebouncedTallyWriter::spawn(repo, WINDOW);

        writer.schedule(write(DieId::new(), 3, 9));
        advance(100).await;
        writer.cancel();
        assert!(writer.is_cancelled());

        advance(1_000).await;
        assert!(log.lock().unwrap().is_empty());

        // Scheduling after cancel is a no-op
        writer.schedule(write(DieId::new(), 1, 1));
        advance(1_000).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_pending_immediately() {
        let (repo, log) = recording_repo(false);
        let writer = DebouncedTallyWriter::spawn(repo, WINDOW);
        let die = DieId::new();

        writer.schedule(write(die, 5, 2));
        writer.flush().await;
        assert_eq!(*log.lock().unwrap(), vec![(die, 5, 2)]);

        advance(1_000).await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_not_retried() {
        let (repo, log) = recording_repo(true);
        let writer = DebouncedTallyWriter::spawn(repo, WINDOW);
        let die = DieId::new();

        writer.schedule(write(die, 6, 1));
        advance(600).await;
        assert_eq!(log.lock().unwrap().len(), 1);

        // The writer keeps running after a failure
        writer.schedule(write(die, 6, 2));
        advance(600).await;
        assert_eq!(*log.lock().unwrap(), vec![(die, 6, 1), (die, 6, 2)]);
    }
}
