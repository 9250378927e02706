//! Write-behind persistence.
//!
//! Cart mutations update memory first and hand the resulting snapshot to a
//! [`WriteBehind`] queue. A single background task owns the storage handle
//! and drains the queue in FIFO order, so storage never sees an older
//! snapshot after a newer one. When several snapshots are waiting, only the
//! newest is written.

use std::sync::Arc;

use go_marketplace_core::CartEntry;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

use crate::cart::CartSnapshot;
use crate::error::PersistError;
use crate::storage::KeyValueStore;

/// Work item for the writer task.
enum Command {
    /// Overwrite the key with this snapshot.
    Write(CartSnapshot),
    /// Delete the key.
    Remove,
    /// Report once everything queued before this has been handled.
    Flush(oneshot::Sender<Result<(), PersistError>>),
}

/// Handle to the background writer for one storage key.
///
/// Dropping the handle closes the queue; the writer finishes whatever is
/// still queued and exits.
#[derive(Debug)]
pub struct WriteBehind {
    tx: mpsc::UnboundedSender<Command>,
}

impl WriteBehind {
    /// Spawn the writer task for `key` on the current tokio runtime.
    pub fn spawn<S: KeyValueStore>(storage: Arc<S>, key: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = Writer {
            storage,
            key,
            rx,
            failure: None,
        };
        tokio::spawn(writer.run());
        Self { tx }
    }

    /// Queue a full snapshot write. Never blocks.
    pub fn enqueue(&self, snapshot: CartSnapshot) {
        if self.tx.send(Command::Write(snapshot)).is_err() {
            error!("Persistence writer has shut down, dropping cart snapshot");
        }
    }

    /// Queue deletion of the persisted snapshot. Never blocks.
    pub fn enqueue_remove(&self) {
        if self.tx.send(Command::Remove).is_err() {
            error!("Persistence writer has shut down, dropping cart removal");
        }
    }

    /// Wait until every previously queued command has reached storage.
    ///
    /// # Errors
    ///
    /// Returns the first write failure since the previous flush, or
    /// [`PersistError::WriterClosed`] if the writer task is gone.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| PersistError::WriterClosed)?;
        done.await.map_err(|_| PersistError::WriterClosed)?
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write(snapshot) => write!(f, "Write({} entries)", snapshot.len()),
            Self::Remove => f.write_str("Remove"),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

/// Background task state.
struct Writer<S> {
    storage: Arc<S>,
    key: String,
    rx: mpsc::UnboundedReceiver<Command>,
    /// First failure since the last flush.
    failure: Option<PersistError>,
}

impl<S: KeyValueStore> Writer<S> {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn run(mut self) {
        debug!("Persistence writer started");

        let mut next = self.rx.recv().await;
        while let Some(command) = next.take() {
            match command {
                Command::Write(snapshot) => {
                    let (latest, deferred) = self.coalesce(snapshot);
                    next = deferred;
                    let result = self.write(&latest).await;
                    self.record(result);
                }
                Command::Remove => {
                    let result = self.storage.remove(&self.key).await.map_err(Into::into);
                    if result.is_ok() {
                        debug!("Removed persisted cart");
                    }
                    self.record(result);
                }
                Command::Flush(reply) => {
                    let result = self.failure.take().map_or(Ok(()), Err);
                    // The caller may have stopped waiting.
                    let _ = reply.send(result);
                }
            }

            if next.is_none() {
                next = self.rx.recv().await;
            }
        }

        info!("Persistence writer stopped");
    }

    /// Skip past queued writes to the newest one.
    ///
    /// Returns the snapshot to write and the first non-write command that
    /// ended the run, which must be handled next.
    fn coalesce(&mut self, mut latest: CartSnapshot) -> (CartSnapshot, Option<Command>) {
        let mut skipped = 0_usize;
        let deferred = loop {
            match self.rx.try_recv() {
                Ok(Command::Write(newer)) => {
                    latest = newer;
                    skipped += 1;
                }
                Ok(other) => break Some(other),
                Err(_) => break None,
            }
        };
        if skipped > 0 {
            debug!(skipped, "Coalesced queued cart snapshots");
        }
        (latest, deferred)
    }

    async fn write(&self, snapshot: &CartSnapshot) -> Result<(), PersistError> {
        let entries: &[CartEntry] = snapshot.entries();
        let encoded = serde_json::to_string(entries)?;
        self.storage.set(&self.key, encoded).await?;
        debug!(entries = entries.len(), "Persisted cart snapshot");
        Ok(())
    }

    fn record(&mut self, result: Result<(), PersistError>) {
        if let Err(e) = result {
            error!(error = %e, "Failed to persist cart");
            if self.failure.is_none() {
                self.failure = Some(e);
            }
        }
    }
}
