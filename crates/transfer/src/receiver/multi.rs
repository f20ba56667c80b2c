//! Receiver for many concurrent transfers keyed by id.
//!
//! Each transfer gets a timer when its first chunk arrives. The timer is
//! never reset: if the transfer is not complete when it fires, the
//! transfer's fragments are dropped and a failure event is emitted.
//! Completion and failure are reported out of band on an event channel,
//! since no `add_chunk` call is active when a timer fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chunkwire_protocol::Chunk;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::TransferState;
use super::{ChunkStatus, parse_chunk};
use crate::{ReceiverConfig, TransferError, hash};

/// Notifications emitted by a [`TransferReceiver`].
#[derive(Debug)]
pub enum ReceiverEvent {
    /// A transfer was reassembled.
    Completed { id: String, payload: Vec<u8> },
    /// A transfer timed out, was cancelled, or could not be reassembled.
    Failed { id: String, error: TransferError },
}

impl ReceiverEvent {
    /// Id of the transfer this event is about.
    pub fn id(&self) -> &str {
        match self {
            ReceiverEvent::Completed { id, .. } | ReceiverEvent::Failed { id, .. } => id,
        }
    }
}

/// An in-flight transfer and the handle to its timer.
struct Pending {
    state: TransferState,
    /// Distinguishes this transfer from a later one reusing the same id.
    epoch: u64,
    timer: CancellationToken,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

/// Accumulates chunks for any number of concurrent transfers.
///
/// `add_chunk` bookkeeping is synchronous; reassembly runs on Tokio's
/// blocking pool and its result is delivered as a [`ReceiverEvent`].
/// Must be used from within a Tokio runtime.
///
/// Dropping the receiver cancels every pending timer and releases all
/// stored fragments.
pub struct TransferReceiver {
    config: ReceiverConfig,
    pending: PendingMap,
    next_epoch: AtomicU64,
    /// Parent of every per-transfer timer token.
    shutdown: CancellationToken,
    events_tx: mpsc::Sender<ReceiverEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<ReceiverEvent>>>,
}

impl TransferReceiver {
    /// Creates a receiver with the given configuration.
    pub fn new(config: ReceiverConfig) -> Result<Self, TransferError> {
        config.validate()?;
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
        Ok(Self {
            config,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_epoch: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        })
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// The channel holds `event_capacity` events and the caller must keep
    /// draining it. Once it is full, each further completion parks a task
    /// holding the reassembled payload until there is room or the receiver
    /// is dropped.
    pub fn take_events(&self) -> Option<mpsc::Receiver<ReceiverEvent>> {
        lock(&self.events_rx).take()
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Adds a chunk of any transfer.
    ///
    /// The first chunk for an unseen id starts a new transfer and its timer.
    /// Chunks for an id that already completed or timed out start a fresh,
    /// unrelated transfer.
    pub fn add_chunk(&self, chunk: Chunk) -> Result<ChunkStatus, TransferError> {
        let id = chunk.id.clone();
        let mut pending = lock(&self.pending);

        let status = match pending.get_mut(&id) {
            Some(entry) => entry.state.accept(chunk)?,
            None => {
                // Validate before inserting so a bad first chunk leaves no state behind.
                let mut state = TransferState::new(id.clone(), chunk.total)?;
                let status = state.accept(chunk)?;
                let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
                let timer = self.shutdown.child_token();
                debug!(id = %id, total = state.total(), epoch, "transfer started");
                pending.insert(
                    id.clone(),
                    Pending {
                        state,
                        epoch,
                        timer: timer.clone(),
                    },
                );
                self.spawn_timer(id.clone(), epoch, timer);
                status
            }
        };

        if status == ChunkStatus::Completed
            && let Some(entry) = pending.remove(&id)
        {
            drop(pending);
            entry.timer.cancel();
            self.spawn_reconstruction(entry.state);
        }

        Ok(status)
    }

    /// Parses a JSON chunk message and adds it.
    pub fn add_json(&self, json: &str) -> Result<ChunkStatus, TransferError> {
        self.add_chunk(parse_chunk(json)?)
    }

    /// Abandons an in-flight transfer now, as if its timer had fired.
    ///
    /// Emits a [`ReceiverEvent::Failed`] with [`TransferError::Cancelled`].
    /// Returns `false` if no transfer with that id is pending.
    pub fn cancel(&self, id: &str) -> bool {
        let Some(entry) = lock(&self.pending).remove(id) else {
            return false;
        };
        entry.timer.cancel();
        debug!(id, received = entry.state.received(), "transfer cancelled");
        let events_tx = self.events_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let event = ReceiverEvent::Failed {
                id: id.clone(),
                error: TransferError::Cancelled(id),
            };
            emit(&events_tx, event).await;
        });
        true
    }

    /// Ids of all in-flight transfers.
    pub fn pending(&self) -> Vec<String> {
        lock(&self.pending).keys().cloned().collect()
    }

    /// Returns `(received, total)` for an in-flight transfer.
    pub fn progress(&self, id: &str) -> Option<(u64, u64)> {
        lock(&self.pending)
            .get(id)
            .map(|p| (p.state.received(), p.state.total()))
    }

    /// Number of in-flight transfers.
    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancels all timers and drops every in-flight transfer without
    /// emitting events.
    pub fn shutdown(self) {
        let dropped = {
            let mut pending = lock(&self.pending);
            let n = pending.len();
            pending.clear();
            n
        };
        info!(dropped, "transfer receiver shut down");
        // Drop cancels the timers.
    }

    fn spawn_timer(&self, id: String, epoch: u64, timer: CancellationToken) {
        let pending = Arc::clone(&self.pending);
        let events_tx = self.events_tx.clone();
        let timeout = self.config.timeout;

        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => return,
                _ = tokio::time::sleep(timeout) => {}
            }

            let expired = {
                let mut pending = lock(&pending);
                // The id may have completed and been reused since this timer started.
                let current = pending.get(&id).is_some_and(|entry| entry.epoch == epoch);
                if current { pending.remove(&id) } else { None }
            };

            if let Some(entry) = expired {
                warn!(
                    id = %id,
                    received = entry.state.received(),
                    total = entry.state.total(),
                    "transfer timed out"
                );
                let event = ReceiverEvent::Failed {
                    id: id.clone(),
                    error: TransferError::TimeoutExpired(id),
                };
                emit(&events_tx, event).await;
            }
        });
    }

    fn spawn_reconstruction(&self, state: TransferState) {
        let events_tx = self.events_tx.clone();
        let verify = self.config.verify;
        let id = state.id().to_string();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || reconstruct(&state, verify)).await;
            let event = match result {
                Ok(Ok(payload)) => {
                    info!(id = %id, bytes = payload.len(), "transfer complete");
                    ReceiverEvent::Completed { id, payload }
                }
                Ok(Err(error)) => {
                    warn!(id = %id, %error, "transfer reconstruction failed");
                    ReceiverEvent::Failed { id, error }
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "reconstruction task failed");
                    ReceiverEvent::Failed {
                        id,
                        error: TransferError::ReconstructionFailure(format!(
                            "reconstruction task failed: {e}"
                        )),
                    }
                }
            };
            emit(&events_tx, event).await;
        });
    }
}

impl Drop for TransferReceiver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for TransferReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferReceiver")
            .field("config", &self.config)
            .field("pending", &self.len())
            .finish()
    }
}

/// Joiner, decompression and, when required, the digest check.
fn reconstruct(state: &TransferState, verify: bool) -> Result<Vec<u8>, TransferError> {
    let payload = state.assemble()?;
    if verify && !hash::verify_content(&payload, state.id()) {
        return Err(TransferError::ReconstructionFailure(format!(
            "digest mismatch for {}",
            state.id()
        )));
    }
    Ok(payload)
}

async fn emit(events_tx: &mpsc::Sender<ReceiverEvent>, event: ReceiverEvent) {
    let id = event.id().to_string();
    if events_tx.send(event).await.is_err() {
        debug!(id = %id, "event receiver dropped, discarding event");
    }
}

/// Locks `mutex`, recovering the data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
