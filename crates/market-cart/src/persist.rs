//! # Persistence Writer
//!
//! Every cart mutation produces a snapshot. Snapshots are written to storage
//! by exactly one background task, in the order the mutations happened.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Single-Writer Queue                              │
//! │                                                                         │
//! │  CartStore (under cart lock)                                           │
//! │       │  enqueue(snapshot)          never awaits                       │
//! │       ▼                                                                 │
//! │  mpsc::unbounded_channel  ── Save(s1) Save(s2) Save(s3) Flush(ack)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PersistWriter::run                                                    │
//! │       │  drain queued Saves, keep only the newest (s3)                 │
//! │       │  serde_json::to_string(s3)                                     │
//! │       ▼                                                                 │
//! │  KeyValueStore::set(key, json)                                         │
//! │       ├── Ok   → writes += 1, last_written_at = now                    │
//! │       └── Err  → exponential backoff, retry until max_elapsed          │
//! │                  still failing → error!, failures += 1                 │
//! │                  memory stays authoritative                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Flush(ack) answered after everything queued before it                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info, warn};

use market_core::Cart;
use market_storage::KeyValueStore;

use crate::config::PersistSettings;
use crate::error::{CartError, CartResult};

// =============================================================================
// Persist Status
// =============================================================================

/// Counters describing how persistence has gone so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Successful writes.
    pub writes: u64,

    /// Snapshots that exhausted their retries.
    pub failures: u64,

    /// Snapshots superseded by a newer one before they were written.
    pub coalesced: u64,

    pub last_error: Option<String>,

    pub last_written_at: Option<DateTime<Utc>>,
}

impl PersistStatus {
    /// Storage matches the last snapshot that reached the writer.
    pub fn is_in_sync(&self) -> bool {
        self.last_error.is_none()
    }
}

// =============================================================================
// Requests
// =============================================================================

enum WriteRequest {
    Save(Cart),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// A control request found while draining queued snapshots.
enum Control {
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable sender side of the writer.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<WriteRequest>,
    status: Arc<RwLock<PersistStatus>>,
}

impl PersistHandle {
    /// Queues a snapshot. Returns immediately.
    pub fn enqueue(&self, snapshot: Cart) -> CartResult<()> {
        self.tx
            .send(WriteRequest::Save(snapshot))
            .map_err(|_| CartError::ChannelClosed)
    }

    /// Resolves once every snapshot queued before this call has been handled.
    pub async fn flush(&self) -> CartResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriteRequest::Flush(ack_tx))
            .map_err(|_| CartError::ChannelClosed)?;
        ack_rx.await.map_err(|_| CartError::ChannelClosed)
    }

    /// Writes whatever is queued, then stops the writer.
    pub async fn shutdown(&self) -> CartResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriteRequest::Shutdown(ack_tx))
            .map_err(|_| CartError::ChannelClosed)?;
        ack_rx.await.map_err(|_| CartError::ChannelClosed)
    }

    pub async fn status(&self) -> PersistStatus {
        self.status.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Owns the storage and performs every write for one cart key.
pub struct PersistWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    settings: PersistSettings,
    rx: mpsc::UnboundedReceiver<WriteRequest>,
    status: Arc<RwLock<PersistStatus>>,
}

impl PersistWriter {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        settings: PersistSettings,
    ) -> (Self, PersistHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(RwLock::new(PersistStatus::default()));

        let writer = PersistWriter {
            storage,
            key: key.into(),
            settings,
            rx,
            status: status.clone(),
        };

        (writer, PersistHandle { tx, status })
    }

    /// Creates the writer and spawns it on the current tokio runtime.
    pub fn spawn(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        settings: PersistSettings,
    ) -> PersistHandle {
        let (writer, handle) = Self::new(storage, key, settings);
        tokio::spawn(writer.run());
        handle
    }

    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(key = %self.key, "Persistence writer starting");

        while let Some(request) = self.rx.recv().await {
            let control = match request {
                WriteRequest::Save(snapshot) => {
                    let (latest, control) = self.drain(snapshot).await;
                    self.write(&latest).await;
                    control
                }
                WriteRequest::Flush(ack) => Some(Control::Flush(ack)),
                WriteRequest::Shutdown(ack) => Some(Control::Shutdown(ack)),
            };

            match control {
                Some(Control::Flush(ack)) => {
                    let _ = ack.send(());
                }
                Some(Control::Shutdown(ack)) => {
                    self.finish().await;
                    let _ = ack.send(());
                    info!("Persistence writer stopped");
                    return;
                }
                None => {}
            }
        }

        info!("Persistence writer stopped, all handles dropped");
    }

    /// Takes every snapshot already queued behind `first` and keeps the
    /// newest. Stops at the first control request so it is answered only
    /// after the snapshots ahead of it.
    async fn drain(&mut self, first: Cart) -> (Cart, Option<Control>) {
        let mut latest = first;
        let mut skipped = 0u64;

        let control = loop {
            match self.rx.try_recv() {
                Ok(WriteRequest::Save(next)) => {
                    latest = next;
                    skipped += 1;
                }
                Ok(WriteRequest::Flush(ack)) => break Some(Control::Flush(ack)),
                Ok(WriteRequest::Shutdown(ack)) => break Some(Control::Shutdown(ack)),
                Err(_) => break None,
            }
        };

        if skipped > 0 {
            debug!(skipped, "Coalesced queued cart snapshots");
            self.status.write().await.coalesced += skipped;
        }

        (latest, control)
    }

    /// Writes any snapshots still queued at shutdown.
    async fn finish(&mut self) {
        self.rx.close();
        let mut latest = None;
        while let Ok(request) = self.rx.try_recv() {
            match request {
                WriteRequest::Save(snapshot) => latest = Some(snapshot),
                WriteRequest::Flush(ack) | WriteRequest::Shutdown(ack) => {
                    if let Some(snapshot) = latest.take() {
                        self.write(&snapshot).await;
                    }
                    let _ = ack.send(());
                }
            }
        }
        if let Some(snapshot) = latest {
            self.write(&snapshot).await;
        }
    }

    async fn write(&self, snapshot: &Cart) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                let err = CartError::Serialization(e.to_string());
                error!(error = %err, "Cart snapshot could not be encoded");
                self.record_failure(&err).await;
                return;
            }
        };

        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.storage.set(&self.key, &json).await {
                Ok(()) => {
                    debug!(
                        key = %self.key,
                        items = snapshot.len(),
                        attempt,
                        "Cart persisted"
                    );
                    let mut status = self.status.write().await;
                    status.writes += 1;
                    status.last_error = None;
                    status.last_written_at = Some(Utc::now());
                    return;
                }
                Err(e) => {
                    let retry_in = if self.settings.retries_enabled() {
                        backoff.next_backoff()
                    } else {
                        None
                    };

                    match retry_in {
                        Some(duration) => {
                            warn!(attempt, ?duration, error = %e, "Cart write failed, retrying");
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            let err = CartError::StorageWrite(e);
                            error!(
                                attempt,
                                error = %err,
                                "Giving up on cart write, storage is behind memory"
                            );
                            self.record_failure(&err).await;
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn record_failure(&self, err: &CartError) {
        let mut status = self.status.write().await;
        status.failures += 1;
        status.last_error = Some(err.to_string());
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.settings.initial_backoff(),
            initial_interval: self.settings.initial_backoff(),
            max_interval: self.settings.max_backoff(),
            multiplier: 2.0,
            max_elapsed_time: Some(self.settings.max_elapsed()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{Money, NewLineItem};
    use market_storage::{MemoryStore, StorageError, StorageResult};
    use std::sync::atomic::{AtomicU32, Ordering};

    const KEY: &str = "@GoMarketplaceCartProducts";

    fn cart_with(ids: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for id in ids {
            cart.add_item(&NewLineItem::new(*id, "Item", "img", Money::from_cents(100)))
                .unwrap();
        }
        cart
    }

    /// Fails the first `failures` writes, then delegates to memory.
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicU32,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StorageError::write(key, "device busy"));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key).await
        }
    }

    fn fast_retry() -> PersistSettings {
        PersistSettings {
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            max_elapsed_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_flush_waits_for_queued_writes() {
        let storage = Arc::new(MemoryStore::new());
        let handle = PersistWriter::spawn(storage.clone(), KEY, PersistSettings::no_retry());

        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.enqueue(cart_with(&["a", "b"])).unwrap();
        handle.flush().await.unwrap();

        let stored: Cart = serde_json::from_str(&storage.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, cart_with(&["a", "b"]));
    }

    #[tokio::test]
    async fn test_coalesces_to_latest_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        let (writer, handle) = PersistWriter::new(storage.clone(), KEY, PersistSettings::no_retry());

        // Queue everything before the writer starts.
        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.enqueue(cart_with(&["a", "b"])).unwrap();
        handle.enqueue(cart_with(&["c"])).unwrap();
        tokio::spawn(writer.run());
        handle.flush().await.unwrap();

        let status = handle.status().await;
        assert_eq!(status.writes, 1);
        assert_eq!(status.coalesced, 2);

        let stored: Cart = serde_json::from_str(&storage.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, cart_with(&["c"]));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let storage = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(2),
        });
        let handle = PersistWriter::spawn(storage.clone(), KEY, fast_retry());

        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.flush().await.unwrap();

        let status = handle.status().await;
        assert_eq!(status.writes, 1);
        assert_eq!(status.failures, 0);
        assert!(status.is_in_sync());
        assert!(storage.inner.get(KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failure_without_retry_is_counted() {
        let storage = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(1),
        });
        let handle = PersistWriter::spawn(storage.clone(), KEY, PersistSettings::no_retry());

        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.flush().await.unwrap();

        let status = handle.status().await;
        assert_eq!(status.failures, 1);
        assert!(!status.is_in_sync());
        assert!(storage.inner.get(KEY).await.unwrap().is_none());

        // The next snapshot reconciles storage.
        handle.enqueue(cart_with(&["a", "b"])).unwrap();
        handle.flush().await.unwrap();

        let status = handle.status().await;
        assert_eq!(status.writes, 1);
        assert!(status.is_in_sync());
        assert!(status.last_written_at.is_some());
    }

    #[tokio::test]
    async fn test_shutdown_writes_pending_and_stops() {
        let storage = Arc::new(MemoryStore::new());
        let (writer, handle) = PersistWriter::new(storage.clone(), KEY, PersistSettings::no_retry());
        let task = tokio::spawn(writer.run());

        handle.enqueue(cart_with(&["z"])).unwrap();
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(storage.get(KEY).await.unwrap().is_some());
        assert!(!handle.is_running());
        assert!(matches!(
            handle.enqueue(cart_with(&["y"])),
            Err(CartError::ChannelClosed)
        ));
        assert!(matches!(handle.flush().await, Err(CartError::ChannelClosed)));
    }
}
