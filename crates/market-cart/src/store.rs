//! # Cart Store
//!
//! The in-memory cart plus everything derived from it.
//!
//! ## Thread Safety
//! The cart sits behind a `std::sync::Mutex`. No lock is ever held across
//! an `.await`, so mutations are synchronous and the store is shared as
//! `Arc<CartStore>`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Store Operations                              │
//! │                                                                         │
//! │  Screen Action         CartStore               Cart Change             │
//! │  ─────────────         ─────────               ───────────             │
//! │                                                                         │
//! │  App start ──────────► load() ───────────────► replaced from storage   │
//! │                                                                         │
//! │  Tap "Add" ──────────► add_to_cart(product) ─► qty += 1 or push qty 1  │
//! │                                                                         │
//! │  Tap "+" ────────────► increment(id) ────────► qty += 1                │
//! │                                                                         │
//! │  Tap "-" ────────────► decrement(id) ────────► qty -= 1, gone at 0     │
//! │                                                                         │
//! │  Badge / footer ─────► total_items_in_cart()   (read only)             │
//! │                        cart_total()                                    │
//! │                                                                         │
//! │  Every change enqueues the post-change snapshot while the lock is      │
//! │  still held, so storage sees changes in the order they happened.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use market_core::{Cart, CurrencyFormat, FormatValue, LineItem, NewLineItem};
use market_storage::KeyValueStore;

use crate::config::{CartConfig, PersistSettings};
use crate::error::{CartError, CartResult};
use crate::persist::{PersistHandle, PersistStatus, PersistWriter};

/// What `load()` found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored cart replaced the in-memory one.
    Restored { items: usize },

    /// Nothing stored under the key yet.
    Empty,

    /// The stored value was not a valid cart. The cart starts empty.
    Discarded,

    /// Storage could not be read. The in-memory cart is untouched.
    ReadFailed,
}

pub struct CartStore {
    cart: Mutex<Cart>,
    key: String,
    storage: Arc<dyn KeyValueStore>,
    formatter: Arc<dyn FormatValue>,
    persist: PersistHandle,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates an empty store and spawns its persistence writer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        settings: PersistSettings,
        formatter: Arc<dyn FormatValue>,
    ) -> Self {
        let key = key.into();
        let persist = PersistWriter::spawn(storage.clone(), key.clone(), settings);

        CartStore {
            cart: Mutex::new(Cart::new()),
            key,
            storage,
            formatter,
            persist,
        }
    }

    /// Builds a store from configuration, formatting with the configured
    /// currency.
    pub fn from_config(config: &CartConfig, storage: Arc<dyn KeyValueStore>) -> CartResult<Self> {
        config.validate()?;
        let format: CurrencyFormat = config.currency.format()?;

        Ok(Self::new(
            storage,
            config.storage_key(),
            config.persist.clone(),
            Arc::new(format),
        ))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Restores the cart saved under the store's key.
    ///
    /// Never fails. Problems are logged and reported through the outcome.
    pub async fn load(&self) -> LoadOutcome {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored cart");
                return LoadOutcome::Empty;
            }
            Err(e) => {
                let err = CartError::StorageRead(e);
                warn!(key = %self.key, error = %err, "Keeping in-memory cart");
                return LoadOutcome::ReadFailed;
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(stored) => {
                let items = stored.len();
                *self.lock() = stored;
                info!(key = %self.key, items, "Cart restored from storage");
                LoadOutcome::Restored { items }
            }
            Err(e) => {
                let err = CartError::Deserialization(e.to_string());
                warn!(key = %self.key, error = %err, "Discarding stored cart");
                *self.lock() = Cart::new();
                LoadOutcome::Discarded
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product`. The descriptor is not modified.
    pub fn add_to_cart(&self, product: &NewLineItem) -> CartResult<()> {
        self.mutate(|cart| {
            cart.add_item(product)?;
            debug!(
                id = %product.id,
                quantity = cart.get(&product.id).map(|item| item.quantity),
                "Added to cart"
            );
            Ok(true)
        })
    }

    /// Adds one unit to the item with `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &str) -> CartResult<()> {
        self.mutate(|cart| {
            let changed = cart.increment(id)?;
            if changed {
                debug!(id = %id, quantity = cart.get(id).map(|item| item.quantity), "Incremented");
            } else {
                debug!(id = %id, "Increment ignored, item not in cart");
            }
            Ok(changed)
        })
    }

    /// Removes one unit from the item with `id`, dropping it at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&self, id: &str) {
        let mut cart = self.lock();
        if cart.decrement(id) {
            debug!(id = %id, quantity = cart.get(id).map_or(0, |item| item.quantity), "Decremented");
            self.enqueue(&cart);
        } else {
            debug!(id = %id, "Decrement ignored, item not in cart");
        }
    }

    /// Applies `f` under the lock and, when it reports a change, queues the
    /// resulting snapshot before releasing the lock.
    fn mutate<F>(&self, f: F) -> CartResult<()>
    where
        F: FnOnce(&mut Cart) -> CartResult<bool>,
    {
        let mut cart = self.lock();
        if f(&mut *cart)? {
            self.enqueue(&cart);
        }
        Ok(())
    }

    fn enqueue(&self, cart: &Cart) {
        if let Err(e) = self.persist.enqueue(cart.clone()) {
            warn!(error = %e, "Cart change will not be persisted");
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current line items.
    pub fn products(&self) -> Vec<LineItem> {
        self.lock().items().to_vec()
    }

    /// Sum of all quantities.
    pub fn total_items_in_cart(&self) -> u64 {
        self.lock().total_items()
    }

    /// Sum of quantity × price, formatted for display.
    pub fn cart_total(&self) -> String {
        let total = self.lock().total();
        self.formatter.format_value(total)
    }

    // =========================================================================
    // Persistence control
    // =========================================================================

    /// Waits until every change made so far has been handled by the writer.
    pub async fn flush(&self) -> CartResult<()> {
        self.persist.flush().await
    }

    /// Flushes and stops the writer. Later changes stay in memory only.
    pub async fn shutdown(&self) -> CartResult<()> {
        self.persist.shutdown().await
    }

    pub async fn persist_status(&self) -> PersistStatus {
        self.persist.status().await
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
