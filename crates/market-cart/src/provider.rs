//! # Cart Provider
//!
//! The scope screens get their cart from. A provider is mounted once at app
//! start, which builds the store and loads the saved cart. Screens call
//! [`CartProvider::use_cart`] to get a [`CartContext`].
//!
//! ```text
//! CartProvider::mount(config, storage, formatter).await
//!     │   CartStore::new ─► load()        (loading → ready)
//!     ▼
//! provider.use_cart() ─► CartContext ─► products / add_to_cart / increment
//!                                       decrement / totals
//!
//! CartProvider::unmounted().use_cart()  ─► panic, no cart in scope
//! ```

use std::sync::Arc;
use tracing::info;

use market_core::{FormatValue, LineItem, NewLineItem};
use market_storage::KeyValueStore;

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::persist::PersistStatus;
use crate::store::{CartStore, LoadOutcome};

/// Handle to the mounted cart. Cheap to clone.
///
/// Exposes the reads and the three mutations. Loading and stopping
/// persistence stay with the provider.
#[derive(Debug, Clone)]
pub struct CartContext {
    store: Arc<CartStore>,
}

impl CartContext {
    pub fn products(&self) -> Vec<LineItem> {
        self.store.products()
    }

    pub fn add_to_cart(&self, product: &NewLineItem) -> CartResult<()> {
        self.store.add_to_cart(product)
    }

    pub fn increment(&self, id: &str) -> CartResult<()> {
        self.store.increment(id)
    }

    pub fn decrement(&self, id: &str) {
        self.store.decrement(id)
    }

    pub fn total_items_in_cart(&self) -> u64 {
        self.store.total_items_in_cart()
    }

    pub fn cart_total(&self) -> String {
        self.store.cart_total()
    }

    /// Waits until every change made so far has been handled by the writer.
    pub async fn flush(&self) -> CartResult<()> {
        self.store.flush().await
    }

    pub async fn persist_status(&self) -> PersistStatus {
        self.store.persist_status().await
    }

    pub fn key(&self) -> &str {
        self.store.key()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartProvider {
    store: Option<Arc<CartStore>>,
    load_outcome: Option<LoadOutcome>,
}

impl CartProvider {
    /// Builds the store, restores the saved cart and returns the mounted
    /// provider.
    pub async fn mount(
        config: &CartConfig,
        storage: Arc<dyn KeyValueStore>,
        formatter: Arc<dyn FormatValue>,
    ) -> CartResult<Self> {
        config.validate()?;

        let store = CartStore::new(
            storage,
            config.storage_key(),
            config.persist.clone(),
            formatter,
        );
        let outcome = store.load().await;
        info!(?outcome, key = %store.key(), "Cart provider mounted");

        Ok(CartProvider {
            store: Some(Arc::new(store)),
            load_outcome: Some(outcome),
        })
    }

    /// Like [`CartProvider::mount`], formatting with the configured currency.
    pub async fn mount_with_config(
        config: &CartConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> CartResult<Self> {
        let format = config.currency.format()?;
        Self::mount(config, storage, Arc::new(format)).await
    }

    /// A scope with no cart in it.
    pub fn unmounted() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    /// What the initial load found. `None` when unmounted.
    pub fn load_outcome(&self) -> Option<&LoadOutcome> {
        self.load_outcome.as_ref()
    }

    /// Returns the cart in scope.
    ///
    /// # Panics
    /// Panics when the provider was never mounted. Asking for a cart outside
    /// its provider is a programming error.
    pub fn use_cart(&self) -> CartContext {
        match self.try_use_cart() {
            Ok(context) => context,
            Err(err) => panic!("{}", err),
        }
    }

    /// Returns the cart in scope, or [`CartError::OutsideProvider`].
    pub fn try_use_cart(&self) -> CartResult<CartContext> {
        self.store
            .as_ref()
            .map(|store| CartContext {
                store: store.clone(),
            })
            .ok_or(CartError::OutsideProvider)
    }

    /// Flushes pending writes and stops persistence.
    pub async fn unmount(self) -> CartResult<()> {
        match self.store {
            Some(store) => store.shutdown().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{CurrencyFormat, Money};
    use market_storage::MemoryStore;

    #[tokio::test]
    async fn test_mount_loads_cart() {
        let storage = Arc::new(MemoryStore::with_entry(
            market_core::DEFAULT_STORAGE_KEY,
            r#"[{"id":"a","title":"A","image_url":"u","price":2.5,"quantity":2}]"#,
        ));
        let provider =
            CartProvider::mount(&CartConfig::default(), storage, Arc::new(CurrencyFormat::brl()))
                .await
                .unwrap();

        assert!(provider.is_mounted());
        assert_eq!(
            provider.load_outcome(),
            Some(&LoadOutcome::Restored { items: 1 })
        );

        let cart = provider.use_cart();
        assert_eq!(cart.total_items_in_cart(), 2);
        assert_eq!(cart.cart_total(), "R$ 5,00");
    }

    #[tokio::test]
    async fn test_contexts_share_one_cart() {
        let provider = CartProvider::mount_with_config(
            &CartConfig::default(),
            Arc::new(MemoryStore::new()),
        )
        .await
        .unwrap();

        let first = provider.use_cart();
        let second = provider.use_cart();
        first
            .add_to_cart(&NewLineItem::new("1", "Cap", "img", Money::from_cents(500)))
            .unwrap();

        assert_eq!(second.products().len(), 1);
        assert_eq!(second.key(), market_core::DEFAULT_STORAGE_KEY);
        provider.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_context_flushes_and_reports_status() {
        let storage = Arc::new(MemoryStore::new());
        let provider = CartProvider::mount_with_config(&CartConfig::default(), storage.clone())
            .await
            .unwrap();

        let cart = provider.use_cart();
        cart.add_to_cart(&NewLineItem::new("1", "Cap", "img", Money::from_cents(500)))
            .unwrap();
        cart.flush().await.unwrap();

        let status = cart.persist_status().await;
        assert_eq!(status.writes, 1);
        assert!(status.is_in_sync());
        assert!(storage.get(cart.key()).await.unwrap().is_some());
        provider.unmount().await.unwrap();
    }

    #[test]
    fn test_try_use_cart_outside_provider() {
        let provider = CartProvider::unmounted();
        assert!(!provider.is_mounted());
        assert!(matches!(
            provider.try_use_cart(),
            Err(CartError::OutsideProvider)
        ));
    }

    #[test]
    #[should_panic(expected = "use_cart must be used within a CartProvider")]
    fn test_use_cart_outside_provider_panics() {
        CartProvider::unmounted().use_cart();
    }

    #[tokio::test]
    async fn test_mount_rejects_invalid_config() {
        let mut config = CartConfig::default();
        config.storage.key = String::new();

        let result = CartProvider::mount_with_config(&config, Arc::new(MemoryStore::new())).await;
        assert!(matches!(result, Err(CartError::InvalidConfig(_))));
    }
}
