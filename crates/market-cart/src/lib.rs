//! # market-cart: Cart State for GoMarketplace
//!
//! Holds the shopper's cart in memory, keeps a copy in device storage and
//! hands screens a shared handle to it.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          market-cart                                    │
//! │                                                                         │
//! │  ┌────────────────┐   use_cart()   ┌──────────────────────────────┐    │
//! │  │  CartProvider  │ ─────────────► │  CartContext (Arc<CartStore>)│    │
//! │  │  (provider.rs) │                └──────────────┬───────────────┘    │
//! │  └────────────────┘                               │                     │
//! │                                                   ▼                     │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  CartStore (store.rs)                                          │    │
//! │  │  Mutex<Cart> ── market-core rules ── FormatValue for totals    │    │
//! │  └──────────────────────────────┬─────────────────────────────────┘    │
//! │                                 │ snapshot per change                   │
//! │                                 ▼                                       │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  PersistWriter (persist.rs)  single task, ordered, coalescing  │    │
//! │  └──────────────────────────────┬─────────────────────────────────┘    │
//! │                                 ▼                                       │
//! │                    KeyValueStore (market-storage)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use market_cart::{CartConfig, CartProvider};
//! use market_core::{Money, NewLineItem};
//! use market_storage::MemoryStore;
//!
//! let provider = CartProvider::mount_with_config(&CartConfig::default(), Arc::new(MemoryStore::new())).await?;
//! let cart = provider.use_cart();
//! cart.add_to_cart(&NewLineItem::new("1", "Shirt", "https://img/shirt.png", Money::from_cents(1000)))?;
//! assert_eq!(cart.cart_total(), "R$ 10,00");
//! ```

pub mod config;
pub mod error;
pub mod persist;
pub mod provider;
pub mod store;

pub use config::{CartConfig, CurrencySettings, PersistSettings, StorageSettings};
pub use error::{CartError, CartResult};
pub use persist::{PersistHandle, PersistStatus, PersistWriter};
pub use provider::{CartContext, CartProvider};
pub use store::{CartStore, LoadOutcome};
