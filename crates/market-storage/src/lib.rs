//! # market-storage: Key-Value Persistence for GoMarketplace
//!
//! The cart survives app restarts by writing one JSON document under one key.
//! This crate provides the store behind that key.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Persistence Flow                            │
//! │                                                                         │
//! │  CartStore mutation                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PersistWriter (market-cart) ── set("@GoMarketplaceCartProducts", json) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 market-storage (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   KeyValueStore (kv.rs)      get / set / remove                 │   │
//! │  │        ▲             ▲                                          │   │
//! │  │        │             │                                          │   │
//! │  │   SqliteStore    MemoryStore                                    │   │
//! │  │   (sqlite.rs)    (memory.rs)                                    │   │
//! │  │   kv_store table HashMap, for tests                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_storage::{KeyValueStore, SqliteStore, StoreConfig};
//!
//! let store = SqliteStore::open(StoreConfig::new("cart.db")).await?;
//! store.set("@GoMarketplaceCartProducts", "[]").await?;
//! assert_eq!(store.get("@GoMarketplaceCartProducts").await?.as_deref(), Some("[]"));
//! ```

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreConfig};
