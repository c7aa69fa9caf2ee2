//! # market-core: Pure Cart Logic for GoMarketplace
//!
//! This crate is the **heart** of the storefront cart. It contains the cart
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Cart Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI                                │   │
//! │  │    Product list ──► Cart badge ──► Cart screen (+ / -)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartContext                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    market-cart (CartStore)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   money   │  │  format   │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │FormatValue│  │   rules   │  │   │
//! │  │   │   Cart    │  │           │  │ Currency  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - `LineItem`, `NewLineItem` and the ordered `Cart`
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`format`] - The currency formatting collaborator
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for products entering the cart
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::{Cart, CurrencyFormat, FormatValue, Money, NewLineItem};
//!
//! let mut cart = Cart::new();
//! let shirt = NewLineItem::new("shirt", "Camiseta", "https://img/shirt.png", Money::from_cents(1000));
//!
//! cart.add_item(&shirt).unwrap();
//! cart.add_item(&shirt).unwrap();
//!
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(CurrencyFormat::brl().format_value(cart.total()), "R$ 20,00");
//! ```

pub mod cart;
pub mod error;
pub mod format;
pub mod money;
pub mod validation;

pub use cart::{Cart, LineItem, NewLineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use format::{CurrencyFormat, FormatValue};
pub use money::Money;

/// Storage key the cart has always been persisted under.
///
/// Kept stable so carts saved by earlier releases still load.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplaceCartProducts";
