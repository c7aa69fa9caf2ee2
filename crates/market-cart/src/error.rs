//! # Cart Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌──────────────────┐  ┌────────────────────────┐ │
//! │  │     Usage       │  │   Persistence    │  │    Configuration       │ │
//! │  │                 │  │                  │  │                        │ │
//! │  │ OutsideProvider │  │ StorageRead      │  │ InvalidConfig          │ │
//! │  │ Core            │  │ StorageWrite     │  │ ConfigLoadFailed       │ │
//! │  │                 │  │ Deserialization  │  │                        │ │
//! │  │                 │  │ Serialization    │  │                        │ │
//! │  │                 │  │ ChannelClosed    │  │                        │ │
//! │  └─────────────────┘  └──────────────────┘  └────────────────────────┘ │
//! │                                                                         │
//! │  Persistence errors never reach the caller of a mutation. They are     │
//! │  logged and the in-memory cart keeps going.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use market_core::CoreError;
use market_storage::StorageError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Usage Errors
    // =========================================================================
    /// The cart was requested from a provider that was never mounted.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// A cart rule rejected the operation (validation, overflow).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("Failed to read cart from storage: {0}")]
    StorageRead(#[source] StorageError),

    #[error("Failed to write cart to storage: {0}")]
    StorageWrite(#[source] StorageError),

    /// The stored document is not a valid cart.
    #[error("Stored cart could not be decoded: {0}")]
    Deserialization(String),

    #[error("Cart could not be encoded: {0}")]
    Serialization(String),

    /// The persistence writer has stopped.
    #[error("Persistence writer is not running")]
    ChannelClosed,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true when the in-memory cart is still usable after this error.
    ///
    /// Every persistence failure is recoverable: the next successful write
    /// brings storage back in line with memory.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CartError::StorageRead(_)
                | CartError::StorageWrite(_)
                | CartError::Deserialization(_)
                | CartError::Serialization(_)
                | CartError::ChannelClosed
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_) | CartError::ConfigLoadFailed(_)
        )
    }
}
