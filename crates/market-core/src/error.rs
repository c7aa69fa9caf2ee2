//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Bad product descriptors                        │
//! │                                                                         │
//! │  market-storage errors (separate crate)                                │
//! │  └── StorageError     - Key-value read/write failures                  │
//! │                                                                         │
//! │  market-cart errors                                                    │
//! │  └── CartError        - What cart consumers see                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → ApiError (terminal)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Incrementing would overflow the quantity counter.
    ///
    /// The cart is left unchanged when this is returned.
    #[error("Quantity for {id} cannot grow any further")]
    QuantityOverflow { id: String },

    /// The cart total would leave the representable money range.
    ///
    /// Mutations returning this leave the cart unchanged. A stored cart
    /// whose total overflows fails to deserialize.
    #[error("Cart total exceeds the largest representable amount")]
    TotalOverflow,

    /// The product descriptor failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for products entering the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
