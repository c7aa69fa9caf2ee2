//! # Validation Module
//!
//! Checks a product descriptor before it becomes a cart line.
//!
//! ## Rules
//! | Field | Rule |
//! |-------|------|
//! | `id` | required, at most 128 characters |
//! | `price` | not negative |
//!
//! `title` and `image_url` are display-only and pass through untouched.
//! Lengths are counted in characters, not bytes.

use crate::cart::NewLineItem;
use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_ID_LEN: usize = 128;

/// Validates a line item id.
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_line_item_id;
///
/// assert!(validate_line_item_id("prod-1").is_ok());
/// assert!(validate_line_item_id("   ").is_err());
/// ```
pub fn validate_line_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Runs every field check on a descriptor, stopping at the first failure.
pub fn validate_new_line_item(item: &NewLineItem) -> ValidationResult<()> {
    validate_line_item_id(&item.id)?;
    validate_price(item.price)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
