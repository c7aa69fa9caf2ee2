//! # Money Module
//!
//! Provides the `Money` type for handling prices and cart totals safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing float prices:                                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Prices arrive as major-unit numbers (10.5) and are converted ONCE    │
//! │    to minor units (1050). Every sum after that is exact.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! let line_total = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line_total.cents(), 3297);
//!
//! assert_eq!(Money::try_from_major(10.99), Some(Money::from_cents(1099)));
//! assert_eq!(Money::try_from_major(1e17), None);
//! ```
//!
//! Arithmetic is checked. A sum that leaves the `i64` range is `None`,
//! never a wrapped or clamped value.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Minor units in one major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// The type does not know its currency. Display formatting belongs to the
/// [`FormatValue`](crate::format::FormatValue) collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// The largest representable amount.
    pub const MAX: Money = Money(i64::MAX);

    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount, rounding to the nearest minor unit.
    ///
    /// Returns `None` for NaN, infinities and amounts whose minor-unit value
    /// does not fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_major(5.0), Some(Money::from_cents(500)));
    /// assert_eq!(Money::try_from_major(0.1 + 0.2), Some(Money::from_cents(30)));
    /// assert_eq!(Money::try_from_major(f64::NAN), None);
    /// ```
    pub fn try_from_major(major: f64) -> Option<Self> {
        let minor = (major * MINOR_PER_MAJOR as f64).round();
        // i64::MIN and i64::MAX + 1 are both exact powers of two as f64.
        if !minor.is_finite() || minor < i64::MIN as f64 || minor >= i64::MAX as f64 {
            return None;
        }
        Some(Money(minor as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion, always 0-99.
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns the value as a major-unit float (for serialization only).
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::MAX.checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(value) => Some(Money(value)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Money(value)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering such as `10.99`, used in logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Major-Unit Serde Helper
// =============================================================================

/// Serializes [`Money`] as a major-unit JSON number.
///
/// The persisted cart stores prices the way the storefront API sends them
/// (`"price": 5` or `"price": 10.5`). Whole amounts are written as integers.
/// Negative, non-finite and out-of-range values are rejected on the way in.
///
/// ```rust,ignore
/// #[serde(with = "market_core::money::major_units")]
/// pub price: Money,
/// ```
pub mod major_units {
    use super::{Money, MINOR_PER_MAJOR};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if money.cents() % MINOR_PER_MAJOR == 0 {
            serializer.serialize_i64(money.cents() / MINOR_PER_MAJOR)
        } else {
            serializer.serialize_f64(money.as_major())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let major = f64::deserialize(deserializer)?;
        if !major.is_finite() {
            return Err(D::Error::custom("price must be a finite number"));
        }
        if major < 0.0 {
            return Err(D::Error::custom(format!(
                "price must be non-negative, got {}",
                major
            )));
        }
        Money::try_from_major(major)
            .ok_or_else(|| D::Error::custom(format!("price {} is out of range", major)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
