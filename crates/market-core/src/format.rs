//! # Currency Formatting
//!
//! The cart never decides how money looks on screen. It hands totals to a
//! [`FormatValue`] implementation and shows whatever string comes back.
//!
//! ```text
//! Cart::total() ──► Money(2050) ──► FormatValue ──► "R$ 20,50"
//! ```
//!
//! Any `Fn(Money) -> String` closure is a formatter, so callers can plug in
//! their own locale handling:
//!
//! ```rust
//! use market_core::{FormatValue, Money};
//!
//! let cents = |m: Money| format!("{}c", m.cents());
//! assert_eq!(cents.format_value(Money::from_cents(42)), "42c");
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Maps a monetary amount to a display string.
pub trait FormatValue: Send + Sync {
    fn format_value(&self, amount: Money) -> String;
}

impl<F> FormatValue for F
where
    F: Fn(Money) -> String + Send + Sync,
{
    fn format_value(&self, amount: Money) -> String {
        self(amount)
    }
}

/// Locale-style currency format built from separators and a symbol.
///
/// ## Presets
/// | Preset | 123456 minor units |
/// |--------|--------------------|
/// | `brl()` | `R$ 1.234,56` |
/// | `usd()` | `$1,234.56` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Currency symbol placed before the amount.
    pub symbol: String,

    /// Text between the symbol and the digits (`" "` for BRL, empty for USD).
    #[serde(default)]
    pub symbol_separator: String,

    pub decimal_separator: char,

    pub thousands_separator: char,

    /// Digits shown after the decimal separator (0-2).
    pub decimals: u8,
}

impl CurrencyFormat {
    /// Brazilian real, the storefront's home currency.
    pub fn brl() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            symbol_separator: " ".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            decimals: 2,
        }
    }

    /// US dollar.
    pub fn usd() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            symbol_separator: String::new(),
            decimal_separator: '.',
            thousands_separator: ',',
            decimals: 2,
        }
    }

    /// Looks up a preset by name (`"brl"`, `"usd"`), case-insensitive.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "brl" => Some(Self::brl()),
            "usd" => Some(Self::usd()),
            _ => None,
        }
    }

    fn group_thousands(&self, whole: u64) -> String {
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }
        grouped
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::brl()
    }
}

impl FormatValue for CurrencyFormat {
    fn format_value(&self, amount: Money) -> String {
        let cents = amount.cents().unsigned_abs();
        let whole = cents / 100;
        let frac = cents % 100;

        let mut out = String::new();
        if amount.is_negative() {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push_str(&self.symbol_separator);
        out.push_str(&self.group_thousands(whole));

        match self.decimals {
            0 => {}
            1 => {
                out.push(self.decimal_separator);
                out.push_str(&(frac / 10).to_string());
            }
            _ => {
                out.push(self.decimal_separator);
                out.push_str(&format!("{:02}", frac));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brl_format() {
        let brl = CurrencyFormat::brl();
        assert_eq!(brl.format_value(Money::from_cents(1000)), "R$ 10,00");
        assert_eq!(brl.format_value(Money::from_cents(123456)), "R$ 1.234,56");
        assert_eq!(brl.format_value(Money::zero()), "R$ 0,00");
    }

    #[test]
    fn test_usd_format() {
        let usd = CurrencyFormat::usd();
        assert_eq!(usd.format_value(Money::from_cents(1)), "$0.01");
        assert_eq!(usd.format_value(Money::from_cents(123456789)), "$1,234,567.89");
        assert_eq!(usd.format_value(Money::from_cents(-1234)), "-$12.34");
    }

    #[test]
    fn test_zero_decimals_drops_fraction() {
        let mut format = CurrencyFormat::usd();
        format.decimals = 0;
        assert_eq!(format.format_value(Money::from_cents(99950)), "$999");
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(CurrencyFormat::preset("BRL"), Some(CurrencyFormat::brl()));
        assert_eq!(CurrencyFormat::preset("usd"), Some(CurrencyFormat::usd()));
        assert_eq!(CurrencyFormat::preset("eur"), None);
    }
}
