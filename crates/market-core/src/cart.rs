//! # Cart
//!
//! The ordered list of line items and the rules for changing it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action              Operation          Cart Change                  │
//! │  ─────────              ─────────          ───────────                  │
//! │                                                                         │
//! │  Tap "Add" ───────────► add_item() ──────► qty += 1 or push(qty = 1)   │
//! │                                                                         │
//! │  Tap "+" ─────────────► increment() ─────► qty += 1 (unknown: no-op)   │
//! │                                                                         │
//! │  Tap "-" ─────────────► decrement() ─────► qty -= 1, remove at 0       │
//! │                                                                         │
//! │  Badge / footer ──────► total_items() / total()   (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one item per `id`
//! - Every item has `quantity >= 1`
//! - New items are appended; existing items never move
//! - The total fits in [`Money`]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{self, Money};
use crate::validation::validate_new_line_item;

// =============================================================================
// Line Items
// =============================================================================

/// A product placed in the cart.
///
/// Serialized with snake_case keys, the format the cart has always been
/// persisted in:
/// ```json
/// {"id":"a","title":"T","image_url":"u","price":5,"quantity":3}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product id, the only field used for identity.
    pub id: String,

    pub title: String,

    pub image_url: String,

    /// Unit price, persisted as a major-unit number.
    #[serde(with = "money::major_units")]
    #[ts(type = "number")]
    pub price: Money,

    pub quantity: u32,
}

impl LineItem {
    /// Builds a line from a product descriptor and a starting quantity.
    pub fn from_product(product: &NewLineItem, quantity: u32) -> Self {
        LineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.price
            .checked_multiply_quantity(self.quantity)
            .ok_or(CoreError::TotalOverflow)
    }
}

/// A product descriptor as the storefront hands it to the cart: a
/// [`LineItem`] without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub id: String,

    pub title: String,

    pub image_url: String,

    #[serde(with = "money::major_units")]
    #[ts(type = "number")]
    pub price: Money,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Money,
    ) -> Self {
        NewLineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The ordered collection of line items for the current session.
///
/// Serializes as a bare JSON array. Deserializing runs the same
/// normalization as [`Cart::from_items`] and rejects a cart whose total
/// overflows, so a cart read back from storage always satisfies the
/// invariants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from stored items.
    ///
    /// ## Normalization
    /// - Items with `quantity == 0` are dropped
    /// - Repeated ids are merged into the first occurrence, quantities summed
    ///
    /// The total is not checked here. Use `Cart::try_from` for untrusted
    /// items.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.position(&item.id) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Adds a product or bumps its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity increases by 1
    /// - Product not in cart: appended with quantity 1
    ///
    /// The descriptor is only read; the cart stores its own copy. Only the
    /// `id` of a re-added product is looked at: the existing line keeps its
    /// title, image and price, and the descriptor is not validated.
    ///
    /// ## Errors
    /// - `CoreError::Validation` if a new descriptor is invalid
    /// - `CoreError::QuantityOverflow` if the quantity cannot grow
    /// - `CoreError::TotalOverflow` if the total would overflow
    pub fn add_item(&mut self, product: &NewLineItem) -> CoreResult<()> {
        match self.position(&product.id) {
            Some(index) => self.bump(index),
            None => {
                validate_new_line_item(product)?;
                self.ensure_room_for(product.price)?;
                self.items.push(LineItem::from_product(product, 1));
                Ok(())
            }
        }
    }

    /// Increases the quantity of `id` by one.
    ///
    /// Returns `Ok(false)` without touching the cart when `id` is not present.
    pub fn increment(&mut self, id: &str) -> CoreResult<bool> {
        match self.position(id) {
            Some(index) => self.bump(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Decreases the quantity of `id` by one, removing the line at zero.
    ///
    /// Returns `false` when `id` is not present.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let item = &mut self.items[index];
        item.quantity = item.quantity.saturating_sub(1);
        if item.quantity == 0 {
            self.items.remove(index);
        }
        true
    }

    /// Returns the items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by product id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over every line.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `quantity × price` over every line.
    ///
    /// Saturates at [`Money::MAX`]. That only happens for a cart built with
    /// [`Cart::from_items`] from items that were never checked.
    pub fn total(&self) -> Money {
        self.checked_total().unwrap_or(Money::MAX)
    }

    /// Sum of `quantity × price`, or `CoreError::TotalOverflow`.
    pub fn checked_total(&self) -> CoreResult<Money> {
        self.items.iter().try_fold(Money::zero(), |total, item| {
            total
                .checked_add(item.line_total()?)
                .ok_or(CoreError::TotalOverflow)
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// One more unit at `price` must keep the total representable.
    fn ensure_room_for(&self, price: Money) -> CoreResult<()> {
        self.checked_total()?
            .checked_add(price)
            .map(|_| ())
            .ok_or(CoreError::TotalOverflow)
    }

    fn bump(&mut self, index: usize) -> CoreResult<()> {
        let price = self.items[index].price;
        let quantity = self.items[index].quantity.checked_add(1).ok_or_else(|| {
            CoreError::QuantityOverflow {
                id: self.items[index].id.clone(),
            }
        })?;
        self.ensure_room_for(price)?;

        self.items[index].quantity = quantity;
        Ok(())
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CoreError;

    fn try_from(items: Vec<LineItem>) -> CoreResult<Self> {
        let cart = Cart::from_items(items);
        cart.checked_total()?;
        Ok(cart)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn product(id: &str, price_cents: i64) -> NewLineItem {
        NewLineItem::new(
            id,
            format!("Product {}", id),
            format!("https://img/{}.png", id),
            Money::from_cents(price_cents),
        )
    }

    fn line(id: &str, price_cents: i64, quantity: u32) -> LineItem {
        LineItem::from_product(&product(id, price_cents), quantity)
    }

    fn ids(cart: &Cart) -> Vec<&str> {
        cart.items().iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_add_new_item_starts_at_one() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 1000)).unwrap();

        assert_eq!(cart.items(), &[line("a", 1000, 1)]);
        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total(), Money::from_cents(1000));
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let shirt = product("a", 1000);

        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();

        assert_eq!(cart.len(), 1); // Still one unique item
        assert_eq!(cart.get("a").unwrap().quantity, 2);
        assert_eq!(cart.total(), Money::from_cents(2000));
    }

    #[test]
    fn test_add_appends_and_keeps_order() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 100)).unwrap();
        cart.add_item(&product("b", 100)).unwrap();
        cart.add_item(&product("a", 100)).unwrap();
        cart.add_item(&product("c", 100)).unwrap();

        assert_eq!(ids(&cart), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_add_does_not_modify_descriptor() {
        let mut cart = Cart::new();
        let shirt = product("a", 1000);
        let before = shirt.clone();

        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();

        assert_eq!(shirt, before);
    }

    #[test]
    fn test_add_rejects_invalid_descriptor() {
        let mut cart = Cart::new();
        let err = cart.add_item(&product("", 100)).unwrap_err();

        assert_eq!(
            err,
            CoreError::Validation(ValidationError::Required {
                field: "id".to_string()
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_accepts_any_title() {
        let mut cart = Cart::new();
        cart.add_item(&NewLineItem::new("a", "", "", Money::from_cents(100)))
            .unwrap();
        cart.add_item(&NewLineItem::new("b", "t".repeat(500), "", Money::from_cents(100)))
            .unwrap();

        assert_eq!(ids(&cart), vec!["a", "b"]);
        assert_eq!(cart.get("a").unwrap().title, "");
    }

    #[test]
    fn test_readd_keeps_existing_line() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 1000)).unwrap();

        // Only the id matters once the product is in the cart.
        let again = NewLineItem::new("a", "Renamed", "other.png", Money::from_cents(-1));
        cart.add_item(&again).unwrap();

        assert_eq!(cart.items(), &[line("a", 1000, 2)]);
    }

    #[test]
    fn test_add_refuses_total_overflow() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", i64::MAX - 10)).unwrap();

        let err = cart.add_item(&product("b", 11)).unwrap_err();
        assert_eq!(err, CoreError::TotalOverflow);
        assert_eq!(ids(&cart), vec!["a"]);

        // Re-adding would double the line total.
        assert_eq!(cart.add_item(&product("a", 1)), Err(CoreError::TotalOverflow));
        assert_eq!(cart.get("a").unwrap().quantity, 1);
    }

    #[test]
    fn test_increment_refuses_total_overflow() {
        let mut cart = Cart::from_items(vec![line("a", i64::MAX / 3, 2)]);
        let before = cart.clone();

        assert_eq!(cart.increment("a"), Ok(true));
        assert_eq!(cart.increment("a"), Err(CoreError::TotalOverflow));
        assert_eq!(cart.get("a").unwrap().quantity, before.get("a").unwrap().quantity + 1);
    }

    #[test]
    fn test_unchecked_cart_total_saturates() {
        let cart = Cart::from_items(vec![line("a", i64::MAX / 2, 3)]);

        assert_eq!(cart.checked_total(), Err(CoreError::TotalOverflow));
        assert_eq!(cart.total(), Money::MAX);
    }

    #[test]
    fn test_increment_unknown_id_is_noop() {
        let mut cart = Cart::from_items(vec![line("a", 100, 2)]);
        let before = cart.clone();

        assert_eq!(cart.increment("nonexistent"), Ok(false));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::from_items(vec![line("a", 100, u32::MAX)]);

        let err = cart.increment("a").unwrap_err();
        assert!(matches!(err, CoreError::QuantityOverflow { .. }));
        assert_eq!(cart.get("a").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_decrement_to_zero_removes_item() {
        let mut cart = Cart::from_items(vec![line("a", 100, 1), line("b", 100, 2)]);

        assert!(cart.decrement("a"));
        assert_eq!(ids(&cart), vec!["b"]);
        assert_eq!(cart.total_items(), 2);

        assert!(cart.decrement("b"));
        assert_eq!(cart.get("b").unwrap().quantity, 1);
    }

    #[test]
    fn test_decrement_unknown_id_is_noop() {
        let mut cart = Cart::from_items(vec![line("a", 100, 1)]);
        assert!(!cart.decrement("zzz"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total_items(), 0);
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_from_items_normalizes() {
        let cart = Cart::from_items(vec![
            line("a", 100, 1),
            line("b", 100, 0),
            line("c", 100, 2),
            line("a", 100, 3),
        ]);

        assert_eq!(ids(&cart), vec!["a", "c"]);
        assert_eq!(cart.get("a").unwrap().quantity, 4);
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let cart = Cart::from_items(vec![line("a", 500, 3)]);
        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(
            json,
            r#"[{"id":"a","title":"Product a","image_url":"https://img/a.png","price":5,"quantity":3}]"#
        );
    }

    #[test]
    fn test_deserializes_stored_json() {
        let json = r#"[{"id":"a","title":"T","image_url":"u","price":5,"quantity":3}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(
            cart.items(),
            &[LineItem {
                id: "a".to_string(),
                title: "T".to_string(),
                image_url: "u".to_string(),
                price: Money::from_cents(500),
                quantity: 3,
            }]
        );
    }

    #[test]
    fn test_deserialize_drops_zero_quantity() {
        let json = r#"[{"id":"a","title":"T","image_url":"u","price":5,"quantity":0}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_overflowing_total() {
        // 10^16 in major units is 10^18 cents; ten of them overflow i64.
        let json = r#"[{"id":"a","title":"T","image_url":"u","price":10000000000000000,"quantity":10}]"#;
        let err = serde_json::from_str::<Cart>(json).unwrap_err();
        assert!(err.to_string().contains("total exceeds"), "{}", err);

        let json = r#"[{"id":"a","title":"T","image_url":"u","price":10000000000000000,"quantity":9}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.total(), Money::from_cents(9 * 10i64.pow(18)));
    }

    #[test]
    fn test_deserialize_rejects_negative_quantity() {
        let json = r#"[{"id":"a","title":"T","image_url":"u","price":5,"quantity":-1}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
