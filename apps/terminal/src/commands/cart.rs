//! # Cart Commands
//!
//! ```text
//!   list ──────────────► (read only)
//!   add --id ... ──────► add_to_cart    qty += 1 or new line
//!   increment <ID> ────► increment      qty += 1
//!   decrement <ID> ────► decrement      qty -= 1, gone at 0
//!        │
//!        ▼
//!   CartResponse { items, total_items, total }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use market_cart::CartContext;
use market_core::{LineItem, Money, NewLineItem};

use crate::commands::{AddArgs, Command};
use crate::error::ApiError;

/// Cart contents with both totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub total_items: u64,
    pub total: String,
}

impl From<&CartContext> for CartResponse {
    fn from(cart: &CartContext) -> Self {
        CartResponse {
            items: cart.products(),
            total_items: cart.total_items_in_cart(),
            total: cart.cart_total(),
        }
    }
}

pub fn execute(cart: &CartContext, command: Command) -> Result<CartResponse, ApiError> {
    match command {
        Command::List => get_cart(cart),
        Command::Add(args) => add_to_cart(cart, args),
        Command::Increment { id } => increment(cart, &id),
        Command::Decrement { id } => decrement(cart, &id),
    }
}

pub fn get_cart(cart: &CartContext) -> Result<CartResponse, ApiError> {
    debug!("list command");
    Ok(CartResponse::from(cart))
}

pub fn add_to_cart(cart: &CartContext, args: AddArgs) -> Result<CartResponse, ApiError> {
    debug!(id = %args.id, price = args.price, "add command");

    let price = Money::try_from_major(args.price)
        .ok_or_else(|| ApiError::validation("price must be a finite number within range"))?;

    let product = NewLineItem::new(args.id, args.title, args.image_url, price);
    cart.add_to_cart(&product)?;
    Ok(CartResponse::from(cart))
}

pub fn increment(cart: &CartContext, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment command");
    cart.increment(id)?;
    Ok(CartResponse::from(cart))
}

pub fn decrement(cart: &CartContext, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement command");
    cart.decrement(id);
    Ok(CartResponse::from(cart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use market_cart::{CartConfig, CartProvider};
    use market_storage::MemoryStore;
    use std::sync::Arc;

    async fn cart() -> CartContext {
        CartProvider::mount_with_config(&CartConfig::default(), Arc::new(MemoryStore::new()))
            .await
            .unwrap()
            .use_cart()
    }

    fn add(id: &str, price: f64) -> Command {
        Command::Add(AddArgs {
            id: id.into(),
            title: "Shirt".into(),
            image_url: "https://img/shirt.png".into(),
            price,
        })
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let cart = cart().await;

        execute(&cart, add("1", 10.5)).unwrap();
        let response = execute(&cart, add("1", 10.5)).unwrap();

        assert_eq!(response.total_items, 2);
        assert_eq!(response.total, "R$ 21,00");
        assert_eq!(execute(&cart, Command::List).unwrap(), response);
    }

    #[tokio::test]
    async fn test_decrement_to_zero() {
        let cart = cart().await;
        execute(&cart, add("1", 3.0)).unwrap();

        let response = execute(&cart, Command::Decrement { id: "1".into() }).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total, "R$ 0,00");
    }

    #[tokio::test]
    async fn test_invalid_price_is_rejected() {
        let cart = cart().await;

        let err = execute(&cart, add("1", f64::NAN)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = execute(&cart, add("1", -1.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = execute(&cart, add("1", 1e17)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(cart.products().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_empty_title() {
        let cart = cart().await;
        let response = execute(
            &cart,
            Command::Add(AddArgs {
                id: "1".into(),
                title: String::new(),
                image_url: String::new(),
                price: 2.0,
            }),
        )
        .unwrap();

        assert_eq!(response.items[0].title, "");
        assert_eq!(response.total, "R$ 2,00");
    }

    #[test]
    fn test_response_json_shape() {
        let response = CartResponse {
            items: vec![],
            total_items: 0,
            total: "R$ 0,00".into(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"items":[],"total_items":0,"total":"R$ 0,00"}"#
        );
    }
}
