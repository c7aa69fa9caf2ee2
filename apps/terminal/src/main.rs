//! # market-cart
//!
//! ```text
//! market-cart [--config PATH] list
//! market-cart add --id 1 --title Shirt --image-url https://... --price 10.5
//! market-cart increment 1
//! market-cart decrement 1
//! ```
//!
//! The setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    market_terminal::run().await
}
