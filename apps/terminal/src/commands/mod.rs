//! # Commands
//!
//! One module per command group. Each command takes the mounted
//! [`market_cart::CartContext`] and returns a response to print.

pub mod cart;

use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the cart
    List,

    /// Add one unit of a product
    Add(AddArgs),

    /// Add one unit of a product already in the cart
    Increment {
        /// Product id
        id: String,
    },

    /// Remove one unit, dropping the product at zero
    Decrement {
        /// Product id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Product id
    #[arg(long)]
    pub id: String,

    /// Display name
    #[arg(long)]
    pub title: String,

    /// Product image
    #[arg(long, default_value = "")]
    pub image_url: String,

    /// Unit price in major units, e.g. 10.5
    #[arg(long)]
    pub price: f64,
}
