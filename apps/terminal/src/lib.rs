//! # market-terminal
//!
//! Runs one cart command per invocation.
//!
//! ## Module Organization
//! ```text
//! market_terminal/
//! ├── lib.rs          ◄─── CLI parsing, startup, run
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command definitions (clap)
//! │   └── cart.rs     ◄─── list / add / increment / decrement
//! └── error.rs        ◄─── ApiError printed on failure
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Command Execution                                 │
//! │                                                                         │
//! │  1. Initialize Logging ─── tracing-subscriber to stderr, RUST_LOG      │
//! │                                                                         │
//! │  2. Load Config ────────── cart.toml + MARKET_* environment            │
//! │                                                                         │
//! │  3. Open Storage ───────── SQLite in the platform data directory       │
//! │     • Linux: ~/.local/share/gomarketplace/cart.db                      │
//! │     • macOS: ~/Library/Application Support/com.gomarketplace.cart/     │
//! │                                                                         │
//! │  4. Mount CartProvider ─── load saved cart                             │
//! │                                                                         │
//! │  5. Run Command ────────── print CartResponse JSON to stdout           │
//! │                                                                         │
//! │  6. Unmount ────────────── flush pending writes                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_cart::{CartConfig, CartProvider};
use market_storage::{KeyValueStore, MemoryStore, SqliteStore, StoreConfig};

use commands::cart::CartResponse;
use commands::Command;
use error::ApiError;

/// GoMarketplace cart
#[derive(Debug, Parser)]
#[command(name = "market-cart", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (default: platform config dir/cart.toml)
    #[arg(short, long, global = true, env = "MARKET_CART_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Parses arguments, runs the command and reports the result.
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", ApiError::internal(e.to_string()).to_json());
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, then runs the command.
pub async fn execute(cli: Cli) -> Result<CartResponse, ApiError> {
    let config = CartConfig::load(cli.config)?;
    execute_with_config(&config, cli.command).await
}

/// Mounts the cart, runs one command and flushes before returning.
pub async fn execute_with_config(
    config: &CartConfig,
    command: Command,
) -> Result<CartResponse, ApiError> {
    let storage = open_storage(config).await?;

    let provider = CartProvider::mount_with_config(config, storage).await?;
    let result = commands::cart::execute(&provider.use_cart(), command);
    provider.unmount().await?;

    result
}

/// Opens the SQLite store, or an in-memory one when no data directory
/// can be determined.
async fn open_storage(config: &CartConfig) -> Result<Arc<dyn KeyValueStore>, ApiError> {
    let Some(path) = config.database_path() else {
        warn!("No data directory available, cart will not survive this run");
        return Ok(Arc::new(MemoryStore::new()));
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::new(
                error::ErrorCode::StorageError,
                format!("Cannot create {}: {}", parent.display(), e),
            )
        })?;
    }

    info!(?path, "Using cart storage");
    let store = SqliteStore::open(StoreConfig::new(path)).await?;
    Ok(Arc::new(store))
}

/// Installs the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=market=trace` - Show trace for market crates only
/// - Default: `info,market=debug,sqlx=warn`
///
/// Logs go to stderr so stdout carries only the JSON response.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,market=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
