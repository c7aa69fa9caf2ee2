//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARKET_CART_KEY=@GoMarketplaceCartProducts                         │
//! │     MARKET_CART_DB_PATH=/data/cart.db                                  │
//! │     MARKET_CURRENCY=usd                                                │
//! │     MARKET_PERSIST_MAX_ELAPSED_MS=0                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarketplace/cart.toml (Linux)                          │
//! │     ~/Library/Application Support/com.gomarketplace.cart/cart.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key "@GoMarketplaceCartProducts", BRL formatting                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarketplaceCartProducts"
//! path = "/data/cart.db"   # optional, platform data dir otherwise
//!
//! [currency]
//! preset = "brl"           # brl | usd
//!
//! [persist]
//! initial_backoff_ms = 100
//! max_backoff_ms = 2000
//! max_elapsed_ms = 10000   # 0 = single attempt, no retry
//! ```

use market_core::{CurrencyFormat, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the cart document is stored under.
    #[serde(default = "default_key")]
    pub key: String,

    /// SQLite file. Falls back to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_key(),
            path: None,
        }
    }
}

// =============================================================================
// Currency Settings
// =============================================================================

/// How `cart_total` renders money.
///
/// `custom` wins over `preset` when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CurrencyFormat>,
}

fn default_preset() -> String {
    "brl".to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            preset: default_preset(),
            custom: None,
        }
    }
}

impl CurrencySettings {
    /// Resolves the configured format.
    pub fn format(&self) -> CartResult<CurrencyFormat> {
        if let Some(custom) = &self.custom {
            return Ok(custom.clone());
        }
        CurrencyFormat::preset(&self.preset).ok_or_else(|| {
            CartError::InvalidConfig(format!(
                "Unknown currency preset: '{}'. Valid options: brl, usd",
                self.preset
            ))
        })
    }
}

// =============================================================================
// Persist Settings
// =============================================================================

/// Retry policy for storage writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistSettings {
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Total time spent retrying one snapshot. 0 disables retry.
    #[serde(default = "default_max_elapsed")]
    pub max_elapsed_ms: u64,
}

fn default_initial_backoff() -> u64 {
    100
}
fn default_max_backoff() -> u64 {
    2_000
}
fn default_max_elapsed() -> u64 {
    10_000
}

impl Default for PersistSettings {
    fn default() -> Self {
        PersistSettings {
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            max_elapsed_ms: default_max_elapsed(),
        }
    }
}

impl PersistSettings {
    /// No retries: each snapshot gets exactly one write attempt.
    pub fn no_retry() -> Self {
        PersistSettings {
            max_elapsed_ms: 0,
            ..Self::default()
        }
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }

    pub fn retries_enabled(&self) -> bool {
        self.max_elapsed_ms > 0
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub persist: PersistSettings,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// [`CartConfig::load`] with the environment supplied by `var`.
    pub fn load_with(
        config_path: Option<PathBuf>,
        var: impl Fn(&str) -> Option<String>,
    ) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(var);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        let format = self.currency.format()?;
        if format.decimals > 2 {
            return Err(CartError::InvalidConfig(format!(
                "currency decimals must be between 0 and 2, got {}",
                format.decimals
            )));
        }

        if self.persist.initial_backoff_ms > self.persist.max_backoff_ms {
            return Err(CartError::InvalidConfig(
                "persist.initial_backoff_ms must not exceed persist.max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies `MARKET_*` overrides from any variable source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("MARKET_CART_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = var("MARKET_CART_DB_PATH") {
            debug!(path = %path, "Overriding storage path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(preset) = var("MARKET_CURRENCY") {
            if CurrencyFormat::preset(&preset).is_some() {
                self.currency.preset = preset.to_ascii_lowercase();
                self.currency.custom = None;
            } else {
                warn!(preset = %preset, "Unknown currency preset in environment");
            }
        }

        if let Some(ms) = var("MARKET_PERSIST_MAX_ELAPSED_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.persist.max_elapsed_ms = ms,
                Err(_) => warn!(value = %ms, "Invalid MARKET_PERSIST_MAX_ELAPSED_MS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "gomarketplace", "cart")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// The SQLite file to open: `storage.path`, else the platform data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("cart.db")))
    }

    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }
}
