//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKETPLACE_STORAGE_DIR` - Directory holding persisted data (default: `.go-marketplace`)
//! - `GO_MARKETPLACE_CART_KEY` - Storage key for the cart snapshot (default: `@GoMarketplace:products`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use go_marketplace_cart::{CartStoreConfig, DEFAULT_CART_KEY};
use thiserror::Error;

const DEFAULT_STORAGE_DIR: &str = ".go-marketplace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file-backed key-value store writes into
    pub storage_dir: PathBuf,
    /// Key the cart snapshot is persisted under
    pub cart_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "development", "production")
    pub sentry_environment: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("GO_MARKETPLACE_STORAGE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);
        if storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GO_MARKETPLACE_STORAGE_DIR".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let cart_key =
            lookup("GO_MARKETPLACE_CART_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string());
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GO_MARKETPLACE_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            storage_dir,
            cart_key,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Cart store options derived from this configuration.
    #[must_use]
    pub fn cart_store(&self) -> CartStoreConfig {
        CartStoreConfig::with_storage_key(&self.cart_key)
    }
}
