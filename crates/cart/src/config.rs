//! Cart store configuration.

/// Storage key the cart snapshot is written under.
///
/// Namespaced so the cart can share a key-value store with other data.
pub const DEFAULT_CART_KEY: &str = "@GoMarketplace:products";

/// Options for opening a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    /// Key the full cart snapshot is persisted under.
    pub storage_key: String,
}

impl CartStoreConfig {
    /// Use a custom storage key.
    #[must_use]
    pub fn with_storage_key(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
        }
    }
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self::with_storage_key(DEFAULT_CART_KEY)
    }
}
