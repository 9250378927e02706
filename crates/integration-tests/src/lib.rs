//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart survives store restarts through the file backend
//! - `cart_compat` - Snapshots written by the mobile client load unchanged
//!
//! Tests run against a [`FileStore`] rooted in a fresh temporary directory, so
//! no shared state leaks between them.

use std::sync::Arc;

use go_marketplace_cart::{CartStore, CartStoreConfig, FileStore, KeyValueStore};
use go_marketplace_core::{CartItem, Price, ProductId};
use tempfile::TempDir;

/// A temporary storage directory plus helpers for opening carts on it.
pub struct TestContext {
    /// Deleted when the context is dropped.
    _dir: TempDir,
    storage: Arc<FileStore>,
}

impl TestContext {
    /// Create a context with an empty storage directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = Arc::new(FileStore::new(dir.path()));
        Self { _dir: dir, storage }
    }

    /// Shared file-backed storage.
    #[must_use]
    pub fn storage(&self) -> Arc<FileStore> {
        Arc::clone(&self.storage)
    }

    /// Open a cart store with the default key, as a fresh process would.
    pub async fn open_store(&self) -> CartStore {
        CartStore::open(self.storage(), CartStoreConfig::default()).await
    }

    /// Write a raw snapshot under the default key, bypassing the store.
    ///
    /// # Panics
    ///
    /// Panics if the write fails.
    pub async fn write_raw(&self, value: &str) {
        self.storage
            .set(go_marketplace_cart::DEFAULT_CART_KEY, value.to_owned())
            .await
            .expect("write raw snapshot");
    }

    /// Read the raw snapshot under the default key.
    ///
    /// # Panics
    ///
    /// Panics if the read fails.
    pub async fn read_raw(&self) -> Option<String> {
        self.storage
            .get(go_marketplace_cart::DEFAULT_CART_KEY)
            .await
            .expect("read raw snapshot")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a cart item with predictable display fields.
#[must_use]
pub fn item(id: &str, price_cents: i64) -> CartItem {
    CartItem {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        image_url: format!("https://img.example/{id}.png"),
        price: Price::from_cents(price_cents),
    }
}
