//! Go Marketplace Cart - shopping cart state container.
//!
//! Holds the ordered list of products a shopper has picked, publishes every
//! change to subscribers, and persists the full list to a key-value store
//! behind the caller's back.
//!
//! # Architecture
//!
//! - [`cart`] - Pure list logic (`add`, `increment`, `decrement`, ...), no I/O
//! - [`store`] - [`CartStore`]: shared state, subscriptions, load on open
//! - [`persist`] - Write-behind queue draining snapshots to storage in order
//! - [`storage`] - The [`KeyValueStore`] collaborator and its backends
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use go_marketplace_cart::{CartStore, CartStoreConfig, MemoryStore};
//! use go_marketplace_core::{CartItem, Price, ProductId};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), go_marketplace_cart::CartError> {
//! let store = CartStore::open(Arc::new(MemoryStore::new()), CartStoreConfig::default()).await;
//!
//! let id = ProductId::new("a");
//! store.add_to_cart(CartItem {
//!     id: id.clone(),
//!     title: "T".to_string(),
//!     image_url: "u".to_string(),
//!     price: Price::from(10),
//! })?;
//! let snapshot = store.increment(&id)?;
//! assert_eq!(snapshot.total_quantity(), 2);
//!
//! store.flush().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod persist;
pub mod storage;
pub mod store;

pub use cart::{Cart, CartSnapshot};
pub use config::{CartStoreConfig, DEFAULT_CART_KEY};
pub use error::{CartError, PersistError, StorageError};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CartStore, CartSubscription, LoadOutcome};
