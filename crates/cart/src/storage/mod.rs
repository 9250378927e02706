//! Key-value storage collaborators.
//!
//! The cart treats storage as an opaque string-to-string map: it reads one
//! key at startup and overwrites it with a full snapshot after each change.

mod file;
mod memory;

use std::future::Future;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// An asynchronous string key-value store.
///
/// Implementations must be shareable across tasks; the cart's persistence
/// writer holds one in a background task.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
