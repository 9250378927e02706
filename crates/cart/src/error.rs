//! Error types for the cart store and its storage collaborators.

use go_marketplace_core::ProductId;
use thiserror::Error;

/// Error from a key-value storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Error writing a cart snapshot to storage.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The storage backend rejected the write.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The snapshot could not be encoded.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The background writer is no longer running.
    #[error("Persistence writer has shut down")]
    WriterClosed,
}

/// Error returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line in the cart has this product ID.
    #[error("Cart entry not found: {0}")]
    NotFound(ProductId),

    /// Adding a unit would overflow the line quantity.
    #[error("Quantity overflow for cart entry: {0}")]
    QuantityOverflow(ProductId),

    /// A queued snapshot failed to persist.
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}
