//! The shared cart store.
//!
//! [`CartStore`] owns the current [`CartSnapshot`] and is the only way to
//! change it. Every successful mutation:
//!
//! 1. applies the [`Cart`] operation to a copy of the current snapshot,
//! 2. publishes the new snapshot to every [`CartSubscription`],
//! 3. queues the new snapshot for write-behind persistence,
//! 4. returns the new snapshot to the caller.
//!
//! All four happen under the state lock, so concurrent callers are applied
//! one after another and queued for storage in the same order. Failed
//! operations change nothing, notify nobody and persist nothing.

use std::sync::Arc;

use go_marketplace_core::{CartEntry, CartItem, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::cart::{Cart, CartSnapshot};
use crate::config::CartStoreConfig;
use crate::error::CartError;
use crate::persist::WriteBehind;
use crate::storage::KeyValueStore;

/// What happened when the store tried to restore a persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted snapshot was found and adopted.
    Restored {
        /// Number of lines restored.
        entries: usize,
    },
    /// Nothing was persisted under the key; the cart starts empty.
    Empty,
    /// Storage failed or held an unreadable snapshot; the cart starts empty.
    Discarded,
}

/// Shared shopping cart with subscriptions and write-behind persistence.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: watch::Sender<CartSnapshot>,
    writer: WriteBehind,
    load_outcome: LoadOutcome,
    storage_key: String,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.storage_key)
            .field("load_outcome", &self.inner.load_outcome)
            .field("entries", &self.inner.state.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart persisted in `storage`.
    ///
    /// The persisted snapshot is loaded before this returns, so mutations can
    /// never race the initial load. A storage failure or undecodable snapshot
    /// is logged and the store starts empty; it is never returned to the
    /// caller. Must be called within a tokio runtime: the persistence writer
    /// runs as a background task.
    #[instrument(skip(storage, config), fields(key = %config.storage_key))]
    pub async fn open<S: KeyValueStore>(storage: Arc<S>, config: CartStoreConfig) -> Self {
        let (cart, load_outcome) = load(storage.as_ref(), &config.storage_key).await;
        let (state, _) = watch::channel(Arc::new(cart));
        let writer = WriteBehind::spawn(storage, config.storage_key.clone());

        Self {
            inner: Arc::new(CartStoreInner {
                state,
                writer,
                load_outcome,
                storage_key: config.storage_key,
            }),
        }
    }

    /// The current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            rx: self.inner.state.subscribe(),
        }
    }

    /// How the persisted cart was restored when the store was opened.
    #[must_use]
    pub fn load_outcome(&self) -> LoadOutcome {
        self.inner.load_outcome
    }

    /// Storage key this cart persists under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Add one unit of `item`, appending a new line if the product is not in
    /// the cart yet.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the line is already full.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_to_cart(&self, item: CartItem) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.add(item))
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product is not in the cart.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn increment(&self, id: &ProductId) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.increment(id))
    }

    /// Take one unit off a line, removing it when the last unit goes.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product is not in the cart.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn decrement(&self, id: &ProductId) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.decrement(id))
    }

    /// Remove a whole line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product is not in the cart.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn remove(&self, id: &ProductId) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| cart.remove(id).map(|_: CartEntry| ()))
    }

    /// Add one unit of each item in order, as a single change.
    ///
    /// With `replace` set the items are added to an empty cart instead of the
    /// current one. Either every item is applied or none is: subscribers see
    /// one new snapshot and storage gets one write.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if any line would overflow; the
    /// cart is left as it was.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn add_items(
        &self,
        items: Vec<CartItem>,
        replace: bool,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(|cart| {
            if replace {
                cart.clear();
            }
            items.into_iter().try_for_each(|item| cart.add(item))
        })
    }

    /// Empty the cart and delete its persisted snapshot.
    #[instrument(skip(self))]
    pub fn clear(&self) -> CartSnapshot {
        let empty: CartSnapshot = Arc::new(Cart::new());
        self.inner.state.send_modify(|current| {
            *current = Arc::clone(&empty);
            self.inner.writer.enqueue_remove();
        });
        debug!("Cart cleared");
        empty
    }

    /// Wait until every change made so far has been written to storage.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] with the first write failure since the
    /// previous flush.
    pub async fn flush(&self) -> Result<(), CartError> {
        self.inner.writer.flush().await?;
        Ok(())
    }

    fn mutate<F>(&self, op: F) -> Result<CartSnapshot, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut outcome = Ok(CartSnapshot::default());
        self.inner.state.send_if_modified(|current| {
            let mut next = Cart::clone(current);
            outcome = op(&mut next).map(|()| {
                let snapshot = Arc::new(next);
                *current = Arc::clone(&snapshot);
                self.inner.writer.enqueue(Arc::clone(&snapshot));
                snapshot
            });
            outcome.is_ok()
        });

        let snapshot = outcome?;
        debug!(
            entries = snapshot.len(),
            total_quantity = snapshot.total_quantity(),
            "Cart updated"
        );
        Ok(snapshot)
    }
}

/// Read the persisted cart, falling back to an empty one.
async fn load<S: KeyValueStore>(storage: &S, key: &str) -> (Cart, LoadOutcome) {
    let raw = match storage.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("No persisted cart found");
            return (Cart::new(), LoadOutcome::Empty);
        }
        Err(e) => {
            warn!(error = %e, "Failed to read persisted cart, starting empty");
            return (Cart::new(), LoadOutcome::Discarded);
        }
    };

    match serde_json::from_str::<Vec<CartEntry>>(&raw) {
        Ok(entries) => {
            let cart = Cart::from_entries(entries);
            info!(entries = cart.len(), "Restored persisted cart");
            let outcome = LoadOutcome::Restored {
                entries: cart.len(),
            };
            (cart, outcome)
        }
        Err(e) => {
            warn!(error = %e, "Persisted cart is unreadable, starting empty");
            (Cart::new(), LoadOutcome::Discarded)
        }
    }
}

/// Receives every new cart snapshot published by a [`CartStore`].
///
/// Subscriptions always see the newest snapshot; when several changes land
/// between two reads, the intermediate snapshots are skipped.
#[derive(Debug, Clone)]
pub struct CartSubscription {
    rx: watch::Receiver<CartSnapshot>,
}

impl CartSubscription {
    /// The latest published snapshot.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// Returns `None` once every handle to the store has been dropped.
    pub async fn changed(&mut self) -> Option<CartSnapshot> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }
}
