//! Cart inspection and editing commands.
//!
//! # Usage
//!
//! ```bash
//! gm-cli cart show
//! gm-cli cart add --id a --title "T-Shirt" --image-url https://img/a.png --price 10
//! gm-cli cart increment a
//! gm-cli cart decrement a
//! gm-cli cart remove a
//! gm-cli cart clear
//! ```

use go_marketplace_cart::{CartSnapshot, CartStore};
use go_marketplace_core::{CartItem, ProductId};
use tracing::info;

use super::CommandError;

/// Log every line of the current cart.
pub fn show(store: &CartStore) {
    log_cart(&store.snapshot());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the line quantity would overflow.
pub fn add(store: &CartStore, item: CartItem) -> Result<(), CommandError> {
    let id = item.id.clone();
    let snapshot = store.add_to_cart(item)?;
    info!(product_id = %id, "Added to cart");
    log_cart(&snapshot);
    Ok(())
}

/// Add one unit to a line already in the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the cart.
pub fn increment(store: &CartStore, id: &ProductId) -> Result<(), CommandError> {
    let snapshot = store.increment(id)?;
    log_cart(&snapshot);
    Ok(())
}

/// Take one unit off a line, removing it at zero.
///
/// # Errors
///
/// Returns an error if the product is not in the cart.
pub fn decrement(store: &CartStore, id: &ProductId) -> Result<(), CommandError> {
    let snapshot = store.decrement(id)?;
    log_cart(&snapshot);
    Ok(())
}

/// Remove a whole line.
///
/// # Errors
///
/// Returns an error if the product is not in the cart.
pub fn remove(store: &CartStore, id: &ProductId) -> Result<(), CommandError> {
    let snapshot = store.remove(id)?;
    info!(product_id = %id, "Removed from cart");
    log_cart(&snapshot);
    Ok(())
}

/// Empty the cart.
pub fn clear(store: &CartStore) {
    store.clear();
    info!("Cart cleared");
}

fn log_cart(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        info!("Cart is empty");
        return;
    }

    for entry in snapshot.iter() {
        info!(
            id = %entry.id,
            title = %entry.title,
            image_url = %entry.image_url,
            price = %entry.price,
            quantity = %entry.quantity,
            "Cart entry"
        );
    }
    info!(
        lines = snapshot.len(),
        total_quantity = snapshot.total_quantity(),
        "Cart summary"
    );
}
