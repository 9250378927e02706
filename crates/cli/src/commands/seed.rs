//! Seed the cart from a YAML product list.
//!
//! The file is a list of cart items:
//!
//! ```yaml
//! - id: a
//!   title: T-Shirt
//!   image_url: https://img.example/a.png
//!   price: "10.00"
//! - id: b
//!   title: Mug
//!   image_url: https://img.example/b.png
//!   price: 7.5
//! ```
//!
//! Each item is added once, in file order; an ID listed twice ends up with
//! quantity 2. The whole list is applied as one change: if any item cannot
//! be added, the cart (including a requested clear) is left untouched.

use std::path::Path;

use go_marketplace_cart::CartStore;
use go_marketplace_core::CartItem;
use tracing::info;

use super::CommandError;

/// Add every item listed in a YAML file to the cart.
///
/// # Arguments
///
/// * `store` - Cart to seed
/// * `file_path` - Path to the YAML item list
/// * `clear_existing` - If true, empty the cart first
///
/// # Returns
///
/// The number of items added.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or an item cannot
/// be added. Nothing is changed in either case.
pub async fn cart_items(
    store: &CartStore,
    file_path: &str,
    clear_existing: bool,
) -> Result<usize, CommandError> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(CommandError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading cart items from file");

    // Parse everything before touching the cart
    let content = tokio::fs::read_to_string(path).await?;
    let items = parse_items(&content)?;

    info!(items = items.len(), "Parsed item list");

    let count = items.len();
    let snapshot = store.add_items(items, clear_existing)?;
    if clear_existing {
        info!("Replaced existing cart");
    }

    info!(
        added = count,
        lines = snapshot.len(),
        total_quantity = snapshot.total_quantity(),
        "Seeded cart"
    );
    Ok(count)
}

fn parse_items(content: &str) -> Result<Vec<CartItem>, CommandError> {
    Ok(serde_yaml::from_str(content)?)
}
