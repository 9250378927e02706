//! Cart line types.
//!
//! A [`CartItem`] is what a product page hands to the cart; a [`CartEntry`]
//! is the same item once it sits in the cart with a quantity attached.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, Quantity};

/// A purchasable product, as submitted to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

/// One product line in the cart.
///
/// Serialized field names (`id`, `title`, `image_url`, `price`, `quantity`)
/// are the persisted snapshot format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Catalog product identifier, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units in the cart.
    pub quantity: Quantity,
}

impl CartEntry {
    /// Create a new line for `item` holding a single unit.
    #[must_use]
    pub fn from_item(item: CartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: Quantity::ONE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item() -> CartItem {
        CartItem {
            id: ProductId::new("a"),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: Price::from(10),
        }
    }

    #[test]
    fn test_from_item_starts_at_one() {
        let entry = CartEntry::from_item(item());
        assert_eq!(entry.quantity, Quantity::ONE);
        assert_eq!(entry.id.as_str(), "a");
        assert_eq!(entry.title, "T");
    }

    #[test]
    fn test_snapshot_field_names() {
        let value = serde_json::to_value(CartEntry::from_item(item())).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["id", "image_url", "price", "quantity", "title"]);
    }

    #[test]
    fn test_parse_client_snapshot_line() {
        let json = r#"{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}"#;
        let entry: CartEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.price, Price::from(10));
        assert_eq!(entry.quantity.get(), 2);
    }

    #[test]
    fn test_item_from_yaml() {
        let yaml = "id: b\ntitle: Shirt\nimage_url: https://img/b.png\nprice: \"24.50\"\n";
        let item: CartItem = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(item.id.as_str(), "b");
        assert_eq!(item.price, Price::from_cents(2450));
    }
}
