//! Cart list logic.
//!
//! [`Cart`] is an ordered list of [`CartEntry`] values, unique by product ID.
//! New products are appended; quantity changes keep a line in place. A line
//! whose quantity would reach zero is removed outright.

use std::sync::Arc;

use go_marketplace_core::{CartEntry, CartItem, ProductId};
use tracing::warn;

use crate::error::CartError;

/// Immutable cart snapshot shared with subscribers and the persistence writer.
pub type CartSnapshot = Arc<Cart>;

/// Ordered, ID-unique list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from a previously persisted list.
    ///
    /// Repeated IDs are merged into their first occurrence by summing
    /// quantities, so the result always satisfies the uniqueness invariant.
    /// A sum past `u32::MAX` is capped there.
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        let mut cart = Self::new();
        for entry in entries {
            match cart.position(&entry.id) {
                None => cart.entries.push(entry),
                Some(index) => {
                    warn!(product_id = %entry.id, "Merging duplicate cart entry");
                    if let Some(existing) = cart.entries.get_mut(index) {
                        if existing.quantity.checked_add(entry.quantity).is_none() {
                            warn!(
                                product_id = %entry.id,
                                quantity = %existing.quantity,
                                duplicate = %entry.quantity,
                                "Merged quantity overflows, capping at maximum"
                            );
                        }
                        existing.quantity = existing.quantity.saturating_add(entry.quantity);
                    }
                }
            }
        }
        cart
    }

    /// All lines, in cart order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Iterate over lines in cart order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartEntry> {
        self.entries.iter()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity.get()))
            .sum()
    }

    /// Add one unit of `item`.
    ///
    /// Appends a new line with quantity 1, or bumps the existing line in place.
    /// An existing line keeps its stored title, image and price; the fields
    /// of `item` are only used for new lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the line is already at the
    /// maximum quantity.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        match self.position(&item.id) {
            None => {
                self.entries.push(CartEntry::from_item(item));
                Ok(())
            }
            Some(index) => self.bump(index, &item.id),
        }
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has this ID, or
    /// [`CartError::QuantityOverflow`] if the line is full.
    pub fn increment(&mut self, id: &ProductId) -> Result<(), CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        self.bump(index, id)
    }

    /// Take one unit off an existing line, removing the line at quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has this ID.
    pub fn decrement(&mut self, id: &ProductId) -> Result<(), CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        let Some(entry) = self.entries.get_mut(index) else {
            return Err(CartError::NotFound(id.clone()));
        };
        match entry.quantity.decremented() {
            Some(quantity) => entry.quantity = quantity,
            None => {
                self.entries.remove(index);
            }
        }
        Ok(())
    }

    /// Remove a whole line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has this ID.
    pub fn remove(&mut self, id: &ProductId) -> Result<CartEntry, CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        Ok(self.entries.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn bump(&mut self, index: usize, id: &ProductId) -> Result<(), CartError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        entry.quantity = entry
            .quantity
            .incremented()
            .ok_or_else(|| CartError::QuantityOverflow(id.clone()))?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use go_marketplace_core::{Price, Quantity};

    use super::*;

    fn item(id: &str, title: &str, price: i64) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: title.to_string(),
            image_url: format!("https://img.example/{id}.png"),
            price: Price::from(price),
        }
    }

    fn quantities(cart: &Cart) -> Vec<(&str, u32)> {
        cart.iter()
            .map(|entry| (entry.id.as_str(), entry.quantity.get()))
            .collect()
    }

    #[test]
    fn test_add_new_item_to_empty_cart() {
        let mut cart = Cart::new();
        cart.add(item("a", "T", 10)).unwrap();

        assert_eq!(cart.len(), 1);
        let entry = &cart.entries()[0];
        assert_eq!(entry.id.as_str(), "a");
        assert_eq!(entry.title, "T");
        assert_eq!(entry.price, Price::from(10));
        assert_eq!(entry.quantity, Quantity::ONE);
    }

    #[test]
    fn test_add_same_id_keeps_original_fields() {
        let mut cart = Cart::new();
        cart.add(item("a", "Original", 10)).unwrap();
        cart.add(item("a", "Renamed", 99)).unwrap();

        assert_eq!(cart.len(), 1);
        let entry = &cart.entries()[0];
        assert_eq!(entry.quantity.get(), 2);
        assert_eq!(entry.title, "Original");
        assert_eq!(entry.price, Price::from(10));
        assert_eq!(entry.image_url, "https://img.example/a.png");
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let mut cart = Cart::new();
        cart.add(item("b", "B", 1)).unwrap();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("b", "B", 1)).unwrap();

        assert_eq!(quantities(&cart), [("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_increment_touches_only_target() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("b", "B", 1)).unwrap();

        cart.increment(&ProductId::new("a")).unwrap();

        assert_eq!(quantities(&cart), [("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_decrement_keeps_position() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("b", "B", 1)).unwrap();

        cart.decrement(&ProductId::new("a")).unwrap();

        assert_eq!(quantities(&cart), [("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_decrement_last_unit_removes_line() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("b", "B", 1)).unwrap();

        cart.decrement(&ProductId::new("a")).unwrap();

        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductId::new("a")).is_none());
        assert_eq!(quantities(&cart), [("b", 1)]);
    }

    #[test]
    fn test_missing_id_is_an_error_and_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        let before = cart.clone();
        let missing = ProductId::new("zzz");

        assert!(matches!(cart.increment(&missing), Err(CartError::NotFound(id)) if id == missing));
        assert!(matches!(cart.decrement(&missing), Err(CartError::NotFound(_))));
        assert!(matches!(cart.remove(&missing), Err(CartError::NotFound(_))));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_overflow() {
        let mut entry = CartEntry::from_item(item("a", "A", 1));
        entry.quantity = Quantity::new(u32::MAX).unwrap();
        let mut cart = Cart::from_entries(vec![entry]);

        assert!(matches!(
            cart.increment(&ProductId::new("a")),
            Err(CartError::QuantityOverflow(_))
        ));
        assert_eq!(cart.entries()[0].quantity.get(), u32::MAX);
    }

    #[test]
    fn test_remove_whole_line() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("a", "A", 1)).unwrap();

        let removed = cart.remove(&ProductId::new("a")).unwrap();

        assert_eq!(removed.quantity.get(), 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = Cart::new();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("a", "A", 1)).unwrap();
        cart.add(item("b", "B", 1)).unwrap();

        assert_eq!(cart.total_quantity(), 3);
        cart.clear();
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_from_entries_merges_duplicates() {
        let a = CartEntry::from_item(item("a", "First", 1));
        let b = CartEntry::from_item(item("b", "B", 1));
        let mut dup = CartEntry::from_item(item("a", "Second", 5));
        dup.quantity = Quantity::new(2).unwrap();

        let cart = Cart::from_entries(vec![a, b, dup]);

        assert_eq!(quantities(&cart), [("a", 3), ("b", 1)]);
        assert_eq!(cart.entries()[0].title, "First");
    }

    #[test]
    fn test_from_entries_caps_merged_quantity() {
        let mut full = CartEntry::from_item(item("a", "A", 1));
        full.quantity = Quantity::new(u32::MAX).unwrap();
        let mut dup = CartEntry::from_item(item("a", "A", 1));
        dup.quantity = Quantity::new(2).unwrap();

        let cart = Cart::from_entries(vec![full, dup]);

        assert_eq!(quantities(&cart), [("a", u32::MAX)]);
    }

    #[test]
    fn test_walkthrough() {
        let a = ProductId::new("a");
        let mut cart = Cart::new();

        cart.add(item("a", "T", 10)).unwrap();
        assert_eq!(quantities(&cart), [("a", 1)]);
        cart.add(item("a", "T", 10)).unwrap();
        assert_eq!(quantities(&cart), [("a", 2)]);
        cart.increment(&a).unwrap();
        assert_eq!(quantities(&cart), [("a", 3)]);
        cart.decrement(&a).unwrap();
        cart.decrement(&a).unwrap();
        assert_eq!(quantities(&cart), [("a", 1)]);
        cart.decrement(&a).unwrap();
        assert!(cart.is_empty());
    }
}
