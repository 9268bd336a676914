//! Products and cart items.

use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// A catalog entry that can be added to a cart.
///
/// Products are plain value types supplied by the embedding
/// application; the replication layer never interprets the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display title.
    pub title: String,
    /// Image URL.
    pub image: String,
    /// Price as a display string (currency formatting is the caller's
    /// concern, not ours).
    pub price: String,
    /// Purchase URL.
    pub url: String,
}

impl Product {
    /// Create a product from its four fields.
    pub fn new(
        title: impl Into<String>,
        image: impl Into<String>,
        price: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            image: image.into(),
            price: price.into(),
            url: url.into(),
        }
    }
}

/// One entry in a cart: a product stamped with a unique [`ItemId`].
///
/// Created on add, never mutated afterwards. Destroyed on remove or
/// when a remote snapshot replaces the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Identifier minted when the item was added. Merge and remove key
    /// on this, never on the product fields.
    pub id: ItemId,
    /// The product this item was created from.
    pub product: Product,
}

impl CartItem {
    /// Stamp a product with a fresh id.
    pub fn new(product: Product) -> Self {
        Self {
            id: ItemId::random(),
            product,
        }
    }

    /// Build an item with an explicit id (tests and fixtures).
    pub fn with_id(id: ItemId, product: Product) -> Self {
        Self { id, product }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product::new(
            "Wireless Headset",
            "https://example.com/headset.jpg",
            "$49.90",
            "https://example.com/buy/headset",
        )
    }

    #[test]
    fn test_new_items_get_distinct_ids() {
        let a = CartItem::new(sample_product());
        let b = CartItem::new(sample_product());
        assert_ne!(a.id, b.id);
        assert_eq!(a.product, b.product);
    }

    #[test]
    fn test_item_serde_roundtrip() {
        let item = CartItem::with_id(ItemId::from_bytes([7; 16]), sample_product());
        let json = serde_json::to_string(&item).unwrap();
        let back: CartItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
