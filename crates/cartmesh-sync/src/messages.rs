//! Replication message types.
//!
//! A single message kind circulates in the mesh: a full-cart snapshot
//! tagged with an update id. The optional `type` field distinguishes a
//! merge request (sent when a connection opens) from the default
//! replace semantics.

use serde::{Deserialize, Serialize};

use cartmesh_core::{CartItem, UpdateId};

/// Message size limits.
pub mod limits {
    /// Max items in CartUpdate.cart.
    pub const MAX_CART_ITEMS: usize = 4096;
}

/// How a received cart snapshot is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Apply the received cart wholesale. The default; absent on the
    /// wire.
    #[default]
    Replace,
    /// Union-merge the received cart into the local one, keyed by item
    /// id. Sent when a connection opens so neither side loses items.
    Sync,
}

impl UpdateKind {
    /// True for the default kind (used to omit the field on the wire).
    pub fn is_replace(&self) -> bool {
        matches!(self, UpdateKind::Replace)
    }
}

/// A full-cart snapshot tagged with a unique update identifier.
///
/// Wire schema: `{ cart, updateId, type?: "sync" }`. A frame missing
/// either `cart` or `updateId` fails to decode and is dropped by the
/// replicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUpdate {
    /// The sender's entire cart at broadcast time.
    pub cart: Vec<CartItem>,
    /// Opaque token deduplicating this broadcast across the mesh.
    #[serde(rename = "updateId")]
    pub update_id: UpdateId,
    /// How to apply the snapshot.
    #[serde(rename = "type", default, skip_serializing_if = "UpdateKind::is_replace")]
    pub kind: UpdateKind,
}

impl CartUpdate {
    /// Build a replace update.
    pub fn replace(cart: Vec<CartItem>, update_id: UpdateId) -> Self {
        Self {
            cart,
            update_id,
            kind: UpdateKind::Replace,
        }
    }

    /// Build a sync (merge) update.
    pub fn sync(cart: Vec<CartItem>, update_id: UpdateId) -> Self {
        Self {
            cart,
            update_id,
            kind: UpdateKind::Sync,
        }
    }

    /// Check that this update respects size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if self.cart.len() > limits::MAX_CART_ITEMS {
            return Err("too many cart items");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartmesh_core::{ItemId, Product};

    fn item(seed: u8) -> CartItem {
        CartItem::with_id(
            ItemId::from_bytes([seed; 16]),
            Product::new("item", "https://example.com/i.jpg", "$1.00", "https://example.com/b"),
        )
    }

    #[test]
    fn test_default_kind_is_replace() {
        assert_eq!(UpdateKind::default(), UpdateKind::Replace);
    }

    #[test]
    fn test_limits_valid() {
        let update = CartUpdate::replace(vec![item(1)], UpdateId::random());
        assert!(update.validate_limits().is_ok());
    }

    #[test]
    fn test_limits_exceeded() {
        let cart = vec![item(1); limits::MAX_CART_ITEMS + 1];
        let update = CartUpdate::sync(cart, UpdateId::random());
        assert!(update.validate_limits().is_err());
    }
}
