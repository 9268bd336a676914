//! The cart: an ordered sequence of items with replace and merge rules.

use std::collections::HashSet;

use crate::item::{CartItem, Product};
use crate::types::ItemId;

/// An ordered sequence of [`CartItem`]s.
///
/// The cart enforces no uniqueness beyond what its operations maintain:
/// items minted through [`Cart::add`] always carry fresh ids, and
/// [`Cart::merge_from`] keys on ids, so an id entering through either
/// path appears at most once. [`Cart::replace_all`] trusts the payload
/// wholesale, matching replace semantics of the replication protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing items (applying a remote snapshot).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Number of items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, yielding its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Whether an item with the given id is present.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Add a product, minting a fresh item id. Always succeeds.
    ///
    /// Returns the id of the new item so callers can remove it later.
    pub fn add(&mut self, product: Product) -> ItemId {
        let item = CartItem::new(product);
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Remove the item with the given id.
    ///
    /// Returns false (silent no-op) if no item matches.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Replace the whole cart with the given items.
    ///
    /// No validation is performed on the payload; the caller (the
    /// replication layer applying a remote snapshot) is trusted.
    pub fn replace_all(&mut self, items: Vec<CartItem>) {
        self.items = items;
    }

    /// Union-merge remote items into this cart, keyed by item id.
    ///
    /// Local items keep their position; remote items whose id is not
    /// already present are appended in their received order. An id held
    /// by both sides therefore appears exactly once. Returns the number
    /// of items appended.
    pub fn merge_from(&mut self, items: Vec<CartItem>) -> usize {
        let mut known: HashSet<ItemId> = self.items.iter().map(|item| item.id).collect();
        let before = self.items.len();
        for item in items {
            if known.insert(item.id) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }
}
