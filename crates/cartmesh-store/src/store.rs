//! The cart store: owned cart state plus change notification.

use std::sync::RwLock;

use tokio::sync::watch;

use cartmesh_core::{Cart, CartItem, ItemId, Product};

/// A point-in-time copy of the cart, as published to UI consumers.
pub type CartSnapshot = Vec<CartItem>;

/// The single owner of the local cart.
///
/// All mutation goes through this type. After every mutation the new
/// snapshot is published on a watch channel; a UI layer subscribes and
/// re-renders from whatever snapshot it observes. The lock is never
/// held across an await point.
pub struct CartStore {
    cart: RwLock<Cart>,
    changes: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            cart: RwLock::new(Cart::new()),
            changes,
        }
    }

    /// Subscribe to cart snapshots.
    ///
    /// The receiver always observes the most recent mutation or applied
    /// remote snapshot; intermediate states may be skipped, partial
    /// states never appear.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    /// Add a product to the cart, returning the minted item id.
    pub fn add(&self, product: Product) -> ItemId {
        let id = {
            let mut cart = self.cart.write().unwrap();
            cart.add(product)
        };
        self.publish();
        id
    }

    /// Remove the item with the given id.
    ///
    /// Returns false if no item matched; the cart is unchanged and no
    /// snapshot is published in that case.
    pub fn remove(&self, id: &ItemId) -> bool {
        let removed = {
            let mut cart = self.cart.write().unwrap();
            cart.remove(id)
        };
        if removed {
            self.publish();
        } else {
            tracing::debug!(item = %id, "remove of unknown item ignored");
        }
        removed
    }

    /// Replace the whole cart (applying a remote replace snapshot).
    pub fn replace_all(&self, items: Vec<CartItem>) {
        {
            let mut cart = self.cart.write().unwrap();
            cart.replace_all(items);
        }
        self.publish();
    }

    /// Union-merge remote items into the cart, keyed by item id.
    ///
    /// Returns the number of items appended.
    pub fn merge_from(&self, items: Vec<CartItem>) -> usize {
        let appended = {
            let mut cart = self.cart.write().unwrap();
            cart.merge_from(items)
        };
        if appended > 0 {
            self.publish();
        }
        appended
    }

    /// A copy of the current cart contents.
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.read().unwrap().items().to_vec()
    }

    /// Number of items currently in the cart.
    pub fn len(&self) -> usize {
        self.cart.read().unwrap().len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.cart.read().unwrap().is_empty()
    }

    /// Whether an item with the given id is present.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.cart.read().unwrap().contains(id)
    }

    fn publish(&self) {
        // send_replace never fails, even with no subscribers.
        self.changes.send_replace(self.snapshot());
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
