//! The cart node: store and replication behind one API.
//!
//! A `CartNode` is what an application embeds. UI handlers call the
//! mutation methods and subscribe to snapshots; a background task
//! drives [`CartNode::run`] to process transport events.

use std::sync::Arc;

use tokio::sync::watch;

use cartmesh_core::{ItemId, PeerId, Product};
use cartmesh_store::{CartSnapshot, CartStore};
use cartmesh_sync::{ReplicationConfig, ReplicationStats, Replicator, Transport};

use crate::error::{NodeError, Result};

/// Configuration for a cart node.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Replication behavior.
    pub replication: ReplicationConfig,
}

/// Parse a user-entered peer identifier.
///
/// Empty or malformed input yields [`NodeError::InvalidPeerInput`],
/// which the UI surfaces directly to the user.
pub fn parse_peer_input(input: &str) -> Result<PeerId> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NodeError::InvalidPeerInput("no peer id entered".into()));
    }
    PeerId::from_hex(trimmed)
        .map_err(|_| NodeError::InvalidPeerInput(format!("not a valid peer id: {trimmed}")))
}

/// A peer in the cart mesh.
///
/// Owns the [`CartStore`] and the replicator; both are constructed
/// here and shared by reference, so multiple independent nodes can
/// coexist in one process (there is no global state).
pub struct CartNode<T: Transport> {
    store: Arc<CartStore>,
    replicator: Arc<Replicator<T>>,
}

impl<T: Transport> CartNode<T> {
    /// Create a node over a transport.
    pub fn new(transport: T, config: NodeConfig) -> Self {
        let store = Arc::new(CartStore::new());
        let replicator = Arc::new(Replicator::new(
            Arc::clone(&store),
            transport,
            config.replication,
        ));
        Self { store, replicator }
    }

    /// This node's identity in the mesh.
    pub fn peer_id(&self) -> PeerId {
        self.replicator.local_peer_id()
    }

    /// The cart store.
    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }

    /// The replication layer.
    pub fn replicator(&self) -> &Arc<Replicator<T>> {
        &self.replicator
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        self.replicator.transport()
    }

    /// Add a product to the cart and broadcast the new cart.
    ///
    /// The local mutation always succeeds; the broadcast is
    /// best-effort per open connection.
    pub async fn add_to_cart(&self, product: Product) -> Result<ItemId> {
        let id = self.store.add(product);
        tracing::debug!(item = %id, "added to cart");
        self.replicator.broadcast_local().await?;
        Ok(id)
    }

    /// Remove an item and broadcast the new cart.
    ///
    /// Removing an unknown id is a silent no-op: nothing is broadcast
    /// and false is returned.
    pub async fn remove_from_cart(&self, id: &ItemId) -> Result<bool> {
        if !self.store.remove(id) {
            return Ok(false);
        }
        tracing::debug!(item = %id, "removed from cart");
        self.replicator.broadcast_local().await?;
        Ok(true)
    }

    /// A copy of the current cart.
    pub fn cart(&self) -> CartSnapshot {
        self.store.snapshot()
    }

    /// Number of items in the cart (what a cart badge renders).
    pub fn cart_len(&self) -> usize {
        self.store.len()
    }

    /// Subscribe to cart snapshots for rendering.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.store.subscribe()
    }

    /// Replication counters.
    pub fn stats(&self) -> ReplicationStats {
        self.replicator.stats()
    }

    /// Process transport events until the transport closes.
    pub async fn run(&self) -> Result<()> {
        self.replicator.run().await?;
        Ok(())
    }
}
