//! The replicator: flood rebroadcast with idempotent deduplication.
//!
//! Every local mutation broadcasts the full cart under a fresh update
//! id. Every inbound update is deduplicated, applied to the store, and
//! relayed to all open connections except the sender. There is no
//! ordering guarantee beyond event arrival order, no retry, and no
//! acknowledgment - convergence relies on every update eventually
//! flooding the whole mesh.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use cartmesh_core::{PeerId, UpdateId};
use cartmesh_store::CartStore;

use crate::codec;
use crate::dedup::SeenSet;
use crate::error::{Result, SyncError};
use crate::messages::{CartUpdate, UpdateKind};
use crate::transport::{Transport, TransportEvent};

/// Configuration for replication behavior.
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Capacity of the seen-updates set (FIFO eviction beyond this).
    pub seen_capacity: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            seen_capacity: 1024,
        }
    }
}

/// Counters describing what the replicator has processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationStats {
    /// Inbound updates applied to the store.
    pub updates_applied: usize,
    /// Inbound updates ignored because their id was already seen.
    pub duplicates_ignored: usize,
    /// Frames dropped as malformed or over limits.
    pub malformed_dropped: usize,
    /// Outbound updates delivered to a peer.
    pub updates_sent: usize,
    /// Outbound sends skipped because the connection was not open or
    /// the send failed.
    pub sends_skipped: usize,
}

/// The replication layer for one peer.
///
/// Owns the transport and a reference to the shared [`CartStore`].
/// All state is interior-mutable so the replicator can be shared
/// behind an `Arc`: the event loop runs in one task while UI handlers
/// call [`Replicator::broadcast_local`] from another.
pub struct Replicator<T: Transport> {
    store: Arc<CartStore>,
    transport: T,
    /// Peers with an open connection. Entries are added on `Opened`
    /// and removed on `Closed`; the connecting phase never appears
    /// here.
    connections: Mutex<HashSet<PeerId>>,
    seen: Mutex<SeenSet>,
    stats: Mutex<ReplicationStats>,
}

impl<T: Transport> Replicator<T> {
    /// Create a replicator over a store and transport.
    pub fn new(store: Arc<CartStore>, transport: T, config: ReplicationConfig) -> Self {
        Self {
            store,
            transport,
            connections: Mutex::new(HashSet::new()),
            seen: Mutex::new(SeenSet::new(config.seen_capacity)),
            stats: Mutex::new(ReplicationStats::default()),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// This peer's identity.
    pub fn local_peer_id(&self) -> PeerId {
        self.transport.local_peer_id()
    }

    /// Peers currently tracked as open.
    pub fn open_peers(&self) -> Vec<PeerId> {
        self.connections.lock().unwrap().iter().copied().collect()
    }

    /// A copy of the current counters.
    pub fn stats(&self) -> ReplicationStats {
        self.stats.lock().unwrap().clone()
    }

    /// Broadcast the current cart to every open connection.
    ///
    /// Called after every local mutation. The fresh update id is
    /// recorded as seen before sending, so a peer reflecting the
    /// update back at us is ignored rather than reprocessed.
    pub async fn broadcast_local(&self) -> Result<UpdateId> {
        let update_id = UpdateId::random();
        self.seen.lock().unwrap().insert(update_id);

        let update = CartUpdate::replace(self.store.snapshot(), update_id);
        let frame = codec::encode(&update)?;
        tracing::trace!(update = %update_id, items = update.cart.len(), "broadcasting local cart");
        self.relay(frame, None).await;
        Ok(update_id)
    }

    /// Process one transport event.
    pub async fn handle_event(&self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Opened(peer) => self.on_open(peer).await,
            TransportEvent::Data { from, frame } => {
                self.on_data(from, frame).await;
                Ok(())
            }
            TransportEvent::Closed(peer) => {
                self.connections.lock().unwrap().remove(&peer);
                tracing::debug!(peer = %peer, "connection closed");
                Ok(())
            }
        }
    }

    /// Process events until the transport closes.
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.transport.next_event().await {
                Ok(event) => self.handle_event(event).await?,
                Err(SyncError::TransportClosed) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    /// Process at most one event, waiting up to `timeout`.
    ///
    /// Returns whether an event was processed. Tests use this to pump
    /// a mesh deterministically.
    pub async fn step_timeout(&self, timeout: std::time::Duration) -> Result<bool> {
        match self.transport.next_event_timeout(timeout).await? {
            Some(event) => {
                self.handle_event(event).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A connection reached the open state: track it and push our full
    /// cart so the newcomer can merge it with whatever it holds.
    async fn on_open(&self, peer: PeerId) -> Result<()> {
        self.connections.lock().unwrap().insert(peer);

        let update_id = UpdateId::random();
        self.seen.lock().unwrap().insert(update_id);

        let update = CartUpdate::sync(self.store.snapshot(), update_id);
        let frame = codec::encode(&update)?;
        tracing::debug!(peer = %peer, update = %update_id, "connection open, pushing cart");
        self.send_one(&peer, frame).await;
        Ok(())
    }

    /// Inbound frame: decode, deduplicate, apply, relay onward.
    async fn on_data(&self, from: PeerId, frame: Bytes) {
        let update = match codec::decode(&frame) {
            Ok(update) => update,
            Err(err) => {
                tracing::debug!(peer = %from, %err, "dropping malformed frame");
                self.stats.lock().unwrap().malformed_dropped += 1;
                return;
            }
        };

        if let Err(reason) = update.validate_limits() {
            tracing::debug!(peer = %from, reason, "dropping oversized update");
            self.stats.lock().unwrap().malformed_dropped += 1;
            return;
        }

        if !self.seen.lock().unwrap().insert(update.update_id) {
            tracing::trace!(update = %update.update_id, "duplicate update ignored");
            self.stats.lock().unwrap().duplicates_ignored += 1;
            return;
        }

        let relay_cart = match update.kind {
            UpdateKind::Sync => {
                let appended = self.store.merge_from(update.cart);
                tracing::debug!(
                    update = %update.update_id,
                    appended,
                    "merged sync update"
                );
                self.store.snapshot()
            }
            UpdateKind::Replace => {
                self.store.replace_all(update.cart.clone());
                tracing::debug!(
                    update = %update.update_id,
                    items = update.cart.len(),
                    "applied replace update"
                );
                update.cart
            }
        };
        self.stats.lock().unwrap().updates_applied += 1;

        // Relay under the same id so downstream peers deduplicate it;
        // the merged result always travels as a replace.
        let relay = CartUpdate::replace(relay_cart, update.update_id);
        match codec::encode(&relay) {
            Ok(frame) => self.relay(frame, Some(&from)).await,
            Err(err) => {
                tracing::warn!(%err, "failed to encode relay frame");
            }
        }
    }

    /// Send a frame to every open connection, optionally excluding the
    /// peer the update came from.
    async fn relay(&self, frame: Bytes, exclude: Option<&PeerId>) {
        let exclude = exclude.copied();
        let peers: Vec<PeerId> = {
            let connections = self.connections.lock().unwrap();
            connections
                .iter()
                .copied()
                .filter(|peer| Some(*peer) != exclude)
                .collect()
        };

        for peer in peers {
            if !self.transport.is_open(&peer).await {
                tracing::debug!(peer = %peer, "skipping send, connection not open");
                self.stats.lock().unwrap().sends_skipped += 1;
                continue;
            }
            self.send_one(&peer, frame.clone()).await;
        }
    }

    /// Best-effort send to one peer; failures are skipped, not errors.
    async fn send_one(&self, peer: &PeerId, frame: Bytes) {
        match self.transport.send(peer, frame).await {
            Ok(()) => {
                self.stats.lock().unwrap().updates_sent += 1;
            }
            Err(err) => {
                tracing::warn!(peer = %peer, %err, "send failed, skipping peer");
                self.stats.lock().unwrap().sends_skipped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryNetwork;
    use cartmesh_core::{CartItem, ItemId, Product};

    fn product(title: &str) -> Product {
        Product::new(
            title,
            "https://example.com/p.jpg",
            "$2.50",
            "https://example.com/b",
        )
    }

    fn item(seed: u8, title: &str) -> CartItem {
        CartItem::with_id(ItemId::from_bytes([seed; 16]), product(title))
    }

    async fn replicator_on(
        network: &Arc<MemoryNetwork>,
        seed: u8,
    ) -> Replicator<crate::transport::memory::MemoryTransport> {
        let peer_id = PeerId::from_bytes([seed; 32]);
        let transport = network.create_transport(peer_id).await;
        Replicator::new(
            Arc::new(CartStore::new()),
            transport,
            ReplicationConfig::default(),
        )
    }

    fn data_event(from: PeerId, update: &CartUpdate) -> TransportEvent {
        TransportEvent::Data {
            from,
            frame: codec::encode(update).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_update_id_applies_once() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        let sender = PeerId::from_bytes([0xB2; 32]);

        let update = CartUpdate::replace(
            vec![item(1, "laptop")],
            UpdateId::from_bytes([0x77; 16]),
        );

        replicator
            .handle_event(data_event(sender, &update))
            .await
            .unwrap();
        replicator
            .handle_event(data_event(sender, &update))
            .await
            .unwrap();

        let stats = replicator.stats();
        assert_eq!(stats.updates_applied, 1);
        assert_eq!(stats.duplicates_ignored, 1);
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped_silently() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        let sender = PeerId::from_bytes([0xB2; 32]);

        replicator
            .handle_event(TransportEvent::Data {
                from: sender,
                frame: Bytes::from_static(b"\xff\xff not a frame"),
            })
            .await
            .unwrap();

        let stats = replicator.stats();
        assert_eq!(stats.malformed_dropped, 1);
        assert_eq!(stats.updates_applied, 0);
    }

    #[tokio::test]
    async fn test_sync_update_merges_instead_of_replacing() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        let local = replicator.store.add(product("keyboard"));
        let sender = PeerId::from_bytes([0xB2; 32]);

        let update = CartUpdate::sync(vec![item(9, "mouse")], UpdateId::random());
        replicator
            .handle_event(data_event(sender, &update))
            .await
            .unwrap();

        assert_eq!(replicator.store.len(), 2);
        assert!(replicator.store.contains(&local));
        assert!(replicator.store.contains(&ItemId::from_bytes([9; 16])));
    }

    #[tokio::test]
    async fn test_replace_update_is_wholesale() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        replicator.store.add(product("keyboard"));
        let sender = PeerId::from_bytes([0xB2; 32]);

        let update = CartUpdate::replace(vec![item(9, "mouse")], UpdateId::random());
        replicator
            .handle_event(data_event(sender, &update))
            .await
            .unwrap();

        assert_eq!(replicator.store.len(), 1);
        assert!(replicator.store.contains(&ItemId::from_bytes([9; 16])));
    }

    #[tokio::test]
    async fn test_broadcast_with_no_peers_succeeds() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        replicator.store.add(product("laptop"));

        replicator.broadcast_local().await.unwrap();
        let stats = replicator.stats();
        assert_eq!(stats.updates_sent, 0);
        assert_eq!(stats.sends_skipped, 0);
    }

    #[tokio::test]
    async fn test_closed_peer_is_forgotten() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        let peer = PeerId::from_bytes([0xB2; 32]);

        // Track the peer without a live link, then close it.
        replicator.connections.lock().unwrap().insert(peer);
        assert_eq!(replicator.open_peers(), vec![peer]);

        replicator
            .handle_event(TransportEvent::Closed(peer))
            .await
            .unwrap();
        assert!(replicator.open_peers().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unlinked_peer_is_skipped_not_fatal() {
        let network = MemoryNetwork::new();
        let replicator = replicator_on(&network, 0xA1).await;
        let peer = PeerId::from_bytes([0xB2; 32]);
        let _other = network.create_transport(peer).await;

        // The replicator believes the connection is open but the
        // transport has no link, as after an abrupt close.
        replicator.connections.lock().unwrap().insert(peer);
        replicator.store.add(product("laptop"));

        replicator.broadcast_local().await.unwrap();
        let stats = replicator.stats();
        assert_eq!(stats.updates_sent, 0);
        assert_eq!(stats.sends_skipped, 1);
    }
}
