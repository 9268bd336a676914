//! Transport abstraction for cart replication.
//!
//! The transport owns connection establishment and frame delivery.
//! Implementations may sit on WebRTC data channels, WebSockets, or any
//! other direct peer channel; the replicator only sees opaque frames
//! and open/close transitions. The connecting phase of a connection is
//! internal to the transport - the replicator learns about a peer when
//! the connection reaches the open state.

use async_trait::async_trait;
use bytes::Bytes;

use cartmesh_core::PeerId;

use crate::error::SyncError;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Events delivered by a transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A connection to the peer reached the open state.
    Opened(PeerId),
    /// A frame arrived from an open connection.
    Data {
        /// The sending peer.
        from: PeerId,
        /// The raw frame; the replicator decodes it.
        frame: Bytes,
    },
    /// The connection to the peer closed (terminal).
    Closed(PeerId),
}

/// Transport trait for frame delivery and connection lifecycle.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a frame to a specific peer.
    ///
    /// Errors if the connection to the peer is not open. Callers that
    /// want skip-on-closed semantics check [`Transport::is_open`] first
    /// or discard the error.
    async fn send(&self, peer: &PeerId, frame: Bytes) -> Result<()>;

    /// Wait for the next transport event.
    ///
    /// Returns [`SyncError::TransportClosed`] once the transport shuts
    /// down and no further events will arrive.
    async fn next_event(&self) -> Result<TransportEvent>;

    /// Wait for the next event with a timeout.
    ///
    /// Returns None if the timeout expires before an event arrives.
    async fn next_event_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Option<TransportEvent>>;

    /// Get the local peer's identity.
    fn local_peer_id(&self) -> PeerId;

    /// List peers with an open connection.
    async fn connected_peers(&self) -> Vec<PeerId>;

    /// Check whether the connection to a peer is open.
    async fn is_open(&self, peer: &PeerId) -> bool;
}

/// A simple in-memory transport for testing.
///
/// Uses channels to simulate direct connections between peers.
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    /// Shared state for the in-memory mesh.
    pub struct MemoryNetwork {
        inner: RwLock<NetworkInner>,
    }

    #[derive(Default)]
    struct NetworkInner {
        /// Event mailboxes for each registered peer.
        mailboxes: HashMap<PeerId, mpsc::Sender<TransportEvent>>,
        /// Open connections, stored as normalized pairs.
        links: HashSet<(PeerId, PeerId)>,
    }

    fn link_key(a: &PeerId, b: &PeerId) -> (PeerId, PeerId) {
        if a.as_bytes() <= b.as_bytes() {
            (*a, *b)
        } else {
            (*b, *a)
        }
    }

    impl MemoryNetwork {
        /// Create a new in-memory mesh.
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: RwLock::new(NetworkInner::default()),
            })
        }

        /// Register a peer and create its transport.
        pub async fn create_transport(self: &Arc<Self>, peer_id: PeerId) -> MemoryTransport {
            let (tx, rx) = mpsc::channel(1000);

            self.inner.write().await.mailboxes.insert(peer_id, tx);

            MemoryTransport {
                peer_id,
                network: Arc::clone(self),
                receiver: RwLock::new(rx),
            }
        }

        /// Open a connection between two registered peers.
        ///
        /// Both ends observe [`TransportEvent::Opened`]. Opening an
        /// already-open connection is a no-op.
        pub async fn connect(&self, a: &PeerId, b: &PeerId) -> Result<()> {
            let (tx_a, tx_b) = {
                let mut inner = self.inner.write().await;
                let tx_a = inner
                    .mailboxes
                    .get(a)
                    .cloned()
                    .ok_or(SyncError::PeerNotConnected(*a))?;
                let tx_b = inner
                    .mailboxes
                    .get(b)
                    .cloned()
                    .ok_or(SyncError::PeerNotConnected(*b))?;
                if !inner.links.insert(link_key(a, b)) {
                    return Ok(());
                }
                (tx_a, tx_b)
            };

            let _ = tx_a.send(TransportEvent::Opened(*b)).await;
            let _ = tx_b.send(TransportEvent::Opened(*a)).await;
            Ok(())
        }

        /// Close the connection between two peers.
        ///
        /// Both ends observe [`TransportEvent::Closed`]. Closing a
        /// connection that is not open is a no-op.
        pub async fn close(&self, a: &PeerId, b: &PeerId) {
            let (tx_a, tx_b) = {
                let mut inner = self.inner.write().await;
                if !inner.links.remove(&link_key(a, b)) {
                    return;
                }
                (
                    inner.mailboxes.get(a).cloned(),
                    inner.mailboxes.get(b).cloned(),
                )
            };

            if let Some(tx) = tx_a {
                let _ = tx.send(TransportEvent::Closed(*b)).await;
            }
            if let Some(tx) = tx_b {
                let _ = tx.send(TransportEvent::Closed(*a)).await;
            }
        }

        /// Whether the connection between two peers is open.
        pub async fn is_linked(&self, a: &PeerId, b: &PeerId) -> bool {
            self.inner.read().await.links.contains(&link_key(a, b))
        }
    }

    /// In-memory transport implementation.
    pub struct MemoryTransport {
        peer_id: PeerId,
        network: Arc<MemoryNetwork>,
        receiver: RwLock<mpsc::Receiver<TransportEvent>>,
    }

    impl MemoryTransport {
        /// The mesh this transport belongs to.
        pub fn network(&self) -> &Arc<MemoryNetwork> {
            &self.network
        }

        /// Open a connection from this peer to another.
        pub async fn connect_to(&self, peer: &PeerId) -> Result<()> {
            self.network.connect(&self.peer_id, peer).await
        }

        /// Close this peer's connection to another.
        pub async fn close_with(&self, peer: &PeerId) {
            self.network.close(&self.peer_id, peer).await
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn send(&self, peer: &PeerId, frame: Bytes) -> Result<()> {
            let sender = {
                let inner = self.network.inner.read().await;
                if !inner.links.contains(&link_key(&self.peer_id, peer)) {
                    return Err(SyncError::PeerNotConnected(*peer));
                }
                inner
                    .mailboxes
                    .get(peer)
                    .cloned()
                    .ok_or(SyncError::PeerNotConnected(*peer))?
            };

            sender
                .send(TransportEvent::Data {
                    from: self.peer_id,
                    frame,
                })
                .await
                .map_err(|_| SyncError::TransportError("peer mailbox closed".into()))
        }

        async fn next_event(&self) -> Result<TransportEvent> {
            let mut rx = self.receiver.write().await;
            rx.recv().await.ok_or(SyncError::TransportClosed)
        }

        async fn next_event_timeout(
            &self,
            timeout: std::time::Duration,
        ) -> Result<Option<TransportEvent>> {
            let mut rx = self.receiver.write().await;
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(event)) => Ok(Some(event)),
                Ok(None) => Err(SyncError::TransportClosed),
                Err(_) => Ok(None), // Timeout
            }
        }

        fn local_peer_id(&self) -> PeerId {
            self.peer_id
        }

        async fn connected_peers(&self) -> Vec<PeerId> {
            let inner = self.network.inner.read().await;
            inner
                .links
                .iter()
                .filter_map(|(a, b)| {
                    if a == &self.peer_id {
                        Some(*b)
                    } else if b == &self.peer_id {
                        Some(*a)
                    } else {
                        None
                    }
                })
                .collect()
        }

        async fn is_open(&self, peer: &PeerId) -> bool {
            self.network.is_linked(&self.peer_id, peer).await
        }
    }
}
