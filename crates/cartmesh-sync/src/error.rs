//! Error types for the sync module.

use thiserror::Error;

use cartmesh_core::PeerId;

/// Errors that can occur during replication.
///
/// Malformed inbound updates never surface here: the replicator drops
/// them silently and counts them in its stats.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Attempted to send to a peer with no open connection.
    #[error("peer not connected: {0}")]
    PeerNotConnected(PeerId),

    /// Failed to encode an update for the wire.
    #[error("encode error: {0}")]
    Encode(String),

    /// Failed to decode a wire frame.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transport's event stream has ended.
    #[error("transport closed")]
    TransportClosed,
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
