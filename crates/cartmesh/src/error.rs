//! Error types for the node API.

use thiserror::Error;

use cartmesh_sync::SyncError;

/// Errors that can occur during node operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Replication error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A peer identifier entered by the user could not be parsed.
    ///
    /// Surfaced to the UI as a user-facing message rather than logged
    /// and swallowed.
    #[error("invalid peer id input: {0}")]
    InvalidPeerInput(String),
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
