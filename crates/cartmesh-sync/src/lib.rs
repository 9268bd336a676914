//! # Cartmesh Sync
//!
//! Cart replication across a small mesh of directly connected peers.
//!
//! ## Overview
//!
//! Peers exchange full-cart snapshots tagged with unique update
//! identifiers. Every local mutation broadcasts the whole cart to every
//! open connection; every inbound update is deduplicated by its id,
//! applied, and flooded onward to all open connections except the
//! sender.
//!
//! ## Key Properties
//!
//! - **Idempotent**: an update id is applied at most once per peer
//! - **Convergent**: flood-with-dedup reaches every peer in a connected
//!   mesh, and merge is keyed by item id
//! - **Best-effort**: no retries, no acknowledgments; a send to a
//!   closed connection is skipped, never an error
//!
//! Flood rebroadcast trades bandwidth for simplicity and is only
//! appropriate for small, fully-meshed peer sets.
//!
//! ## Message Flow
//!
//! ```text
//! Peer A                              Peer B
//!   |==== connection opens ===========>|
//!   |<------- Sync {cart, u1} ---------|   (B pushes its cart)
//!   |-------- Sync {cart, u2} -------->|   (A pushes its cart)
//!   |  ... local add on A ...          |
//!   |-------- Replace {cart, u3} ----->|   (B relays u3 to its
//!   |                                  |    other peers, not to A)
//! ```

pub mod codec;
pub mod convergence;
pub mod dedup;
pub mod error;
pub mod messages;
pub mod replicator;
pub mod transport;

pub use convergence::{cart_state_hash, verify_convergence, CartStateHash, ConvergenceResult};
pub use dedup::SeenSet;
pub use error::{Result, SyncError};
pub use messages::{limits, CartUpdate, UpdateKind};
pub use replicator::{ReplicationConfig, ReplicationStats, Replicator};
pub use transport::{memory::MemoryNetwork, memory::MemoryTransport, Transport, TransportEvent};
