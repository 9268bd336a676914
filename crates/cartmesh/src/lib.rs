//! # Cartmesh
//!
//! A shared shopping cart replicated across a small mesh of directly
//! connected peers, with no central server.
//!
//! ## Overview
//!
//! Each peer runs a [`CartNode`]: a cart store plus a replication
//! layer over an abstract transport. Local mutations broadcast the
//! full cart to every open connection under a fresh update id; inbound
//! updates are deduplicated by id, applied, and flooded onward to all
//! open connections except the sender. Carts converge by union merge
//! keyed on item id.
//!
//! ## Usage
//!
//! ```rust
//! use cartmesh::{CartNode, NodeConfig, PeerId, Product};
//! use cartmesh::sync::MemoryNetwork;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let network = MemoryNetwork::new();
//! let node = CartNode::new(
//!     network.create_transport(PeerId::random()).await,
//!     NodeConfig::default(),
//! );
//!
//! let product = Product::new(
//!     "Wireless Headset",
//!     "https://shop.example/img/headset.jpg",
//!     "$59.90",
//!     "https://shop.example/buy/headset",
//! );
//! let item_id = node.add_to_cart(product).await.unwrap();
//! assert!(node.store().contains(&item_id));
//! # }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `cartmesh::core` - identifiers, products, the cart sequence
//! - `cartmesh::store` - the cart store with change notification
//! - `cartmesh::sync` - replication, transport, convergence checks

pub mod error;
pub mod node;

// Re-export component crates
pub use cartmesh_core as core;
pub use cartmesh_store as store;
pub use cartmesh_sync as sync;

// Re-export main types for convenience
pub use error::{NodeError, Result};
pub use node::{parse_peer_input, CartNode, NodeConfig};

// Re-export commonly used component types
pub use cartmesh_core::{Cart, CartItem, ItemId, PeerId, Product, UpdateId};
pub use cartmesh_store::{CartSnapshot, CartStore};
pub use cartmesh_sync::{ReplicationConfig, ReplicationStats, Transport, TransportEvent};
