//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;
use std::time::Duration;

use cartmesh_core::{PeerId, Product};
use cartmesh_store::CartStore;
use cartmesh_sync::{
    MemoryNetwork, MemoryTransport, ReplicationConfig, Replicator,
};

/// A test fixture with a store ready for mutation.
pub struct TestFixture {
    pub store: Arc<CartStore>,
}

impl TestFixture {
    /// Create a fixture with an empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(CartStore::new()),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A small canned catalog for tests.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(
            "Gaming Laptop 15.6\" 16GB",
            "https://shop.example/img/laptop.jpg",
            "$1,199.00",
            "https://shop.example/buy/laptop",
        ),
        Product::new(
            "Wireless Gaming Headset",
            "https://shop.example/img/headset.jpg",
            "$59.90",
            "https://shop.example/buy/headset",
        ),
        Product::new(
            "Controller Charging Dock",
            "https://shop.example/img/dock.jpg",
            "$34.50",
            "https://shop.example/buy/dock",
        ),
        Product::new(
            "64GB USB Flash Drive",
            "https://shop.example/img/pendrive.jpg",
            "$9.90",
            "https://shop.example/buy/pendrive",
        ),
    ]
}

/// Create `count` replicators on a fresh in-memory mesh.
///
/// Peers are registered with deterministic ids (`[1; 32]`, `[2; 32]`,
/// ...) but no connections are opened; tests wire the topology they
/// need via [`MemoryNetwork::connect`].
pub async fn mesh_replicators(
    count: usize,
) -> (Arc<MemoryNetwork>, Vec<Replicator<MemoryTransport>>) {
    let network = MemoryNetwork::new();
    let mut replicators = Vec::with_capacity(count);

    for i in 0..count {
        let peer_id = PeerId::from_bytes([(i + 1) as u8; 32]);
        let transport = network.create_transport(peer_id).await;
        replicators.push(Replicator::new(
            Arc::new(CartStore::new()),
            transport,
            ReplicationConfig::default(),
        ));
    }

    (network, replicators)
}

/// Drive every replicator until the mesh is quiescent.
///
/// Repeatedly offers each replicator its pending events; stops after a
/// full round in which nothing was processed. Deterministic because the
/// in-memory transport delivers in order and nothing else is running.
pub async fn pump_mesh(replicators: &[&Replicator<MemoryTransport>]) {
    let idle = Duration::from_millis(20);
    loop {
        let mut progressed = false;
        for replicator in replicators {
            while replicator
                .step_timeout(idle)
                .await
                .expect("replicator step failed")
            {
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}
