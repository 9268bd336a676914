//! Convergence verification for replicated carts.
//!
//! After the flood settles, two peers can verify they hold the same
//! cart by comparing deterministic state hashes instead of exchanging
//! full snapshots. Diagnostic helper only - the protocol itself never
//! sends these hashes.

use cartmesh_core::{CartItem, ItemId};

/// A deterministic hash of a cart's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartStateHash(pub [u8; 32]);

impl CartStateHash {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Compute a deterministic state hash for a cart.
///
/// The hash covers item membership only: item ids are sorted before
/// hashing, so two carts holding the same items in different orders
/// produce the same hash. Replication preserves membership but not
/// necessarily order across relay paths.
pub fn cart_state_hash(items: &[CartItem]) -> CartStateHash {
    let mut ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
    ids.sort();
    ids.dedup();

    let mut hasher = blake3::Hasher::new();
    hasher.update(b"cartmesh-state-v0:");
    for id in ids {
        hasher.update(id.as_bytes());
    }
    CartStateHash(*hasher.finalize().as_bytes())
}

/// Result of convergence verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceResult {
    /// Both carts hold the same items.
    Converged,
    /// The carts differ; ids on only one side are listed.
    Diverged {
        /// Items only the local cart holds.
        only_local: Vec<ItemId>,
        /// Items only the remote cart holds.
        only_remote: Vec<ItemId>,
    },
}

impl ConvergenceResult {
    /// Check if the carts have converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceResult::Converged)
    }
}

/// Verify two cart snapshots hold the same items.
pub fn verify_convergence(local: &[CartItem], remote: &[CartItem]) -> ConvergenceResult {
    if cart_state_hash(local) == cart_state_hash(remote) {
        return ConvergenceResult::Converged;
    }

    let local_ids: std::collections::BTreeSet<ItemId> =
        local.iter().map(|item| item.id).collect();
    let remote_ids: std::collections::BTreeSet<ItemId> =
        remote.iter().map(|item| item.id).collect();

    ConvergenceResult::Diverged {
        only_local: local_ids.difference(&remote_ids).copied().collect(),
        only_remote: remote_ids.difference(&local_ids).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartmesh_core::Product;

    fn item(seed: u8) -> CartItem {
        CartItem::with_id(
            ItemId::from_bytes([seed; 16]),
            Product::new("item", "https://example.com/i.jpg", "$1.00", "https://example.com/b"),
        )
    }

    #[test]
    fn test_hash_is_order_insensitive() {
        let forward = vec![item(1), item(2), item(3)];
        let backward = vec![item(3), item(2), item(1)];
        assert_eq!(cart_state_hash(&forward), cart_state_hash(&backward));
    }

    #[test]
    fn test_hash_differs_on_membership() {
        let a = vec![item(1), item(2)];
        let b = vec![item(1), item(3)];
        assert_ne!(cart_state_hash(&a), cart_state_hash(&b));
    }

    #[test]
    fn test_verify_reports_divergence() {
        let local = vec![item(1), item(2)];
        let remote = vec![item(2), item(3)];

        match verify_convergence(&local, &remote) {
            ConvergenceResult::Diverged {
                only_local,
                only_remote,
            } => {
                assert_eq!(only_local, vec![ItemId::from_bytes([1; 16])]);
                assert_eq!(only_remote, vec![ItemId::from_bytes([3; 16])]);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_converged() {
        let local = vec![item(1), item(2)];
        let remote = vec![item(2), item(1)];
        assert!(verify_convergence(&local, &remote).is_converged());
    }
}
