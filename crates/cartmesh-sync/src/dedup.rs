//! Seen-update tracking.
//!
//! Every broadcast carries a unique update id. A peer records ids it
//! has processed and ignores repeats, which makes the flood idempotent
//! and stops relays from echoing forever. The set is size-capped with
//! FIFO eviction so retention does not grow for the life of the
//! process.

use std::collections::{HashSet, VecDeque};

use cartmesh_core::UpdateId;

/// A bounded, insertion-ordered set of update ids.
///
/// Once the capacity is reached, inserting a new id evicts the oldest
/// one. Capacity should comfortably exceed the number of updates that
/// can be in flight in the mesh at once; an evicted id that somehow
/// reappears would be reprocessed.
#[derive(Debug)]
pub struct SeenSet {
    capacity: usize,
    ids: HashSet<UpdateId>,
    order: VecDeque<UpdateId>,
}

impl SeenSet {
    /// Create a set holding at most `capacity` ids.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ids: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Record an id.
    ///
    /// Returns true if the id was new, false if it had already been
    /// seen (the caller should ignore the update in that case).
    pub fn insert(&mut self, id: UpdateId) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }

    /// Whether an id has been seen (and not yet evicted).
    pub fn contains(&self, id: &UpdateId) -> bool {
        self.ids.contains(id)
    }

    /// Number of ids currently retained.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no ids are retained.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
