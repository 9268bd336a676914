//! # Cartmesh Store
//!
//! The cart store: the single owner of the local cart, with a watch
//! channel publishing snapshots to UI consumers after every mutation.
//!
//! The store is deliberately infallible - add, remove, replace, and
//! merge always succeed (remove of an unknown id is a silent no-op).
//! Failure handling lives entirely in the replication layer.

pub mod store;

pub use store::{CartSnapshot, CartStore};
