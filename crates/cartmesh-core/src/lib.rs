//! # Cartmesh Core
//!
//! Pure primitives for cartmesh: identifiers, products, and the cart
//! sequence itself.
//!
//! This crate contains no I/O, no networking, and no shared state. It is
//! plain data plus the merge rules the replication layer relies on.
//!
//! ## Key Types
//!
//! - [`CartItem`] - One entry in the cart: a product plus its unique id
//! - [`ItemId`] - Identifier minted once per add, never reused
//! - [`UpdateId`] - Opaque token tagging one broadcast, used for dedup
//! - [`PeerId`] - Identifier for a node in the replication mesh
//! - [`Cart`] - The ordered item sequence with add/remove/replace/merge

pub mod cart;
pub mod item;
pub mod types;

pub use cart::Cart;
pub use item::{CartItem, Product};
pub use types::{ItemId, PeerId, UpdateId};
