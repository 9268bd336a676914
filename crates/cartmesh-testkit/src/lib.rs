//! # Cartmesh Testkit
//!
//! Testing utilities for cartmesh.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: helpers for setting up stores, products, and
//!   in-memory replication meshes
//! - **Generators**: proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up a test scenario:
//!
//! ```rust
//! use cartmesh_testkit::fixtures::{sample_products, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let id = fixture.store.add(sample_products()[0].clone());
//! assert!(fixture.store.contains(&id));
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cartmesh_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn cart_len_matches(items in generators::cart(16)) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{mesh_replicators, pump_mesh, sample_products, TestFixture};
