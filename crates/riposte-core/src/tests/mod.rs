//! Crate-level tests for the full engine pipeline.
//!
//! - `determinism.rs`: seeded input scripts produce identical state hashes
//! - `integration.rs`: end-to-end action scenarios through [`Engine`](crate::engine::Engine)
//! - `properties.rs`: proptest invariants over random input sequences
//! - `helpers.rs`: engine setup and output filtering

mod helpers;

pub use helpers::*;
