// src/block/mod.rs
//! Block header construction
//!
//! The header is computed once per run from the previous block identifier and
//! the fetched transaction payload, then shared read-only with every worker.

/// Header type and builder
pub mod header;

pub use header::{BlockHeader, BlockHeaderBuilder, DEFAULT_PREVIOUS_BLOCK_ID};
