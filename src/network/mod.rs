// src/network/mod.rs
//! External collaborators reached over the network or filesystem
//!
//! Currently only the transaction payload source used to build the block header.

/// Payload source and client
pub mod payload;

// Re-export main components for cleaner imports
pub use payload::{DEFAULT_PAYLOAD_URL, PayloadClient, PayloadSource};
