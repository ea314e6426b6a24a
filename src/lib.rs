//! Hashcash Miner - parallel proof-of-work nonce search
//!
//! Builds a block header from a previous-block identifier and a transaction
//! payload, then races a fixed pool of workers for a nonce whose digest has
//! the required number of leading zero hex characters:
//! - Disjoint fixed-stride partitioning of the nonce space
//! - First-writer-wins publication of the winning nonce
//! - Prompt, all-or-nothing cancellation of the losing workers
//! - Independent re-verification of the winner

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Block header construction
pub mod block;

/// Miner core: algorithms, partitioning, workers and the race coordinator
pub mod miner;

/// Payload retrieval
pub mod network;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use block::{BlockHeader, BlockHeaderBuilder};
pub use cli::Commands;
pub use config::Config;
pub use miner::{
    Algorithm, RaceConfig, RaceCoordinator, RaceResult, RaceState, Solution, WorkPartitioner,
};
pub use network::{PayloadClient, PayloadSource};
pub use stats::{RaceReport, StatsReporter};
pub use types::{AlgorithmType, Difficulty};
pub use utils::{MinerError, init_logging};
