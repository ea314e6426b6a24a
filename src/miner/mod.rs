// src/miner/mod.rs
//! Core mining functionality
//!
//! - Digest algorithms
//! - Partitioning of the nonce space between workers
//! - Worker search loops
//! - The race coordinator that picks the first valid result

/// Digest algorithm implementations
pub mod algorithm;

/// Race coordinator
///
/// Launches the workers, accepts the first published solution, cancels the
/// rest and verifies the winner.
pub mod coordinator;

/// Fixed-stride interleaving of the nonce space
pub mod partition;

/// Write-once winner slot and cancellation flag
pub mod signal;

/// Worker search loop
pub mod worker;

// Re-export main components for cleaner imports
pub use self::algorithm::{Algorithm, HashOutput};
pub use self::coordinator::{Canceller, RaceConfig, RaceCoordinator, RaceResult, RaceState};
pub use self::partition::{NonceSequence, WorkAssignment, WorkPartitioner, assign};
pub use self::signal::{RaceSignal, Solution};
pub use self::worker::{Worker, WorkerExit};
