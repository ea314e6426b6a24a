//! Statistics collection and reporting module
//!
//! - [`StatsReporter`] counts digests and can log progress while a race runs
//! - [`RaceReport`] is the final summary printed at the end of a run

/// Digest counting, hashrate and hardware sampling
pub mod reporter;

/// End-of-run summary
pub mod report;

// Re-export main components
pub use report::RaceReport;
pub use reporter::{HardwareStats, HashCounter, MiningStats, ReportingHandle, StatsReporter};
