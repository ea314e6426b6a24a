// src/stats/report.rs
use crate::block::BlockHeader;
use crate::miner::coordinator::{RaceResult, RaceState};
use crate::stats::reporter::hashrate;
use crate::types::{AlgorithmType, Difficulty};
use serde::Serialize;
use std::fmt;
use sysinfo::System;

/// Final, printable summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct RaceReport {
    /// Required leading zero characters
    pub difficulty: Difficulty,
    /// Digest algorithm used
    pub algorithm: AlgorithmType,
    /// Number of workers in the race
    pub workers: usize,
    /// Host the race ran on
    pub node: String,
    /// Payload fingerprint the header was built from
    pub merkle_root: String,
    /// Whether a valid nonce was found
    pub found: bool,
    /// Winning nonce
    pub nonce: Option<u64>,
    /// Winning digest, lowercase hex
    pub digest: Option<String>,
    /// Worker that found the nonce
    pub winner: Option<u64>,
    /// Race time in seconds
    pub elapsed_secs: f64,
    /// Digests computed by all workers
    pub hashes: u64,
    /// Average hashes per second over the race
    pub hashrate: f64,
}

impl RaceReport {
    /// Summarizes `result` for the race run against `header`
    pub fn new(
        result: &RaceResult,
        header: &BlockHeader,
        difficulty: Difficulty,
        algorithm: AlgorithmType,
    ) -> Self {
        let elapsed_secs = result.elapsed.as_secs_f64();

        RaceReport {
            difficulty,
            algorithm,
            workers: result.worker_count,
            node: System::host_name().unwrap_or_else(|| "unknown".into()),
            merkle_root: header.payload_fingerprint().to_string(),
            found: result.state == RaceState::Succeeded && result.found(),
            nonce: result.solution.map(|s| s.nonce),
            digest: result.solution.map(|s| s.digest_hex()),
            winner: result.solution.map(|s| s.worker_id),
            elapsed_secs,
            hashes: result.hashes,
            hashrate: hashrate(result.hashes, elapsed_secs),
        }
    }

    /// Serializes the report as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merkle Root: {}", self.merkle_root)?;
        writeln!(f, "Difficulty/Number of Leading Zeros: {}", self.difficulty)?;

        match (self.nonce, &self.digest, self.winner) {
            (Some(nonce), Some(digest), Some(winner)) => {
                writeln!(f, "Final Nonce: {}", nonce)?;
                writeln!(f, "New Block Signature: {}", digest)?;
                writeln!(
                    f,
                    "Found By: worker {} of {} on {}",
                    winner, self.workers, self.node
                )?;
            }
            _ => writeln!(f, "No valid nonce found (race cancelled)")?,
        }

        writeln!(f, "Mining Time: {:.6} seconds", self.elapsed_secs)?;
        write!(
            f,
            "Hashes: {} ({:.2} H/s, {})",
            self.hashes, self.hashrate, self.algorithm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::signal::Solution;
    use std::time::Duration;

    fn header() -> BlockHeader {
        BlockHeader::new("11".repeat(32), "22".repeat(32))
    }

    fn result(solution: Option<Solution>) -> RaceResult {
        RaceResult {
            state: if solution.is_some() {
                RaceState::Succeeded
            } else {
                RaceState::Cancelled
            },
            solution,
            elapsed: Duration::from_millis(1500),
            hashes: 3000,
            worker_count: 4,
        }
    }

    #[test]
    fn successful_report_lists_winner() {
        let solution = Solution {
            worker_id: 3,
            nonce: 1234,
            digest: [0; 32],
        };
        let report = RaceReport::new(
            &result(Some(solution)),
            &header(),
            Difficulty::from(2),
            AlgorithmType::Sha256,
        );

        assert!(report.found);
        assert_eq!(report.hashrate, 2000.0);
        let text = report.to_string();
        assert!(text.contains("Final Nonce: 1234"));
        assert!(text.contains(&format!("New Block Signature: {}", "0".repeat(64))));
        assert!(text.contains("Difficulty/Number of Leading Zeros: 2"));
        assert!(text.contains(&format!("Merkle Root: {}", "22".repeat(32))));
    }

    #[test]
    fn cancelled_report_has_no_nonce() {
        let report = RaceReport::new(
            &result(None),
            &header(),
            Difficulty::from(70),
            AlgorithmType::Blake2s,
        );
        assert!(!report.found);
        assert!(report.to_string().contains("No valid nonce found"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["nonce"], serde_json::Value::Null);
        assert_eq!(json["difficulty"], 70);
        assert_eq!(json["algorithm"], "blake2s");
    }
}
