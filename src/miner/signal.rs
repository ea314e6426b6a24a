// src/miner/signal.rs
//! Shared race state: the write-once winner slot and the cancellation flag
//!
//! These are the only mutable values shared between workers. The slot is a
//! `OnceLock`, so a published solution is fully visible to every thread that
//! can observe it; the flag uses release/acquire ordering.

use crate::miner::algorithm::HashOutput;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A valid nonce found by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Worker that found the nonce
    pub worker_id: u64,
    /// The winning nonce
    pub nonce: u64,
    /// Digest of header + nonce
    pub digest: HashOutput,
}

impl Solution {
    /// Lowercase hex encoding of the digest
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// First-writer-wins result slot plus one-shot cancellation broadcast
#[derive(Debug, Default)]
pub struct RaceSignal {
    winner: OnceLock<Solution>,
    cancelled: AtomicBool,
}

impl RaceSignal {
    /// Creates an empty, uncancelled signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to publish `solution` as the race winner
    ///
    /// Returns `true` only for the first call; every later publication is
    /// discarded and returns `false`.
    pub fn publish(&self, solution: Solution) -> bool {
        self.winner.set(solution).is_ok()
    }

    /// The accepted winner, if any
    pub fn winner(&self) -> Option<&Solution> {
        self.winner.get()
    }

    /// Signals every worker to stop
    ///
    /// Returns `true` if this call set the flag, `false` if it was already set.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
