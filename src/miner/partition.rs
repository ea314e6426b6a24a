// src/miner/partition.rs
//! Nonce space partitioning
//!
//! Worker `i` of `W` walks the arithmetic sequence `i, i + W, i + 2W, ...`.
//! The sequences are pairwise disjoint and their union is every `u64`, so no
//! nonce is tried twice and none is skipped, without any shared counter.

use crate::utils::error::MinerError;

/// Splits the nonce space between a fixed number of workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPartitioner {
    worker_count: u64,
}

impl WorkPartitioner {
    /// Creates a partitioner for `worker_count` workers
    ///
    /// # Errors
    /// `InvalidConfiguration` if `worker_count` is zero.
    pub fn new(worker_count: u64) -> Result<Self, MinerError> {
        if worker_count == 0 {
            return Err(MinerError::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(WorkPartitioner { worker_count })
    }

    /// Total number of workers
    pub fn worker_count(&self) -> u64 {
        self.worker_count
    }

    /// Returns the assignment for `worker_id`
    ///
    /// # Errors
    /// `InvalidConfiguration` if `worker_id >= worker_count`.
    pub fn assign(&self, worker_id: u64) -> Result<WorkAssignment, MinerError> {
        if worker_id >= self.worker_count {
            return Err(MinerError::InvalidConfiguration(format!(
                "worker id {} out of range for {} workers",
                worker_id, self.worker_count
            )));
        }
        Ok(WorkAssignment {
            worker_count: self.worker_count,
            worker_id,
        })
    }

    /// Iterates over the assignments of every worker, in id order
    pub fn assignments(&self) -> impl Iterator<Item = WorkAssignment> + '_ {
        (0..self.worker_count).map(|worker_id| WorkAssignment {
            worker_count: self.worker_count,
            worker_id,
        })
    }

    /// Id of the worker whose sequence contains `nonce`
    pub fn owner_of(&self, nonce: u64) -> u64 {
        nonce % self.worker_count
    }
}

/// One worker's share of the nonce space
///
/// Immutable; [`nonces`](Self::nonces) can be called any number of times and
/// always starts from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkAssignment {
    worker_count: u64,
    worker_id: u64,
}

impl WorkAssignment {
    /// Id of the worker this assignment belongs to
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Stride between consecutive nonces
    pub fn worker_count(&self) -> u64 {
        self.worker_count
    }

    /// Lazily yields `worker_id + k * worker_count` for `k = 0, 1, 2, ...`
    pub fn nonces(&self) -> NonceSequence {
        NonceSequence {
            next: Some(self.worker_id),
            stride: self.worker_count,
        }
    }
}

/// Strictly increasing nonce iterator for a single worker
///
/// Ends only once the next nonce would overflow `u64`.
#[derive(Debug, Clone)]
pub struct NonceSequence {
    next: Option<u64>,
    stride: u64,
}

impl Iterator for NonceSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = current.checked_add(self.stride);
        Some(current)
    }
}

impl std::iter::FusedIterator for NonceSequence {}

/// Assigns the nonce sequence of `worker_id` among `worker_count` workers
pub fn assign(worker_count: u64, worker_id: u64) -> Result<NonceSequence, MinerError> {
    Ok(WorkPartitioner::new(worker_count)?
        .assign(worker_id)?
        .nonces())
}
