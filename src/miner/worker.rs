// src/miner/worker.rs
//! Worker search loop
//!
//! A worker walks its own nonce sequence, hashing the shared header with each
//! candidate, until it finds a valid digest, the race is cancelled, or its
//! digest function fails.

use crate::block::BlockHeader;
use crate::miner::algorithm::Algorithm;
use crate::miner::partition::WorkAssignment;
use crate::miner::signal::{RaceSignal, Solution};
use crate::stats::HashCounter;
use crate::types::Difficulty;
use crate::utils::error::MinerError;
use std::sync::Arc;

/// Digests a worker computes before flushing them to the shared counter
const HASH_FLUSH_INTERVAL: u64 = 1024;

/// Why a worker stopped
#[derive(Debug)]
pub enum WorkerExit {
    /// This worker's solution was accepted into the winner slot
    Won,
    /// A valid nonce was found but another worker had already published
    Discarded(Solution),
    /// Cancellation was observed before a solution was found
    Cancelled,
    /// The nonce sequence ran out (only after walking all of `u64`)
    Exhausted,
    /// The digest function failed; only this worker is affected
    Failed(MinerError),
}

/// One independently running search unit
pub struct Worker {
    assignment: WorkAssignment,
    algorithm: Arc<dyn Algorithm>,
    header: Arc<BlockHeader>,
    difficulty: Difficulty,
    signal: Arc<RaceSignal>,
    hashes: HashCounter,
}

impl Worker {
    /// Creates a worker for `assignment`
    ///
    /// # Arguments
    /// * `assignment` - The worker's share of the nonce space
    /// * `algorithm` - Digest algorithm
    /// * `header` - Shared, immutable header bytes
    /// * `difficulty` - Required leading zero characters
    /// * `signal` - Winner slot and cancellation flag shared by the race
    /// * `hashes` - Counter for throughput reporting
    pub fn new(
        assignment: WorkAssignment,
        algorithm: Arc<dyn Algorithm>,
        header: Arc<BlockHeader>,
        difficulty: Difficulty,
        signal: Arc<RaceSignal>,
        hashes: HashCounter,
    ) -> Self {
        Worker {
            assignment,
            algorithm,
            header,
            difficulty,
            signal,
            hashes,
        }
    }

    /// Id of this worker
    pub fn id(&self) -> u64 {
        self.assignment.worker_id()
    }

    /// Runs the search loop until a terminal condition
    ///
    /// Cancellation is checked before every digest, so after it is signalled
    /// at most the digest already in progress completes.
    pub fn run(&self) -> WorkerExit {
        let worker_id = self.id();
        let worker_count = self.assignment.worker_count();
        let header = self.header.bytes();
        let mut pending = 0u64;

        log::debug!("Worker {}/{} started", worker_id, worker_count);

        let exit = 'search: {
            for nonce in self.assignment.nonces() {
                if self.signal.is_cancelled() {
                    break 'search WorkerExit::Cancelled;
                }

                let digest = match self.algorithm.hash(header, nonce) {
                    Ok(digest) => digest,
                    Err(e) => {
                        log::error!("Worker {} failed at nonce {}: {}", worker_id, nonce, e);
                        break 'search WorkerExit::Failed(e);
                    }
                };

                pending += 1;
                if pending == HASH_FLUSH_INTERVAL {
                    self.hashes.add(pending);
                    pending = 0;
                }

                log::trace!(
                    "Try nonce {} => {} | worker {}/{}",
                    nonce,
                    hex::encode(digest),
                    worker_id,
                    worker_count
                );

                if self.difficulty.is_satisfied_by(&digest) {
                    let solution = Solution {
                        worker_id,
                        nonce,
                        digest,
                    };
                    if self.signal.publish(solution) {
                        log::info!("Worker {} found nonce {}", worker_id, nonce);
                        break 'search WorkerExit::Won;
                    }
                    log::debug!(
                        "Worker {} found nonce {} after the race was decided; discarded",
                        worker_id,
                        nonce
                    );
                    break 'search WorkerExit::Discarded(solution);
                }
            }
            WorkerExit::Exhausted
        };

        self.hashes.add(pending);
        log::debug!("Worker {} stopped: {:?}", worker_id, exit);
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::{HashOutput, Sha256Algo};
    use crate::miner::partition::WorkPartitioner;
    use crate::types::AlgorithmType;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Sets the race's cancellation flag from inside the `cancel_at`-th digest
    struct CancellingAlgo {
        calls: AtomicU64,
        cancel_at: u64,
        signal: Arc<RaceSignal>,
    }

    impl Algorithm for CancellingAlgo {
        fn digest(&self, _data: &[u8]) -> Result<HashOutput, MinerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.cancel_at {
                self.signal.cancel();
            }
            Ok([0xff; 32])
        }

        fn algorithm_type(&self) -> AlgorithmType {
            AlgorithmType::Sha256
        }
    }

    struct FailingAlgo;

    impl Algorithm for FailingAlgo {
        fn digest(&self, _data: &[u8]) -> Result<HashOutput, MinerError> {
            Err(MinerError::AlgorithmError("digest unavailable".into()))
        }

        fn algorithm_type(&self) -> AlgorithmType {
            AlgorithmType::Sha256
        }
    }

    fn header() -> Arc<BlockHeader> {
        Arc::new(BlockHeader::new("aa".into(), "bb".into()))
    }

    fn worker(
        workers: u64,
        id: u64,
        algorithm: Arc<dyn Algorithm>,
        difficulty: usize,
        signal: Arc<RaceSignal>,
        hashes: HashCounter,
    ) -> Worker {
        let assignment = WorkPartitioner::new(workers).unwrap().assign(id).unwrap();
        Worker::new(
            assignment,
            algorithm,
            header(),
            Difficulty::from(difficulty),
            signal,
            hashes,
        )
    }

    #[test]
    fn zero_difficulty_wins_on_first_nonce() {
        let signal = Arc::new(RaceSignal::new());
        let hashes = HashCounter::default();
        let w = worker(3, 2, Arc::new(Sha256Algo), 0, signal.clone(), hashes.clone());

        assert!(matches!(w.run(), WorkerExit::Won));
        let winner = signal.winner().unwrap();
        assert_eq!(winner.worker_id, 2);
        assert_eq!(winner.nonce, 2);
        assert_eq!(hashes.total(), 1);
    }

    #[test]
    fn already_cancelled_worker_computes_nothing() {
        let signal = Arc::new(RaceSignal::new());
        signal.cancel();
        let hashes = HashCounter::default();
        let w = worker(1, 0, Arc::new(Sha256Algo), 0, signal.clone(), hashes.clone());

        assert!(matches!(w.run(), WorkerExit::Cancelled));
        assert_eq!(hashes.total(), 0);
        assert!(signal.winner().is_none());
    }

    #[test]
    fn stops_right_after_cancellation() {
        let signal = Arc::new(RaceSignal::new());
        let algo = Arc::new(CancellingAlgo {
            calls: AtomicU64::new(0),
            cancel_at: 37,
            signal: signal.clone(),
        });
        let hashes = HashCounter::default();
        let w = worker(2, 1, algo.clone(), 64, signal, hashes.clone());

        assert!(matches!(w.run(), WorkerExit::Cancelled));
        // The digest in flight when cancellation arrived is the last one.
        assert_eq!(algo.calls.load(Ordering::SeqCst), 37);
        assert_eq!(hashes.total(), 37);
    }

    #[test]
    fn late_publication_is_discarded() {
        let signal = Arc::new(RaceSignal::new());
        let earlier = Solution {
            worker_id: 0,
            nonce: 0,
            digest: [0; 32],
        };
        assert!(signal.publish(earlier));

        let w = worker(2, 1, Arc::new(Sha256Algo), 0, signal.clone(), HashCounter::default());
        match w.run() {
            WorkerExit::Discarded(solution) => assert_eq!(solution.nonce, 1),
            other => panic!("unexpected exit {:?}", other),
        }
        assert_eq!(signal.winner(), Some(&earlier));
    }

    #[test]
    fn digest_failure_ends_only_this_worker() {
        let signal = Arc::new(RaceSignal::new());
        let w = worker(2, 0, Arc::new(FailingAlgo), 1, signal.clone(), HashCounter::default());

        assert!(matches!(
            w.run(),
            WorkerExit::Failed(MinerError::AlgorithmError(_))
        ));
        assert!(!signal.is_cancelled());
        assert!(signal.winner().is_none());
    }
}
