// src/miner/coordinator.rs
//! Race coordinator
//!
//! Launches one thread per worker, waits for the first accepted solution,
//! broadcasts cancellation and re-verifies the winner before handing it back.
//!
//! ```text
//! Idle -> Running -> Succeeded
//!                 \-> Cancelled
//! ```
//!
//! The winner is whichever worker publishes first, which is not necessarily
//! the smallest valid nonce.

use crate::block::BlockHeader;
use crate::miner::algorithm::Algorithm;
use crate::miner::partition::WorkPartitioner;
use crate::miner::signal::{RaceSignal, Solution};
use crate::miner::worker::{Worker, WorkerExit};
use crate::stats::StatsReporter;
use crate::types::Difficulty;
use crate::utils::error::MinerError;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Lifecycle of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceState {
    /// Created, not started
    Idle,
    /// Workers are searching
    Running,
    /// A verified solution was found
    Succeeded,
    /// Ended without a solution (deadline, external cancel, or every worker failed)
    Cancelled,
}

/// Parameters of a single race
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Number of workers (must be at least 1)
    pub worker_count: usize,
    /// Required leading zero characters
    pub difficulty: Difficulty,
    /// Optional wall-clock cap on the race
    pub deadline: Option<Duration>,
    /// Interval for progress log lines; `None` disables them
    pub report_interval: Option<Duration>,
}

impl RaceConfig {
    /// Config with no deadline and no progress reporting
    pub fn new(worker_count: usize, difficulty: Difficulty) -> Self {
        RaceConfig {
            worker_count,
            difficulty,
            deadline: None,
            report_interval: None,
        }
    }

    /// Sets a deadline after which the race is cancelled
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Enables periodic progress reporting
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = Some(interval);
        self
    }
}

/// Outcome of a race; produced once and never modified
#[derive(Debug, Clone)]
pub struct RaceResult {
    /// `Succeeded` or `Cancelled`
    pub state: RaceState,
    /// The verified winner, present only when `state` is `Succeeded`
    pub solution: Option<Solution>,
    /// Time from race start until the winner was confirmed (or the race ended)
    pub elapsed: Duration,
    /// Digests computed across all workers
    pub hashes: u64,
    /// Number of workers that took part
    pub worker_count: usize,
}

impl RaceResult {
    /// Whether a valid nonce was found
    pub fn found(&self) -> bool {
        self.solution.is_some()
    }
}

/// Message each worker thread sends when it stops
#[derive(Debug)]
pub struct WorkerEvent {
    /// Worker that stopped
    pub worker_id: u64,
    /// Why it stopped
    pub exit: WorkerExit,
}

/// Handle for cancelling a race from outside, e.g. on Ctrl-C
#[derive(Debug, Clone)]
pub struct Canceller(Arc<RaceSignal>);

impl Canceller {
    /// Stops every worker; the race ends `Cancelled` unless a winner was already published
    pub fn cancel(&self) {
        if self.0.cancel() {
            log::warn!("Race cancellation requested");
        }
    }
}

/// Runs one race between `worker_count` workers
pub struct RaceCoordinator {
    config: RaceConfig,
    algorithm: Arc<dyn Algorithm>,
    signal: Arc<RaceSignal>,
    state: RaceState,
}

impl RaceCoordinator {
    /// Creates an idle coordinator
    pub fn new(config: RaceConfig, algorithm: Arc<dyn Algorithm>) -> Self {
        RaceCoordinator {
            config,
            algorithm,
            signal: Arc::new(RaceSignal::new()),
            state: RaceState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Handle that can cancel this race from another thread
    pub fn canceller(&self) -> Canceller {
        Canceller(Arc::clone(&self.signal))
    }

    /// Runs the race to completion
    ///
    /// Blocks until a solution is confirmed, the deadline passes, or every
    /// worker has stopped.
    ///
    /// # Errors
    /// * `InvalidConfiguration` - zero workers, or the race was already run;
    ///   returned before any worker starts
    /// * `TaskError` - a worker thread could not be spawned
    /// * `VerificationFailed` - the published solution does not re-check
    pub fn run(&mut self, header: Arc<BlockHeader>) -> Result<RaceResult, MinerError> {
        if self.state != RaceState::Idle {
            return Err(MinerError::InvalidConfiguration(
                "a race coordinator can only run once".into(),
            ));
        }
        let partitioner = WorkPartitioner::new(self.config.worker_count as u64)?;

        let reporter = StatsReporter::new(
            self.config
                .report_interval
                .unwrap_or(Duration::from_secs(60)),
        );
        let reporting = self
            .config
            .report_interval
            .map(|_| reporter.start_reporting());

        log::info!(
            "Starting race: {} workers, difficulty {}, algorithm {}",
            self.config.worker_count,
            self.config.difficulty,
            self.algorithm.algorithm_type()
        );

        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let start = Instant::now();
        self.state = RaceState::Running;

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.config.worker_count);
        for assignment in partitioner.assignments() {
            let worker = Worker::new(
                assignment,
                Arc::clone(&self.algorithm),
                Arc::clone(&header),
                self.config.difficulty,
                Arc::clone(&self.signal),
                reporter.hash_counter(),
            );
            let tx = event_tx.clone();
            let worker_id = assignment.worker_id();

            let spawned = std::thread::Builder::new()
                .name(format!("race-worker-{}", worker_id))
                .spawn(move || {
                    let exit = worker.run();
                    if let Err(e) = tx.send(WorkerEvent { worker_id, exit }) {
                        let e: MinerError = e.into();
                        log::debug!("Worker {}: {}", worker_id, e);
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    self.signal.cancel();
                    join_workers(handles);
                    if let Some(reporting) = reporting {
                        reporting.stop();
                    }
                    self.state = RaceState::Cancelled;
                    return Err(MinerError::TaskError(format!(
                        "failed to spawn worker {}: {}",
                        worker_id, e
                    )));
                }
            }
        }
        drop(event_tx);

        let outcome = self.await_winner(&event_rx, start);
        self.signal.cancel();
        join_workers(handles);

        // A worker mid-digest at the deadline may still have published.
        // Once every worker is joined the slot is final.
        let outcome = outcome.or_else(|| self.signal.winner().copied());

        let confirmed = outcome
            .map(|solution| {
                self.verify(&header, &solution)
                    .map(|()| (solution, start.elapsed()))
            })
            .transpose();
        let ended = start.elapsed();

        drain_events(&event_rx);
        if let Some(reporting) = reporting {
            reporting.stop();
        }
        let hashes = reporter.get_stats().hashes_total;

        let result = match confirmed {
            Ok(Some((solution, elapsed))) => {
                self.state = RaceState::Succeeded;
                RaceResult {
                    state: self.state,
                    solution: Some(solution),
                    elapsed,
                    hashes,
                    worker_count: self.config.worker_count,
                }
            }
            Ok(None) => {
                self.state = RaceState::Cancelled;
                log::warn!("Race ended without a solution after {:?}", ended);
                RaceResult {
                    state: self.state,
                    solution: None,
                    elapsed: ended,
                    hashes,
                    worker_count: self.config.worker_count,
                }
            }
            Err(e) => {
                self.state = RaceState::Cancelled;
                return Err(e);
            }
        };

        Ok(result)
    }

    /// Waits for the first accepted publication
    ///
    /// Returns `None` when the deadline passes or every worker has stopped
    /// without winning. A late publication is picked up from the slot by
    /// the caller after the workers are joined.
    fn await_winner(&self, events: &Receiver<WorkerEvent>, start: Instant) -> Option<Solution> {
        let deadline = self.config.deadline.map(|d| start + d);

        loop {
            let event = match deadline {
                Some(at) => match events.recv_deadline(at) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        log::warn!("Race deadline of {:?} reached", at - start);
                        return None;
                    }
                    Err(RecvTimeoutError::Disconnected) => return None,
                },
                None => events.recv().ok()?,
            };

            match event.exit {
                WorkerExit::Won => {
                    // Stop everyone before doing anything else.
                    self.signal.cancel();
                    return self.signal.winner().copied();
                }
                WorkerExit::Discarded(solution) => log::debug!(
                    "Worker {} lost the race with nonce {}",
                    event.worker_id,
                    solution.nonce
                ),
                WorkerExit::Cancelled => {
                    log::debug!("Worker {} cancelled", event.worker_id)
                }
                WorkerExit::Exhausted => {
                    log::warn!("Worker {} exhausted its nonce space", event.worker_id)
                }
                WorkerExit::Failed(e) => {
                    log::error!("Worker {} failed: {}", event.worker_id, e)
                }
            }
        }
    }

    /// Recomputes the winner's digest independently of the worker
    fn verify(&self, header: &BlockHeader, solution: &Solution) -> Result<(), MinerError> {
        let digest = self
            .algorithm
            .verify(header.bytes(), solution.nonce, self.config.difficulty)?
            .ok_or_else(|| {
                MinerError::VerificationFailed(format!(
                    "nonce {} from worker {} does not have {} leading zeros",
                    solution.nonce, solution.worker_id, self.config.difficulty
                ))
            })?;

        if digest != solution.digest {
            return Err(MinerError::VerificationFailed(format!(
                "nonce {} from worker {}: published digest {} but recomputed {}",
                solution.nonce,
                solution.worker_id,
                solution.digest_hex(),
                hex::encode(digest)
            )));
        }

        log::debug!("Verified nonce {} from worker {}", solution.nonce, solution.worker_id);
        Ok(())
    }
}

fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            log::error!("A worker thread panicked");
        }
    }
}

/// Logs the exits of workers that stopped after the race was decided
fn drain_events(events: &Receiver<WorkerEvent>) {
    for event in events.try_iter() {
        if let WorkerExit::Failed(e) = event.exit {
            log::error!("Worker {} failed: {}", event.worker_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::{HashOutput, Sha256Algo};
    use crate::types::AlgorithmType;

    fn header() -> Arc<BlockHeader> {
        Arc::new(BlockHeader::new("A".repeat(32), "A".repeat(32)))
    }

    /// Reports a different digest on every other call for the same input
    struct FlakyAlgo {
        calls: std::sync::atomic::AtomicU64,
    }

    impl Algorithm for FlakyAlgo {
        fn digest(&self, _data: &[u8]) -> Result<HashOutput, MinerError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok([call as u8 % 2; 32])
        }

        fn algorithm_type(&self) -> AlgorithmType {
            AlgorithmType::Sha256
        }
    }

    /// Meets any difficulty up to 62 but ends in a different byte on every call
    struct DriftingAlgo {
        calls: std::sync::atomic::AtomicU64,
    }

    impl Algorithm for DriftingAlgo {
        fn digest(&self, _data: &[u8]) -> Result<HashOutput, MinerError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let mut digest = [0; 32];
            digest[31] = call as u8 + 1;
            Ok(digest)
        }

        fn algorithm_type(&self) -> AlgorithmType {
            AlgorithmType::Sha256
        }
    }

    /// Each digest outlasts the race deadline
    struct SlowAlgo;

    impl Algorithm for SlowAlgo {
        fn digest(&self, _data: &[u8]) -> Result<HashOutput, MinerError> {
            std::thread::sleep(Duration::from_millis(150));
            Ok([0; 32])
        }

        fn algorithm_type(&self) -> AlgorithmType {
            AlgorithmType::Sha256
        }
    }

    #[test]
    fn publication_during_deadline_is_kept() {
        let mut race = RaceCoordinator::new(
            RaceConfig::new(1, Difficulty::from(1)).with_deadline(Duration::from_millis(50)),
            Arc::new(SlowAlgo),
        );
        let result = race.run(header()).unwrap();

        assert_eq!(result.state, RaceState::Succeeded);
        assert_eq!(race.state(), RaceState::Succeeded);
        let solution = result.solution.unwrap();
        assert_eq!(solution.worker_id, 0);
        assert_eq!(solution.nonce, 0);
        assert!(result.elapsed >= Duration::from_millis(150));
    }

    #[test]
    fn starts_idle_and_ends_succeeded() {
        let mut race = RaceCoordinator::new(
            RaceConfig::new(2, Difficulty::from(1)),
            Arc::new(Sha256Algo),
        );
        assert_eq!(race.state(), RaceState::Idle);

        let result = race.run(header()).unwrap();
        assert_eq!(race.state(), RaceState::Succeeded);
        assert_eq!(result.state, RaceState::Succeeded);
        assert!(result.found());
        assert!(result.hashes >= 1);
    }

    #[test]
    fn zero_workers_rejected_before_starting() {
        let mut race = RaceCoordinator::new(
            RaceConfig::new(0, Difficulty::from(1)),
            Arc::new(Sha256Algo),
        );
        assert!(matches!(
            race.run(header()),
            Err(MinerError::InvalidConfiguration(_))
        ));
        assert_eq!(race.state(), RaceState::Idle);
    }

    #[test]
    fn second_run_is_rejected() {
        let mut race = RaceCoordinator::new(
            RaceConfig::new(1, Difficulty::from(0)),
            Arc::new(Sha256Algo),
        );
        race.run(header()).unwrap();
        assert!(matches!(
            race.run(header()),
            Err(MinerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn corrupted_publication_fails_verification() {
        // The worker sees an all-zero digest, the coordinator's recomputation does not.
        let mut race = RaceCoordinator::new(
            RaceConfig::new(1, Difficulty::from(2)),
            Arc::new(FlakyAlgo {
                calls: Default::default(),
            }),
        );
        assert!(matches!(
            race.run(header()),
            Err(MinerError::VerificationFailed(_))
        ));
        assert_eq!(race.state(), RaceState::Cancelled);
    }

    #[test]
    fn recomputed_digest_must_match_publication() {
        // Both digests meet the difficulty, but they are not the same digest.
        let mut race = RaceCoordinator::new(
            RaceConfig::new(1, Difficulty::from(2)),
            Arc::new(DriftingAlgo {
                calls: Default::default(),
            }),
        );
        match race.run(header()) {
            Err(MinerError::VerificationFailed(msg)) => assert!(msg.contains("recomputed")),
            other => panic!("expected a digest mismatch, got {:?}", other.map(|r| r.state)),
        }
    }

    #[test]
    fn external_cancel_ends_race_without_winner() {
        let mut race = RaceCoordinator::new(
            RaceConfig::new(2, Difficulty::from(65)),
            Arc::new(Sha256Algo),
        );
        let canceller = race.canceller();
        let trigger = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            canceller.cancel();
        });

        let result = race.run(header()).unwrap();
        trigger.join().unwrap();

        assert_eq!(result.state, RaceState::Cancelled);
        assert!(!result.found());
    }
}
