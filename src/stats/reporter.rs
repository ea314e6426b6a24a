// src/stats/reporter.rs
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use sysinfo::System;

/// Snapshot of race throughput
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total number of digests computed
    pub hashes_total: u64,
    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
    /// Average hashrate since start (hashes per second)
    pub avg_hashrate: f64,
}

/// Statistics related to hardware performance
#[derive(Debug, Clone)]
pub struct HardwareStats {
    /// Current CPU usage percentage (0-100)
    pub cpu_usage: f32,
    /// Memory currently in use on the host (in bytes)
    pub memory_used: u64,
}

/// Shared digest counter handed to every worker
///
/// Workers add in batches; the total is only used for reporting, so relaxed
/// ordering is sufficient.
#[derive(Debug, Clone, Default)]
pub struct HashCounter(Arc<AtomicU64>);

impl HashCounter {
    /// Adds `count` computed digests
    pub fn add(&self, count: u64) {
        if count > 0 {
            self.0.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Digests counted so far
    pub fn total(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Collects race statistics and optionally logs them periodically
pub struct StatsReporter {
    hashes: HashCounter,
    start_time: Instant,
    system: System,
    report_interval: Duration,
}

/// Running periodic reporter; call [`stop`](Self::stop) when the race ends
pub struct ReportingHandle {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ReportingHandle {
    /// Stops the background reporter and waits for it to exit
    pub fn stop(self) {
        drop(self.stop_tx);
        if self.handle.join().is_err() {
            log::warn!("Stats reporter thread panicked");
        }
    }
}

impl StatsReporter {
    /// Creates a new StatsReporter with the specified reporting interval
    pub fn new(report_interval: Duration) -> Self {
        StatsReporter {
            hashes: HashCounter::default(),
            start_time: Instant::now(),
            system: System::new(),
            report_interval,
        }
    }

    /// Counter that workers report computed digests to
    pub fn hash_counter(&self) -> HashCounter {
        self.hashes.clone()
    }

    /// Gets the current mining statistics
    pub fn get_stats(&self) -> MiningStats {
        compute_stats(&self.hashes, self.start_time)
    }

    /// Gets the current hardware statistics
    ///
    /// This refreshes system information before returning the stats.
    pub fn get_hardware_stats(&mut self) -> HardwareStats {
        sample_hardware(&mut self.system)
    }

    /// Starts logging statistics every `report_interval` on a background thread
    pub fn start_reporting(&self) -> ReportingHandle {
        let (stop_tx, stop_rx): (Sender<()>, Receiver<()>) = crossbeam_channel::bounded(0);
        let hashes = self.hashes.clone();
        let start_time = self.start_time;
        let interval = self.report_interval;

        let handle = std::thread::spawn(move || {
            let mut system = System::new();

            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let mining_stats = compute_stats(&hashes, start_time);
                let hw_stats = sample_hardware(&mut system);

                log::info!(
                    "Hashrate: {:.2} H/s | Hashes: {} | CPU: {:.1}% | Mem: {} MiB",
                    mining_stats.avg_hashrate,
                    mining_stats.hashes_total,
                    hw_stats.cpu_usage,
                    hw_stats.memory_used / (1024 * 1024)
                );
            }
        });

        ReportingHandle { stop_tx, handle }
    }
}

fn compute_stats(hashes: &HashCounter, start_time: Instant) -> MiningStats {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let hashes_total = hashes.total();

    MiningStats {
        hashes_total,
        elapsed_secs,
        avg_hashrate: hashrate(hashes_total, elapsed_secs),
    }
}

fn sample_hardware(system: &mut System) -> HardwareStats {
    system.refresh_cpu_all();
    system.refresh_memory();

    let cpus = system.cpus();
    let cpu_usage = if cpus.is_empty() {
        0.0
    } else {
        cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
    };

    HardwareStats {
        cpu_usage,
        memory_used: system.used_memory(),
    }
}

/// Hashes per second, `0.0` for an empty interval
pub fn hashrate(hashes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        hashes as f64 / elapsed_secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_shared_between_clones() {
        let reporter = StatsReporter::new(Duration::from_secs(60));
        let a = reporter.hash_counter();
        let b = reporter.hash_counter();
        a.add(10);
        b.add(5);
        b.add(0);
        assert_eq!(reporter.get_stats().hashes_total, 15);
    }

    #[test]
    fn hashrate_handles_zero_elapsed() {
        assert_eq!(hashrate(100, 0.0), 0.0);
        assert_eq!(hashrate(100, 2.0), 50.0);
    }

    #[test]
    fn reporting_stops_promptly() {
        let reporter = StatsReporter::new(Duration::from_secs(3600));
        let started = Instant::now();
        reporter.start_reporting().stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
