// src/stats/reporter.rs
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Point-in-time view of the oracle counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    /// Calls that reached a verifier
    pub verifications: u64,
    /// Boolean or cycle verdicts that came out valid
    pub valid: u64,
    /// Boolean or cycle verdicts that came out invalid
    pub invalid: u64,
    /// Calls that returned an error
    pub errors: u64,
    /// Hashes counted through a reporter channel
    pub hashes_total: u64,
    /// RandomX cache builds across all slots
    pub randomx_cache_builds: u64,
    /// RandomX VMs created
    pub randomx_vm_creations: u64,
    /// Ethash light cache builds
    pub ethash_rebuilds: u64,
    /// Etchash light cache builds
    pub etchash_rebuilds: u64,
    /// Seconds since the counters were created
    pub uptime_secs: u64,
}

/// Host memory and CPU load
#[derive(Debug, Clone, Serialize)]
pub struct HardwareStats {
    /// Current CPU usage percentage (0-100)
    pub cpu_usage: f32,
    /// Memory in use on the host (in bytes)
    pub memory_used: u64,
}

/// Thread-safe verification counters
#[derive(Debug)]
pub struct OracleStats {
    verifications: AtomicU64,
    valid: AtomicU64,
    invalid: AtomicU64,
    errors: AtomicU64,
    hashes: AtomicU64,
    start_time: Instant,
}

impl Default for OracleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleStats {
    /// Creates zeroed counters
    pub fn new() -> Self {
        OracleStats {
            verifications: AtomicU64::new(0),
            valid: AtomicU64::new(0),
            invalid: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            hashes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a call that produced a digest
    pub fn record_digest<T, E>(&self, outcome: &Result<T, E>) {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        if outcome.is_err() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a call that produced a validity verdict
    pub fn record_verdict<E>(&self, outcome: &Result<bool, E>) {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Ok(true) => &self.valid,
            Ok(false) => &self.invalid,
            Err(_) => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the hash counter
    pub fn add_hashes(&self, count: u64) {
        self.hashes.fetch_add(count, Ordering::Relaxed);
    }

    /// Average hashes per second since creation
    pub fn hashrate(&self) -> f64 {
        let secs = self.start_time.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.hashes.load(Ordering::Relaxed) as f64 / secs
        } else {
            0.0
        }
    }

    /// Snapshot of the counters owned here
    ///
    /// Cache counters live in the managers and are filled in by the oracle.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            verifications: self.verifications.load(Ordering::Relaxed),
            valid: self.valid.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            hashes_total: self.hashes.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
            ..StatsSnapshot::default()
        }
    }
}

/// Periodically logs oracle counters and host load
pub struct StatsReporter {
    /// Shared counters
    stats: Arc<OracleStats>,
    /// System information collector
    system: System,
    /// Interval at which stats are reported
    report_interval: Duration,
}

impl StatsReporter {
    /// Creates a reporter over fresh counters
    ///
    /// # Arguments
    /// * `report_interval` - How often to log statistics
    pub fn new(report_interval: Duration) -> Self {
        Self::with_stats(Arc::new(OracleStats::new()), report_interval)
    }

    /// Creates a reporter over existing counters
    pub fn with_stats(stats: Arc<OracleStats>, report_interval: Duration) -> Self {
        StatsReporter {
            stats,
            system: System::new_all(),
            report_interval,
        }
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<OracleStats> {
        Arc::clone(&self.stats)
    }

    /// Creates and returns a channel sender for hash counts
    ///
    /// A background thread adds every received count to the hash counter.
    pub fn hash_sender(&self) -> Sender<u64> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.start_hashrate_listener(rx);
        tx
    }

    /// Gets the current hardware statistics
    ///
    /// This refreshes system information before returning the stats.
    pub fn get_hardware_stats(&mut self) -> HardwareStats {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();

        let cpus = self.system.cpus();
        let cpu_usage = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
        };

        HardwareStats {
            cpu_usage,
            memory_used: self.system.used_memory(),
        }
    }

    /// Starts the periodic reporting of statistics
    ///
    /// This spawns a background thread that logs stats at the configured interval.
    pub fn start_reporting(&self) {
        let stats = Arc::clone(&self.stats);
        let interval = self.report_interval;

        std::thread::spawn(move || {
            let mut reporter = StatsReporter::with_stats(stats, interval);

            loop {
                std::thread::sleep(interval);
                let snapshot = reporter.stats.snapshot();
                let hw = reporter.get_hardware_stats();

                log::info!(
                    "Hashrate: {:.2} H/s | Verified: {} (valid {}, invalid {}, errors {}) | CPU: {:.1}% | Mem: {} MiB",
                    reporter.stats.hashrate(),
                    snapshot.verifications,
                    snapshot.valid,
                    snapshot.invalid,
                    snapshot.errors,
                    hw.cpu_usage,
                    hw.memory_used / (1024 * 1024)
                );
            }
        });
    }

    /// Starts a listener for hash counts on a background thread
    fn start_hashrate_listener(&self, receiver: Receiver<u64>) {
        let stats = Arc::clone(&self.stats);

        std::thread::spawn(move || {
            for count in receiver {
                stats.add_hashes(count);
            }
        });
    }
}
