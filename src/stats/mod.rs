// src/stats/mod.rs
//! Statistics collection and reporting module
//!
//! This module tracks what the oracle has been asked to do:
//! - Verification counts, split into valid, invalid and failed calls
//! - Hash counts and hashrate for benchmarks
//! - Host CPU and memory load
//!
//! [`OracleStats`] is shared by the oracle and any reporter. [`StatsReporter`]
//! periodically logs a summary.

/// Counters, snapshots and the periodic reporter
pub mod reporter;

// Re-export main components
pub use reporter::{HardwareStats, OracleStats, StatsReporter, StatsSnapshot};
