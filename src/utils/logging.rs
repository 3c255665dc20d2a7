// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! This module handles logging setup for the oracle binary, including:
//! - Standard logging configuration
//! - Benchmark-specific logging
//! - Custom log formatting
//!
//! The library itself only talks to the `log` facade. Output goes to stderr so
//! verification results printed on stdout stay machine-readable.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem
///
/// # Arguments
/// * `level` - Default level, usually taken from the config file
///
/// # Configuration
/// - Logs to stderr
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging(level: LevelFilter) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter_level(level);
    }

    // A host may already have installed a logger; keep theirs.
    let _ = builder.try_init();
}

/// Configures benchmark-specific logging
///
/// Same as [`init_logging`] but defaults to Debug so per-thread hashrates show up.
pub fn init_bench_logging() {
    init_logging(LevelFilter::Debug);
}

/// Parses a textual level from the config file
///
/// Unknown strings fall back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

/// Creates a base logger builder with the `[ts level module:line] msg` format
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stderr);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }
}
