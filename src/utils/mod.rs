// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the oracle,
//! including error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`OracleError`] enum which defines all possible error conditions
/// for the oracle, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
pub mod logging;

// Re-export for easier access
pub use error::{OracleError, fixed_bytes};
pub use logging::init_logging;
