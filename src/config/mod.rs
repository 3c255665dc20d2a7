// src/config/mod.rs
//! Configuration management for the oracle
//!
//! This module handles loading the TOML configuration file and generating a
//! commented template. Settings cover the default log level, RandomX fast
//! mode and the Etchash activation height.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and its sections.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, EtchashConfig, RandomXConfig};

use crate::utils::error::OracleError;
use std::path::PathBuf;

/// Loads oracle configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(OracleError)` - If the file couldn't be read or parsed
pub fn load(path: impl Into<PathBuf>) -> Result<Config, OracleError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
