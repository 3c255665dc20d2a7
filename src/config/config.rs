// src/config/config.rs
use crate::oracle::epoch::ETCHASH_ACTIVATION_HEIGHT;
use crate::utils::error::OracleError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the oracle
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default log level ("error", "warn", "info", "debug", "trace")
    /// (default: "info", overridden by `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// RandomX backend settings
    #[serde(default)]
    pub randomx: RandomXConfig,

    /// Etchash schedule settings
    #[serde(default)]
    pub etchash: EtchashConfig,
}

/// RandomX backend settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomXConfig {
    /// Build the full dataset instead of the light cache
    /// (default: false)
    #[serde(default)]
    pub fast_mode: bool,
}

/// Etchash schedule settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtchashConfig {
    /// First block height using 60 000-block epochs
    /// (default: 11 700 000, Ethereum Classic mainnet)
    #[serde(default = "default_activation_height")]
    pub activation_height: u64,
}

impl Default for EtchashConfig {
    fn default() -> Self {
        EtchashConfig {
            activation_height: default_activation_height(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_activation_height() -> u64 {
    ETCHASH_ACTIVATION_HEIGHT
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            randomx: RandomXConfig::default(),
            etchash: EtchashConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(OracleError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, OracleError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            OracleError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn parse(config_str: &str) -> Result<Self, OracleError> {
        Ok(toml::from_str(config_str)?)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# PoW Oracle Configuration\n\n");
        template.push_str("# Log level: error, warn, info, debug, trace (RUST_LOG wins if set)\n");
        template.push_str("log_level = \"info\"\n\n");

        template.push_str("[randomx]\n");
        template.push_str("# Full 2 GiB dataset instead of the 256 MiB light cache\n");
        template.push_str("fast_mode = false\n\n");

        template.push_str("[etchash]\n");
        template.push_str("# First height with 60000-block epochs (ECIP-1099)\n");
        template.push_str(&format!(
            "activation_height = {}\n",
            ETCHASH_ACTIVATION_HEIGHT
        ));

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.randomx.fast_mode);
        assert_eq!(config.etchash.activation_height, 11_700_000);
    }

    #[test]
    fn template_round_trips() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse("[etchash]\nactivation_height = 100\n").unwrap();
        assert_eq!(config.etchash.activation_height, 100);
        assert_eq!(config.log_level, "info");
        assert!(!config.randomx.fast_mode);
    }

    #[test]
    fn bad_types_are_config_errors() {
        let err = Config::parse("[randomx]\nfast_mode = \"yes\"\n").unwrap_err();
        assert!(matches!(err, OracleError::ConfigError(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load("/nonexistent/pow_oracle.toml").unwrap_err();
        assert!(matches!(err, OracleError::ConfigError(_)));
    }
}
