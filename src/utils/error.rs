// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the verification oracle
///
/// Every public entry point returns `Result<_, OracleError>`. Argument problems
/// are reported before any hashing starts, so an `Err` never means a partially
/// executed verification.
#[derive(Error, Debug)]
pub enum OracleError {
    /// Wrong argument shape: bad length, missing height, malformed hex
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A parameter set outside the supported table (Equihash (N,K), an
    /// algorithm with no registered primitive, a RandomX tuning the linked
    /// library cannot apply)
    #[error("Unsupported parameters: {0}")]
    UnsupportedParameters(String),

    /// Native cache, VM or scratchpad allocation failed
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// A previous verification panicked while holding a manager lock
    #[error("Manager poisoned: {0}")]
    ManagerPoisoned(&'static str),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Converts hex decoding errors into OracleError
///
/// Hex only reaches the oracle through caller-supplied strings (CLI arguments,
/// chained-difficulty submissions), so a decoding failure is always an
/// argument problem.
impl From<hex::FromHexError> for OracleError {
    fn from(e: hex::FromHexError) -> Self {
        OracleError::InvalidArgument(format!("Hex conversion failed: {}", e))
    }
}

impl From<toml::de::Error> for OracleError {
    fn from(e: toml::de::Error) -> Self {
        OracleError::ConfigError(format!("Invalid config format: {}", e))
    }
}

/// Copies a caller buffer into a fixed-size array
///
/// # Arguments
/// * `bytes` - The caller-supplied buffer
/// * `what` - Argument name used in the error message
///
/// # Returns
/// - `Ok([u8; N])` when the buffer is exactly `N` bytes long
/// - `Err(OracleError::InvalidArgument)` otherwise
pub fn fixed_bytes<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N], OracleError> {
    <[u8; N]>::try_from(bytes).map_err(|_| {
        OracleError::InvalidArgument(format!(
            "{} should be {} bytes long, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}
