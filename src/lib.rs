//! PoW Oracle - multi-family proof-of-work verification in Rust
//!
//! This crate recomputes and checks proof-of-work for mining pools:
//! - Variant-selected digest families (CryptoNight, Argon2, AstroBWT)
//! - RandomX with seed-keyed cache reuse across seven forks
//! - Ethash/Etchash light verification and the KawPow final hash
//! - Cuckoo-cycle proofs, Equihash solutions and chained SHA3 difficulty
//!
//! Results are digests or validity verdicts; comparing a digest against a
//! network target is left to the caller.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Verifiers, cache managers and the dispatcher
pub mod oracle;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use oracle::{
    AlgorithmRegistry, CycleStatus, CycleVariant, DigestPrimitive, EpochHash, Oracle, Verdict,
    VerifyRequest,
};
pub use stats::{HardwareStats, OracleStats, StatsReporter, StatsSnapshot};
pub use types::{AlgorithmId, Digest, HashFamily};
pub use utils::{OracleError, init_logging};
