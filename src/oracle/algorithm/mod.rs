// src/oracle/algorithm/mod.rs
//! Digest primitive implementations
//!
//! This module contains the hash functions the oracle can evaluate and their
//! common interface. Currently implements:
//! - CryptoNight cn/0 and cn/1 (through `cryptonight-rs`)
//! - Argon2id Chukwa, WRKZ and ChukwaV2
//! - KangarooTwelve
//! - The RandomX backend used by the context manager
//! - Ethash light verification and the KawPow final hash
//! - Equihash solution checking
//!
//! Memory-hard primitives with no linked implementation are installed by the
//! host through [`crate::oracle::AlgorithmRegistry::register`].

/// CryptoNight primitives backed by the `cryptonight-rs` crate
pub mod cryptonight;

/// Argon2id based TurtleCoin-family hashes
pub mod argon2;

/// KangarooTwelve
pub mod k12;

/// RandomX variants, tunings and the backend used by the context manager
pub mod randomx;

/// Ethash light cache and hashimoto
pub mod ethash;

/// KawPow final keccak-f800 hash
pub mod kawpow;

/// Equihash generalized birthday solution check
pub mod equihash;

use crate::types::Digest;
use crate::utils::error::OracleError;

/// Common interface for opaque digest primitives
///
/// A primitive maps a payload to a 32-byte digest. It must be a pure function
/// of its arguments; per-call scratch memory is the primitive's own business.
/// Closures with the same signature implement this trait, so a host can
/// register a foreign implementation without a wrapper type.
pub trait DigestPrimitive: Send + Sync {
    /// Compute the digest of a payload
    ///
    /// # Arguments
    /// * `payload` - The blob to hash (block header with nonce in place)
    /// * `height` - Block height, `0` for primitives that do not use it
    ///
    /// # Returns
    /// 32-byte digest or an error if the payload is malformed for this primitive
    fn digest(&self, payload: &[u8], height: u64) -> Result<Digest, OracleError>;
}

impl<F> DigestPrimitive for F
where
    F: Fn(&[u8], u64) -> Result<Digest, OracleError> + Send + Sync,
{
    fn digest(&self, payload: &[u8], height: u64) -> Result<Digest, OracleError> {
        self(payload, height)
    }
}
