// src/oracle/algorithm/argon2.rs
//! Argon2id digests used by TurtleCoin-derived chains
//!
//! All three variants hash the blob with Argon2id v1.3, using the blob as the
//! password and its first 16 bytes as salt, and differ only in cost parameters.

use crate::oracle::algorithm::DigestPrimitive;
use crate::types::{AlgorithmId, Digest};
use crate::utils::error::OracleError;
use argon2::{Algorithm, Argon2, Params, Version};

/// Number of leading payload bytes used as salt
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters for one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Variant {
    /// Passes over memory
    pub t_cost: u32,
    /// Memory in KiB
    pub m_cost: u32,
    /// Lanes
    pub p_cost: u32,
}

/// TurtleCoin Chukwa
pub const CHUKWA: Argon2Variant = Argon2Variant { t_cost: 3, m_cost: 512, p_cost: 1 };
/// WrkzCoin
pub const WRKZ: Argon2Variant = Argon2Variant { t_cost: 4, m_cost: 256, p_cost: 1 };
/// TurtleCoin Chukwa v2
pub const CHUKWA_V2: Argon2Variant = Argon2Variant { t_cost: 4, m_cost: 1024, p_cost: 1 };

/// Argon2id digest primitive
#[derive(Debug, Clone, Copy)]
pub struct Argon2Algo {
    variant: Argon2Variant,
}

impl Argon2Algo {
    /// Creates the primitive for an Argon2-family algorithm id
    ///
    /// # Returns
    /// `None` for ids outside the Argon2 family
    pub fn for_algorithm(algorithm: AlgorithmId) -> Option<Self> {
        let variant = match algorithm {
            AlgorithmId::Argon2Chukwa => CHUKWA,
            AlgorithmId::Argon2Wrkz => WRKZ,
            AlgorithmId::Argon2ChukwaV2 => CHUKWA_V2,
            _ => return None,
        };
        Some(Self { variant })
    }
}

impl DigestPrimitive for Argon2Algo {
    fn digest(&self, payload: &[u8], _height: u64) -> Result<Digest, OracleError> {
        if payload.len() < SALT_LEN {
            return Err(OracleError::InvalidArgument(format!(
                "argon2 input must be at least {} bytes, got {}",
                SALT_LEN,
                payload.len()
            )));
        }

        let v = self.variant;
        let params = Params::new(v.m_cost, v.t_cost, v.p_cost, Some(32))
            .map_err(|e| OracleError::UnsupportedParameters(format!("argon2 params: {}", e)))?;
        let a2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; 32];
        a2.hash_password_into(payload, &payload[..SALT_LEN], &mut output)
            .map_err(|e| OracleError::AllocationFailure(format!("argon2: {}", e)))?;
        Ok(output)
    }
}
