// src/oracle/algorithm/cryptonight.rs
//! CryptoNight algorithm implementation
//!
//! Provides the CryptoNight variants that the `cryptonight-rs` crate links in:
//! - cn/0 (CryptoNote v0)
//! - cn/1 (Monero v7, variant 1)
//!
//! Every other CryptoNight-family variant is opaque to this crate and has to be
//! registered by the host.

use crate::oracle::algorithm::DigestPrimitive;
use crate::types::{AlgorithmId, Digest};
use crate::utils::error::{OracleError, fixed_bytes};
use cryptonight::cryptonight;

/// cn/1 tweaks the scratchpad with bytes 35..43 of the blob
pub const CN1_MIN_PAYLOAD: usize = 43;

/// CryptoNight primitive for one linked variant
///
/// The struct is lightweight as it only needs to track the variant;
/// all hashing is handled by the underlying cryptonight library.
#[derive(Debug, Clone, Copy)]
pub struct CryptoNightAlgo {
    /// Variant number understood by `cryptonight-rs`
    variant: i32,
}

impl CryptoNightAlgo {
    /// Creates a primitive for a linked CryptoNight variant
    ///
    /// # Returns
    /// `None` for algorithms `cryptonight-rs` does not implement
    pub fn for_algorithm(algorithm: AlgorithmId) -> Option<Self> {
        match algorithm {
            AlgorithmId::Cn0 => Some(Self { variant: 0 }),
            AlgorithmId::Cn1 => Some(Self { variant: 1 }),
            _ => None,
        }
    }

    /// The linked algorithm id
    pub fn algorithm(&self) -> AlgorithmId {
        if self.variant == 0 {
            AlgorithmId::Cn0
        } else {
            AlgorithmId::Cn1
        }
    }
}

impl DigestPrimitive for CryptoNightAlgo {
    /// Computes a CryptoNight hash of the blob
    ///
    /// # Returns
    /// - `Ok([u8; 32])` - The 32-byte hash result
    /// - `Err(OracleError::InvalidArgument)` - cn/1 blob shorter than 43 bytes
    fn digest(&self, payload: &[u8], _height: u64) -> Result<Digest, OracleError> {
        if self.variant == 1 && payload.len() < CN1_MIN_PAYLOAD {
            return Err(OracleError::InvalidArgument(format!(
                "cn/1 input must be at least {} bytes, got {}",
                CN1_MIN_PAYLOAD,
                payload.len()
            )));
        }

        let hash = cryptonight(payload, payload.len(), self.variant);
        fixed_bytes(&hash, "cryptonight output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn cn0_matches_reference_vector() {
        // "This is a test" from the CryptoNote reference test set
        let cn = CryptoNightAlgo::for_algorithm(AlgorithmId::Cn0).unwrap();
        let out = cn.digest(b"This is a test", 0).unwrap();
        assert_eq!(
            out,
            hex!("a084f01d1437a09c6985401b60d43554ae105802c5f5d8a9b3253649c0be6605")
        );
    }

    #[test]
    fn cn1_rejects_short_blob() {
        let cn = CryptoNightAlgo::for_algorithm(AlgorithmId::Cn1).unwrap();
        let err = cn.digest(&[0u8; 42], 0).unwrap_err();
        assert!(matches!(err, OracleError::InvalidArgument(_)));
    }

    #[test]
    fn only_linked_variants_are_available() {
        assert!(CryptoNightAlgo::for_algorithm(AlgorithmId::Cn1).is_some());
        assert!(CryptoNightAlgo::for_algorithm(AlgorithmId::CnR).is_none());
        assert!(CryptoNightAlgo::for_algorithm(AlgorithmId::CnLite1).is_none());
    }

    #[test]
    fn digest_is_deterministic() {
        let cn = CryptoNightAlgo::for_algorithm(AlgorithmId::Cn1).unwrap();
        let blob = [0x5au8; 76];
        assert_eq!(cn.digest(&blob, 0).unwrap(), cn.digest(&blob, 0).unwrap());
    }
}
