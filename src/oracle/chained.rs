// src/oracle/chained.rs
//! Chained SHA3 difficulty validation
//!
//! Validates a miner submission for SHA3x-style chains: three sequential
//! SHA3-256 rounds over `nonce || mining_hash || pow_bytes`, with the
//! difficulty taken from the first four bytes of the final digest.

use crate::types::Digest;
use crate::utils::error::OracleError;
use serde::{Deserialize, Serialize};
use sha3::{Digest as _, Sha3_256};

/// One submission as received from a miner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedSubmission {
    /// Nonce as hex, optional `0x` prefix, at most 16 digits
    pub nonce_hex: String,
    /// Claimed final hash as lowercase hex
    pub expected_hex: String,
    /// Mining hash of the block template
    #[serde(with = "hex::serde")]
    pub mining_hash: Vec<u8>,
    /// Extra PoW bytes
    #[serde(with = "hex::serde")]
    pub pow_bytes: Vec<u8>,
    /// Share target difficulty
    pub target: u64,
}

/// Parses a hex nonce into a host integer
///
/// Accepts 1 to 16 hex digits with an optional `0x`/`0X` prefix.
pub fn parse_nonce(nonce_hex: &str) -> Result<u64, OracleError> {
    let digits = nonce_hex
        .strip_prefix("0x")
        .or_else(|| nonce_hex.strip_prefix("0X"))
        .unwrap_or(nonce_hex);

    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(OracleError::InvalidArgument(format!(
            "nonce must be 1-16 hex digits, got {:?}",
            nonce_hex
        )));
    }

    u64::from_str_radix(digits, 16)
        .map_err(|e| OracleError::InvalidArgument(format!("nonce {:?}: {}", nonce_hex, e)))
}

/// Final digest of the three-round chain
pub fn chained_hash(nonce: u64, mining_hash: &[u8], pow_bytes: &[u8]) -> Digest {
    let mut hasher = Sha3_256::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(mining_hash);
    hasher.update(pow_bytes);
    let h1 = hasher.finalize();

    let h2 = Sha3_256::digest(h1);
    Sha3_256::digest(h2).into()
}

/// Difficulty of a final digest: its first four bytes, big-endian
pub fn difficulty(hash: &Digest) -> u64 {
    u64::from(u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]))
}

/// Validates a submission
///
/// # Arguments
/// * `nonce_hex` - Nonce as hex
/// * `expected_hex` - Hash claimed by the miner, compared case-sensitively against lowercase hex
/// * `mining_hash` - Mining hash of the template
/// * `pow_bytes` - Extra PoW bytes
/// * `target` - Target difficulty
///
/// # Returns
/// `Ok(true)` iff the recomputed hash equals `expected_hex` and its difficulty
/// is at most `target`
pub fn validate(
    nonce_hex: &str,
    expected_hex: &str,
    mining_hash: &[u8],
    pow_bytes: &[u8],
    target: u64,
) -> Result<bool, OracleError> {
    let nonce = parse_nonce(nonce_hex)?;
    let hash = chained_hash(nonce, mining_hash, pow_bytes);

    let hash_ok = hex::encode(hash) == expected_hex;
    Ok(hash_ok && difficulty(&hash) <= target)
}

impl ChainedSubmission {
    /// Validates this submission
    pub fn validate(&self) -> Result<bool, OracleError> {
        validate(
            &self.nonce_hex,
            &self.expected_hex,
            &self.mining_hash,
            &self.pow_bytes,
            self.target,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_chain() -> Digest {
        let h1 = Sha3_256::digest([0u8; 8]);
        let h2 = Sha3_256::digest(h1);
        Sha3_256::digest(h2).into()
    }

    #[test]
    fn nonce_parsing() {
        assert_eq!(parse_nonce("0").unwrap(), 0);
        assert_eq!(parse_nonce("0x1f").unwrap(), 31);
        assert_eq!(parse_nonce("0XFF").unwrap(), 255);
        assert_eq!(parse_nonce("ffffffffffffffff").unwrap(), u64::MAX);

        for bad in ["", "0x", "xyz", "1ffffffffffffffff", "-1", "+1"] {
            assert!(matches!(parse_nonce(bad), Err(OracleError::InvalidArgument(_))), "{bad}");
        }
    }

    #[test]
    fn zero_nonce_chain_matches_manual_rounds() {
        assert_eq!(chained_hash(0, &[], &[]), zero_chain());
    }

    #[test]
    fn both_conditions_are_required() {
        let h3 = zero_chain();
        let expected = hex::encode(h3);
        let diff = difficulty(&h3);

        assert!(validate("0", &expected, &[], &[], diff).unwrap());
        assert!(validate("0", &expected, &[], &[], u64::MAX).unwrap());
        if diff > 0 {
            assert!(!validate("0", &expected, &[], &[], diff - 1).unwrap());
        }
        assert!(!validate("1", &expected, &[], &[], u64::MAX).unwrap());
    }

    #[test]
    fn expected_hash_comparison_is_case_sensitive() {
        let upper = hex::encode_upper(zero_chain());
        assert!(!validate("0", &upper, &[], &[], u64::MAX).unwrap());
    }

    #[test]
    fn nonce_is_little_endian() {
        let mut hasher = Sha3_256::new();
        hasher.update([0x01, 0, 0, 0, 0, 0, 0, 0]);
        hasher.update(b"mh");
        let h1 = hasher.finalize();
        let expected: Digest = Sha3_256::digest(Sha3_256::digest(h1)).into();
        assert_eq!(chained_hash(1, b"mh", &[]), expected);
    }
}
