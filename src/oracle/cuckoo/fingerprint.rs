// src/oracle/cuckoo/fingerprint.rs
use super::{CycleVariant, EDGEBITS, check_arity};
use crate::types::Digest;
use crate::utils::error::OracleError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};

/// Packs each endpoint's low `EDGEBITS` bits LSB-first into a minimal buffer
pub fn pack_proof(proof: &[u32]) -> Vec<u8> {
    let mut buf = vec![0u8; (proof.len() * EDGEBITS as usize).div_ceil(8)];
    let mut bit = 0usize;
    for &node in proof {
        for j in 0..EDGEBITS {
            if (node >> j) & 1 == 1 {
                buf[bit / 8] |= 1 << (bit % 8);
            }
            bit += 1;
        }
    }
    buf
}

/// Compact identity of a cycle proof
///
/// `blake2b-256` of the packed proof with the digest bytes reversed, matching
/// how pools display cycle hashes.
///
/// # Returns
/// - `Ok(Digest)` - Byte-reversed digest
/// - `Err(OracleError::InvalidArgument)` - Proof length differs from the variant arity
pub fn cycle_fingerprint(variant: CycleVariant, proof: &[u32]) -> Result<Digest, OracleError> {
    check_arity(variant, proof)?;

    let mut digest: Digest = Blake2b::<U32>::digest(pack_proof(proof)).into();
    digest.reverse();
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_sizes_match_arity() {
        assert_eq!(pack_proof(&[0; 32]).len(), 116);
        assert_eq!(pack_proof(&[0; 40]).len(), 145);
        assert_eq!(pack_proof(&[0; 48]).len(), 174);
    }

    #[test]
    fn packing_is_lsb_first_and_masks_high_bits() {
        // endpoint 1 sets bit 0; endpoint 2 starts at bit 29
        let buf = pack_proof(&[1, 1]);
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[3], 0x20);

        assert_eq!(pack_proof(&[u32::MAX]), pack_proof(&[(1 << EDGEBITS) - 1]));
    }

    #[test]
    fn fingerprint_is_reversed_blake2b() {
        let proof: Vec<u32> = (0..32).map(|i| i * 1_000_003).collect();
        let fp = cycle_fingerprint(CycleVariant::C29s, &proof).unwrap();

        let mut plain: Digest = Blake2b::<U32>::digest(pack_proof(&proof)).into();
        assert_ne!(fp, plain);
        plain.reverse();
        assert_eq!(fp, plain);
        assert_eq!(fp, cycle_fingerprint(CycleVariant::C29s, &proof).unwrap());
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = cycle_fingerprint(CycleVariant::C29b, &[0; 32]).unwrap_err();
        assert!(matches!(err, OracleError::InvalidArgument(_)));
    }
}
