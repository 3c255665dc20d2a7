// src/oracle/batch.rs
//! Parallel verification of stateless submissions
//!
//! Only verifiers without shared caches are batched. The RandomX and epoch
//! managers serialize on their own locks and gain nothing from a thread pool.

use crate::oracle::chained::ChainedSubmission;
use crate::oracle::cuckoo::{CycleStatus, CycleVariant, verify_cycle};
use crate::utils::error::OracleError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One cycle proof submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSubmission {
    /// Proof size variant
    pub variant: CycleVariant,
    /// Pre-PoW header
    #[serde(with = "hex::serde")]
    pub header: Vec<u8>,
    /// Ascending edge indices
    pub proof: Vec<u32>,
}

/// Verifies cycle proofs in parallel
///
/// # Returns
/// One result per submission, in input order
pub fn verify_cycle_batch(items: &[CycleSubmission]) -> Vec<Result<CycleStatus, OracleError>> {
    items
        .par_iter()
        .map(|s| verify_cycle(s.variant, &s.header, &s.proof))
        .collect()
}

/// Validates chained-SHA3 submissions in parallel
///
/// # Returns
/// One result per submission, in input order
pub fn validate_chained_batch(items: &[ChainedSubmission]) -> Vec<Result<bool, OracleError>> {
    items.par_iter().map(ChainedSubmission::validate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::chained::{chained_hash, validate};

    #[test]
    fn chained_batch_preserves_order() {
        let good = hex::encode(chained_hash(7, b"mh", b""));
        let items: Vec<ChainedSubmission> = (0..16)
            .map(|i| ChainedSubmission {
                nonce_hex: if i % 3 == 0 { "7".into() } else { format!("{:x}", i + 100) },
                expected_hex: good.clone(),
                mining_hash: b"mh".to_vec(),
                pow_bytes: Vec::new(),
                target: u64::MAX,
            })
            .collect();

        let results = validate_chained_batch(&items);
        assert_eq!(results.len(), items.len());
        for (i, (item, result)) in items.iter().zip(&results).enumerate() {
            let serial = validate(&item.nonce_hex, &item.expected_hex, b"mh", b"", u64::MAX).unwrap();
            assert_eq!(*result.as_ref().unwrap(), serial);
            assert_eq!(serial, i % 3 == 0);
        }
    }

    #[test]
    fn cycle_batch_reports_errors_per_item() {
        let items = vec![
            CycleSubmission {
                variant: CycleVariant::C29s,
                header: b"a".to_vec(),
                proof: (1..=32).collect(),
            },
            CycleSubmission {
                variant: CycleVariant::C29s,
                header: b"b".to_vec(),
                proof: vec![1, 2, 3],
            },
        ];

        let results = verify_cycle_batch(&items);
        assert!(matches!(results[0], Ok(status) if !status.is_ok()));
        assert!(matches!(results[1], Err(OracleError::InvalidArgument(_))));
    }
}
