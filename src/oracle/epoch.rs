// src/oracle/epoch.rs
//! Epoch-keyed light cache management
//!
//! Ethash-style verification needs a per-epoch light cache that takes seconds
//! to build. The manager keeps exactly one cache and rebuilds it only when the
//! cache identity derived from the block height changes. Etchash (ECIP-1099)
//! doubles the epoch length after an activation height, which is why the
//! identity is the *seed epoch* rather than the epoch itself.

use crate::types::Digest;
use crate::utils::error::OracleError;
use log::{debug, info};
use serde::Serialize;

/// Ethash epoch length in blocks
pub const ETHASH_EPOCH_LENGTH: u64 = 30_000;

/// Etchash epoch length after activation
pub const ETCHASH_EPOCH_LENGTH: u64 = 60_000;

/// Ethereum Classic mainnet ECIP-1099 activation height
pub const ETCHASH_ACTIVATION_HEIGHT: u64 = 11_700_000;

/// Number of 30 000-block epochs with a light cache, as in libethash
pub const MAX_EPOCH: u64 = 2048;

/// Rejects heights past the last supported epoch
///
/// Covers both schedules: the seed epoch never exceeds
/// `height / ETHASH_EPOCH_LENGTH`, and it bounds the cache size.
///
/// # Returns
/// - `Ok(())` - Height has a light cache
/// - `Err(OracleError::InvalidArgument)` - Height is at or past epoch [`MAX_EPOCH`]
pub fn check_height(height: u64) -> Result<(), OracleError> {
    if height / ETHASH_EPOCH_LENGTH >= MAX_EPOCH {
        return Err(OracleError::InvalidArgument(format!(
            "height {} is past the last supported epoch {}",
            height,
            MAX_EPOCH - 1
        )));
    }
    Ok(())
}

/// Result of a light-cache verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpochHash {
    /// Final digest compared against the boundary
    #[serde(with = "hex_digest")]
    pub result: Digest,
    /// Compressed mix, compared against the block's mix hash
    #[serde(with = "hex_digest")]
    pub mix_hash: Digest,
}

/// Everything a backend needs to build the cache for a height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochKey {
    /// Height that triggered the build
    pub height: u64,
    /// Epoch under the active schedule; sizes the cache
    pub epoch: u64,
    /// Epoch in 30 000-block units; selects the seed hash
    pub seed_epoch: u64,
}

/// How block heights map to epochs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochSchedule {
    /// Plain Ethash: 30 000-block epochs forever
    Fixed,
    /// Etchash: 60 000-block epochs from `activation_height` on
    Shifted {
        /// First height using the long epoch
        activation_height: u64,
    },
}

impl EpochSchedule {
    /// Etchash with the mainnet activation height
    pub fn etchash() -> Self {
        EpochSchedule::Shifted { activation_height: ETCHASH_ACTIVATION_HEIGHT }
    }

    /// Derives the cache key for a height
    pub fn key(&self, height: u64) -> EpochKey {
        match *self {
            EpochSchedule::Fixed => {
                let epoch = height / ETHASH_EPOCH_LENGTH;
                EpochKey { height, epoch, seed_epoch: epoch }
            }
            EpochSchedule::Shifted { activation_height } => {
                let length = if height >= activation_height {
                    ETCHASH_EPOCH_LENGTH
                } else {
                    ETHASH_EPOCH_LENGTH
                };
                let epoch = height / length;
                let seed_epoch = epoch * (length / ETHASH_EPOCH_LENGTH);
                EpochKey { height, epoch, seed_epoch }
            }
        }
    }

    /// Identity of the cache a key needs
    ///
    /// Two heights with the same identity share a cache.
    fn identity(&self, key: &EpochKey) -> u64 {
        match self {
            EpochSchedule::Fixed => key.epoch,
            EpochSchedule::Shifted { .. } => key.seed_epoch,
        }
    }
}

/// Native light-cache implementation driven by [`EpochLightCacheManager`]
pub trait LightCacheBackend: Send {
    /// Built light cache
    type Cache: Send;

    /// Builds the cache for `key`
    fn build(&mut self, key: &EpochKey) -> Result<Self::Cache, OracleError>;

    /// Light verification of `(header_hash, nonce)` against `cache`
    fn compute(&mut self, cache: &Self::Cache, header_hash: &Digest, nonce: u64) -> EpochHash;
}

/// Single-slot epoch cache
///
/// Alternating between heights of different epochs rebuilds on every call;
/// callers are expected to group work by height.
pub struct EpochLightCacheManager<L: LightCacheBackend> {
    backend: L,
    schedule: EpochSchedule,
    current: Option<(u64, L::Cache)>,
    rebuilds: u64,
}

impl<L: LightCacheBackend> EpochLightCacheManager<L> {
    /// Creates an empty manager; the first call builds
    pub fn new(backend: L, schedule: EpochSchedule) -> Self {
        Self {
            backend,
            schedule,
            current: None,
            rebuilds: 0,
        }
    }

    /// Light-verifies a header at a height
    ///
    /// # Arguments
    /// * `header_hash` - 32-byte header hash
    /// * `nonce` - Host-order nonce
    /// * `height` - Block height selecting the epoch
    ///
    /// # Returns
    /// The result digest and mix hash
    pub fn compute(
        &mut self,
        header_hash: &Digest,
        nonce: u64,
        height: u64,
    ) -> Result<EpochHash, OracleError> {
        check_height(height)?;
        let key = self.schedule.key(height);
        let identity = self.schedule.identity(&key);

        let stale = !matches!(&self.current, Some((id, _)) if *id == identity);
        if stale {
            info!(
                "Rebuilding light cache: height {} epoch {} seed epoch {}",
                key.height, key.epoch, key.seed_epoch
            );
            // Release the old cache before allocating the next one
            self.current = None;
            let cache = self.backend.build(&key)?;
            self.current = Some((identity, cache));
            self.rebuilds += 1;
        } else {
            debug!("Reusing light cache for identity {}", identity);
        }

        match &self.current {
            Some((_, cache)) => Ok(self.backend.compute(cache, header_hash, nonce)),
            None => Err(OracleError::AllocationFailure("light cache missing".to_string())),
        }
    }

    /// Number of cache builds so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Schedule in use
    pub fn schedule(&self) -> EpochSchedule {
        self.schedule
    }
}

/// Serializes digests as lowercase hex
pub(crate) mod hex_digest {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that records which keys it built
    #[derive(Default)]
    struct Recording {
        built: Vec<EpochKey>,
    }

    impl LightCacheBackend for Recording {
        type Cache = u64;

        fn build(&mut self, key: &EpochKey) -> Result<u64, OracleError> {
            self.built.push(*key);
            Ok(key.seed_epoch)
        }

        fn compute(&mut self, cache: &u64, header_hash: &Digest, nonce: u64) -> EpochHash {
            let mut result = *header_hash;
            result[..8].copy_from_slice(&(cache ^ nonce).to_le_bytes());
            EpochHash { result, mix_hash: [*cache as u8; 32] }
        }
    }

    #[test]
    fn fixed_schedule_keys() {
        let s = EpochSchedule::Fixed;
        assert_eq!(s.key(0), EpochKey { height: 0, epoch: 0, seed_epoch: 0 });
        assert_eq!(s.key(29_999).epoch, 0);
        assert_eq!(s.key(30_000).epoch, 1);
        assert_eq!(s.key(30_000).seed_epoch, 1);
    }

    #[test]
    fn shifted_schedule_straddles_activation() {
        let s = EpochSchedule::etchash();

        let before = s.key(ETCHASH_ACTIVATION_HEIGHT - 1);
        assert_eq!(before.epoch, 389);
        assert_eq!(before.seed_epoch, 389);

        let at = s.key(ETCHASH_ACTIVATION_HEIGHT);
        assert_eq!(at.epoch, 195);
        assert_eq!(at.seed_epoch, 390);

        let later = s.key(ETCHASH_ACTIVATION_HEIGHT + 59_999);
        assert_eq!(later.epoch, 195);
        assert_eq!(later.seed_epoch, 390);

        assert_eq!(s.key(12_000_000).seed_epoch, 400);
    }

    #[test]
    fn first_call_builds_even_for_epoch_zero() {
        let mut m = EpochLightCacheManager::new(Recording::default(), EpochSchedule::Fixed);
        m.compute(&[0u8; 32], 1, 0).unwrap();
        assert_eq!(m.rebuilds(), 1);
        assert_eq!(m.backend.built.len(), 1);
    }

    #[test]
    fn same_epoch_reuses_cache() {
        let mut m = EpochLightCacheManager::new(Recording::default(), EpochSchedule::Fixed);
        let header = [3u8; 32];
        let a = m.compute(&header, 7, 30_001).unwrap();
        let b = m.compute(&header, 7, 59_999).unwrap();
        assert_eq!(a, b);
        assert_eq!(m.rebuilds(), 1);

        m.compute(&header, 7, 60_000).unwrap();
        assert_eq!(m.rebuilds(), 2);
    }

    #[test]
    fn shifted_manager_keys_on_seed_epoch() {
        let mut m = EpochLightCacheManager::new(
            Recording::default(),
            EpochSchedule::Shifted { activation_height: 60_000 },
        );
        m.compute(&[0u8; 32], 0, 60_000).unwrap();
        m.compute(&[0u8; 32], 0, 119_999).unwrap();
        assert_eq!(m.rebuilds(), 1);
        assert_eq!(m.backend.built[0].seed_epoch, 2);

        m.compute(&[0u8; 32], 0, 120_000).unwrap();
        assert_eq!(m.rebuilds(), 2);
        assert_eq!(m.backend.built[1].seed_epoch, 4);
    }

    #[test]
    fn heights_past_last_epoch_are_rejected() {
        assert!(check_height(MAX_EPOCH * ETHASH_EPOCH_LENGTH - 1).is_ok());
        assert!(check_height(MAX_EPOCH * ETHASH_EPOCH_LENGTH).is_err());

        for schedule in [EpochSchedule::Fixed, EpochSchedule::Shifted { activation_height: 0 }] {
            let mut m = EpochLightCacheManager::new(Recording::default(), schedule);
            for height in [u64::MAX, 1_000_000_000] {
                let err = m.compute(&[0u8; 32], 0, height).unwrap_err();
                assert!(matches!(err, OracleError::InvalidArgument(_)));
            }
            assert!(m.backend.built.is_empty());

            m.compute(&[0u8; 32], 0, 30_000).unwrap();
            assert_eq!(m.rebuilds(), 1);
        }
    }

    #[test]
    fn last_supported_height_stays_in_range() {
        let height = MAX_EPOCH * ETHASH_EPOCH_LENGTH - 1;
        assert_eq!(EpochSchedule::Fixed.key(height).seed_epoch, MAX_EPOCH - 1);
        let shifted = EpochSchedule::Shifted { activation_height: 0 }.key(height);
        assert!(shifted.seed_epoch < MAX_EPOCH);
        assert!(shifted.epoch < MAX_EPOCH);
    }

    #[test]
    fn alternating_epochs_rebuild_every_call() {
        let mut m = EpochLightCacheManager::new(Recording::default(), EpochSchedule::Fixed);
        for height in [0, 30_000, 0, 30_000] {
            m.compute(&[0u8; 32], 0, height).unwrap();
        }
        assert_eq!(m.rebuilds(), 4);
    }
}
