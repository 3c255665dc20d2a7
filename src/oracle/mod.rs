// src/oracle/mod.rs
//! Proof-of-work verification oracle
//!
//! This module ties the verifiers together:
//! - [`AlgorithmRegistry`] resolves `(family, variant)` pairs to digest primitives
//! - [`RandomXContextManager`] keeps seed-keyed RandomX caches and VMs
//! - [`EpochLightCacheManager`] keeps one Ethash-style light cache per schedule
//! - [`cuckoo`], [`chained`] and the Equihash checker are stateless
//!
//! [`Oracle`] owns one of each manager behind its own lock and exposes one
//! method per family, plus [`Oracle::verify`] for tagged requests.

/// Digest primitives and backends
pub mod algorithm;

/// Parallel verification of stateless submissions
pub mod batch;

/// Chained SHA3 difficulty validation
pub mod chained;

/// RandomX cache and VM lifecycle
pub mod context;

/// Cuckoo-cycle proof verification and fingerprints
pub mod cuckoo;

/// Epoch-keyed light cache management
pub mod epoch;

/// Variant-id dispatch
pub mod registry;

pub use algorithm::DigestPrimitive;
pub use algorithm::randomx::{RandomXBackend, RandomXVariant, RustRandomX};
pub use batch::CycleSubmission;
pub use chained::ChainedSubmission;
pub use context::RandomXContextManager;
pub use cuckoo::{CycleStatus, CycleVariant};
pub use epoch::{EpochHash, EpochKey, EpochLightCacheManager, EpochSchedule, LightCacheBackend};
pub use registry::AlgorithmRegistry;

use crate::config::Config;
use crate::oracle::algorithm::equihash::{self, EquihashParams};
use crate::oracle::algorithm::ethash::EthashLight;
use crate::oracle::algorithm::{k12, kawpow};
use crate::oracle::epoch::{check_height, hex_digest};
use crate::stats::{OracleStats, StatsSnapshot};
use crate::types::{Digest, HashFamily};
use crate::utils::error::{OracleError, fixed_bytes};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A verification request, tagged by `kind`
///
/// Byte fields are hex strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyRequest {
    /// CryptoNight, Argon2 and AstroBWT families
    Hash {
        /// Digest family
        family: HashFamily,
        /// Wire variant id
        #[serde(default)]
        variant: i32,
        /// Hashing blob
        #[serde(with = "hex::serde")]
        payload: Vec<u8>,
        /// Block height, required for the CN/R class
        #[serde(default)]
        height: Option<u64>,
    },
    /// RandomX forks
    #[serde(rename = "randomx")]
    RandomX {
        /// Hashing blob
        #[serde(with = "hex::serde")]
        payload: Vec<u8>,
        /// 32-byte seed hash
        #[serde(with = "hex::serde")]
        seed_hash: Vec<u8>,
        /// Wire variant id
        #[serde(default)]
        variant: i32,
    },
    /// KangarooTwelve
    K12 {
        /// Input bytes
        #[serde(with = "hex::serde")]
        payload: Vec<u8>,
    },
    /// Cuckoo-cycle proof check
    Cycle {
        /// Proof size variant
        variant: CycleVariant,
        /// Pre-PoW header
        #[serde(with = "hex::serde")]
        header: Vec<u8>,
        /// Ascending edge indices
        proof: Vec<u32>,
    },
    /// Cuckoo-cycle proof fingerprint
    Fingerprint {
        /// Proof size variant
        variant: CycleVariant,
        /// Ascending edge indices
        proof: Vec<u32>,
    },
    /// KawPow final hash
    #[serde(rename = "kawpow")]
    KawPow {
        /// 32-byte header hash
        #[serde(with = "hex::serde")]
        header_hash: Vec<u8>,
        /// 8-byte big-endian nonce
        #[serde(with = "hex::serde")]
        nonce: Vec<u8>,
        /// 32-byte mix hash
        #[serde(with = "hex::serde")]
        mix_hash: Vec<u8>,
    },
    /// Ethash light verification
    Ethash {
        /// 32-byte header hash
        #[serde(with = "hex::serde")]
        header_hash: Vec<u8>,
        /// 8-byte big-endian nonce
        #[serde(with = "hex::serde")]
        nonce: Vec<u8>,
        /// Block height
        height: u64,
    },
    /// Etchash light verification
    Etchash {
        /// 32-byte header hash
        #[serde(with = "hex::serde")]
        header_hash: Vec<u8>,
        /// 8-byte big-endian nonce
        #[serde(with = "hex::serde")]
        nonce: Vec<u8>,
        /// Block height
        height: u64,
    },
    /// Equihash solution check
    Equihash {
        /// 140-byte header
        #[serde(with = "hex::serde")]
        header: Vec<u8>,
        /// Minimal-encoded solution
        #[serde(with = "hex::serde")]
        solution: Vec<u8>,
        /// Personalization prefix, at most 8 bytes
        personalization: String,
        /// Equihash N
        n: u32,
        /// Equihash K
        k: u32,
    },
    /// Chained SHA3 submission
    Sha3x(ChainedSubmission),
}

/// Outcome of a [`VerifyRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// A digest for the caller to compare against its target
    Digest {
        /// Lowercase hex on the wire
        #[serde(with = "hex_digest")]
        digest: Digest,
    },
    /// Light-cache result and mix hash
    Epoch(EpochHash),
    /// Cycle check outcome
    Cycle {
        /// Named status
        status: CycleStatus,
        /// Stable numeric code
        code: i32,
    },
    /// Boolean validity
    Valid {
        /// Whether the submission is valid
        valid: bool,
    },
}

impl Verdict {
    /// Serializes the verdict as a single JSON line
    pub fn to_json(&self) -> Result<String, OracleError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Multi-family verification front end
///
/// Stateless verifiers run lock-free. Each stateful manager sits behind its
/// own mutex, so at most one verification at a time touches it.
pub struct Oracle<R: RandomXBackend = RustRandomX, L: LightCacheBackend = EthashLight> {
    registry: AlgorithmRegistry,
    randomx: Mutex<RandomXContextManager<R>>,
    ethash: Mutex<EpochLightCacheManager<L>>,
    etchash: Mutex<EpochLightCacheManager<L>>,
    stats: Arc<OracleStats>,
}

impl Oracle {
    /// Creates an oracle with the linked backends
    ///
    /// # Arguments
    /// * `config` - Supplies RandomX fast mode and the Etchash activation height
    pub fn new(config: &Config) -> Self {
        Self::with_backends(
            AlgorithmRegistry::with_builtin(),
            RustRandomX::new(config.randomx.fast_mode),
            EthashLight,
            EthashLight,
            config.etchash.activation_height,
        )
    }
}

impl Default for Oracle {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl<R: RandomXBackend, L: LightCacheBackend> Oracle<R, L> {
    /// Creates an oracle over caller-supplied backends
    ///
    /// # Arguments
    /// * `registry` - Digest primitives for the variant families
    /// * `randomx` - RandomX backend
    /// * `ethash` - Light-cache backend for the fixed schedule
    /// * `etchash` - Light-cache backend for the shifted schedule
    /// * `etchash_activation` - First height with 60 000-block epochs
    pub fn with_backends(
        registry: AlgorithmRegistry,
        randomx: R,
        ethash: L,
        etchash: L,
        etchash_activation: u64,
    ) -> Self {
        Oracle {
            registry,
            randomx: Mutex::new(RandomXContextManager::new(randomx)),
            ethash: Mutex::new(EpochLightCacheManager::new(ethash, EpochSchedule::Fixed)),
            etchash: Mutex::new(EpochLightCacheManager::new(
                etchash,
                EpochSchedule::Shifted {
                    activation_height: etchash_activation,
                },
            )),
            stats: Arc::new(OracleStats::new()),
        }
    }

    /// Registry used by [`Oracle::cryptonight`]
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Mutable registry, for installing host primitives
    pub fn registry_mut(&mut self) -> &mut AlgorithmRegistry {
        &mut self.registry
    }

    /// Shared counters, for attaching a [`crate::stats::StatsReporter`]
    pub fn stats_handle(&self) -> Arc<OracleStats> {
        Arc::clone(&self.stats)
    }

    /// Counters plus cache instrumentation from every manager
    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = self.stats.snapshot();
        {
            let rx = self.randomx.lock().unwrap_or_else(PoisonError::into_inner);
            snapshot.randomx_cache_builds = rx.cache_builds();
            snapshot.randomx_vm_creations = rx.vm_creations();
        }
        snapshot.ethash_rebuilds = self
            .ethash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rebuilds();
        snapshot.etchash_rebuilds = self
            .etchash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rebuilds();
        snapshot
    }

    /// Computes a CryptoNight, Argon2 or AstroBWT family digest
    ///
    /// # Arguments
    /// * `family` - Digest family
    /// * `payload` - Hashing blob
    /// * `variant` - Wire variant id; unknown ids use the family default
    /// * `height` - Block height, required for the CN/R class
    ///
    /// # Returns
    /// - `Ok(Digest)` - The 32-byte digest
    /// - `Err(OracleError::InvalidArgument)` - Missing height or malformed payload
    /// - `Err(OracleError::UnsupportedParameters)` - No primitive installed for the resolved algorithm
    pub fn cryptonight(
        &self,
        family: HashFamily,
        payload: &[u8],
        variant: i32,
        height: Option<u64>,
    ) -> Result<Digest, OracleError> {
        let outcome = self.registry.hash(family, variant, payload, height);
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Computes a RandomX digest
    ///
    /// # Arguments
    /// * `payload` - Hashing blob
    /// * `seed_hash` - Exactly 32 bytes
    /// * `variant` - Wire variant id; unknown ids use Monero
    ///
    /// # Returns
    /// - `Ok(Digest)` - The 32-byte digest
    /// - `Err(OracleError::InvalidArgument)` - Seed hash is not 32 bytes
    /// - `Err(OracleError::UnsupportedParameters)` - Backend cannot apply the fork's tuning
    /// - `Err(OracleError::ManagerPoisoned)` - An earlier call panicked inside the manager
    pub fn randomx(
        &self,
        payload: &[u8],
        seed_hash: &[u8],
        variant: i32,
    ) -> Result<Digest, OracleError> {
        let outcome = fixed_bytes::<32>(seed_hash, "seed hash").and_then(|seed| {
            let variant = RandomXVariant::from_wire(variant);
            lock(&self.randomx, "randomx")?.compute(variant, &seed, payload)
        });
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Computes the KangarooTwelve digest of `payload`
    pub fn k12(&self, payload: &[u8]) -> Digest {
        let digest = k12::k12(payload);
        self.stats.record_digest::<_, OracleError>(&Ok(digest));
        digest
    }

    /// Verifies a cuckoo-cycle proof
    ///
    /// # Returns
    /// - `Ok(CycleStatus)` - `CycleStatus::Ok` for a valid cycle
    /// - `Err(OracleError::InvalidArgument)` - Proof length differs from the variant arity
    pub fn verify_cycle(
        &self,
        variant: CycleVariant,
        header: &[u8],
        proof: &[u32],
    ) -> Result<CycleStatus, OracleError> {
        let outcome = cuckoo::verify_cycle(variant, header, proof);
        self.stats.record_verdict(&outcome.as_ref().map(|s| s.is_ok()));
        outcome
    }

    /// Fingerprint of a cuckoo-cycle proof
    pub fn cycle_fingerprint(
        &self,
        variant: CycleVariant,
        proof: &[u32],
    ) -> Result<Digest, OracleError> {
        let outcome = cuckoo::fingerprint::cycle_fingerprint(variant, proof);
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Computes the KawPow final hash
    ///
    /// # Arguments
    /// * `header_hash` - Exactly 32 bytes
    /// * `nonce` - Exactly 8 bytes, big-endian
    /// * `mix_hash` - Exactly 32 bytes
    pub fn kawpow(
        &self,
        header_hash: &[u8],
        nonce: &[u8],
        mix_hash: &[u8],
    ) -> Result<Digest, OracleError> {
        let outcome = (|| -> Result<Digest, OracleError> {
            let header_hash = fixed_bytes::<32>(header_hash, "header hash")?;
            let nonce = u64::from_be_bytes(fixed_bytes::<8>(nonce, "nonce")?);
            let mix_hash = fixed_bytes::<32>(mix_hash, "mix hash")?;
            Ok(kawpow::kawpow_final(&header_hash, nonce, &mix_hash))
        })();
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Ethash light verification
    ///
    /// # Arguments
    /// * `header_hash` - Exactly 32 bytes
    /// * `nonce` - Exactly 8 bytes, big-endian
    /// * `height` - Block height selecting the epoch, below epoch 2048
    ///
    /// # Returns
    /// - `Ok(EpochHash)` - Result digest and mix hash
    /// - `Err(OracleError::InvalidArgument)` - Wrong lengths or a height past the last epoch
    pub fn ethash(
        &self,
        header_hash: &[u8],
        nonce: &[u8],
        height: u64,
    ) -> Result<EpochHash, OracleError> {
        let outcome = epoch_compute(&self.ethash, "ethash", header_hash, nonce, height);
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Etchash light verification
    ///
    /// Same inputs as [`Oracle::ethash`]; the epoch length doubles from the
    /// configured activation height on.
    pub fn etchash(
        &self,
        header_hash: &[u8],
        nonce: &[u8],
        height: u64,
    ) -> Result<EpochHash, OracleError> {
        let outcome = epoch_compute(&self.etchash, "etchash", header_hash, nonce, height);
        self.stats.record_digest(&outcome);
        outcome
    }

    /// Checks an Equihash solution
    ///
    /// # Returns
    /// - `Ok(bool)` - Validity; a wrong header or solution length is `false`
    /// - `Err(OracleError::UnsupportedParameters)` - `(n, k)` outside the supported set
    /// - `Err(OracleError::InvalidArgument)` - Personalization longer than 8 bytes
    pub fn equihash(
        &self,
        header: &[u8],
        solution: &[u8],
        personalization: &str,
        n: u32,
        k: u32,
    ) -> Result<bool, OracleError> {
        let outcome = EquihashParams::new(n, k)
            .and_then(|params| equihash::verify(&params, personalization, header, solution));
        self.stats.record_verdict(&outcome);
        outcome
    }

    /// Validates a chained SHA3 submission
    pub fn validate_chained(
        &self,
        nonce_hex: &str,
        expected_hex: &str,
        mining_hash: &[u8],
        pow_bytes: &[u8],
        target: u64,
    ) -> Result<bool, OracleError> {
        let outcome = chained::validate(nonce_hex, expected_hex, mining_hash, pow_bytes, target);
        self.stats.record_verdict(&outcome);
        outcome
    }

    /// Verifies cycle proofs in parallel, one result per submission
    pub fn verify_cycle_batch(
        &self,
        items: &[CycleSubmission],
    ) -> Vec<Result<CycleStatus, OracleError>> {
        let results = batch::verify_cycle_batch(items);
        for outcome in &results {
            self.stats.record_verdict(&outcome.as_ref().map(|s| s.is_ok()));
        }
        results
    }

    /// Validates chained SHA3 submissions in parallel, one result per submission
    pub fn validate_chained_batch(
        &self,
        items: &[ChainedSubmission],
    ) -> Vec<Result<bool, OracleError>> {
        let results = batch::validate_chained_batch(items);
        for outcome in &results {
            self.stats.record_verdict(outcome);
        }
        results
    }

    /// Dispatches a tagged request to the matching verifier
    pub fn verify(&self, request: &VerifyRequest) -> Result<Verdict, OracleError> {
        let digest = |digest: Digest| Verdict::Digest { digest };
        let valid = |valid: bool| Verdict::Valid { valid };

        match request {
            VerifyRequest::Hash {
                family,
                variant,
                payload,
                height,
            } => self.cryptonight(*family, payload, *variant, *height).map(digest),
            VerifyRequest::RandomX {
                payload,
                seed_hash,
                variant,
            } => self.randomx(payload, seed_hash, *variant).map(digest),
            VerifyRequest::K12 { payload } => Ok(digest(self.k12(payload))),
            VerifyRequest::Cycle {
                variant,
                header,
                proof,
            } => self
                .verify_cycle(*variant, header, proof)
                .map(|status| Verdict::Cycle {
                    status,
                    code: status.code(),
                }),
            VerifyRequest::Fingerprint { variant, proof } => {
                self.cycle_fingerprint(*variant, proof).map(digest)
            }
            VerifyRequest::KawPow {
                header_hash,
                nonce,
                mix_hash,
            } => self.kawpow(header_hash, nonce, mix_hash).map(digest),
            VerifyRequest::Ethash {
                header_hash,
                nonce,
                height,
            } => self.ethash(header_hash, nonce, *height).map(Verdict::Epoch),
            VerifyRequest::Etchash {
                header_hash,
                nonce,
                height,
            } => self.etchash(header_hash, nonce, *height).map(Verdict::Epoch),
            VerifyRequest::Equihash {
                header,
                solution,
                personalization,
                n,
                k,
            } => self
                .equihash(header, solution, personalization, *n, *k)
                .map(valid),
            VerifyRequest::Sha3x(submission) => self
                .validate_chained(
                    &submission.nonce_hex,
                    &submission.expected_hex,
                    &submission.mining_hash,
                    &submission.pow_bytes,
                    submission.target,
                )
                .map(valid),
        }
    }
}

fn lock<'a, T>(
    manager: &'a Mutex<T>,
    name: &'static str,
) -> Result<MutexGuard<'a, T>, OracleError> {
    manager.lock().map_err(|_| OracleError::ManagerPoisoned(name))
}

/// Argument checks run before the lock is taken
fn epoch_compute<L: LightCacheBackend>(
    manager: &Mutex<EpochLightCacheManager<L>>,
    name: &'static str,
    header_hash: &[u8],
    nonce: &[u8],
    height: u64,
) -> Result<EpochHash, OracleError> {
    let header_hash = fixed_bytes::<32>(header_hash, "header hash")?;
    let nonce = u64::from_be_bytes(fixed_bytes::<8>(nonce, "nonce")?);
    check_height(height)?;
    lock(manager, name)?.compute(&header_hash, nonce, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_from_json() {
        let req: VerifyRequest = serde_json::from_str(
            r#"{"kind":"hash","family":"cn-lite","variant":1,"payload":"00ff"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            VerifyRequest::Hash {
                family: HashFamily::CryptoNightLite,
                variant: 1,
                payload: vec![0x00, 0xff],
                height: None,
            }
        );

        let req: VerifyRequest = serde_json::from_str(
            r#"{"kind":"sha3x","nonce_hex":"0x1","expected_hex":"ab","mining_hash":"","pow_bytes":"","target":5}"#,
        )
        .unwrap();
        assert!(matches!(req, VerifyRequest::Sha3x(ref s) if s.target == 5));

        let bad = serde_json::from_str::<VerifyRequest>(r#"{"kind":"k12","payload":"zz"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn verdicts_serialize_with_hex_digests() {
        let json = Verdict::Digest { digest: [0xab; 32] }.to_json().unwrap();
        assert_eq!(json, format!(r#"{{"kind":"digest","digest":"{}"}}"#, "ab".repeat(32)));

        let json = Verdict::Cycle {
            status: CycleStatus::DeadEnd,
            code: CycleStatus::DeadEnd.code(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"kind":"cycle","status":"dead_end","code":6}"#);
    }

    #[test]
    fn kawpow_checks_lengths_before_hashing() {
        let oracle = Oracle::default();
        for (h, n, m) in [(31, 8, 32), (32, 7, 32), (32, 8, 33)] {
            let err = oracle.kawpow(&vec![0; h], &vec![0; n], &vec![0; m]).unwrap_err();
            assert!(matches!(err, OracleError::InvalidArgument(_)));
        }
        assert!(oracle.kawpow(&[0; 32], &[0; 8], &[0; 32]).is_ok());
        assert_eq!(oracle.stats().errors, 3);
    }

    #[test]
    fn kawpow_nonce_is_big_endian_on_the_wire() {
        let oracle = Oracle::default();
        let wire = [0, 0, 0, 0, 0, 0, 0, 1];
        let direct = kawpow::kawpow_final(&[3; 32], 1, &[4; 32]);
        assert_eq!(oracle.kawpow(&[3; 32], &wire, &[4; 32]).unwrap(), direct);
    }

    #[test]
    fn dispatch_matches_typed_methods() {
        let oracle = Oracle::default();
        let verdict = oracle
            .verify(&VerifyRequest::K12 { payload: b"abc".to_vec() })
            .unwrap();
        assert_eq!(verdict, Verdict::Digest { digest: oracle.k12(b"abc") });

        let verdict = oracle
            .verify(&VerifyRequest::Equihash {
                header: vec![0; 139],
                solution: vec![],
                personalization: "ZcashPoW".into(),
                n: 200,
                k: 9,
            })
            .unwrap();
        assert_eq!(verdict, Verdict::Valid { valid: false });

        let snap = oracle.stats();
        assert_eq!(snap.verifications, 3);
        assert_eq!(snap.invalid, 1);
    }
}
