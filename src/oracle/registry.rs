// src/oracle/registry.rs
//! Variant-id dispatch for the digest families
//!
//! Resolution is two-staged: the family turns a wire variant id into an
//! [`AlgorithmId`] (unknown ids fall back to the family default), then the
//! registry looks up the primitive installed for that algorithm.

use crate::oracle::algorithm::DigestPrimitive;
use crate::oracle::algorithm::argon2::Argon2Algo;
use crate::oracle::algorithm::cryptonight::CryptoNightAlgo;
use crate::types::{AlgorithmId, Digest, HashFamily};
use crate::utils::error::OracleError;
use log::debug;
use std::collections::HashMap;

/// Table of installed digest primitives
#[derive(Default)]
pub struct AlgorithmRegistry {
    primitives: HashMap<AlgorithmId, Box<dyn DigestPrimitive>>,
}

impl AlgorithmRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every primitive this crate links
    ///
    /// Installs cn/0 and cn/1 plus the three Argon2 variants.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for id in [AlgorithmId::Cn0, AlgorithmId::Cn1] {
            if let Some(algo) = CryptoNightAlgo::for_algorithm(id) {
                registry.register(id, algo);
            }
        }
        for id in [
            AlgorithmId::Argon2Chukwa,
            AlgorithmId::Argon2Wrkz,
            AlgorithmId::Argon2ChukwaV2,
        ] {
            if let Some(algo) = Argon2Algo::for_algorithm(id) {
                registry.register(id, algo);
            }
        }
        registry
    }

    /// Installs or replaces the primitive for an algorithm
    pub fn register(&mut self, id: AlgorithmId, primitive: impl DigestPrimitive + 'static) {
        debug!("Registering {} primitive for {}", id.family(), id);
        self.primitives.insert(id, Box::new(primitive));
    }

    /// Whether a primitive is installed for `id`
    pub fn contains(&self, id: AlgorithmId) -> bool {
        self.primitives.contains_key(&id)
    }

    /// Installed algorithms, in no particular order
    pub fn algorithms(&self) -> impl Iterator<Item = AlgorithmId> + '_ {
        self.primitives.keys().copied()
    }

    /// Resolves a wire variant id, logging fallbacks
    pub fn resolve(&self, family: HashFamily, variant: i32) -> AlgorithmId {
        family.resolve_exact(variant).unwrap_or_else(|| {
            let id = family.default_algorithm();
            debug!("{} variant {} unknown, using {}", family, variant, id);
            id
        })
    }

    /// Computes a family digest
    ///
    /// # Arguments
    /// * `family` - Digest family
    /// * `variant` - Wire variant id
    /// * `payload` - Hashing blob
    /// * `height` - Block height, required for the CN/R class
    ///
    /// # Returns
    /// - `Ok(Digest)` - 32-byte digest
    /// - `Err(OracleError::InvalidArgument)` - Missing height or malformed payload
    /// - `Err(OracleError::UnsupportedParameters)` - No primitive installed for the resolved algorithm
    pub fn hash(
        &self,
        family: HashFamily,
        variant: i32,
        payload: &[u8],
        height: Option<u64>,
    ) -> Result<Digest, OracleError> {
        if family.requires_height(variant) && height.is_none() {
            return Err(OracleError::InvalidArgument(format!(
                "{} variant {} requires a block height",
                family, variant
            )));
        }

        let id = self.resolve(family, variant);
        let primitive = self.primitives.get(&id).ok_or_else(|| {
            OracleError::UnsupportedParameters(format!(
                "no {} primitive registered for {}",
                id.family(),
                id
            ))
        })?;

        primitive.digest(payload, height.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: u8) -> impl Fn(&[u8], u64) -> Result<Digest, OracleError> + Send + Sync {
        move |payload: &[u8], height: u64| {
            let mut out = [tag; 32];
            out[1] = payload.len() as u8;
            out[2..10].copy_from_slice(&height.to_le_bytes());
            Ok(out)
        }
    }

    #[test]
    fn builtin_primitives() {
        let r = AlgorithmRegistry::with_builtin();
        assert!(r.contains(AlgorithmId::Cn0));
        assert!(r.contains(AlgorithmId::Argon2ChukwaV2));
        assert!(!r.contains(AlgorithmId::CnR));
        assert_eq!(r.algorithms().count(), 5);
    }

    #[test]
    fn unknown_variant_hashes_like_default() {
        let mut r = AlgorithmRegistry::new();
        r.register(AlgorithmId::CnLite1, tagged(1));
        r.register(AlgorithmId::CnLite0, tagged(0));

        let payload = [0u8; 76];
        let default = r.hash(HashFamily::CryptoNightLite, 1, &payload, None).unwrap();
        assert_eq!(r.hash(HashFamily::CryptoNightLite, 42, &payload, None).unwrap(), default);
        assert_ne!(r.hash(HashFamily::CryptoNightLite, 0, &payload, None).unwrap(), default);
    }

    #[test]
    fn height_rule_runs_before_lookup() {
        let r = AlgorithmRegistry::new();
        let err = r.hash(HashFamily::CryptoNight, 13, &[0u8; 76], None).unwrap_err();
        assert!(matches!(err, OracleError::InvalidArgument(_)));

        let err = r.hash(HashFamily::CryptoNight, 13, &[0u8; 76], Some(1)).unwrap_err();
        assert!(matches!(err, OracleError::UnsupportedParameters(_)));
    }

    #[test]
    fn unsupported_error_names_family_and_algorithm() {
        let r = AlgorithmRegistry::new();
        let err = r.hash(HashFamily::CryptoNightHeavy, 2, &[0u8; 76], None).unwrap_err();
        assert!(matches!(err, OracleError::UnsupportedParameters(_)));
        let msg = err.to_string();
        assert!(msg.contains("no cn-heavy primitive"));
        assert!(msg.contains(&AlgorithmId::CnHeavyTube.to_string()));
    }

    #[test]
    fn height_is_forwarded() {
        let mut r = AlgorithmRegistry::new();
        r.register(AlgorithmId::CnR, tagged(9));
        let out = r.hash(HashFamily::CryptoNight, 12, b"abc", Some(1_806_260)).unwrap();
        assert_eq!(&out[2..10], &1_806_260u64.to_le_bytes());

        // heights are ignored, not rejected, elsewhere
        r.register(AlgorithmId::AstroBwt, tagged(3));
        let out = r.hash(HashFamily::AstroBwt, 0, b"abc", None).unwrap();
        assert_eq!(&out[2..10], &[0u8; 8]);
    }

    #[test]
    fn register_replaces() {
        let mut r = AlgorithmRegistry::with_builtin();
        r.register(AlgorithmId::Cn0, tagged(7));
        let out = r.hash(HashFamily::CryptoNight, 0, b"x", None).unwrap();
        assert_eq!(out[0], 7);
    }
}
