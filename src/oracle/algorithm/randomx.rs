// src/oracle/algorithm/randomx.rs
//! RandomX variants and backend
//!
//! RandomX forks differ only in a table of tuning constants (Argon2 cache
//! parameters, dataset size, scratchpad levels, program shape). This module
//! holds those tables, the mapping from wire variant ids to context slots, and
//! the [`RandomXBackend`] seam the context manager drives.

use crate::types::Digest;
use crate::utils::error::{OracleError, fixed_bytes};
use rust_randomx::{Context, Hasher};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Number of context slots, one per supported fork
pub const SLOT_COUNT: usize = 7;

/// RandomX forks the oracle can be asked for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RandomXVariant {
    /// rx/0
    Monero,
    /// rx/wow
    Wownero,
    /// rx/arq
    Arqma,
    /// rx/graft
    Graft,
    /// rx/sfx, kept for slot layout; no wire id selects it
    Safex,
    /// rx/keva
    Keva,
    /// rx/xla (DefyX)
    Scala,
}

/// Memory-hardness and program-shape constants of one RandomX fork
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomXTuning {
    pub argon_salt: &'static [u8],
    pub argon_iterations: u32,
    pub argon_memory: u32,
    pub argon_lanes: u32,
    pub cache_accesses: u32,
    pub dataset_base_size: u64,
    pub scratchpad_l1: u32,
    pub scratchpad_l2: u32,
    pub scratchpad_l3: u32,
    pub program_size: u32,
    pub program_iterations: u32,
    pub program_count: u32,
}

/// Reference parameter set; every fork is expressed as a delta from it
pub const MONERO: RandomXTuning = RandomXTuning {
    argon_salt: b"RandomX\x03",
    argon_iterations: 3,
    argon_memory: 262_144,
    argon_lanes: 1,
    cache_accesses: 8,
    dataset_base_size: 2_147_483_648,
    scratchpad_l1: 16_384,
    scratchpad_l2: 262_144,
    scratchpad_l3: 2_097_152,
    program_size: 256,
    program_iterations: 2048,
    program_count: 8,
};

#[allow(missing_docs)]
pub const WOWNERO: RandomXTuning = RandomXTuning {
    argon_salt: b"RandomWOW\x01",
    program_iterations: 1024,
    program_count: 16,
    scratchpad_l2: 131_072,
    scratchpad_l3: 1_048_576,
    ..MONERO
};

#[allow(missing_docs)]
pub const ARQMA: RandomXTuning = RandomXTuning {
    argon_iterations: 1,
    argon_salt: b"RandomARQ\x01",
    program_iterations: 1024,
    program_count: 4,
    scratchpad_l2: 131_072,
    scratchpad_l3: 262_144,
    ..MONERO
};

#[allow(missing_docs)]
pub const GRAFT: RandomXTuning = RandomXTuning {
    argon_lanes: 2,
    argon_salt: b"RandomX-Graft\x01",
    program_size: 280,
    ..MONERO
};

#[allow(missing_docs)]
pub const SAFEX: RandomXTuning = RandomXTuning {
    argon_salt: b"RandomSFX\x01",
    ..MONERO
};

#[allow(missing_docs)]
pub const KEVA: RandomXTuning = RandomXTuning {
    argon_salt: b"RandomKV\x01",
    scratchpad_l2: 131_072,
    scratchpad_l3: 1_048_576,
    ..MONERO
};

#[allow(missing_docs)]
pub const SCALA: RandomXTuning = RandomXTuning {
    argon_memory: 131_072,
    argon_iterations: 2,
    argon_salt: b"DefyXScala\x13",
    cache_accesses: 2,
    dataset_base_size: 33_554_432,
    scratchpad_l1: 65_536,
    scratchpad_l2: 131_072,
    scratchpad_l3: 262_144,
    program_size: 64,
    program_iterations: 1024,
    program_count: 4,
};

impl RandomXVariant {
    /// Maps a wire variant id to a fork, defaulting to Monero
    pub fn from_wire(id: i32) -> Self {
        match id {
            0 => RandomXVariant::Monero,
            17 => RandomXVariant::Wownero,
            2 => RandomXVariant::Arqma,
            20 => RandomXVariant::Graft,
            19 => RandomXVariant::Keva,
            3 => RandomXVariant::Scala,
            _ => RandomXVariant::Monero,
        }
    }

    /// Context slot owned by this fork, in `0..SLOT_COUNT`
    pub fn slot(self) -> usize {
        match self {
            RandomXVariant::Monero => 0,
            RandomXVariant::Wownero => 1,
            RandomXVariant::Arqma => 2,
            RandomXVariant::Graft => 3,
            RandomXVariant::Safex => 4,
            RandomXVariant::Keva => 5,
            RandomXVariant::Scala => 6,
        }
    }

    /// Tuning constants for this fork
    pub fn tuning(self) -> &'static RandomXTuning {
        match self {
            RandomXVariant::Monero => &MONERO,
            RandomXVariant::Wownero => &WOWNERO,
            RandomXVariant::Arqma => &ARQMA,
            RandomXVariant::Graft => &GRAFT,
            RandomXVariant::Safex => &SAFEX,
            RandomXVariant::Keva => &KEVA,
            RandomXVariant::Scala => &SCALA,
        }
    }
}

impl fmt::Display for RandomXVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RandomXVariant::Monero => "rx/0",
            RandomXVariant::Wownero => "rx/wow",
            RandomXVariant::Arqma => "rx/arq",
            RandomXVariant::Graft => "rx/graft",
            RandomXVariant::Safex => "rx/sfx",
            RandomXVariant::Keva => "rx/keva",
            RandomXVariant::Scala => "rx/xla",
        };
        f.write_str(name)
    }
}

/// Native RandomX library seen by the context manager
///
/// A cache is the seed-keyed Argon2-filled lookup table. A VM is bound to one
/// cache and owns its scratchpad. The manager guarantees that it calls
/// [`RandomXBackend::apply_tuning`] before every other method of a request.
pub trait RandomXBackend: Send {
    /// Seed-keyed cache
    type Cache: Send;
    /// Hashing VM bound to one cache
    type Vm: Send;

    /// Makes `tuning` the active parameter set
    fn apply_tuning(&mut self, tuning: &RandomXTuning) -> Result<(), OracleError>;

    /// Builds a cache from a 32-byte seed hash
    fn build_cache(&mut self, seed: &[u8; 32]) -> Result<Self::Cache, OracleError>;

    /// Creates a VM bound to `cache`
    fn create_vm(&mut self, cache: &Self::Cache) -> Result<Self::Vm, OracleError>;

    /// Re-points an existing VM at a rebuilt cache
    fn rebind_vm(&mut self, vm: &mut Self::Vm, cache: &Self::Cache);

    /// Hashes `payload` with `vm`
    fn hash(&mut self, vm: &mut Self::Vm, payload: &[u8]) -> Result<Digest, OracleError>;
}

/// Backend over the `rust-randomx` crate
///
/// `rust-randomx` compiles in the reference (Monero) parameter set only, so any
/// other tuning is rejected with `UnsupportedParameters`. Hosts that link a
/// fork-aware library provide their own [`RandomXBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRandomX {
    /// Build the full 2 GiB dataset instead of the 256 MiB light cache
    pub fast: bool,
}

impl RustRandomX {
    /// Creates the backend
    ///
    /// # Arguments
    /// * `fast` - Enables fast mode when true (uses more memory but better performance)
    ///
    /// # Performance Notes
    /// - Cache initialization is expensive (seconds in fast mode)
    /// - Fast mode requires ~2080MB RAM vs ~256MB in light mode
    pub fn new(fast: bool) -> Self {
        Self { fast }
    }
}

impl RandomXBackend for RustRandomX {
    type Cache = Arc<Context>;
    type Vm = Hasher;

    fn apply_tuning(&mut self, tuning: &RandomXTuning) -> Result<(), OracleError> {
        if *tuning == MONERO {
            Ok(())
        } else {
            Err(OracleError::UnsupportedParameters(format!(
                "rust-randomx cannot apply tuning with salt {:?}",
                String::from_utf8_lossy(tuning.argon_salt)
            )))
        }
    }

    fn build_cache(&mut self, seed: &[u8; 32]) -> Result<Self::Cache, OracleError> {
        Ok(Arc::new(Context::new(seed, self.fast)))
    }

    fn create_vm(&mut self, cache: &Self::Cache) -> Result<Self::Vm, OracleError> {
        Ok(Hasher::new(Arc::clone(cache)))
    }

    fn rebind_vm(&mut self, vm: &mut Self::Vm, cache: &Self::Cache) {
        vm.update(Arc::clone(cache));
    }

    fn hash(&mut self, vm: &mut Self::Vm, payload: &[u8]) -> Result<Digest, OracleError> {
        let output = vm.hash(payload);
        fixed_bytes(output.as_ref(), "randomx output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn wire_ids_map_to_distinct_slots() {
        let slots: HashSet<usize> = [0, 17, 2, 20, 19, 3]
            .into_iter()
            .map(|id| RandomXVariant::from_wire(id).slot())
            .collect();
        assert_eq!(slots.len(), 6);
        assert!(slots.iter().all(|s| *s < SLOT_COUNT));
        assert!(!slots.contains(&RandomXVariant::Safex.slot()));
    }

    #[test]
    fn unknown_ids_fall_back_to_monero() {
        for id in [-1, 1, 4, 18, 99] {
            assert_eq!(RandomXVariant::from_wire(id), RandomXVariant::Monero);
        }
    }

    #[test]
    fn fork_tunings_override_reference_values() {
        assert_eq!(WOWNERO.argon_memory, MONERO.argon_memory);
        assert_eq!(WOWNERO.program_count, 16);
        assert_eq!(GRAFT.argon_lanes, 2);
        assert_eq!(SCALA.dataset_base_size, 33_554_432);
        assert_ne!(KEVA, MONERO);
    }

    #[test]
    fn rust_randomx_only_accepts_reference_tuning() {
        let mut backend = RustRandomX::new(false);
        assert!(backend.apply_tuning(&MONERO).is_ok());
        let err = backend.apply_tuning(&WOWNERO).unwrap_err();
        assert!(matches!(err, OracleError::UnsupportedParameters(_)));
    }
}
