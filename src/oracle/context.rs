// src/oracle/context.rs
//! RandomX context management
//!
//! One slot per RandomX fork. A slot owns a seed-keyed cache and a VM. The
//! cache is rebuilt only when the seed hash changes; the VM is created once and
//! afterwards only re-pointed at the current cache.

use crate::oracle::algorithm::randomx::{RandomXBackend, RandomXVariant, SLOT_COUNT};
use crate::types::Digest;
use crate::utils::error::OracleError;
use log::{debug, info};
use std::time::Instant;

/// Cache and VM of one fork
struct Slot<B: RandomXBackend> {
    cache: Option<B::Cache>,
    vm: Option<B::Vm>,
    seed: [u8; 32],
}

impl<B: RandomXBackend> Default for Slot<B> {
    fn default() -> Self {
        Self {
            cache: None,
            vm: None,
            seed: [0u8; 32],
        }
    }
}

/// Owner of all RandomX caches and VMs
///
/// Methods take `&mut self`: one computation at a time per manager.
pub struct RandomXContextManager<B: RandomXBackend> {
    backend: B,
    slots: [Slot<B>; SLOT_COUNT],
    cache_builds: u64,
    vm_creations: u64,
}

impl<B: RandomXBackend> RandomXContextManager<B> {
    /// Creates a manager with all slots empty
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: std::array::from_fn(|_| Slot::default()),
            cache_builds: 0,
            vm_creations: 0,
        }
    }

    /// Computes a RandomX digest
    ///
    /// # Arguments
    /// * `variant` - Fork selecting the slot and tuning
    /// * `seed` - 32-byte seed hash keying the cache
    /// * `payload` - Hashing blob
    ///
    /// # Returns
    /// - `Ok(Digest)` - The 32-byte digest
    /// - `Err(OracleError::UnsupportedParameters)` - Backend cannot apply the fork's tuning
    /// - `Err(OracleError::AllocationFailure)` - Cache or VM allocation failed
    pub fn compute(
        &mut self,
        variant: RandomXVariant,
        seed: &[u8; 32],
        payload: &[u8],
    ) -> Result<Digest, OracleError> {
        let slot = &mut self.slots[variant.slot()];

        let needs_init = slot.cache.is_none() || slot.seed != *seed;

        // Tuning is global in the native library; reassert it every call
        self.backend.apply_tuning(variant.tuning())?;

        if needs_init {
            let start = Instant::now();
            // Drop the previous cache first; two live caches double peak memory
            slot.cache = None;
            let cache = self.backend.build_cache(seed)?;
            if let Some(vm) = slot.vm.as_mut() {
                self.backend.rebind_vm(vm, &cache);
            }
            slot.cache = Some(cache);
            slot.seed = *seed;
            self.cache_builds += 1;
            info!(
                "{} cache built for seed {} in {:.2?}",
                variant,
                hex::encode(seed),
                start.elapsed()
            );
        }

        let cache = slot
            .cache
            .as_ref()
            .ok_or_else(|| OracleError::AllocationFailure(format!("{} cache missing", variant)))?;

        if slot.vm.is_none() {
            slot.vm = Some(self.backend.create_vm(cache)?);
            self.vm_creations += 1;
            debug!("{} VM created", variant);
        }

        match slot.vm.as_mut() {
            Some(vm) => self.backend.hash(vm, payload),
            None => Err(OracleError::AllocationFailure(format!("{} VM missing", variant))),
        }
    }

    /// Number of cache builds across all slots
    pub fn cache_builds(&self) -> u64 {
        self.cache_builds
    }

    /// Number of VMs created across all slots
    pub fn vm_creations(&self) -> u64 {
        self.vm_creations
    }

    /// Seed the slot's cache was last built from, if any
    pub fn current_seed(&self, variant: RandomXVariant) -> Option<[u8; 32]> {
        let slot = &self.slots[variant.slot()];
        slot.cache.as_ref().map(|_| slot.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::algorithm::randomx::RandomXTuning;
    use sha3::{Digest as _, Sha3_256};

    /// Cache is the seed; the VM remembers the seed it is bound to
    #[derive(Default)]
    struct Toy {
        tunings: Vec<&'static [u8]>,
        rebinds: usize,
    }

    impl RandomXBackend for Toy {
        type Cache = [u8; 32];
        type Vm = [u8; 32];

        fn apply_tuning(&mut self, tuning: &RandomXTuning) -> Result<(), OracleError> {
            self.tunings.push(tuning.argon_salt);
            Ok(())
        }

        fn build_cache(&mut self, seed: &[u8; 32]) -> Result<[u8; 32], OracleError> {
            Ok(*seed)
        }

        fn create_vm(&mut self, cache: &[u8; 32]) -> Result<[u8; 32], OracleError> {
            Ok(*cache)
        }

        fn rebind_vm(&mut self, vm: &mut [u8; 32], cache: &[u8; 32]) {
            *vm = *cache;
            self.rebinds += 1;
        }

        fn hash(&mut self, vm: &mut [u8; 32], payload: &[u8]) -> Result<Digest, OracleError> {
            let mut h = Sha3_256::new();
            h.update(self.tunings.last().copied().unwrap_or_default());
            h.update(vm);
            h.update(payload);
            Ok(h.finalize().into())
        }
    }

    #[test]
    fn seed_rotation_rebuilds_and_rebinds() {
        let mut m = RandomXContextManager::new(Toy::default());
        let (s1, s2) = ([1u8; 32], [2u8; 32]);

        let a = m.compute(RandomXVariant::Monero, &s1, b"blob").unwrap();
        let b = m.compute(RandomXVariant::Monero, &s2, b"blob").unwrap();
        let c = m.compute(RandomXVariant::Monero, &s1, b"blob").unwrap();

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(m.cache_builds(), 3);
        assert_eq!(m.vm_creations(), 1);
        assert_eq!(m.backend.rebinds, 2);
    }

    #[test]
    fn unchanged_seed_skips_rebuild_but_reapplies_tuning() {
        let mut m = RandomXContextManager::new(Toy::default());
        let seed = [9u8; 32];
        for _ in 0..3 {
            m.compute(RandomXVariant::Monero, &seed, b"x").unwrap();
        }
        assert_eq!(m.cache_builds(), 1);
        assert_eq!(m.backend.tunings.len(), 3);
    }

    #[test]
    fn slots_are_independent() {
        let mut m = RandomXContextManager::new(Toy::default());
        let seed = [5u8; 32];
        let monero = m.compute(RandomXVariant::Monero, &seed, b"x").unwrap();
        let wow = m.compute(RandomXVariant::Wownero, &seed, b"x").unwrap();
        let monero_again = m.compute(RandomXVariant::Monero, &seed, b"x").unwrap();

        assert_ne!(monero, wow);
        assert_eq!(monero, monero_again);
        assert_eq!(m.cache_builds(), 2);
        assert_eq!(m.vm_creations(), 2);
        assert_eq!(m.current_seed(RandomXVariant::Keva), None);
        assert_eq!(m.current_seed(RandomXVariant::Wownero), Some(seed));
    }

    #[test]
    fn first_call_with_zero_seed_still_builds() {
        let mut m = RandomXContextManager::new(Toy::default());
        m.compute(RandomXVariant::Monero, &[0u8; 32], b"x").unwrap();
        assert_eq!(m.cache_builds(), 1);
    }
}
