// src/oracle/algorithm/ethash.rs
//! Ethash light verification
//!
//! Implements the pieces of Ethash a verifier needs: the epoch seed hash, the
//! cache and dataset sizes, the RandMemoHash light cache, on-demand dataset
//! items and `hashimoto_light`. The full dataset is never materialized.

use crate::oracle::epoch::{EpochHash, EpochKey, LightCacheBackend};
use crate::types::Digest;
use crate::utils::error::OracleError;
use log::info;
use sha3::{Digest as _, Keccak256, Keccak512};
use std::time::Instant;

const WORD_BYTES: usize = 4;
const DATASET_BYTES_INIT: u64 = 1 << 30;
const DATASET_BYTES_GROWTH: u64 = 1 << 23;
const CACHE_BYTES_INIT: u64 = 1 << 24;
const CACHE_BYTES_GROWTH: u64 = 1 << 17;
const MIX_BYTES: u64 = 128;
const HASH_BYTES: u64 = 64;
const DATASET_PARENTS: u32 = 256;
const CACHE_ROUNDS: usize = 3;
const ACCESSES: u32 = 64;
const FNV_PRIME: u32 = 0x0100_0193;

const NODE_WORDS: usize = HASH_BYTES as usize / WORD_BYTES;
const MIX_WORDS: usize = MIX_BYTES as usize / WORD_BYTES;
const MIX_NODES: usize = (MIX_BYTES / HASH_BYTES) as usize;

/// One 64-byte cache or dataset node as little-endian words
type Node = [u32; NODE_WORDS];

/// Ethash light cache for one epoch
pub struct LightCache {
    epoch: u64,
    full_size: u64,
    nodes: Vec<Node>,
}

impl LightCache {
    /// Builds the cache for `epoch` from its seed hash
    ///
    /// # Arguments
    /// * `epoch` - Epoch used for the cache and dataset sizes
    /// * `seed` - Seed hash, usually [`seed_hash`] of the seed epoch
    pub fn new(epoch: u64, seed: &Digest) -> Self {
        Self::with_size(epoch, seed, cache_size(epoch), full_size(epoch))
    }

    /// Builds a cache with explicit sizes
    fn with_size(epoch: u64, seed: &Digest, cache_bytes: u64, full_bytes: u64) -> Self {
        let n = (cache_bytes / HASH_BYTES) as usize;
        let mut nodes: Vec<Node> = Vec::with_capacity(n);

        nodes.push(keccak512(seed));
        for i in 1..n {
            let next = keccak512(&node_bytes(&nodes[i - 1]));
            nodes.push(next);
        }

        for _ in 0..CACHE_ROUNDS {
            for i in 0..n {
                let v = nodes[i][0] as usize % n;
                let prev = nodes[(i + n - 1) % n];
                let mut mixed = [0u32; NODE_WORDS];
                for w in 0..NODE_WORDS {
                    mixed[w] = prev[w] ^ nodes[v][w];
                }
                nodes[i] = keccak512(&node_bytes(&mixed));
            }
        }

        Self { epoch, full_size: full_bytes, nodes }
    }

    /// Epoch this cache was sized for
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cache size in bytes
    pub fn size(&self) -> u64 {
        self.nodes.len() as u64 * HASH_BYTES
    }

    /// Computes one 64-byte dataset item from the cache
    fn dataset_item(&self, index: u32) -> Node {
        let n = self.nodes.len();
        let mut mix = self.nodes[index as usize % n];
        mix[0] ^= index;
        mix = keccak512(&node_bytes(&mix));

        for j in 0..DATASET_PARENTS {
            let parent = fnv(index ^ j, mix[j as usize % NODE_WORDS]) as usize % n;
            let node = &self.nodes[parent];
            for w in 0..NODE_WORDS {
                mix[w] = fnv(mix[w], node[w]);
            }
        }

        keccak512(&node_bytes(&mix))
    }
}

/// Cache size in bytes for an epoch
pub fn cache_size(epoch: u64) -> u64 {
    let mut size = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch - HASH_BYTES;
    while !is_prime(size / HASH_BYTES) {
        size -= 2 * HASH_BYTES;
    }
    size
}

/// Full dataset size in bytes for an epoch
pub fn full_size(epoch: u64) -> u64 {
    let mut size = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch - MIX_BYTES;
    while !is_prime(size / MIX_BYTES) {
        size -= 2 * MIX_BYTES;
    }
    size
}

/// Seed hash: Keccak-256 applied `seed_epoch` times to 32 zero bytes
pub fn seed_hash(seed_epoch: u64) -> Digest {
    let mut seed = [0u8; 32];
    for _ in 0..seed_epoch {
        seed = Keccak256::digest(seed).into();
    }
    seed
}

/// Light-client hashimoto
///
/// # Arguments
/// * `cache` - Light cache for the block's epoch
/// * `header_hash` - Keccak-256 of the RLP header without nonce and mix
/// * `nonce` - Block nonce as a host integer
///
/// # Returns
/// Final result digest and the 32-byte compressed mix
pub fn hashimoto_light(cache: &LightCache, header_hash: &Digest, nonce: u64) -> EpochHash {
    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(header_hash);
    seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
    let s = keccak512(&seed_input);

    let mut mix = [0u32; MIX_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = s[i % NODE_WORDS];
    }

    let pages = (cache.full_size / MIX_BYTES) as u32;
    for i in 0..ACCESSES {
        let p = fnv(i ^ s[0], mix[i as usize % MIX_WORDS]) % pages * MIX_NODES as u32;
        for n in 0..MIX_NODES {
            let item = cache.dataset_item(p + n as u32);
            for w in 0..NODE_WORDS {
                let idx = n * NODE_WORDS + w;
                mix[idx] = fnv(mix[idx], item[w]);
            }
        }
    }

    let mut mix_hash = [0u8; 32];
    for (i, chunk) in mix.chunks_exact(4).enumerate() {
        let c = fnv(fnv(fnv(chunk[0], chunk[1]), chunk[2]), chunk[3]);
        mix_hash[i * 4..i * 4 + 4].copy_from_slice(&c.to_le_bytes());
    }

    let mut hasher = Keccak256::new();
    hasher.update(node_bytes(&s));
    hasher.update(mix_hash);
    EpochHash {
        result: hasher.finalize().into(),
        mix_hash,
    }
}

/// Native light-cache backend for the epoch managers
#[derive(Debug, Clone, Copy, Default)]
pub struct EthashLight;

impl LightCacheBackend for EthashLight {
    type Cache = LightCache;

    fn build(&mut self, key: &EpochKey) -> Result<Self::Cache, OracleError> {
        let start = Instant::now();
        let cache = LightCache::new(key.epoch, &seed_hash(key.seed_epoch));
        info!(
            "Built ethash light cache for epoch {} (seed epoch {}, {} bytes) in {:.2?}",
            key.epoch,
            key.seed_epoch,
            cache.size(),
            start.elapsed()
        );
        Ok(cache)
    }

    fn compute(&mut self, cache: &Self::Cache, header_hash: &Digest, nonce: u64) -> EpochHash {
        hashimoto_light(cache, header_hash, nonce)
    }
}

fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

fn keccak512(data: &[u8]) -> Node {
    let out = Keccak512::digest(data);
    let mut node = [0u32; NODE_WORDS];
    for (w, chunk) in node.iter_mut().zip(out.chunks_exact(WORD_BYTES)) {
        *w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    node
}

fn node_bytes(node: &Node) -> [u8; HASH_BYTES as usize] {
    let mut out = [0u8; HASH_BYTES as usize];
    for (chunk, w) in out.chunks_exact_mut(WORD_BYTES).zip(node.iter()) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
    out
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
