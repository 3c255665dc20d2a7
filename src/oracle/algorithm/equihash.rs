// src/oracle/algorithm/equihash.rs
//! Equihash solution verification
//!
//! Checks a minimal-encoded solution against a 140-byte header for the
//! parameter sets Zcash and its forks use. Each chain picks its own BLAKE2b
//! personalization prefix (`ZcashPoW`, `ZelProof`, `BgoldPoW`, ...).

use crate::utils::error::OracleError;
use blake2b_simd::{Params, State};

/// Header length every supported chain hashes
pub const HEADER_LEN: usize = 140;

/// Longest personalization prefix; the remaining 8 bytes carry N and K
pub const MAX_PERSONAL_LEN: usize = 8;

const SUPPORTED: [(u32, u32); 7] = [(200, 9), (125, 4), (144, 5), (192, 7), (96, 5), (96, 3), (48, 5)];

/// A supported `(N, K)` pair and its derived widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquihashParams {
    n: u32,
    k: u32,
}

impl EquihashParams {
    /// Validates an `(N, K)` pair
    ///
    /// # Returns
    /// - `Ok(EquihashParams)` for the seven supported pairs
    /// - `Err(OracleError::UnsupportedParameters)` for anything else
    pub fn new(n: u32, k: u32) -> Result<Self, OracleError> {
        if SUPPORTED.contains(&(n, k)) {
            Ok(Self { n, k })
        } else {
            Err(OracleError::UnsupportedParameters(format!(
                "equihash ({}, {}) is not supported",
                n, k
            )))
        }
    }

    fn indices_per_hash(&self) -> usize {
        512 / self.n as usize
    }

    fn hash_output(&self) -> usize {
        self.indices_per_hash() * self.n.div_ceil(8) as usize
    }

    fn collision_bit_length(&self) -> usize {
        (self.n / (self.k + 1)) as usize
    }

    fn collision_byte_length(&self) -> usize {
        self.collision_bit_length().div_ceil(8)
    }

    fn hash_length(&self) -> usize {
        (self.k as usize + 1) * self.collision_byte_length()
    }

    /// Length of a minimal-encoded solution in bytes
    pub fn solution_width(&self) -> usize {
        (1usize << self.k) * (self.collision_bit_length() + 1) / 8
    }
}

/// Builds the 16-byte BLAKE2b personalization: prefix, `le32(N)`, `le32(K)`
pub fn personalization(prefix: &str, params: &EquihashParams) -> Result<[u8; 16], OracleError> {
    let bytes = prefix.as_bytes();
    if bytes.len() > MAX_PERSONAL_LEN {
        return Err(OracleError::InvalidArgument(format!(
            "personalization must be at most {} bytes, got {}",
            MAX_PERSONAL_LEN,
            bytes.len()
        )));
    }

    let mut out = [0u8; 16];
    out[..bytes.len()].copy_from_slice(bytes);
    out[8..12].copy_from_slice(&params.n.to_le_bytes());
    out[12..].copy_from_slice(&params.k.to_le_bytes());
    Ok(out)
}

/// Verifies an Equihash solution
///
/// # Arguments
/// * `params` - Validated `(N, K)` pair
/// * `personal` - Personalization prefix, at most 8 bytes
/// * `header` - Block header, must be 140 bytes to verify
/// * `solution` - Minimal-encoded solution without its compact-size prefix
///
/// # Returns
/// - `Ok(true)` for a valid solution
/// - `Ok(false)` for a wrong header length, wrong solution length or failed tree check
/// - `Err(OracleError::InvalidArgument)` for an over-long personalization
pub fn verify(
    params: &EquihashParams,
    personal: &str,
    header: &[u8],
    solution: &[u8],
) -> Result<bool, OracleError> {
    let personal = personalization(personal, params)?;

    if header.len() != HEADER_LEN || solution.len() != params.solution_width() {
        return Ok(false);
    }

    let mut base = Params::new()
        .hash_length(params.hash_output())
        .personal(&personal)
        .to_state();
    base.update(header);

    let rows = indices_from_minimal(params, solution)
        .into_iter()
        .map(|i| Row::leaf(params, &base, i))
        .collect();
    Ok(is_valid_tree(params, rows))
}

struct Row {
    hash: Vec<u8>,
    indices: Vec<u32>,
}

impl Row {
    fn leaf(params: &EquihashParams, base: &State, index: u32) -> Self {
        let per_hash = params.indices_per_hash();
        let n_bytes = params.n.div_ceil(8) as usize;

        let mut state = base.clone();
        state.update(&(index / per_hash as u32).to_le_bytes());
        let digest = state.finalize();

        let start = (index as usize % per_hash) * n_bytes;
        let hash = expand_array(
            &digest.as_bytes()[start..start + n_bytes],
            params.hash_length(),
            params.collision_bit_length(),
            0,
        );
        Self { hash, indices: vec![index] }
    }
}

fn is_valid_tree(params: &EquihashParams, mut rows: Vec<Row>) -> bool {
    let cbyl = params.collision_byte_length();

    while rows.len() > 1 {
        let mut next = Vec::with_capacity(rows.len() / 2);
        for pair in rows.chunks_exact(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.hash[..cbyl] != b.hash[..cbyl] {
                return false;
            }
            if b.indices < a.indices {
                return false;
            }
            if a.indices.iter().any(|i| b.indices.contains(i)) {
                return false;
            }

            let hash = a.hash[cbyl..]
                .iter()
                .zip(&b.hash[cbyl..])
                .map(|(x, y)| x ^ y)
                .collect();
            let mut indices = a.indices.clone();
            indices.extend_from_slice(&b.indices);
            next.push(Row { hash, indices });
        }
        rows = next;
    }

    rows.first().is_some_and(|r| r.hash.iter().all(|b| *b == 0))
}

/// Decodes the big-endian bit-packed `(cbl + 1)`-bit indices of a solution
fn indices_from_minimal(params: &EquihashParams, minimal: &[u8]) -> Vec<u32> {
    let bit_len = params.collision_bit_length() + 1;
    let byte_pad = 4 - bit_len.div_ceil(8);
    let len_indices = 32 * minimal.len() / bit_len;

    expand_array(minimal, len_indices, bit_len, byte_pad)
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Splits a big-endian bitstream into `bit_len`-bit big-endian fields
///
/// Each field takes `ceil(bit_len / 8) + byte_pad` output bytes, the padding
/// bytes first.
fn expand_array(input: &[u8], out_len: usize, bit_len: usize, byte_pad: usize) -> Vec<u8> {
    let out_width = bit_len.div_ceil(8) + byte_pad;
    let mask: u64 = (1 << bit_len) - 1;
    let mut out = vec![0u8; out_len];

    let mut acc: u64 = 0;
    let mut acc_bits = 0;
    let mut j = 0;
    for &byte in input {
        acc = (acc << 8) | u64::from(byte);
        acc_bits += 8;

        if acc_bits >= bit_len {
            acc_bits -= bit_len;
            if j + out_width > out_len {
                break;
            }
            for x in byte_pad..out_width {
                let shift = 8 * (out_width - x - 1);
                out[j + x] = ((acc >> (acc_bits + shift)) & ((mask >> shift) & 0xFF)) as u8;
            }
            j += out_width;
        }
    }
    out
}
