// src/oracle/cuckoo/mod.rs
//! Cuckoo Cycle proof verification
//!
//! A proof is an ascending list of edge indices claimed to form a single cycle
//! in the bipartite graph keyed by the header. The verifier reports *why* a
//! proof fails through [`CycleStatus`] instead of a bare boolean.

/// SipHash-2-4 edge generation
pub mod siphash;

/// Canonical proof hash
pub mod fingerprint;

use crate::utils::error::OracleError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use siphash::{ROT_CUCKAROO, ROT_CUCKAROOD, SiphashKeys, sipblock};
use std::fmt;

pub use fingerprint::cycle_fingerprint;

/// Significant bits of an edge index
pub const EDGEBITS: u32 = 29;

/// Largest valid edge index
pub const EDGEMASK: u64 = (1 << EDGEBITS) - 1;

/// Proof size variants
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleVariant {
    /// Cuckaroo29s, 32 edges
    C29s,
    /// Cuckarood29v, 32 edges, directed
    C29v,
    /// Cuckaroo29b, 40 edges
    C29b,
    /// Cuckaroo29i, 48 edges
    C29i,
}

impl CycleVariant {
    /// Edges in a proof
    pub fn arity(self) -> usize {
        match self {
            CycleVariant::C29s | CycleVariant::C29v => 32,
            CycleVariant::C29b => 40,
            CycleVariant::C29i => 48,
        }
    }

    fn is_directed(self) -> bool {
        self == CycleVariant::C29v
    }

    fn rotation(self) -> u32 {
        if self.is_directed() { ROT_CUCKAROOD } else { ROT_CUCKAROO }
    }

    fn node_mask(self) -> u64 {
        if self.is_directed() {
            (1 << (EDGEBITS - 1)) - 1
        } else {
            EDGEMASK
        }
    }
}

impl fmt::Display for CycleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleVariant::C29s => write!(f, "c29s"),
            CycleVariant::C29v => write!(f, "c29v"),
            CycleVariant::C29b => write!(f, "c29b"),
            CycleVariant::C29i => write!(f, "c29i"),
        }
    }
}

/// Outcome of a cycle check, with stable numeric codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Valid cycle
    Ok,
    /// Edge index above `EDGEMASK`
    TooBig,
    /// Edges not strictly ascending
    TooSmall,
    /// Endpoints do not pair up
    NonMatching,
    /// A node has more than two incident proof edges
    Branch,
    /// A node has only one incident proof edge
    DeadEnd,
    /// The edges form more than one cycle
    ShortCycle,
    /// Directed proof with unequal edge directions
    Unbalanced,
}

impl CycleStatus {
    /// Numeric result code; 1 is reserved for header-length errors
    pub fn code(self) -> i32 {
        match self {
            CycleStatus::Ok => 0,
            CycleStatus::TooBig => 2,
            CycleStatus::TooSmall => 3,
            CycleStatus::NonMatching => 4,
            CycleStatus::Branch => 5,
            CycleStatus::DeadEnd => 6,
            CycleStatus::ShortCycle => 7,
            CycleStatus::Unbalanced => 8,
        }
    }

    /// Whether the proof is a valid cycle
    pub fn is_ok(self) -> bool {
        self == CycleStatus::Ok
    }
}

pub(crate) fn check_arity(variant: CycleVariant, proof: &[u32]) -> Result<(), OracleError> {
    if proof.len() != variant.arity() {
        return Err(OracleError::InvalidArgument(format!(
            "{} proof must have {} edges, got {}",
            variant,
            variant.arity(),
            proof.len()
        )));
    }
    Ok(())
}

/// Verifies a cycle proof against a header
///
/// # Arguments
/// * `variant` - Proof size variant
/// * `header` - Pre-PoW header bytes, hashed into the graph keys
/// * `proof` - Ascending edge indices
///
/// # Returns
/// - `Ok(CycleStatus)` - Verification outcome, `CycleStatus::Ok` for a valid cycle
/// - `Err(OracleError::InvalidArgument)` - Proof length differs from the variant arity
pub fn verify_cycle(
    variant: CycleVariant,
    header: &[u8],
    proof: &[u32],
) -> Result<CycleStatus, OracleError> {
    check_arity(variant, proof)?;

    let keys = SiphashKeys::from_header(header);
    let rot = variant.rotation();
    let endpoints = |edge: u64| sipblock(&keys, edge, rot);

    Ok(if variant.is_directed() {
        check_directed(proof, variant.node_mask(), endpoints)
    } else {
        check_undirected(proof, variant.node_mask(), endpoints)
    })
}

/// Cuckaroo rule: each proof edge contributes `(u, v)` at positions `2n, 2n+1`
fn check_undirected(proof: &[u32], node_mask: u64, endpoints: impl Fn(u64) -> u64) -> CycleStatus {
    let size = proof.len();
    let mut uvs = vec![0u64; 2 * size];
    let (mut xor0, mut xor1) = (0u64, 0u64);

    for (n, &edge) in proof.iter().enumerate() {
        let edge = u64::from(edge);
        if edge > EDGEMASK {
            return CycleStatus::TooBig;
        }
        if n > 0 && edge <= u64::from(proof[n - 1]) {
            return CycleStatus::TooSmall;
        }
        let uv = endpoints(edge);
        uvs[2 * n] = uv & node_mask;
        uvs[2 * n + 1] = (uv >> 32) & node_mask;
        xor0 ^= uvs[2 * n];
        xor1 ^= uvs[2 * n + 1];
    }
    if xor0 | xor1 != 0 {
        return CycleStatus::NonMatching;
    }

    let len = 2 * size;
    let mut n = 0;
    let mut i = 0;
    loop {
        let mut j = i;
        let mut k = i;
        loop {
            k = (k + 2) % len;
            if k == i {
                break;
            }
            if uvs[k] == uvs[i] {
                if j != i {
                    return CycleStatus::Branch;
                }
                j = k;
            }
        }
        if j == i {
            return CycleStatus::DeadEnd;
        }
        i = j ^ 1;
        n += 1;
        if i == 0 {
            break;
        }
    }

    if n == size { CycleStatus::Ok } else { CycleStatus::ShortCycle }
}

/// Cuckarood rule: edge direction is the low index bit, directions must balance
fn check_directed(proof: &[u32], node_mask: u64, endpoints: impl Fn(u64) -> u64) -> CycleStatus {
    let size = proof.len();
    let mut uvs = vec![0u64; 2 * size];
    let mut ndir = [0usize; 2];
    let (mut xor0, mut xor1) = (0u64, 0u64);

    for (n, &edge) in proof.iter().enumerate() {
        let edge = u64::from(edge);
        let dir = (edge & 1) as usize;
        if ndir[dir] >= size / 2 {
            return CycleStatus::Unbalanced;
        }
        if edge > EDGEMASK {
            return CycleStatus::TooBig;
        }
        if n > 0 && edge <= u64::from(proof[n - 1]) {
            return CycleStatus::TooSmall;
        }
        let uv = endpoints(edge);
        let idx = 4 * ndir[dir] + 2 * dir;
        uvs[idx] = uv & node_mask;
        uvs[idx + 1] = (uv >> 32) & node_mask;
        xor0 ^= uvs[idx];
        xor1 ^= uvs[idx + 1];
        ndir[dir] += 1;
    }
    if xor0 | xor1 != 0 {
        return CycleStatus::NonMatching;
    }

    let mut n = 0;
    let mut i = 0;
    loop {
        let mut j = i;
        for k in (((i % 4) ^ 2)..2 * size).step_by(4) {
            if uvs[k] == uvs[i] {
                if j != i {
                    return CycleStatus::Branch;
                }
                j = k;
            }
        }
        if j == i {
            return CycleStatus::DeadEnd;
        }
        i = j ^ 1;
        n += 1;
        if i == 0 {
            break;
        }
    }

    if n == size { CycleStatus::Ok } else { CycleStatus::ShortCycle }
}
