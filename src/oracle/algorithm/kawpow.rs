// src/oracle/algorithm/kawpow.rs
//! KawPow final hash
//!
//! Given the miner-reported mix hash, the block's final hash is two
//! keccak-f[800] permutations away and needs no DAG. Checking the mix hash
//! itself against the DAG is left to the pool.

use crate::types::Digest;

const ROUNDS: usize = 22;

const RC: [u32; ROUNDS] = [
    0x0000_0001, 0x0000_8082, 0x0000_808A, 0x8000_8000, 0x0000_808B, 0x8000_0001,
    0x8000_8081, 0x0000_8009, 0x0000_008A, 0x0000_0088, 0x8000_8009, 0x8000_000A,
    0x8000_808B, 0x0000_008B, 0x0000_8089, 0x0000_8003, 0x0000_8002, 0x0000_0080,
    0x0000_800A, 0x8000_000A, 0x8000_8081, 0x0000_8080,
];

const ROTC: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

const PILN: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// "rAVENCOINKAWPOW", one character per word
const PADDING: [u32; 15] = [
    0x72, 0x41, 0x56, 0x45, 0x4E, 0x43, 0x4F, 0x49, 0x4E, 0x4B, 0x41, 0x57, 0x50, 0x4F, 0x57,
];

/// keccak-f[800] permutation
pub fn keccak_f800(st: &mut [u32; 25]) {
    let mut bc = [0u32; 5];

    for rc in RC {
        // theta
        for x in 0..5 {
            bc[x] = st[x] ^ st[x + 5] ^ st[x + 10] ^ st[x + 15] ^ st[x + 20];
        }
        for x in 0..5 {
            let t = bc[(x + 4) % 5] ^ bc[(x + 1) % 5].rotate_left(1);
            for y in (0..25).step_by(5) {
                st[y + x] ^= t;
            }
        }

        // rho pi
        let mut t = st[1];
        for (rot, &j) in ROTC.iter().zip(PILN.iter()) {
            let next = st[j];
            st[j] = t.rotate_left(*rot);
            t = next;
        }

        // chi
        for y in (0..25).step_by(5) {
            bc.copy_from_slice(&st[y..y + 5]);
            for x in 0..5 {
                st[y + x] ^= !bc[(x + 1) % 5] & bc[(x + 2) % 5];
            }
        }

        st[0] ^= rc;
    }
}

/// Final KawPow hash from header hash, nonce and mix hash
///
/// # Arguments
/// * `header_hash` - 32-byte header hash, read as little-endian words
/// * `nonce` - Host-order nonce
/// * `mix_hash` - 32-byte mix hash reported by the miner
pub fn kawpow_final(header_hash: &Digest, nonce: u64, mix_hash: &Digest) -> Digest {
    let header = words(header_hash);
    let mix = words(mix_hash);

    let mut state = [0u32; 25];
    state[..8].copy_from_slice(&header);
    state[8] = nonce as u32;
    state[9] = (nonce >> 32) as u32;
    state[10..].copy_from_slice(&PADDING);
    keccak_f800(&mut state);

    let mut seed = [0u32; 8];
    seed.copy_from_slice(&state[..8]);

    let mut state = [0u32; 25];
    state[..8].copy_from_slice(&seed);
    state[8..16].copy_from_slice(&mix);
    state[16..].copy_from_slice(&PADDING[..9]);
    keccak_f800(&mut state);

    let mut out = [0u8; 32];
    for (chunk, w) in out.chunks_exact_mut(4).zip(state.iter()) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
    out
}

fn words(bytes: &Digest) -> [u32; 8] {
    let mut out = [0u32; 8];
    for (w, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn keccak_f800_zero_state() {
        let mut st = [0u32; 25];
        keccak_f800(&mut st);
        assert_eq!(
            st,
            [
                0xe531d45d, 0xf404c6fb, 0x23a0bf99, 0xf1f8452f, 0x51ffd042, 0xe539f578, 0xf00b80a7,
                0xaf973664, 0xbf5af34c, 0x227a2424, 0x88172715, 0x9f685884, 0xb15cd054, 0x1bf4fc0e,
                0x6166fa91, 0x1a9e599a, 0xa3970a1f, 0xab659687, 0xafab8d68, 0xe74b1015, 0x34001a98,
                0x4119eff3, 0x930a0e76, 0x87b28070, 0x11efe996,
            ]
        );
    }

    #[test]
    fn final_hash_known_answers() {
        assert_eq!(
            kawpow_final(&[0u8; 32], 0, &[0u8; 32]),
            hex!("eca8b4f31e736adb983cc905a06872eb3faebafe85a7b275b55e5ede41b5b019")
        );

        let header = hex!("ffeeddccbbaa9988776655443322110000112233445566778899aabbccddeeff");
        let mut mix = [0u8; 32];
        for (i, b) in mix.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_eq!(
            kawpow_final(&header, 0x1234_5678_9abc_def0, &mix),
            hex!("6892913c281df24452faf0b28491750dcf155fa302b60e906440d45f3530a6aa")
        );
    }

    #[test]
    fn permutation_is_not_identity_on_zero_state() {
        let mut st = [0u32; 25];
        keccak_f800(&mut st);
        assert_ne!(st, [0u32; 25]);
        let first = st;
        keccak_f800(&mut st);
        assert_ne!(st, first);
    }

    #[test]
    fn final_hash_depends_on_every_input() {
        let header = [0xAAu8; 32];
        let mix = [0x55u8; 32];
        let base = kawpow_final(&header, 0x1234_5678_9abc_def0, &mix);

        assert_eq!(base, kawpow_final(&header, 0x1234_5678_9abc_def0, &mix));
        assert_ne!(base, kawpow_final(&header, 0x1234_5678_9abc_def1, &mix));
        assert_ne!(base, kawpow_final(&header, 0x1234_5679_9abc_def0, &mix));
        assert_ne!(base, kawpow_final(&[0xABu8; 32], 0x1234_5678_9abc_def0, &mix));
        assert_ne!(base, kawpow_final(&header, 0x1234_5678_9abc_def0, &[0u8; 32]));
    }
}
