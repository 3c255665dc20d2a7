// src/oracle/algorithm/k12.rs
use crate::types::Digest;
use k12::KangarooTwelve;
use k12::digest::{ExtendableOutput, Update};

/// KangarooTwelve with empty customization, truncated to 32 bytes
pub fn k12(payload: &[u8]) -> Digest {
    let mut hasher = KangarooTwelve::default();
    hasher.update(payload);

    let mut out = [0u8; 32];
    hasher.finalize_xof_into(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn empty_message_vector() {
        // KangarooTwelve(M="", C="", 32)
        assert_eq!(
            k12(b""),
            hex!("1ac2d450fc3b4205d19da7bfca1b37513c0803577ac7167f06fe2ce1f0ef39e5")
        );
    }
}
