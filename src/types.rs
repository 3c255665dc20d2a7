// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte proof-of-work digest
pub type Digest = [u8; 32];

/// Digest families selected by a small variant integer
///
/// Each family resolves its variant id to a concrete [`AlgorithmId`]. Unknown
/// ids resolve to the family default so that new variant numbers from a pool
/// never turn into hard errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum HashFamily {
    /// CryptoNight (2 MiB scratchpad) and its derivatives, including GhostRider
    #[clap(name = "cn")]
    #[serde(rename = "cn")]
    CryptoNight,

    /// CryptoNight-Lite (1 MiB)
    #[clap(name = "cn-lite")]
    #[serde(rename = "cn-lite")]
    CryptoNightLite,

    /// CryptoNight-Heavy (4 MiB)
    #[clap(name = "cn-heavy")]
    #[serde(rename = "cn-heavy")]
    CryptoNightHeavy,

    /// CryptoNight-Pico (256 KiB)
    #[clap(name = "cn-pico")]
    #[serde(rename = "cn-pico")]
    CryptoNightPico,

    /// Argon2id based TurtleCoin-style hashes
    #[clap(name = "argon2")]
    #[serde(rename = "argon2")]
    Argon2,

    /// AstroBWT (Dero)
    #[clap(name = "astrobwt")]
    #[serde(rename = "astrobwt")]
    AstroBwt,
}

/// Concrete digest primitive behind a `(family, variant)` pair
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    Cn0,
    Cn1,
    CnFast,
    CnXao,
    CnRto,
    Cn2,
    CnHalf,
    CnGpu,
    CnR,
    CnRwz,
    CnZls,
    CnDouble,
    CnCcx,
    GhostRider,
    CnLite0,
    CnLite1,
    CnHeavy0,
    CnHeavyXhv,
    CnHeavyTube,
    CnPico0,
    Argon2Chukwa,
    Argon2Wrkz,
    Argon2ChukwaV2,
    AstroBwt,
    AstroBwtV2,
}

impl HashFamily {
    /// Resolves a wire variant id to a concrete algorithm
    ///
    /// # Arguments
    /// * `variant` - The variant integer sent by the host
    ///
    /// # Returns
    /// The matching [`AlgorithmId`], or [`HashFamily::default_algorithm`] for
    /// ids this build does not know about
    pub fn resolve(self, variant: i32) -> AlgorithmId {
        self.resolve_exact(variant)
            .unwrap_or_else(|| self.default_algorithm())
    }

    /// Looks a variant id up without falling back
    ///
    /// # Returns
    /// `None` for ids outside the family table
    pub fn resolve_exact(self, variant: i32) -> Option<AlgorithmId> {
        use AlgorithmId::*;

        let id = match (self, variant) {
            (HashFamily::CryptoNight, 0) => Cn0,
            (HashFamily::CryptoNight, 1) => Cn1,
            (HashFamily::CryptoNight, 4) => CnFast,
            (HashFamily::CryptoNight, 6) => CnXao,
            (HashFamily::CryptoNight, 7) => CnRto,
            (HashFamily::CryptoNight, 8) => Cn2,
            (HashFamily::CryptoNight, 9) => CnHalf,
            (HashFamily::CryptoNight, 11) => CnGpu,
            (HashFamily::CryptoNight, 13) => CnR,
            (HashFamily::CryptoNight, 14) => CnRwz,
            (HashFamily::CryptoNight, 15) => CnZls,
            (HashFamily::CryptoNight, 16) => CnDouble,
            (HashFamily::CryptoNight, 17) => CnCcx,
            (HashFamily::CryptoNight, 18) => GhostRider,
            (HashFamily::CryptoNightLite, 0) => CnLite0,
            (HashFamily::CryptoNightLite, 1) => CnLite1,
            (HashFamily::CryptoNightHeavy, 0) => CnHeavy0,
            (HashFamily::CryptoNightHeavy, 1) => CnHeavyXhv,
            (HashFamily::CryptoNightHeavy, 2) => CnHeavyTube,
            (HashFamily::CryptoNightPico, 0) => CnPico0,
            (HashFamily::Argon2, 0) => Argon2Chukwa,
            (HashFamily::Argon2, 1) => Argon2Wrkz,
            (HashFamily::Argon2, 2) => Argon2ChukwaV2,
            (HashFamily::AstroBwt, 0) => AstroBwt,
            (HashFamily::AstroBwt, 1) => AstroBwtV2,
            _ => return None,
        };
        Some(id)
    }

    /// The algorithm used when a variant id is not recognised
    pub fn default_algorithm(self) -> AlgorithmId {
        match self {
            HashFamily::CryptoNight => AlgorithmId::CnR,
            HashFamily::CryptoNightLite => AlgorithmId::CnLite1,
            HashFamily::CryptoNightHeavy => AlgorithmId::CnHeavy0,
            HashFamily::CryptoNightPico => AlgorithmId::CnPico0,
            HashFamily::Argon2 => AlgorithmId::Argon2Chukwa,
            HashFamily::AstroBwt => AlgorithmId::AstroBwt,
        }
    }

    /// Whether the raw variant id needs a block height
    ///
    /// Only the CryptoNight-R class (ids 12 and 13) generates its random math
    /// program from the height. The check is on the raw id, before resolution.
    pub fn requires_height(self, variant: i32) -> bool {
        self == HashFamily::CryptoNight && matches!(variant, 12 | 13)
    }
}

impl AlgorithmId {
    /// The family this algorithm belongs to
    pub fn family(self) -> HashFamily {
        use AlgorithmId::*;

        match self {
            Cn0 | Cn1 | CnFast | CnXao | CnRto | Cn2 | CnHalf | CnGpu | CnR | CnRwz | CnZls
            | CnDouble | CnCcx | GhostRider => HashFamily::CryptoNight,
            CnLite0 | CnLite1 => HashFamily::CryptoNightLite,
            CnHeavy0 | CnHeavyXhv | CnHeavyTube => HashFamily::CryptoNightHeavy,
            CnPico0 => HashFamily::CryptoNightPico,
            Argon2Chukwa | Argon2Wrkz | Argon2ChukwaV2 => HashFamily::Argon2,
            AstroBwt | AstroBwtV2 => HashFamily::AstroBwt,
        }
    }

    /// Canonical pool-side name, e.g. `cn/r` or `argon2/chukwa`
    pub fn name(self) -> &'static str {
        use AlgorithmId::*;

        match self {
            Cn0 => "cn/0",
            Cn1 => "cn/1",
            CnFast => "cn/fast",
            CnXao => "cn/xao",
            CnRto => "cn/rto",
            Cn2 => "cn/2",
            CnHalf => "cn/half",
            CnGpu => "cn/gpu",
            CnR => "cn/r",
            CnRwz => "cn/rwz",
            CnZls => "cn/zls",
            CnDouble => "cn/double",
            CnCcx => "cn/ccx",
            GhostRider => "ghostrider",
            CnLite0 => "cn-lite/0",
            CnLite1 => "cn-lite/1",
            CnHeavy0 => "cn-heavy/0",
            CnHeavyXhv => "cn-heavy/xhv",
            CnHeavyTube => "cn-heavy/tube",
            CnPico0 => "cn-pico",
            Argon2Chukwa => "argon2/chukwa",
            Argon2Wrkz => "argon2/wrkz",
            Argon2ChukwaV2 => "argon2/chukwav2",
            AstroBwt => "astrobwt",
            AstroBwtV2 => "astrobwt/v2",
        }
    }
}

impl fmt::Display for HashFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFamily::CryptoNight => write!(f, "cn"),
            HashFamily::CryptoNightLite => write!(f, "cn-lite"),
            HashFamily::CryptoNightHeavy => write!(f, "cn-heavy"),
            HashFamily::CryptoNightPico => write!(f, "cn-pico"),
            HashFamily::Argon2 => write!(f, "argon2"),
            HashFamily::AstroBwt => write!(f, "astrobwt"),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cn" | "cryptonight" => Ok(HashFamily::CryptoNight),
            "cn-lite" | "cryptonight-lite" | "cryptonight_light" => Ok(HashFamily::CryptoNightLite),
            "cn-heavy" | "cryptonight-heavy" => Ok(HashFamily::CryptoNightHeavy),
            "cn-pico" | "cryptonight-pico" => Ok(HashFamily::CryptoNightPico),
            "argon2" => Ok(HashFamily::Argon2),
            "astrobwt" => Ok(HashFamily::AstroBwt),
            _ => Err(format!("Unknown hash family: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILIES: [HashFamily; 6] = [
        HashFamily::CryptoNight,
        HashFamily::CryptoNightLite,
        HashFamily::CryptoNightHeavy,
        HashFamily::CryptoNightPico,
        HashFamily::Argon2,
        HashFamily::AstroBwt,
    ];

    #[test]
    fn unknown_variants_fall_back_to_family_default() {
        for family in FAMILIES {
            for variant in [-1, 3, 99, i32::MAX] {
                if family == HashFamily::CryptoNight && variant == 3 {
                    continue;
                }
                assert_eq!(family.resolve(variant), family.default_algorithm());
            }
        }
    }

    #[test]
    fn cryptonight_table_matches_wire_ids() {
        let f = HashFamily::CryptoNight;
        assert_eq!(f.resolve(0), AlgorithmId::Cn0);
        assert_eq!(f.resolve(8), AlgorithmId::Cn2);
        assert_eq!(f.resolve(13), AlgorithmId::CnR);
        assert_eq!(f.resolve(18), AlgorithmId::GhostRider);
        // 12 is accepted by the height rule but has no dedicated primitive
        assert_eq!(f.resolve(12), AlgorithmId::CnR);
        assert_eq!(f.resolve(3), AlgorithmId::CnR);
    }

    #[test]
    fn exact_lookup_has_no_fallback() {
        assert_eq!(HashFamily::Argon2.resolve_exact(2), Some(AlgorithmId::Argon2ChukwaV2));
        assert_eq!(HashFamily::Argon2.resolve_exact(3), None);
        assert_eq!(HashFamily::CryptoNight.resolve_exact(12), None);
    }

    #[test]
    fn resolved_algorithms_stay_in_their_family() {
        for family in FAMILIES {
            for variant in -2..24 {
                assert_eq!(family.resolve(variant).family(), family);
            }
        }
    }

    #[test]
    fn height_is_required_only_for_cn_r_class() {
        assert!(HashFamily::CryptoNight.requires_height(12));
        assert!(HashFamily::CryptoNight.requires_height(13));
        assert!(!HashFamily::CryptoNight.requires_height(1));
        assert!(!HashFamily::CryptoNightLite.requires_height(13));
    }

    #[test]
    fn family_names_round_trip() {
        for family in FAMILIES {
            assert_eq!(family.to_string().parse::<HashFamily>().unwrap(), family);
        }
        assert!("sha256".parse::<HashFamily>().is_err());
    }
}
