// src/cli/commands.rs
use crate::oracle::{ChainedSubmission, CycleVariant, VerifyRequest};
use crate::types::HashFamily;
use crate::utils::error::OracleError;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// PoW Oracle CLI - multi-family proof-of-work verification
///
/// Byte arguments are hex. Results are printed to stdout as JSON, logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "pow-oracle")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the oracle application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// CryptoNight, Argon2 or AstroBWT family digest
    Hash(HashOptions),

    /// RandomX digest
    #[command(name = "randomx")]
    RandomX(RandomXOptions),

    /// KangarooTwelve digest
    K12(K12Options),

    /// Verify a cuckoo-cycle proof
    Cycle(CycleOptions),

    /// Fingerprint a cuckoo-cycle proof
    Fingerprint(FingerprintOptions),

    /// KawPow final hash
    #[command(name = "kawpow")]
    KawPow(KawPowOptions),

    /// Ethash light verification
    Ethash(EpochOptions),

    /// Etchash light verification
    Etchash(EpochOptions),

    /// Verify an Equihash solution
    Equihash(EquihashOptions),

    /// Validate a chained SHA3 submission
    Sha3x(Sha3xOptions),

    /// Verify JSON requests, one per line
    Verify(VerifyOptions),

    /// Run performance benchmarks
    Bench(BenchOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for family digests
#[derive(Parser, Debug)]
pub struct HashOptions {
    /// Digest family
    #[arg(short, long)]
    pub family: HashFamily,

    /// Wire variant id (unknown ids use the family default)
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub variant: i32,

    /// Block height, required for the CN/R class (variant ids 12 and 13)
    #[arg(long)]
    pub height: Option<u64>,

    /// Hashing blob as hex
    pub payload: String,
}

/// Options for RandomX digests
#[derive(Parser, Debug)]
pub struct RandomXOptions {
    /// Wire variant id (unknown ids use Monero)
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub variant: i32,

    /// 32-byte seed hash as hex
    #[arg(short, long)]
    pub seed: String,

    /// Hashing blob as hex
    pub payload: String,
}

/// Options for KangarooTwelve
#[derive(Parser, Debug)]
pub struct K12Options {
    /// Input as hex
    pub payload: String,
}

/// Options for cycle verification
#[derive(Parser, Debug)]
pub struct CycleOptions {
    /// Proof size variant
    #[arg(short, long)]
    pub variant: CycleVariant,

    /// Pre-PoW header as hex
    #[arg(long)]
    pub header: String,

    /// Comma-separated edge indices
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub proof: Vec<u32>,
}

/// Options for cycle fingerprints
#[derive(Parser, Debug)]
pub struct FingerprintOptions {
    /// Proof size variant
    #[arg(short, long)]
    pub variant: CycleVariant,

    /// Comma-separated edge indices
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub proof: Vec<u32>,
}

/// Options for the KawPow final hash
#[derive(Parser, Debug)]
pub struct KawPowOptions {
    /// 32-byte header hash as hex
    #[arg(long)]
    pub header_hash: String,

    /// 8-byte big-endian nonce as hex
    #[arg(short, long)]
    pub nonce: String,

    /// 32-byte mix hash as hex
    #[arg(short, long)]
    pub mix_hash: String,
}

/// Options for Ethash and Etchash
#[derive(Parser, Debug)]
pub struct EpochOptions {
    /// 32-byte header hash as hex
    #[arg(long)]
    pub header_hash: String,

    /// 8-byte big-endian nonce as hex
    #[arg(short, long)]
    pub nonce: String,

    /// Block height
    #[arg(long)]
    pub height: u64,
}

/// Options for Equihash
#[derive(Parser, Debug)]
pub struct EquihashOptions {
    /// Equihash N
    #[arg(short, default_value_t = 200)]
    pub n: u32,

    /// Equihash K
    #[arg(short, default_value_t = 9)]
    pub k: u32,

    /// Personalization prefix, at most 8 bytes
    #[arg(short, long, default_value = "ZcashPoW")]
    pub personalization: String,

    /// 140-byte header as hex
    #[arg(long)]
    pub header: String,

    /// Solution as hex
    #[arg(short, long)]
    pub solution: String,
}

/// Options for chained SHA3
#[derive(Parser, Debug)]
pub struct Sha3xOptions {
    /// Nonce as hex, optional 0x prefix
    #[arg(short, long)]
    pub nonce: String,

    /// Claimed final hash as lowercase hex
    #[arg(short, long)]
    pub expected: String,

    /// Mining hash as hex
    #[arg(short, long)]
    pub mining_hash: String,

    /// Extra PoW bytes as hex
    #[arg(short, long, default_value = "")]
    pub pow_bytes: String,

    /// Target difficulty
    #[arg(short, long)]
    pub target: u64,
}

/// Options for batch verification of JSON requests
#[derive(Parser, Debug)]
pub struct VerifyOptions {
    /// File with one JSON request per line (stdin when omitted)
    pub input: Option<PathBuf>,
}

/// Algorithms the benchmark can drive
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BenchTarget {
    /// CryptoNight cn/0
    #[clap(name = "cn/0")]
    Cn0,
    /// CryptoNight cn/1
    #[clap(name = "cn/1")]
    Cn1,
    /// Argon2id Chukwa
    #[clap(name = "chukwa")]
    Chukwa,
    /// RandomX (Monero)
    #[clap(name = "randomx")]
    RandomX,
    /// KangarooTwelve
    #[clap(name = "k12")]
    K12,
    /// KawPow final hash
    #[clap(name = "kawpow")]
    KawPow,
    /// Chained SHA3
    #[clap(name = "sha3x")]
    Sha3x,
}

impl fmt::Display for BenchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BenchTarget::Cn0 => "cn/0",
            BenchTarget::Cn1 => "cn/1",
            BenchTarget::Chukwa => "chukwa",
            BenchTarget::RandomX => "randomx",
            BenchTarget::K12 => "k12",
            BenchTarget::KawPow => "kawpow",
            BenchTarget::Sha3x => "sha3x",
        };
        write!(f, "{}", name)
    }
}

/// Options for running benchmarks
#[derive(Parser, Debug)]
pub struct BenchOptions {
    /// Algorithm to benchmark
    #[arg(short, long)]
    pub algorithm: BenchTarget,

    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}

impl Action {
    /// Converts a single-shot verification command into a request
    ///
    /// # Returns
    /// - `Ok(Some(VerifyRequest))` - For the per-family commands
    /// - `Ok(None)` - For `verify`, `bench` and `config`
    /// - `Err(OracleError::InvalidArgument)` - Malformed hex argument
    pub fn request(&self) -> Result<Option<VerifyRequest>, OracleError> {
        let request = match self {
            Action::Hash(o) => VerifyRequest::Hash {
                family: o.family,
                variant: o.variant,
                payload: hex::decode(&o.payload)?,
                height: o.height,
            },
            Action::RandomX(o) => VerifyRequest::RandomX {
                payload: hex::decode(&o.payload)?,
                seed_hash: hex::decode(&o.seed)?,
                variant: o.variant,
            },
            Action::K12(o) => VerifyRequest::K12 {
                payload: hex::decode(&o.payload)?,
            },
            Action::Cycle(o) => VerifyRequest::Cycle {
                variant: o.variant,
                header: hex::decode(&o.header)?,
                proof: o.proof.clone(),
            },
            Action::Fingerprint(o) => VerifyRequest::Fingerprint {
                variant: o.variant,
                proof: o.proof.clone(),
            },
            Action::KawPow(o) => VerifyRequest::KawPow {
                header_hash: hex::decode(&o.header_hash)?,
                nonce: hex::decode(&o.nonce)?,
                mix_hash: hex::decode(&o.mix_hash)?,
            },
            Action::Ethash(o) => VerifyRequest::Ethash {
                header_hash: hex::decode(&o.header_hash)?,
                nonce: hex::decode(&o.nonce)?,
                height: o.height,
            },
            Action::Etchash(o) => VerifyRequest::Etchash {
                header_hash: hex::decode(&o.header_hash)?,
                nonce: hex::decode(&o.nonce)?,
                height: o.height,
            },
            Action::Equihash(o) => VerifyRequest::Equihash {
                header: hex::decode(&o.header)?,
                solution: hex::decode(&o.solution)?,
                personalization: o.personalization.clone(),
                n: o.n,
                k: o.k,
            },
            Action::Sha3x(o) => VerifyRequest::Sha3x(ChainedSubmission {
                nonce_hex: o.nonce.clone(),
                expected_hex: o.expected.clone(),
                mining_hash: hex::decode(&o.mining_hash)?,
                pow_bytes: hex::decode(&o.pow_bytes)?,
                target: o.target,
            }),
            Action::Verify(_) | Action::Bench(_) | Action::Config(_) => return Ok(None),
        };
        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Commands::try_parse_from(std::iter::once("pow-oracle").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn hash_command_builds_request() {
        let cli = parse(&["hash", "--family", "cn-lite", "-v", "-1", "0a0b"]);
        let req = cli.action.request().unwrap().unwrap();
        assert_eq!(
            req,
            VerifyRequest::Hash {
                family: HashFamily::CryptoNightLite,
                variant: -1,
                payload: vec![0x0a, 0x0b],
                height: None,
            }
        );
    }

    #[test]
    fn cycle_proof_is_comma_separated() {
        let cli = parse(&["cycle", "-v", "c29v", "--header", "00", "-p", "1,2,3"]);
        match cli.action.request().unwrap().unwrap() {
            VerifyRequest::Cycle { variant, proof, .. } => {
                assert_eq!(variant, CycleVariant::C29v);
                assert_eq!(proof, vec![1, 2, 3]);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn bad_hex_is_invalid_argument() {
        let cli = parse(&["k12", "xyz"]);
        assert!(matches!(cli.action.request(), Err(OracleError::InvalidArgument(_))));
    }

    #[test]
    fn global_config_and_non_request_actions() {
        let cli = parse(&["bench", "-a", "cn/0", "-d", "1", "--config", "oracle.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("oracle.toml")));
        assert!(cli.action.request().unwrap().is_none());
    }
}
