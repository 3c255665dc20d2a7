// src/main.rs
use clap::Parser;
use pow_oracle::cli::{Action, BenchOptions, BenchTarget, ConfigOptions, VerifyOptions};
use pow_oracle::oracle::chained::chained_hash;
use pow_oracle::utils::logging::{init_bench_logging, parse_level};
use pow_oracle::{self, *};
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main entry point for the oracle
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(OracleError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments and loads the optional config file
/// 2. Delegates to the subcommand handler
/// 3. Prints the verdict as JSON on stdout
fn main() -> Result<(), OracleError> {
    let cli = cli::Commands::parse();
    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    match cli.action {
        Action::Bench(opts) => run_benchmark(&config, opts),
        Action::Config(opts) => generate_config(opts),
        Action::Verify(opts) => {
            init_logging(parse_level(&config.log_level));
            verify_lines(&Oracle::new(&config), opts)
        }
        action => {
            init_logging(parse_level(&config.log_level));
            let oracle = Oracle::new(&config);
            if let Some(request) = action.request()? {
                let verdict = oracle.verify(&request)?;
                println!("{}", verdict.to_json()?);
            }
            Ok(())
        }
    }
}

/// Verifies newline-delimited JSON requests
///
/// Each input line produces one output line: the verdict, or an `error`
/// object. Blank lines are skipped.
fn verify_lines(oracle: &Oracle, opts: VerifyOptions) -> Result<(), OracleError> {
    let reader: Box<dyn BufRead> = match opts.input {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = serde_json::from_str::<VerifyRequest>(&line)
            .map_err(OracleError::from)
            .and_then(|request| oracle.verify(&request));

        match outcome {
            Ok(verdict) => println!("{}", verdict.to_json()?),
            Err(e) => {
                log::warn!("Request failed: {}", e);
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
        }
    }

    log::info!("{}", serde_json::to_string(&oracle.stats())?);
    Ok(())
}

/// Runs benchmarks against a shared oracle
///
/// # Operations
/// 1. Initializes benchmark-specific logging
/// 2. Spawns worker threads hashing through the oracle
/// 3. Collects and reports performance statistics
fn run_benchmark(config: &Config, opts: BenchOptions) -> Result<(), OracleError> {
    init_bench_logging();

    let oracle = Arc::new(Oracle::new(config));
    let reporter = StatsReporter::with_stats(oracle.stats_handle(), Duration::from_secs(5));
    let hash_sender = reporter.hash_sender();
    reporter.start_reporting();

    // Fail fast on a target the linked backends cannot run
    bench_once(&oracle, opts.algorithm, 0)?;

    log::info!(
        "Starting {} benchmark for {} seconds on {} threads",
        opts.algorithm,
        opts.duration,
        opts.threads
    );

    let start_time = Instant::now();
    let handles: Vec<_> = (0..opts.threads)
        .map(|thread| {
            let oracle = Arc::clone(&oracle);
            let sender = hash_sender.clone();
            let target = opts.algorithm;
            let duration = opts.duration;
            std::thread::spawn(move || {
                let mut nonce = (thread as u64) << 32;
                let mut last_log = Instant::now();
                let mut hashes = 0u64;

                while start_time.elapsed().as_secs() < duration {
                    if let Err(e) = bench_once(&oracle, target, nonce) {
                        log::error!("Benchmark hash failed: {}", e);
                        break;
                    }
                    nonce += 1;
                    hashes += 1;
                    if sender.send(1).is_err() {
                        break;
                    }

                    // Log progress every second
                    if last_log.elapsed().as_secs() >= 1 {
                        log::debug!(
                            "Thread {}: {:.1} H/s",
                            thread,
                            hashes as f64 / last_log.elapsed().as_secs_f64()
                        );
                        hashes = 0;
                        last_log = Instant::now();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            log::error!("Benchmark thread panicked");
        }
    }
    drop(hash_sender);

    // Let the listener drain the channel
    std::thread::sleep(Duration::from_millis(100));

    let snapshot = oracle.stats();
    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", snapshot.hashes_total);
    log::info!(
        "Average hashrate: {:.2} H/s",
        snapshot.hashes_total as f64 / start_time.elapsed().as_secs_f64()
    );
    println!("{}", serde_json::to_string(&snapshot)?);
    log::logger().flush();

    Ok(())
}

/// One benchmark iteration; the nonce is mixed into the input
fn bench_once(oracle: &Oracle, target: BenchTarget, nonce: u64) -> Result<(), OracleError> {
    let mut blob = [0u8; 76];
    blob[39..47].copy_from_slice(&nonce.to_le_bytes());

    match target {
        BenchTarget::Cn0 => oracle.cryptonight(HashFamily::CryptoNight, &blob, 0, None).map(drop),
        BenchTarget::Cn1 => oracle.cryptonight(HashFamily::CryptoNight, &blob, 1, None).map(drop),
        BenchTarget::Chukwa => oracle.cryptonight(HashFamily::Argon2, &blob, 0, None).map(drop),
        BenchTarget::RandomX => oracle.randomx(&blob, &[0u8; 32], 0).map(drop),
        BenchTarget::K12 => {
            oracle.k12(&blob);
            Ok(())
        }
        BenchTarget::KawPow => oracle
            .kawpow(&[0u8; 32], &nonce.to_be_bytes(), &[0u8; 32])
            .map(drop),
        BenchTarget::Sha3x => {
            let expected = hex::encode(chained_hash(nonce, &blob[..32], &[]));
            oracle
                .validate_chained(&format!("{:x}", nonce), &expected, &blob[..32], &[], u64::MAX)
                .map(drop)
        }
    }
}

/// Generates configuration template file
///
/// # Arguments
/// * `opts` - Configuration generation options
fn generate_config(opts: ConfigOptions) -> Result<(), OracleError> {
    let template = config::generate_template();
    std::fs::write(&opts.output, template)?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
