// src/main.rs
use clap::Parser;
use hashcash_miner_rs::miner::algorithm;
use hashcash_miner_rs::*;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Main entry point for the hashcash miner
///
/// Setup errors (bad configuration, unavailable payload) print a diagnostic
/// to stderr and exit with status 1. A race that ends without a nonce is not
/// an error.
fn main() -> ExitCode {
    let cli = cli::Commands::parse();

    let verbosity = match cli.action {
        cli::Action::Benchmark(_) => cli.verbose.max(1),
        _ => cli.verbose,
    };
    init_logging(verbosity);

    let outcome = match cli.action {
        cli::Action::Mine(opts) => mine(opts),
        cli::Action::Benchmark(opts) => run_benchmark(opts),
        cli::Action::Config(opts) => generate_config(opts),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs a full mining race
///
/// # Operations
/// 1. Loads configuration and applies CLI overrides
/// 2. Validates race parameters before any network or hashing work
/// 3. Fetches the payload and builds the block header
/// 4. Races the workers, cancelling on Ctrl-C
/// 5. Prints the report
fn mine(opts: cli::MineOptions) -> Result<(), MinerError> {
    let mut config = match &opts.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    // Apply CLI overrides
    if let Some(difficulty) = opts.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(workers) = opts.workers {
        config.workers = workers;
    }
    if let Some(algo) = opts.algorithm {
        config.algorithm = algo;
    }
    if let Some(payload) = opts.payload {
        config.payload = payload;
    }
    if let Some(deadline) = opts.deadline {
        config.deadline_secs = Some(deadline);
    }

    let race_config = config.race_config()?;
    let source = config.payload_source()?;
    let algorithm = algorithm::create(config.algorithm);

    let rt = Runtime::new()?;
    let client = PayloadClient::new(config.fetch_timeout())?;
    let payload = rt.block_on(client.fetch(&source))?;
    log::info!("Fetched {} payload bytes from {}", payload.len(), source);
    log::debug!("Payload: {}", String::from_utf8_lossy(&payload));

    let header = Arc::new(
        BlockHeaderBuilder::new(Arc::clone(&algorithm))
            .previous_block_id(config.previous_block_id.as_str())
            .build(&payload)?,
    );
    log::info!("Merkle Root: {}", header.payload_fingerprint());

    let difficulty = race_config.difficulty;
    let mut coordinator = RaceCoordinator::new(race_config, algorithm);

    let canceller = coordinator.canceller();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let result = coordinator.run(Arc::clone(&header))?;
    let report = RaceReport::new(&result, &header, difficulty, config.algorithm);

    if opts.json {
        println!("{}", report.to_json()?);
    } else {
        println!("\n{}", report);
    }

    Ok(())
}

/// Measures digest throughput
///
/// Each rayon thread walks its own partition of the nonce space against a
/// dummy header until the duration elapses.
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    let algorithm = algorithm::create(opts.algorithm);
    let partitioner = WorkPartitioner::new(opts.threads as u64)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.threads)
        .build()
        .map_err(|e| MinerError::TaskError(format!("Failed to build thread pool: {}", e)))?;

    let mut reporter = stats::StatsReporter::new(Duration::from_secs(5));
    let reporting = reporter.start_reporting();
    let counter = reporter.hash_counter();

    log::info!(
        "Starting {} benchmark for {} seconds on {} threads",
        opts.algorithm,
        opts.duration,
        opts.threads
    );

    const CHECK_EVERY: u64 = 1024;
    let header = [0u8; 128];
    let duration = Duration::from_secs(opts.duration);
    let start_time = Instant::now();

    let results = pool.broadcast(|ctx| -> Result<(), MinerError> {
        let assignment = partitioner.assign(ctx.index() as u64)?;
        let mut hashes = 0u64;

        for nonce in assignment.nonces() {
            algorithm.hash(&header, nonce)?;
            hashes += 1;

            if hashes % CHECK_EVERY == 0 {
                counter.add(CHECK_EVERY);
                if start_time.elapsed() >= duration {
                    break;
                }
            }
        }
        counter.add(hashes % CHECK_EVERY);
        Ok(())
    });
    reporting.stop();
    results.into_iter().collect::<Result<Vec<()>, MinerError>>()?;

    // Report final results
    let stats = reporter.get_stats();
    let hw = reporter.get_hardware_stats();
    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", stats.hashes_total);
    log::info!("Average hashrate: {:.2} H/s", stats.avg_hashrate);
    log::info!("CPU usage at end: {:.1}%", hw.cpu_usage);
    log::logger().flush();

    Ok(())
}

/// Writes a configuration template file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    let template = config::generate_template();
    std::fs::write(&opts.output, template)?;
    log::info!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
