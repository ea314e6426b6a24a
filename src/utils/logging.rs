// src/utils/logging.rs
//! Logging configuration
//!
//! Sets up `env_logger` with the miner's line format:
//! `[timestamp LEVEL module:line] message`, written to stdout.
//! An explicit `RUST_LOG` always wins over the verbosity flag.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes logging, raising the default level with each `-v`
///
/// * `0` - Info
/// * `1` - Debug
/// * `2+` - Trace (every attempted nonce is logged)
pub fn init_logging(verbosity: u8) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(level_for(verbosity));
    } else {
        builder.parse_env("RUST_LOG");
    }

    // A second init (e.g. from tests) is harmless.
    let _ = builder.try_init();
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
