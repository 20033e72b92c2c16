// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! stdout belongs to the UI transport, so every log line goes to stderr or,
//! in debug mode, to a `debug.log` file in the working directory.
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use crate::utils::error::MinerError;
use env_logger::fmt::Formatter;
use env_logger::{Builder, Target};
use log::{LevelFilter, Record};
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Name of the log file written in debug mode
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Initializes the logging subsystem with sensible defaults
///
/// # Configuration
/// - Logs to stderr
/// - Default log level: Info
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    let mut builder = common_log_config();
    builder.target(Target::Stderr);
    apply_filter(&mut builder, LevelFilter::Info);
    builder.init();
}

/// Configures debug logging into `<working_dir>/debug.log`
///
/// The file is truncated on every start.
///
/// # Errors
/// Returns `MinerError::IoError` if the log file cannot be created
pub fn init_debug_logging(working_dir: &Path) -> Result<(), MinerError> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(working_dir.join(DEBUG_LOG_FILE))?;

    let mut builder = common_log_config();
    builder.target(Target::Pipe(Box::new(file)));
    apply_filter(&mut builder, LevelFilter::Debug);
    builder.init();
    Ok(())
}

/// `RUST_LOG` wins; otherwise `default` for this crate and warnings only for
/// the HTTP stack
fn apply_filter(builder: &mut Builder, default: LevelFilter) {
    match env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder
                .filter_level(default)
                .filter_module("reqwest", LevelFilter::Warn)
                .filter_module("hyper_util", LevelFilter::Warn);
        }
    }
}

/// Base builder shared by both targets
///
/// Lines look like `[1700000000 INFO  bloc_miner_control::stats::poller:120] message`.
fn common_log_config() -> Builder {
    let mut builder = Builder::new();
    builder.format(write_record);
    builder
}

fn write_record(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    let ts = buf.timestamp_seconds();
    writeln!(
        buf,
        "[{} {:<5} {}:{}] {}",
        ts,
        record.level(),
        record.module_path().unwrap_or_default(),
        record.line().unwrap_or(0),
        record.args()
    )
}
