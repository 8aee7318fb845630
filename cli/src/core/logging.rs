//! # cmdgate Logging Setup
//!
//! File: cli/src/core/logging.rs
//!
//! Installs the global `tracing` subscriber. Output goes to the configured
//! log file (opened in append mode, created if needed) or to stderr when no
//! file is configured. `RUST_LOG` takes precedence over the verbosity flag.
//!
use crate::core::error::{GatewayError, Result};
use anyhow::anyhow;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

/// Maps the `-v` count to a default filter level.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Opens (or creates) the log file for appending.
pub fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| {
            anyhow!(GatewayError::LogFile {
                path: path.to_path_buf(),
                source,
            })
        })
}

/// # Initialize Logging (`init_logging`)
///
/// Builds the `fmt` subscriber with an `EnvFilter` and installs it globally.
/// ANSI colours are disabled when writing to a file.
pub fn init_logging(verbose: u8, logfile: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    let (writer, ansi) = match logfile {
        Some(path) => {
            let file = open_log_file(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
