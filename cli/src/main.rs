//! # cmdgate Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! cmdgate exposes a fixed set of shell commands, declared in a TOML file,
//! over HTTP. This file handles:
//! - Command-line argument parsing using Clap
//! - Loading and validating the configuration
//! - Setting up the logging system (log file or stderr)
//! - Starting the HTTP server
//!
//! ## Startup sequence
//!
//! Each step has its own exit code so that supervisors can tell failures apart:
//! 1. Parse args; the configuration path is required (exit 1)
//! 2. Load the configuration file (exit 2)
//! 3. Open the log file and install the subscriber (exit 3)
//! 4. Check that every command executable exists (exit 4)
//! 5. Bind the listener and serve (exit 5)
//!
//! ## Examples
//!
//! ```bash
//! # Serve the commands declared in gateway.toml
//! cmdgate gateway.toml
//!
//! # Validate the file and list its commands without serving
//! cmdgate --check gateway.toml
//!
//! # Then, from a client
//! curl 'http://127.0.0.1:8080/echo?name=world'
//! ```
//!
use clap::Parser;
use std::path::{Path, PathBuf};

mod common; // Process execution
mod core; // Configuration, errors, logging, registry, substitution
mod srv; // HTTP server and request dispatch

use crate::core::config;
use crate::core::error::{exit_code_for, GatewayError, Result};
use crate::core::logging;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "cmdgate",
    about = "Expose pre-declared shell commands over HTTP",
    long_about = "Runs the commands declared in a TOML file on `GET /{command}` requests\n\
                  and returns their exit code and standard output as JSON.",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    config: Option<PathBuf>,

    /// Validate the configuration, list the commands and exit.
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(GatewayError::MissingConfigArgument.exit_code());
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli).await {
        tracing::error!("Startup failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .ok_or(GatewayError::MissingConfigArgument)?;

    let config = config::load_config(&config_path)?;

    // Validation only: no log file, no listener.
    if cli.check {
        config::validate_commands(&config)?;
        print_commands(&config_path, &config);
        return Ok(());
    }

    // From here on, log output goes to the configured file (or stderr).
    logging::init_logging(cli.verbose, config.general.logfile.as_deref())?;
    tracing::info!("Starting cmdgate {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("config={:?}", config);

    // Every executable must be present before the listener is bound.
    config::validate_commands(&config)?;

    srv::handle_srv(&config).await
}

fn print_commands(config_path: &Path, config: &config::ServerConfig) {
    println!(
        "Configuration OK: {} ({} command(s), listening on {})",
        config_path.display(),
        config.commands.len(),
        config.network.bind_address()
    );
    for command in &config.commands {
        println!(
            "  {:<16} {} {}",
            command.name,
            command.path.display(),
            command.args.join(" ")
        );
    }
}
