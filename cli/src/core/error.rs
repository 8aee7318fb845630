//! # cmdgate Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout cmdgate. Only startup
//! can fail hard: once the listener is bound, per-request problems (unknown
//! command, spawn failure, serialization failure) are reported to the caller
//! instead of being raised.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `GatewayError`: A custom error enum using `thiserror`, one variant per
//!   fatal startup cause. Each variant maps to a distinct process exit code.
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !path.exists() {
//!     return Err(anyhow!(GatewayError::CommandNotFound { name, path }));
//! }
//!
//! // Pick the exit code for a failed startup step
//! let code = exit_code_for(&err);
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when the configuration file argument is missing.
pub const EXIT_MISSING_CONFIG_ARG: i32 = 1;
/// Exit code used when the configuration file cannot be read or parsed.
pub const EXIT_CONFIG_LOAD: i32 = 2;
/// Exit code used when the log file cannot be opened.
pub const EXIT_LOG_FILE: i32 = 3;
/// Exit code used when a configured executable is missing or not executable.
pub const EXIT_MISSING_COMMAND: i32 = 4;
/// Exit code used when the listener cannot be bound or the server fails.
pub const EXIT_SERVER: i32 = 5;

/// Custom error type for cmdgate startup failures.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("needs the TOML file as an argument")]
    MissingConfigArgument,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to open log file '{path}': {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to find command <name={name}, path={path}>")]
    CommandNotFound { name: String, path: PathBuf },

    #[error("Command <name={name}, path={path}> is not an executable file")]
    CommandNotExecutable { name: String, path: PathBuf },

    #[error("Server error: {0}")]
    Server(String),
}

impl GatewayError {
    /// Process exit code associated with this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            GatewayError::MissingConfigArgument => EXIT_MISSING_CONFIG_ARG,
            GatewayError::Config(_) => EXIT_CONFIG_LOAD,
            GatewayError::LogFile { .. } => EXIT_LOG_FILE,
            GatewayError::CommandNotFound { .. } | GatewayError::CommandNotExecutable { .. } => {
                EXIT_MISSING_COMMAND
            }
            GatewayError::Server(_) => EXIT_SERVER,
        }
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

/// # Exit Code For Error (`exit_code_for`)
///
/// Walks the error chain and returns the exit code of the first `GatewayError`
/// found. Errors that carry no `GatewayError` are treated as server failures,
/// since every earlier startup step tags its errors explicitly.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GatewayError>())
        .map_or(EXIT_SERVER, GatewayError::exit_code)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_error_display() {
        let config_err = GatewayError::Config("duplicate command 'echo'".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: duplicate command 'echo'"
        );

        let missing = GatewayError::CommandNotFound {
            name: "echo".into(),
            path: PathBuf::from("/nope/echo"),
        };
        assert_eq!(
            missing.to_string(),
            "Unable to find command <name=echo, path=/nope/echo>"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            GatewayError::MissingConfigArgument.exit_code(),
            GatewayError::Config(String::new()).exit_code(),
            GatewayError::LogFile {
                path: PathBuf::from("/x"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .exit_code(),
            GatewayError::CommandNotFound {
                name: String::new(),
                path: PathBuf::new(),
            }
            .exit_code(),
            GatewayError::Server(String::new()).exit_code(),
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn test_exit_code_for_finds_wrapped_error() {
        let err = Err::<(), _>(anyhow!(GatewayError::Config("bad".into())))
            .context("Failed to load configuration")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CONFIG_LOAD);

        let untagged = anyhow!("something else");
        assert_eq!(exit_code_for(&untagged), EXIT_SERVER);
    }
}
