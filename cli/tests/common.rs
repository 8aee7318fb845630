//! # cmdgate Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: locating the
//! compiled `cmdgate` binary and writing configuration fixtures into a
//! temporary directory.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// # Get cmdgate Command (`cmdgate_cmd`)
///
/// Creates an `assert_cmd::Command` for the `cmdgate` binary built for this test run.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn cmdgate_cmd() -> Command {
    Command::cargo_bin("cmdgate").expect("Failed to find cmdgate binary for testing")
}

/// Writes `content` to `gateway.toml` inside `dir` and returns its path.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("gateway.toml");
    std::fs::write(&path, content).expect("Failed to write test configuration");
    path
}

/// A valid configuration logging into `dir` and exposing `/bin/echo`.
pub fn echo_config(dir: &Path) -> String {
    format!(
        r#"
[General]
Logfile = "{}"
Var_Prefix = "$"

[Network]
Address = "127.0.0.1"
Port = 0

[[Command]]
Name = "echo"
Path = "/bin/echo"
Args = ["hello", "$name"]
"#,
        dir.join("gateway.log").display()
    )
}
