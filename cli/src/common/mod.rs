//! # cmdgate Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! Shared utilities that are not specific to HTTP handling.
//!
//! - **`process`**: Spawning external programs and capturing their results.

/// Utilities for executing external processes and capturing their output.
pub mod process;
