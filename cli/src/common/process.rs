//! # cmdgate Process Execution (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Runs an external program with a resolved argument list and reports its
//! standard output and exit status. The call awaits the child's termination
//! without blocking the runtime thread (`tokio::process`).
//!
//! Failures never propagate as errors: a child that cannot be started, or
//! that dies without an exit status (killed by a signal), is reported with
//! the sentinel `EXIT_CODE_UNKNOWN` so the HTTP layer always has something
//! to send back.
//!
//! ## Limitations
//!
//! - Standard error is discarded. Only stdout is captured.
//! - There is no timeout: a child that never exits keeps its request waiting.
//! - Each execution is attempted once; there are no retries.
//!
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, warn};

/// Exit code reported when the process could not be started or terminated
/// without an exit status.
pub const EXIT_CODE_UNKNOWN: i32 = -1;

/// Outcome of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Captured stdout, decoded as UTF-8 (invalid sequences replaced).
    pub output: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    fn spawn_failure() -> Self {
        Self {
            output: String::new(),
            exit_code: EXIT_CODE_UNKNOWN,
        }
    }
}

/// # Run Command (`run`)
///
/// Spawns `path` with `args` (the program name is not part of `args`),
/// connects stdin and stderr to the null device, captures stdout and waits
/// for the child to exit.
///
/// ## Returns
///
/// * `ExecutionResult` with the child's exit code, or `EXIT_CODE_UNKNOWN`
///   and empty output if the child could not be started.
pub async fn run(path: &Path, args: &[String]) -> ExecutionResult {
    debug!("Executing: {} {:?}", path.display(), args);

    // Only stdout is piped back; the child gets no input and its stderr is dropped.
    let output = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            error!(
                "Error <{}> trying to execute command <{} {:?}>",
                e,
                path.display(),
                args
            );
            return ExecutionResult::spawn_failure();
        }
    };

    // `code()` is None when the child was killed by a signal.
    let exit_code = match output.status.code() {
        Some(code) => code,
        None => {
            warn!(
                "Command <{}> terminated without an exit code ({})",
                path.display(),
                output.status
            );
            EXIT_CODE_UNKNOWN
        }
    };

    debug!("Command <{}> exited with {}", path.display(), exit_code);
    ExecutionResult {
        output: String::from_utf8_lossy(&output.stdout).into_owned(),
        exit_code,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let result = run(Path::new("/bin/echo"), &args(&["hello", "world"])).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "hello world\n");
    }

    #[tokio::test]
    async fn test_run_does_not_pass_program_name_as_argument() {
        let result = run(Path::new("/bin/sh"), &args(&["-c", "echo $#", "x", "a", "b"])).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "2\n");
    }

    #[tokio::test]
    async fn test_run_reports_non_zero_exit_with_output() {
        let result = run(Path::new("/bin/sh"), &args(&["-c", "echo partial; exit 3"])).await;
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.output, "partial\n");
    }

    #[tokio::test]
    async fn test_run_discards_stderr() {
        let result = run(Path::new("/bin/sh"), &args(&["-c", "echo out; echo err >&2"])).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "out\n");
    }

    #[tokio::test]
    async fn test_run_missing_executable_returns_sentinel() {
        let result = run(Path::new("/definitely/not/a/program"), &[]).await;
        assert_eq!(result, ExecutionResult::spawn_failure());
        assert_eq!(result.exit_code, EXIT_CODE_UNKNOWN);
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn test_run_killed_by_signal_returns_sentinel() {
        let result = run(Path::new("/bin/sh"), &args(&["-c", "echo before; kill -9 $$"])).await;
        assert_eq!(result.exit_code, EXIT_CODE_UNKNOWN);
        assert_eq!(result.output, "before\n");
    }

    #[tokio::test]
    async fn test_run_lossy_decodes_invalid_utf8() {
        let result = run(Path::new("/bin/sh"), &args(&["-c", "printf 'a\\377b'"])).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "a\u{FFFD}b");
    }
}
