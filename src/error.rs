//! Exit codes for the dupescan binary.

use serde::Serialize;

/// Exit codes for the dupescan application.
///
/// - 0: Success. The scan ran to completion, or a non-fatal failure was
///   reported through the log.
/// - 501: Input validation failed (missing or non-directory starting path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the pipeline ran (duplicates or not), or a recoverable
    /// failure was logged.
    Success = 0,
    /// Invalid input: the starting path does not exist or is not a directory.
    InvalidInput = 501,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
