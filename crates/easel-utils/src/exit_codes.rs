//! Exit code constants for the easel CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments |
//! | 3 | `CONFIG` | Invalid or missing configuration |
//! | 4 | `SERVICE_FAILURE` | External service call failed |
//! | 5 | `NOT_FOUND` | Requested asset not in the store |
//! | 6 | `JUDGE_INVALID` | Judge response violated the verdict contract |
//!
//! A failed validation verdict after retry exhaustion is a normal
//! result, not a failure: the CLI prints the result and exits 0.

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for common exit codes, or
/// [`as_i32()`](Self::as_i32) to get the numeric value for
/// `std::process::exit()`. The numeric values are part of the public API
/// and will not change in 0.x releases.
///
/// # Example
///
/// ```rust
/// use easel_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::SUCCESS;
/// assert_eq!(code.as_i32(), 0);
///
/// assert_eq!(ExitCode::NOT_FOUND, ExitCode::from_i32(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Configuration error - invalid file, value, or missing requirement
    pub const CONFIG: ExitCode = ExitCode(3);

    /// Service failure - generation, description, or judge backend failed
    pub const SERVICE_FAILURE: ExitCode = ExitCode(4);

    /// Not found - the requested asset is not in the store
    pub const NOT_FOUND: ExitCode = ExitCode(5);

    /// Judge invalid - judge output violated the verdict contract
    pub const JUDGE_INVALID: ExitCode = ExitCode(6);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
