//! Error types for logstat.
//!
//! The accounting engine itself never fails: every lifecycle call is an
//! in-memory update. Errors only arise at the edges, when loading
//! configuration, parsing record traces, or doing I/O for the CLI.
//!
//! Each error carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A remediation hint for humans
//!
//! ```text
//! ✗ Trace Parse Error
//!   Reason: trace line 7: unknown record id 42
//!   Fix: Every drop/remove/merge must reference an id added earlier in the trace.
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for logstat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Record trace errors.
    Trace,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Trace => write!(f, "trace"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for logstat.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    // Trace errors (20-29)
    #[error("trace line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("trace line {line}: unknown record id {id}")]
    UnknownRecord { line: usize, id: u64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// - 10-19: Configuration errors
    /// - 20-29: Trace errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::Trace { .. } => 20,
            Error::UnknownRecord { .. } => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => ErrorCategory::Config,
            Error::Trace { .. } | Error::UnknownRecord { .. } => ErrorCategory::Trace,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => {
                "Run 'logstat config validate' and fix the reported field, or remove the file to use defaults."
            }
            Error::Trace { .. } => {
                "Each trace line must be one JSON object with an \"op\" of add, drop, remove, merge, enable or disable."
            }
            Error::UnknownRecord { .. } => {
                "Every drop/remove/merge must reference an id added earlier in the trace."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check the syntax with 'jq .'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig { .. } => "Invalid Configuration",
            Error::Trace { .. } => "Trace Parse Error",
            Error::UnknownRecord { .. } => "Trace Parse Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
