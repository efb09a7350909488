//! Log statistics common types, IDs, and errors.
//!
//! This crate provides foundational types shared across logstat crates:
//! - User and process identity newtypes
//! - The fixed log category enumeration and category bitmasks
//! - Common error types
//! - Output format selection

pub mod error;
pub mod id;
pub mod log_id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result};
pub use id::{ProcessId, UserId};
pub use log_id::{LogId, LogMask, LOG_ID_COUNT};
pub use output::OutputFormat;

/// Schema version for JSON snapshots emitted by logstat.
pub const SCHEMA_VERSION: &str = "1.0.0";
