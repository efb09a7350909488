//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::stats::StatsConfig;

/// Largest accepted `report.top_n`. Ranking is O(table size × n).
pub const MAX_TOP_N: usize = 1024;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a configuration semantically.
pub fn validate_config(config: &StatsConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.report.top_n == 0 || config.report.top_n > MAX_TOP_N {
        return Err(ValidationError::InvalidValue {
            field: "report.top_n".to_string(),
            message: format!("Must be in [1, {}], got {}", MAX_TOP_N, config.report.top_n),
        });
    }

    if config.identity.resolve_names {
        if config.identity.proc_root.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "identity.proc_root".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
        if config.identity.passwd_path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "identity.passwd_path".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
