//! logstat configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for logstat.json
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation

pub mod resolve;
pub mod stats;
pub mod validate;

pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use stats::{IdentityConfig, ReportConfig, StatsConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};

use std::path::{Path, PathBuf};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Configuration with provenance information.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The validated configuration.
    pub config: StatsConfig,
    /// Path the configuration was read from (None if using defaults).
    pub path: Option<PathBuf>,
    /// Where the path came from.
    pub source: ConfigSource,
}

/// Resolve, read and validate the configuration.
///
/// Falls back to [`StatsConfig::default`] when no file is found anywhere in
/// the resolution order.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let resolved = resolve_config(cli_path);

    let config = match &resolved.path {
        Some(path) => {
            tracing::debug!(path = %path.display(), source = %resolved.source, "loading config");
            StatsConfig::from_file(path)?
        }
        None => StatsConfig::default(),
    };

    validate_config(&config)?;

    Ok(LoadedConfig {
        config,
        path: resolved.path,
        source: resolved.source,
    })
}
