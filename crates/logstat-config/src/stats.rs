//! Statistics configuration types.
//!
//! Every field has a default, so an empty object `{}` is a complete config.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validate::ValidationError;

/// Complete logstat configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatsConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Start with per-user/per-process collection enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Usage report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    /// Maximum rows per ranked section.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Emit the process section after the per-category user sections.
    #[serde(default = "default_true")]
    pub include_pids: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            include_pids: true,
        }
    }
}

/// Identity resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdentityConfig {
    /// Resolve process and user names from the host.
    #[serde(default = "default_true")]
    pub resolve_names: bool,

    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    #[serde(default = "default_passwd_path")]
    pub passwd_path: PathBuf,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            resolve_names: true,
            proc_root: default_proc_root(),
            passwd_path: default_passwd_path(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            enabled: true,
            report: ReportConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl StatsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// JSON schema describing logstat.json.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(StatsConfig)).unwrap_or_default()
    }
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    32
}

fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_passwd_path() -> PathBuf {
    PathBuf::from("/etc/passwd")
}
