//! Logging setup for the logstat binary.
//!
//! The engine emits `tracing` events (entry created/removed, process id
//! reuse, collection toggles). This module installs the subscriber on
//! stderr, since stdout carries the report:
//! - Human-readable console output for interactive use
//! - One JSON object per event when the report itself is JSON
//!
//! Level precedence: `-q` / `-v` flags, then `LOGSTAT_LOG`, then `RUST_LOG`
//! directives, then `info`.

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Level for every logstat crate (`trace`, `debug`, `info`, `warn`, `error`, `off`).
pub const ENV_LOG: &str = "LOGSTAT_LOG";
/// `json` forces JSON log lines even for text reports.
pub const ENV_LOG_FORMAT: &str = "LOGSTAT_LOG_FORMAT";

/// Crates whose events are shown at the configured level.
const LOG_TARGETS: &[&str] = &["logstat", "logstat_core", "logstat_config"];

/// Resolved logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Level from flags or `LOGSTAT_LOG`; `None` defers to `RUST_LOG`.
    pub level: Option<LevelFilter>,
    pub json: bool,
}

impl LogConfig {
    /// Resolve from CLI flags and the process environment.
    pub fn from_env(verbose: u8, quiet: bool, json_output: bool) -> Self {
        Self::resolve(
            verbose,
            quiet,
            json_output,
            std::env::var(ENV_LOG).ok().as_deref(),
            std::env::var(ENV_LOG_FORMAT).ok().as_deref(),
        )
    }

    fn resolve(
        verbose: u8,
        quiet: bool,
        json_output: bool,
        env_level: Option<&str>,
        env_format: Option<&str>,
    ) -> Self {
        let level = if quiet {
            Some(LevelFilter::ERROR)
        } else {
            match verbose {
                0 => env_level.and_then(|val| val.trim().parse().ok()),
                1 => Some(LevelFilter::DEBUG),
                _ => Some(LevelFilter::TRACE),
            }
        };
        let json = json_output
            || env_format.is_some_and(|val| val.trim().eq_ignore_ascii_case("json"));

        Self { level, json }
    }

    /// Event filter for these settings.
    pub fn filter(&self) -> EnvFilter {
        if let Some(level) = self.level {
            return EnvFilter::new(directives(level));
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives(LevelFilter::INFO)))
    }
}

fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = config.filter();

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .flatten_event(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(std::io::stderr().is_terminal());
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_beat_environment() {
        let config = LogConfig::resolve(0, true, false, Some("trace"), None);
        assert_eq!(config.level, Some(LevelFilter::ERROR));

        let config = LogConfig::resolve(1, false, false, Some("off"), None);
        assert_eq!(config.level, Some(LevelFilter::DEBUG));

        let config = LogConfig::resolve(3, false, false, None, None);
        assert_eq!(config.level, Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_env_level_used_without_flags() {
        let config = LogConfig::resolve(0, false, false, Some("warn"), None);
        assert_eq!(config.level, Some(LevelFilter::WARN));

        // Unparsable values defer to RUST_LOG / the default.
        let config = LogConfig::resolve(0, false, false, Some("loud"), None);
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_json_follows_report_format_or_env() {
        assert!(LogConfig::resolve(0, false, true, None, None).json);
        assert!(LogConfig::resolve(0, false, false, None, Some("JSON")).json);
        assert!(!LogConfig::resolve(0, false, false, None, Some("human")).json);
    }

    #[test]
    fn test_directives_name_every_crate() {
        assert_eq!(
            directives(LevelFilter::DEBUG),
            "logstat=debug,logstat_core=debug,logstat_config=debug"
        );
        assert!(directives(LevelFilter::OFF).contains("logstat_core=off"));
    }
}
