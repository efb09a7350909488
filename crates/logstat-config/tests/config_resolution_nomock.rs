//! No-mock configuration resolution + validation tests.
//!
//! Covers:
//! - Resolution order (CLI > env path > env dir > defaults)
//! - Loading and validating real files on disk

use logstat_config::resolve::{resolve_config, ConfigSource, ENV_CONFIG_DIR, ENV_CONFIG_PATH};
use logstat_config::{load_config, ValidationError, CONFIG_SCHEMA_VERSION};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
            env::remove_var(key);
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

fn write_config(path: &Path, json: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config parent");
    }
    fs::write(path, json).expect("write config");
}

#[test]
fn test_resolve_cli_over_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let cli = temp.path().join("cli").join("logstat.json");
        let from_env = temp.path().join("env").join("logstat.json");
        write_config(&cli, "{}");
        write_config(&from_env, "{}");
        env::set_var(ENV_CONFIG_PATH, from_env.display().to_string());

        let resolved = resolve_config(Some(&cli));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.unwrap(), cli);
    });
}

#[test]
fn test_resolve_env_path_over_env_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let direct = temp.path().join("direct.json");
        let dir = temp.path().join("dir");
        write_config(&direct, "{}");
        write_config(&dir.join("logstat.json"), "{}");
        env::set_var(ENV_CONFIG_PATH, direct.display().to_string());
        env::set_var(ENV_CONFIG_DIR, dir.display().to_string());

        let resolved = resolve_config(None);
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.path.unwrap(), direct);
    });
}

#[test]
fn test_missing_cli_path_falls_through_to_env_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("dir");
        write_config(&dir.join("logstat.json"), r#"{"report": {"top_n": 8}}"#);
        env::set_var(ENV_CONFIG_DIR, dir.display().to_string());

        let missing = temp.path().join("missing.json");
        let loaded = load_config(Some(&missing)).expect("load config");
        assert_eq!(loaded.source, ConfigSource::Environment);
        assert_eq!(loaded.config.report.top_n, 8);
    });
}

#[test]
fn test_load_rejects_invalid_values() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("logstat.json");
        write_config(&path, r#"{"report": {"top_n": 5000}}"#);

        let err = load_config(Some(&path)).expect_err("top_n above limit must fail");
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    });
}

#[test]
fn test_load_rejects_wrong_schema_version() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("logstat.json");
        write_config(&path, r#"{"schema_version": "2.0.0"}"#);

        match load_config(Some(&path)) {
            Err(ValidationError::VersionMismatch { expected, actual }) => {
                assert_eq!(expected, CONFIG_SCHEMA_VERSION);
                assert_eq!(actual, "2.0.0");
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    });
}

#[test]
fn test_load_reports_parse_errors() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("logstat.json");
        write_config(&path, "enabled = true");

        let err = load_config(Some(&path)).expect_err("non-JSON must fail");
        assert!(matches!(err, ValidationError::ParseError(_)));
    });
}
