//! Host identity resolution from procfs and the passwd database.
//!
//! Roots are configurable so tests can point the resolver at fixture trees.

use std::fs;
use std::path::{Path, PathBuf};

use logstat_common::{ProcessId, UserId};
use logstat_config::IdentityConfig;

use super::IdentityResolver;

/// Resolver reading `<proc_root>/<pid>/{cmdline,comm,status}` and a passwd file.
#[derive(Debug, Clone)]
pub struct ProcfsResolver {
    proc_root: PathBuf,
    passwd_path: PathBuf,
}

impl Default for ProcfsResolver {
    fn default() -> Self {
        Self::new("/proc", "/etc/passwd")
    }
}

impl ProcfsResolver {
    pub fn new(proc_root: impl Into<PathBuf>, passwd_path: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            passwd_path: passwd_path.into(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(&config.proc_root, &config.passwd_path)
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    fn pid_dir(&self, pid: ProcessId) -> PathBuf {
        self.proc_root.join(pid.0.to_string())
    }
}

impl IdentityResolver for ProcfsResolver {
    fn process_name(&self, pid: ProcessId) -> Option<String> {
        let dir = self.pid_dir(pid);
        if let Ok(content) = fs::read(dir.join("cmdline")) {
            if let Some(name) = parse_cmdline_content(&content) {
                return Some(name);
            }
        }

        // Kernel threads have an empty cmdline; comm is the short name.
        let comm = fs::read_to_string(dir.join("comm")).ok()?;
        let comm = comm.trim();
        (!comm.is_empty()).then(|| comm.to_string())
    }

    fn process_owner(&self, pid: ProcessId) -> Option<UserId> {
        let status = fs::read_to_string(self.pid_dir(pid).join("status")).ok()?;
        parse_uid_from_status(&status)
    }

    fn user_name(&self, uid: UserId) -> Option<String> {
        let passwd = fs::read_to_string(&self.passwd_path).ok()?;
        parse_passwd_content(&passwd, uid)
    }
}

/// First argument of a NUL-separated `cmdline`, if non-empty.
pub fn parse_cmdline_content(content: &[u8]) -> Option<String> {
    let argv0 = content.split(|&b| b == 0).next()?;
    let name = String::from_utf8_lossy(argv0);
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Real uid from the `Uid:` line of `/proc/<pid>/status`.
pub fn parse_uid_from_status(content: &str) -> Option<UserId> {
    // Format: "Uid:\t1000\t1000\t1000\t1000"
    let line = content.lines().find(|line| line.starts_with("Uid:"))?;
    line.split_whitespace().nth(1)?.parse().ok().map(UserId)
}

/// Account name for `uid` in passwd(5) content.
pub fn parse_passwd_content(content: &str, uid: UserId) -> Option<String> {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split(':');
            let name = fields.next()?;
            let entry_uid: u32 = fields.nth(1)?.parse().ok()?;
            (entry_uid == uid.0 && !name.is_empty()).then(|| name.to_string())
        })
}
