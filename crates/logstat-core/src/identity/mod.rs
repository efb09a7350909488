//! Identity resolution: process names, process owners and user names.
//!
//! The engine asks a resolver once per process entry (on its first add) and
//! caches the answer. Unknown identities are `None`, never an error.

mod procfs;

pub use procfs::{
    parse_cmdline_content, parse_passwd_content, parse_uid_from_status, ProcfsResolver,
};

use logstat_common::{ProcessId, UserId};
use std::collections::HashMap;

/// Source of identity information for the accounting engine.
pub trait IdentityResolver {
    /// Display name (command) of a running process.
    fn process_name(&self, pid: ProcessId) -> Option<String>;

    /// Real user id owning a running process.
    fn process_owner(&self, pid: ProcessId) -> Option<UserId>;

    /// Account name for a user id.
    fn user_name(&self, uid: UserId) -> Option<String>;
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for &R {
    fn process_name(&self, pid: ProcessId) -> Option<String> {
        (**self).process_name(pid)
    }

    fn process_owner(&self, pid: ProcessId) -> Option<UserId> {
        (**self).process_owner(pid)
    }

    fn user_name(&self, uid: UserId) -> Option<String> {
        (**self).user_name(uid)
    }
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for Box<R> {
    fn process_name(&self, pid: ProcessId) -> Option<String> {
        (**self).process_name(pid)
    }

    fn process_owner(&self, pid: ProcessId) -> Option<UserId> {
        (**self).process_owner(pid)
    }

    fn user_name(&self, uid: UserId) -> Option<String> {
        (**self).user_name(uid)
    }
}

/// Resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl IdentityResolver for NullResolver {
    fn process_name(&self, _pid: ProcessId) -> Option<String> {
        None
    }

    fn process_owner(&self, _pid: ProcessId) -> Option<UserId> {
        None
    }

    fn user_name(&self, _uid: UserId) -> Option<String> {
        None
    }
}

/// In-memory resolver backed by fixed tables.
///
/// ```
/// use logstat_common::{ProcessId, UserId};
/// use logstat_core::identity::{IdentityResolver, StaticResolver};
///
/// let resolver = StaticResolver::new()
///     .with_process(ProcessId(50), "surfaceflinger", UserId(1000))
///     .with_user(UserId(1000), "system");
/// assert_eq!(resolver.process_name(ProcessId(50)).as_deref(), Some("surfaceflinger"));
/// assert_eq!(resolver.user_name(UserId(1000)).as_deref(), Some("system"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    processes: HashMap<ProcessId, (String, UserId)>,
    users: HashMap<UserId, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, pid: ProcessId, name: impl Into<String>, uid: UserId) -> Self {
        self.insert_process(pid, name, uid);
        self
    }

    pub fn with_user(mut self, uid: UserId, name: impl Into<String>) -> Self {
        self.insert_user(uid, name);
        self
    }

    pub fn insert_process(&mut self, pid: ProcessId, name: impl Into<String>, uid: UserId) {
        self.processes.insert(pid, (name.into(), uid));
    }

    pub fn insert_user(&mut self, uid: UserId, name: impl Into<String>) {
        self.users.insert(uid, name.into());
    }
}

impl IdentityResolver for StaticResolver {
    fn process_name(&self, pid: ProcessId) -> Option<String> {
        self.processes.get(&pid).map(|(name, _)| name.clone())
    }

    fn process_owner(&self, pid: ProcessId) -> Option<UserId> {
        self.processes.get(&pid).map(|(_, uid)| *uid)
    }

    fn user_name(&self, uid: UserId) -> Option<String> {
        self.users.get(&uid).cloned()
    }
}

/// Asks `primary` first and `fallback` for anything it does not know.
#[derive(Debug, Clone, Default)]
pub struct LayeredResolver<A, B> {
    pub primary: A,
    pub fallback: B,
}

impl<A, B> LayeredResolver<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: IdentityResolver, B: IdentityResolver> IdentityResolver for LayeredResolver<A, B> {
    fn process_name(&self, pid: ProcessId) -> Option<String> {
        self.primary
            .process_name(pid)
            .or_else(|| self.fallback.process_name(pid))
    }

    fn process_owner(&self, pid: ProcessId) -> Option<UserId> {
        self.primary
            .process_owner(pid)
            .or_else(|| self.fallback.process_owner(pid))
    }

    fn user_name(&self, uid: UserId) -> Option<String> {
        self.primary
            .user_name(uid)
            .or_else(|| self.fallback.user_name(uid))
    }
}
