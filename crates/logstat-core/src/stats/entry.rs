//! Accounting entries: per-user and per-process accumulators.
//!
//! An entry lives in its table from the first accumulate until both its
//! size and dropped count are back to zero. The `subtract*` methods report
//! that moment so the owner can remove the entry.
//!
//! Callers must never reduce by more than they added for the same logical
//! record. Entries do not validate this; reductions saturate at zero.

use logstat_common::{ProcessId, UserId};

use super::table::SizedEntry;

/// Common accumulator capabilities.
pub trait StatsEntry: SizedEntry {
    type Key: Copy;

    fn key(&self) -> Self::Key;

    /// Messages whose payload was discarded but which are still counted.
    fn dropped(&self) -> usize;

    fn add(&mut self, size: usize);

    fn add_dropped(&mut self, count: usize);

    /// Returns true when the entry is now empty.
    fn subtract(&mut self, size: usize) -> bool;

    /// Returns true when the entry is now empty.
    fn subtract_dropped(&mut self, count: usize) -> bool;
}

/// Per-user accumulator, one table per log category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidEntry {
    uid: UserId,
    size: usize,
    dropped: usize,
}

impl UidEntry {
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            size: 0,
            dropped: 0,
        }
    }

    pub fn uid(&self) -> UserId {
        self.uid
    }

    fn is_empty(&self) -> bool {
        self.size == 0 && self.dropped == 0
    }
}

impl SizedEntry for UidEntry {
    fn sizes(&self) -> usize {
        self.size
    }
}

impl StatsEntry for UidEntry {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.uid
    }

    fn dropped(&self) -> usize {
        self.dropped
    }

    fn add(&mut self, size: usize) {
        self.size = self.size.saturating_add(size);
    }

    fn add_dropped(&mut self, count: usize) {
        self.dropped = self.dropped.saturating_add(count);
    }

    fn subtract(&mut self, size: usize) -> bool {
        self.size = self.size.saturating_sub(size);
        self.is_empty()
    }

    fn subtract_dropped(&mut self, count: usize) -> bool {
        self.dropped = self.dropped.saturating_sub(count);
        self.is_empty()
    }
}

/// Per-process accumulator, shared across log categories.
///
/// Caches the owning uid and a display name. The uid is corrected in place
/// when a reused pid starts logging under a different user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidEntry {
    pid: ProcessId,
    uid: UserId,
    name: Option<String>,
    size: usize,
    dropped: usize,
}

impl PidEntry {
    pub fn new(pid: ProcessId, uid: UserId, name: Option<String>) -> Self {
        Self {
            pid,
            uid,
            name,
            size: 0,
            dropped: 0,
        }
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn uid(&self) -> UserId {
        self.uid
    }

    pub fn set_uid(&mut self, uid: UserId) {
        self.uid = uid;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replace the cached name; the previous one is dropped.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    fn is_empty(&self) -> bool {
        self.size == 0 && self.dropped == 0
    }
}

impl SizedEntry for PidEntry {
    fn sizes(&self) -> usize {
        self.size
    }
}

impl StatsEntry for PidEntry {
    type Key = ProcessId;

    fn key(&self) -> ProcessId {
        self.pid
    }

    fn dropped(&self) -> usize {
        self.dropped
    }

    fn add(&mut self, size: usize) {
        self.size = self.size.saturating_add(size);
    }

    fn add_dropped(&mut self, count: usize) {
        self.dropped = self.dropped.saturating_add(count);
    }

    fn subtract(&mut self, size: usize) -> bool {
        self.size = self.size.saturating_sub(size);
        self.is_empty()
    }

    fn subtract_dropped(&mut self, count: usize) -> bool {
        self.dropped = self.dropped.saturating_sub(count);
        self.is_empty()
    }
}
