//! User and process identity types.
//!
//! A log record is attributed to the (uid, pid) pair of its writer. Both are
//! plain kernel numbers; the newtypes keep them from being swapped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User ID of the writer of a log record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UserId {
    fn from(uid: u32) -> Self {
        UserId(uid)
    }
}

/// Process ID of the writer of a log record.
///
/// PIDs are recycled by the kernel, so the same `ProcessId` can stand for
/// different processes over the lifetime of a log buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        ProcessId(pid)
    }
}
