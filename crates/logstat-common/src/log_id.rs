//! Log buffer categories.
//!
//! The log buffer is split into a small fixed set of independently tracked
//! partitions. Every per-category counter and table in logstat is an array
//! indexed by [`LogId::index`].
//!
//! # Masks
//!
//! [`LogMask`] selects a subset of categories, one bit per id
//! (`1 << id.index()`). Masks parse from comma-separated names:
//!
//! ```text
//! main,system   -> 0b01001
//! all           -> 0b11111
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of log categories.
pub const LOG_ID_COUNT: usize = 5;

/// Log buffer category.
///
/// The discriminants are stable: they index per-category arrays and form
/// the bit positions of [`LogMask`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LogId {
    /// Application logs.
    Main = 0,
    /// Telephony stack logs.
    Radio = 1,
    /// Binary event logs.
    Events = 2,
    /// Platform service logs.
    System = 3,
    /// Crash dumps.
    Crash = 4,
}

impl LogId {
    /// All categories in id order.
    pub fn all() -> &'static [LogId; LOG_ID_COUNT] {
        &[
            LogId::Main,
            LogId::Radio,
            LogId::Events,
            LogId::System,
            LogId::Crash,
        ]
    }

    /// Index of this category into per-category arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category for an array index, if in range.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::all().get(idx).copied()
    }

    /// Short lowercase name, as used in reports and masks.
    pub fn name(self) -> &'static str {
        match self {
            LogId::Main => "main",
            LogId::Radio => "radio",
            LogId::Events => "events",
            LogId::System => "system",
            LogId::Crash => "crash",
        }
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LogId::all()
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown log buffer: {}", s))
    }
}

/// Bitmask selecting a set of log categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LogMask(pub u32);

impl LogMask {
    /// Every category.
    pub const ALL: LogMask = LogMask((1 << LOG_ID_COUNT) - 1);

    /// No category.
    pub const NONE: LogMask = LogMask(0);

    /// Mask holding a single category.
    pub fn only(id: LogId) -> Self {
        LogMask(1 << id.index())
    }

    /// Whether `id` is selected.
    pub fn contains(self, id: LogId) -> bool {
        self.0 & (1 << id.index()) != 0
    }

    /// Mask with `id` added.
    pub fn with(self, id: LogId) -> Self {
        LogMask(self.0 | (1 << id.index()))
    }

    /// Selected categories in id order.
    pub fn ids(self) -> impl Iterator<Item = LogId> {
        LogId::all().iter().copied().filter(move |id| self.contains(*id))
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }
}

impl Default for LogMask {
    fn default() -> Self {
        LogMask::ALL
    }
}

impl From<LogId> for LogMask {
    fn from(id: LogId) -> Self {
        LogMask::only(id)
    }
}

impl FromIterator<LogId> for LogMask {
    fn from_iter<I: IntoIterator<Item = LogId>>(iter: I) -> Self {
        iter.into_iter().fold(LogMask::NONE, LogMask::with)
    }
}

impl FromStr for LogMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(LogMask::ALL);
        }
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(LogId::from_str)
            .collect::<Result<LogMask, _>>()
            .and_then(|mask| {
                if mask.is_empty() {
                    Err(format!("empty log buffer selection: {:?}", s))
                } else {
                    Ok(mask)
                }
            })
    }
}

impl fmt::Display for LogMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == LogMask::ALL {
            return f.write_str("all");
        }
        let names: Vec<&str> = self.ids().map(LogId::name).collect();
        f.write_str(&names.join(","))
    }
}
