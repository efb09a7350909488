//! Record trace replay.
//!
//! A trace is a JSON Lines stream of buffer events. [`ReplayBuffer`] plays
//! the part of the log buffer: it holds the live records by id and drives
//! the accounting engine exactly as the buffer would.
//!
//! ```text
//! {"op":"add","id":1,"log_id":"main","uid":1000,"pid":50,"size":120}
//! {"op":"drop","id":1}
//! {"op":"merge","into":1,"from":2}
//! {"op":"remove","id":1}
//! {"op":"disable"}
//! {"op":"enable"}
//! {"op":"process","pid":50,"uid":1000,"name":"surfaceflinger"}
//! {"op":"user","uid":1000,"name":"system"}
//! ```
//!
//! `process` and `user` lines declare identities for offline replay; they
//! are collected by [`declared_identities`] before the run and ignored by
//! the buffer itself. Blank lines and lines starting with `#` are skipped.

use std::collections::HashMap;
use std::io::BufRead;

use logstat_common::{Error, LogId, ProcessId, Result, UserId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::identity::{IdentityResolver, StaticResolver};
use crate::record::LogRecord;
use crate::stats::Statistics;

/// Record identifier within a trace.
pub type RecordId = u64;

/// One trace line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum TraceEvent {
    /// A record enters the buffer.
    Add {
        id: RecordId,
        log_id: LogId,
        uid: UserId,
        pid: ProcessId,
        size: usize,
    },
    /// A record's payload is discarded; it becomes a placeholder.
    Drop { id: RecordId },
    /// A record leaves the buffer.
    Remove { id: RecordId },
    /// Placeholder `from` is folded into placeholder `into`.
    Merge { into: RecordId, from: RecordId },
    Enable,
    Disable,
    /// Identity declaration for a process.
    Process {
        pid: ProcessId,
        uid: UserId,
        name: String,
    },
    /// Identity declaration for a user.
    User { uid: UserId, name: String },
}

/// A parsed event with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub line: usize,
    pub event: TraceEvent,
}

/// Parse a whole trace.
pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceLine>> {
    let mut events = Vec::new();
    for (idx, text) in reader.lines().enumerate() {
        let line = idx + 1;
        let text = text?;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(text).map_err(|e| Error::Trace {
            line,
            message: e.to_string(),
        })?;
        events.push(TraceLine { line, event });
    }
    Ok(events)
}

/// Identities declared by `process` and `user` lines.
pub fn declared_identities<'a>(events: impl IntoIterator<Item = &'a TraceLine>) -> StaticResolver {
    let mut resolver = StaticResolver::new();
    for traced in events {
        match &traced.event {
            TraceEvent::Process { pid, uid, name } => resolver.insert_process(*pid, name.clone(), *uid),
            TraceEvent::User { uid, name } => resolver.insert_user(*uid, name.clone()),
            _ => {}
        }
    }
    resolver
}

/// Totals for a completed replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub added: usize,
    pub dropped: usize,
    pub removed: usize,
    pub merged: usize,
    /// Records still resident at the end.
    pub resident: usize,
}

/// Stand-in for the log buffer: live records keyed by trace id.
#[derive(Debug, Default)]
pub struct ReplayBuffer {
    records: HashMap<RecordId, LogRecord>,
    summary: ReplaySummary,
}

impl ReplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&LogRecord> {
        self.records.get(&id)
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            resident: self.records.len(),
            ..self.summary
        }
    }

    /// Apply every event in order, stopping at the first bad one.
    pub fn replay<'a, R: IdentityResolver>(
        &mut self,
        stats: &mut Statistics<R>,
        events: impl IntoIterator<Item = &'a TraceLine>,
    ) -> Result<ReplaySummary> {
        for traced in events {
            self.apply(stats, traced)?;
        }
        Ok(self.summary())
    }

    /// Apply one event.
    pub fn apply<R: IdentityResolver>(
        &mut self,
        stats: &mut Statistics<R>,
        traced: &TraceLine,
    ) -> Result<()> {
        let line = traced.line;
        trace!(line, event = ?traced.event, "replay");

        match traced.event {
            TraceEvent::Add {
                id,
                log_id,
                uid,
                pid,
                size,
            } => {
                if self.records.contains_key(&id) {
                    return Err(Error::Trace {
                        line,
                        message: format!("record id {} is already resident", id),
                    });
                }
                let record = LogRecord::new(log_id, uid, pid, size);
                stats.add(&record);
                self.records.insert(id, record);
                self.summary.added += 1;
            }
            TraceEvent::Drop { id } => {
                let record = self.take(id, line)?;
                if !record.is_dropped() {
                    self.summary.dropped += 1;
                }
                let record = stats.convert_to_dropped(record);
                self.records.insert(id, record);
            }
            TraceEvent::Remove { id } => {
                let record = self.take(id, line)?;
                stats.subtract(&record);
                self.summary.removed += 1;
            }
            TraceEvent::Merge { into, from } => {
                if into == from {
                    return Err(Error::Trace {
                        line,
                        message: format!("cannot merge record {} into itself", into),
                    });
                }
                let merged = self.take(from, line)?;
                let Some(survivor) = self.records.get_mut(&into) else {
                    self.records.insert(from, merged);
                    return Err(Error::UnknownRecord { line, id: into });
                };
                if !stats.merge_dropped(survivor, &merged) {
                    self.records.insert(from, merged);
                    return Err(Error::Trace {
                        line,
                        message: format!(
                            "records {} and {} are not placeholders of the same origin",
                            into, from
                        ),
                    });
                }
                self.summary.merged += 1;
            }
            TraceEvent::Enable => stats.enable_statistics(),
            TraceEvent::Disable => stats.disable_statistics(),
            TraceEvent::Process { .. } | TraceEvent::User { .. } => {}
        }

        self.summary.events += 1;
        Ok(())
    }

    fn take(&mut self, id: RecordId, line: usize) -> Result<LogRecord> {
        self.records
            .remove(&id)
            .ok_or(Error::UnknownRecord { line, id })
    }
}
