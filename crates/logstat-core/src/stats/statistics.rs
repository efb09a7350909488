//! The statistics orchestrator.
//!
//! Owns the per-category counters, one user table per category and the
//! shared process table, and routes buffer lifecycle events to them.
//!
//! # Lifecycle
//!
//! ```text
//! add ──► live ──► subtract                     (evicted as-is)
//!          │
//!          └─► convert_to_dropped ──► placeholder ──► subtract
//!                                        │
//!                                        └─► merge_dropped (erase)
//! ```
//!
//! Every reduction must pair with an earlier accumulation of the same
//! record. The engine does not validate this; counters saturate at zero so
//! that toggling collection mid-stream cannot underflow them.

use logstat_common::{LogId, LogMask, ProcessId, UserId, LOG_ID_COUNT};
use logstat_config::{ReportConfig, StatsConfig};
use std::hash::Hash;
use tracing::{debug, info};

use super::entry::{PidEntry, StatsEntry, UidEntry};
use super::report::{self, StatsSnapshot};
use super::table::{StatsTable, TopEntries};
use crate::identity::{IdentityResolver, NullResolver};
use crate::record::LogRecord;

/// Per-category counters and accounting tables.
#[derive(Debug)]
pub struct Statistics<R = NullResolver> {
    enabled: bool,
    sizes: [usize; LOG_ID_COUNT],
    elements: [usize; LOG_ID_COUNT],
    sizes_total: [usize; LOG_ID_COUNT],
    elements_total: [usize; LOG_ID_COUNT],
    uid_tables: [StatsTable<UserId, UidEntry>; LOG_ID_COUNT],
    pid_table: StatsTable<ProcessId, PidEntry>,
    report: ReportConfig,
    resolver: R,
}

impl Default for Statistics<NullResolver> {
    fn default() -> Self {
        Self::new(NullResolver)
    }
}

impl<R: IdentityResolver> Statistics<R> {
    /// Empty, enabled engine with default report settings.
    pub fn new(resolver: R) -> Self {
        Self {
            enabled: true,
            sizes: [0; LOG_ID_COUNT],
            elements: [0; LOG_ID_COUNT],
            sizes_total: [0; LOG_ID_COUNT],
            elements_total: [0; LOG_ID_COUNT],
            uid_tables: Default::default(),
            pid_table: StatsTable::new(),
            report: ReportConfig::default(),
            resolver,
        }
    }

    /// Empty engine configured from a loaded config.
    pub fn with_config(config: &StatsConfig, resolver: R) -> Self {
        let mut stats = Self::new(resolver);
        stats.enabled = config.enabled;
        stats.report = config.report.clone();
        stats
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn report_config(&self) -> &ReportConfig {
        &self.report
    }

    pub fn set_report_config(&mut self, report: ReportConfig) {
        self.report = report;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Account a record entering the buffer.
    ///
    /// A dropped placeholder contributes its dropped count and no bytes.
    pub fn add(&mut self, record: &LogRecord) {
        if !self.enabled {
            return;
        }

        let idx = record.log_id().index();
        let size = record.payload_len();
        let dropped = record.dropped_count();

        self.sizes[idx] = self.sizes[idx].saturating_add(size);
        self.elements[idx] = self.elements[idx].saturating_add(1);
        self.sizes_total[idx] = self.sizes_total[idx].saturating_add(size);
        self.elements_total[idx] = self.elements_total[idx].saturating_add(1);

        let uid = record.uid();
        let uid_entry = upsert(&mut self.uid_tables[idx], uid, || UidEntry::new(uid));
        uid_entry.add(size);
        uid_entry.add_dropped(dropped);

        let pid = record.pid();
        let pid_entry = upsert(&mut self.pid_table, pid, || PidEntry::new(pid, uid, None));
        pid_entry.add(size);
        pid_entry.add_dropped(dropped);

        if pid_entry.uid() != uid {
            debug!(
                pid = %pid,
                old_uid = %pid_entry.uid(),
                new_uid = %uid,
                "process id reused by another user"
            );
            pid_entry.set_uid(uid);
            // The cached name belongs to the previous occupant.
            pid_entry.set_name(self.resolver.process_name(pid));
        } else if pid_entry.name().is_none() {
            pid_entry.set_name(self.resolver.process_name(pid));
        }
    }

    /// Account a record leaving the buffer.
    pub fn subtract(&mut self, record: &LogRecord) {
        if !self.enabled {
            return;
        }

        let idx = record.log_id().index();
        let size = record.payload_len();
        let dropped = record.dropped_count();

        self.sizes[idx] = self.sizes[idx].saturating_sub(size);
        self.elements[idx] = self.elements[idx].saturating_sub(1);

        reduce(&mut self.uid_tables[idx], record.uid(), size, dropped);
        reduce(&mut self.pid_table, record.pid(), size, dropped);
    }

    /// Count one lost message against the record's user and process.
    ///
    /// Sizes and category counters are left alone. The caller releases the
    /// payload and marks the record dropped; [`Self::convert_to_dropped`]
    /// does all three.
    pub fn drop(&mut self, record: &LogRecord) {
        if !self.enabled {
            return;
        }

        let idx = record.log_id().index();
        if let Some(entry) = self.uid_tables[idx].get_mut(&record.uid()) {
            entry.add_dropped(1);
        }
        if let Some(entry) = self.pid_table.get_mut(&record.pid()) {
            entry.add_dropped(1);
        }
    }

    /// Turn a live record into a dropped placeholder.
    ///
    /// Counts the loss, releases the payload bytes from the entries and
    /// from the category's current size, and returns the placeholder. The
    /// element count is unchanged: the placeholder still occupies a slot.
    /// Records that are already placeholders come back untouched.
    pub fn convert_to_dropped(&mut self, mut record: LogRecord) -> LogRecord {
        if record.is_dropped() {
            return record;
        }

        if self.enabled {
            self.drop(&record);

            let idx = record.log_id().index();
            let size = record.payload_len();
            self.sizes[idx] = self.sizes[idx].saturating_sub(size);
            reduce(&mut self.uid_tables[idx], record.uid(), size, 0);
            reduce(&mut self.pid_table, record.pid(), size, 0);
        }

        record.mark_dropped();
        record
    }

    /// Forget one element of the record's category without touching tables.
    pub fn erase(&mut self, record: &LogRecord) {
        if !self.enabled {
            return;
        }

        let idx = record.log_id().index();
        self.elements[idx] = self.elements[idx].saturating_sub(1);
    }

    /// Fold placeholder `merged` into the adjacent placeholder `survivor`.
    ///
    /// The survivor takes over the merged dropped count, so entry totals are
    /// unchanged; only the category element count drops by one. The caller
    /// then discards `merged`. Returns `false` and changes nothing unless
    /// both are placeholders of the same category, user and process.
    pub fn merge_dropped(&mut self, survivor: &mut LogRecord, merged: &LogRecord) -> bool {
        if !survivor.can_merge(merged) {
            return false;
        }

        survivor.absorb_dropped(merged.dropped_count());
        self.erase(merged);
        true
    }

    // ------------------------------------------------------------------
    // Collection switch
    // ------------------------------------------------------------------

    pub fn enable_statistics(&mut self) {
        if !self.enabled {
            info!("statistics collection enabled");
        }
        self.enabled = true;
    }

    /// Stop collecting. Existing counters and entries are kept as-is.
    pub fn disable_statistics(&mut self) {
        if self.enabled {
            info!("statistics collection disabled");
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The `n` chattiest users of a category.
    pub fn sort(&self, n: usize, log_id: LogId) -> TopEntries<'_, UidEntry> {
        self.uid_tables[log_id.index()].sort(n)
    }

    /// The `n` chattiest processes across all categories.
    pub fn sort_pids(&self, n: usize) -> TopEntries<'_, PidEntry> {
        self.pid_table.sort(n)
    }

    pub fn uid_table(&self, log_id: LogId) -> &StatsTable<UserId, UidEntry> {
        &self.uid_tables[log_id.index()]
    }

    pub fn pid_table(&self) -> &StatsTable<ProcessId, PidEntry> {
        &self.pid_table
    }

    /// Bytes currently resident.
    pub fn sizes(&self, log_id: LogId) -> usize {
        self.sizes[log_id.index()]
    }

    /// Records currently resident, placeholders included.
    pub fn elements(&self, log_id: LogId) -> usize {
        self.elements[log_id.index()]
    }

    /// Bytes ever recorded.
    pub fn sizes_total(&self, log_id: LogId) -> usize {
        self.sizes_total[log_id.index()]
    }

    /// Records ever recorded.
    pub fn elements_total(&self, log_id: LogId) -> usize {
        self.elements_total[log_id.index()]
    }

    /// Usage report as text.
    pub fn format(&self, uid_filter: Option<UserId>, mask: LogMask) -> String {
        self.snapshot(uid_filter, mask).to_string()
    }

    /// Usage report as structured data.
    pub fn snapshot(&self, uid_filter: Option<UserId>, mask: LogMask) -> StatsSnapshot {
        report::build_snapshot(self, uid_filter, mask)
    }

    // ------------------------------------------------------------------
    // Identity lookups
    // ------------------------------------------------------------------

    pub fn pid_to_name(&self, pid: ProcessId) -> Option<String> {
        self.pid_table
            .get(&pid)
            .and_then(|entry| entry.name().map(str::to_string))
            .or_else(|| self.resolver.process_name(pid))
    }

    pub fn pid_to_uid(&self, pid: ProcessId) -> Option<UserId> {
        self.pid_table
            .get(&pid)
            .map(PidEntry::uid)
            .or_else(|| self.resolver.process_owner(pid))
    }

    /// Account name for `uid`.
    ///
    /// Asks the resolver first. Failing that, if every named process of
    /// that user carries the same command name, that name stands in.
    /// Processes without a cached name are skipped.
    pub fn uid_to_name(&self, uid: UserId) -> Option<String> {
        if let Some(name) = self.resolver.user_name(uid) {
            return Some(name);
        }

        let mut shared: Option<&str> = None;
        for entry in self.pid_table.iter().filter(|entry| entry.uid() == uid) {
            let Some(name) = entry.name() else {
                continue;
            };
            match shared {
                Some(seen) if seen != name => return None,
                _ => shared = Some(name),
            }
        }
        shared.map(str::to_string)
    }
}

fn upsert<K, E>(table: &mut StatsTable<K, E>, key: K, create: impl FnOnce() -> E) -> &mut E
where
    K: Eq + Hash + Copy + std::fmt::Display,
{
    if !table.contains_key(&key) {
        debug!(key = %key, "accounting entry created");
    }
    table.get_or_insert_with(key, create)
}

fn reduce<K, E>(table: &mut StatsTable<K, E>, key: K, size: usize, dropped: usize)
where
    K: Eq + Hash + Copy + std::fmt::Display,
    E: StatsEntry,
{
    let Some(entry) = table.get_mut(&key) else {
        return;
    };

    let mut empty = entry.subtract(size);
    if dropped > 0 {
        empty = entry.subtract_dropped(dropped);
    }
    if empty {
        table.remove(&key);
        debug!(key = %key, "accounting entry removed");
    }
}
