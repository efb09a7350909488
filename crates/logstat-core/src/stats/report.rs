//! Usage reports.
//!
//! [`StatsSnapshot`] is the report content: one section per selected
//! category that has ever recorded anything, each ranked descending and cut
//! at the configured top-n and at the 1% long tail, plus one process
//! section. Its `Display` impl lays it out for humans; `--format json`
//! serializes the snapshot itself.

use logstat_common::{LogId, LogMask, ProcessId, UserId, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entry::StatsEntry;
use super::statistics::Statistics;
use super::table::SizedEntry;
use crate::identity::IdentityResolver;

/// Structured usage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub schema_version: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid_filter: Option<UserId>,
    pub categories: Vec<CategoryReport>,
    pub pids: Vec<PidRow>,
}

/// Counters and chattiest users of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub log_id: LogId,
    pub size: usize,
    pub elements: usize,
    pub size_total: usize,
    pub elements_total: usize,
    pub uids: Vec<UidRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidRow {
    pub uid: UserId,
    pub name: Option<String>,
    pub size: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidRow {
    pub pid: ProcessId,
    pub uid: UserId,
    pub name: Option<String>,
    pub size: usize,
    pub dropped: usize,
}

pub(crate) fn build_snapshot<R: IdentityResolver>(
    stats: &Statistics<R>,
    uid_filter: Option<UserId>,
    mask: LogMask,
) -> StatsSnapshot {
    let top_n = stats.report_config().top_n;
    let keep = |uid: UserId| uid_filter.is_none_or(|filter| filter == uid);

    let categories = mask
        .ids()
        .filter(|&id| stats.elements_total(id) > 0)
        .map(|id| CategoryReport {
            log_id: id,
            size: stats.sizes(id),
            elements: stats.elements(id),
            size_total: stats.sizes_total(id),
            elements_total: stats.elements_total(id),
            uids: stats
                .sort(top_n, id)
                .iter()
                .filter(|entry| keep(entry.key()))
                .map(|entry| UidRow {
                    uid: entry.key(),
                    name: stats.uid_to_name(entry.key()),
                    size: entry.sizes(),
                    dropped: entry.dropped(),
                })
                .collect(),
        })
        .collect();

    let pids = if stats.report_config().include_pids {
        stats
            .sort_pids(top_n)
            .iter()
            .filter(|entry| keep(entry.uid()))
            .map(|entry| PidRow {
                pid: entry.key(),
                uid: entry.uid(),
                name: stats.pid_to_name(entry.key()),
                size: entry.sizes(),
                dropped: entry.dropped(),
            })
            .collect()
    } else {
        Vec::new()
    };

    StatsSnapshot {
        schema_version: SCHEMA_VERSION.to_string(),
        enabled: stats.is_enabled(),
        uid_filter,
        categories,
        pids,
    }
}

const LABEL_WIDTH: usize = 9;
const COLUMN_WIDTH: usize = 16;

/// Plain-text usage report.
impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.categories.is_empty() {
            let mut header = format!("{:<LABEL_WIDTH$}", "size/num");
            let mut total = format!("{:<LABEL_WIDTH$}", "Total");
            let mut now = format!("{:<LABEL_WIDTH$}", "Now");
            for cat in &self.categories {
                header.push_str(&format!("{:<COLUMN_WIDTH$}", cat.log_id.name()));
                total.push_str(&format!(
                    "{:<COLUMN_WIDTH$}",
                    format!("{}/{}", cat.size_total, cat.elements_total)
                ));
                now.push_str(&format!(
                    "{:<COLUMN_WIDTH$}",
                    format!("{}/{}", cat.size, cat.elements)
                ));
            }
            for line in [header, total, now] {
                writeln!(f, "{}", line.trim_end())?;
            }
        }

        for cat in self.categories.iter().filter(|cat| !cat.uids.is_empty()) {
            writeln!(f, "\nChattiest UIDs in {} log buffer:", cat.log_id.name())?;
            write_row(f, &["UID", "NAME", "BYTES", "DROPPED"], &UID_COLUMNS)?;
            for row in &cat.uids {
                write_row(
                    f,
                    &[
                        &row.uid.to_string(),
                        row.name.as_deref().unwrap_or("-"),
                        &row.size.to_string(),
                        &row.dropped.to_string(),
                    ],
                    &UID_COLUMNS,
                )?;
            }
        }

        if !self.pids.is_empty() {
            writeln!(f, "\nChattiest PIDs:")?;
            write_row(f, &["PID", "UID", "COMMAND", "BYTES", "DROPPED"], &PID_COLUMNS)?;
            for row in &self.pids {
                write_row(
                    f,
                    &[
                        &row.pid.to_string(),
                        &row.uid.to_string(),
                        row.name.as_deref().unwrap_or("-"),
                        &row.size.to_string(),
                        &row.dropped.to_string(),
                    ],
                    &PID_COLUMNS,
                )?;
            }
        }

        Ok(())
    }
}

const UID_COLUMNS: [usize; 4] = [8, 24, 12, 8];
const PID_COLUMNS: [usize; 5] = [8, 8, 24, 12, 8];

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$} ", cell, width = width))
        .collect();
    writeln!(f, "{}", line.trim_end())
}
