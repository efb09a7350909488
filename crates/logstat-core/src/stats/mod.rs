//! Log statistics accounting.
//!
//! - [`table`]: keyed aggregate table and partial top-N ranking
//! - [`entry`]: per-user and per-process accumulators
//! - [`statistics`]: the orchestrator driven by the log buffer
//! - [`report`]: text and structured usage reports

pub mod entry;
pub mod report;
pub mod statistics;
pub mod table;

pub use entry::{PidEntry, StatsEntry, UidEntry};
pub use report::{CategoryReport, PidRow, StatsSnapshot, UidRow};
pub use statistics::Statistics;
pub use table::{select_top, SizedEntry, StatsTable, TopEntries, TopIter, LONG_TAIL_DIVISOR};
