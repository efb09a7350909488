//! Log statistics core library.
//!
//! This library provides the accounting engine of a logging daemon:
//! - Per-category size and element counters
//! - Per-user and per-process accounting with top-N ranking
//! - Usage reports (text and JSON)
//! - Identity resolution from procfs and passwd
//! - Trace replay standing in for the log buffer
//! - Exit codes and logging setup for the CLI
//!
//! The binary entry point is in `main.rs`.
//!
//! ```
//! use logstat_common::{LogId, ProcessId, UserId};
//! use logstat_core::identity::NullResolver;
//! use logstat_core::{LogRecord, Statistics};
//!
//! let mut stats = Statistics::new(NullResolver);
//! stats.add(&LogRecord::new(LogId::Main, UserId(1000), ProcessId(50), 120));
//! stats.add(&LogRecord::new(LogId::Main, UserId(1000), ProcessId(51), 80));
//!
//! assert_eq!(stats.sizes(LogId::Main), 200);
//! let top = stats.sort(1, LogId::Main);
//! assert_eq!(top.iter().next().map(|e| e.uid()), Some(UserId(1000)));
//! ```

pub mod exit_codes;
pub mod identity;
pub mod logging;
pub mod record;
pub mod replay;
pub mod stats;

pub use record::LogRecord;
pub use stats::Statistics;
