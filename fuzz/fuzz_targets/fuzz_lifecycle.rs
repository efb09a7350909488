//! Fuzz target for the accounting lifecycle.
//!
//! Drives arbitrary add / drop / remove / merge / toggle sequences through
//! the engine and checks that current counters never exceed lifetime ones
//! and that an always-enabled run balances back to zero.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logstat_common::{LogId, LogMask, ProcessId, UserId};
use logstat_core::identity::NullResolver;
use logstat_core::{LogRecord, Statistics};

#[derive(Debug, Arbitrary)]
enum Op {
    Add { log_id: u8, uid: u8, pid: u8, size: u16 },
    Drop(u8),
    Remove(u8),
    Merge(u8, u8),
    Toggle,
    Sort(u8),
}

fuzz_target!(|ops: Vec<Op>| {
    let mut stats = Statistics::new(NullResolver);
    let mut resident: Vec<LogRecord> = Vec::new();
    let mut toggled = false;

    for op in ops {
        match op {
            Op::Add { log_id, uid, pid, size } => {
                let Some(log_id) = LogId::from_index(usize::from(log_id) % 5) else {
                    continue;
                };
                let record = LogRecord::new(
                    log_id,
                    UserId(u32::from(uid)),
                    ProcessId(u32::from(pid)),
                    usize::from(size),
                );
                stats.add(&record);
                resident.push(record);
            }
            Op::Drop(i) if !resident.is_empty() => {
                let idx = usize::from(i) % resident.len();
                let record = resident.remove(idx);
                resident.insert(idx, stats.convert_to_dropped(record));
            }
            Op::Remove(i) if !resident.is_empty() => {
                let record = resident.remove(usize::from(i) % resident.len());
                stats.subtract(&record);
            }
            Op::Merge(a, b) if resident.len() > 1 => {
                let a = usize::from(a) % resident.len();
                let b = usize::from(b) % resident.len();
                if a != b {
                    let merged = resident[b].clone();
                    if stats.merge_dropped(&mut resident[a], &merged) {
                        resident.remove(b);
                    }
                }
            }
            Op::Toggle => {
                toggled = true;
                if stats.is_enabled() {
                    stats.disable_statistics();
                } else {
                    stats.enable_statistics();
                }
            }
            Op::Sort(n) => {
                for &log_id in LogId::all() {
                    let _ = stats.sort(usize::from(n), log_id).iter().count();
                }
                let _ = stats.sort_pids(usize::from(n)).iter().count();
            }
            _ => {}
        }

        for &log_id in LogId::all() {
            assert!(stats.sizes(log_id) <= stats.sizes_total(log_id));
        }
    }

    let _ = stats.format(None, LogMask::ALL);

    if !toggled {
        for record in resident.drain(..) {
            stats.subtract(&record);
        }
        for &log_id in LogId::all() {
            assert_eq!(stats.sizes(log_id), 0);
            assert_eq!(stats.elements(log_id), 0);
            assert!(stats.uid_table(log_id).is_empty());
        }
        assert!(stats.pid_table().is_empty());
    }
});
