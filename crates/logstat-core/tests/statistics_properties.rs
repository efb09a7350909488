//! Property-based tests for accounting invariants.

use std::collections::HashMap;

use logstat_common::{LogId, ProcessId, UserId};
use logstat_core::identity::NullResolver;
use logstat_core::stats::{select_top, SizedEntry, StatsEntry, LONG_TAIL_DIVISOR};
use logstat_core::{LogRecord, Statistics};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add {
        log_id: LogId,
        uid: u32,
        pid: u32,
        size: usize,
    },
    Drop(usize),
    Remove(usize),
    Merge(usize, usize),
    Toggle,
}

fn log_id_strategy() -> impl Strategy<Value = LogId> {
    (0usize..5).prop_map(|idx| LogId::from_index(idx).expect("index in range"))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (log_id_strategy(), 0u32..4, 0u32..6, 1usize..4096).prop_map(
            |(log_id, uid, pid, size)| Op::Add { log_id, uid, pid, size }
        ),
        2 => any::<usize>().prop_map(Op::Drop),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Merge(a, b)),
    ]
}

fn ops_with_toggles() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(prop_oneof![9 => op_strategy(), 1 => Just(Op::Toggle)], 0..200)
}

/// Minimal buffer: resident records in insertion order.
struct Buffer {
    records: Vec<LogRecord>,
}

impl Buffer {
    fn pick(&self, raw: usize) -> Option<usize> {
        (!self.records.is_empty()).then(|| raw % self.records.len())
    }
}

/// Run ops with collection always on; returns the resident records.
fn run_enabled(stats: &mut Statistics<NullResolver>, ops: &[Op]) -> Vec<LogRecord> {
    let mut buffer = Buffer { records: Vec::new() };
    for op in ops {
        match *op {
            Op::Add {
                log_id,
                uid,
                pid,
                size,
            } => {
                let record = LogRecord::new(log_id, UserId(uid), ProcessId(pid), size);
                stats.add(&record);
                buffer.records.push(record);
            }
            Op::Drop(raw) => {
                if let Some(i) = buffer.pick(raw) {
                    let record = buffer.records.remove(i);
                    let record = stats.convert_to_dropped(record);
                    buffer.records.insert(i, record);
                }
            }
            Op::Remove(raw) => {
                if let Some(i) = buffer.pick(raw) {
                    let record = buffer.records.remove(i);
                    stats.subtract(&record);
                }
            }
            Op::Merge(a, b) => {
                if let (Some(i), Some(j)) = (buffer.pick(a), buffer.pick(b)) {
                    if i != j {
                        let merged = buffer.records[j].clone();
                        if stats.merge_dropped(&mut buffer.records[i], &merged) {
                            buffer.records.remove(j);
                        }
                    }
                }
            }
            Op::Toggle => {}
        }
    }
    buffer.records
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Current counters always equal what is resident; tables agree with them.
    #[test]
    fn counters_match_resident_records(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut stats = Statistics::new(NullResolver);
        let resident = run_enabled(&mut stats, &ops);

        for &log_id in LogId::all() {
            let in_cat: Vec<_> = resident.iter().filter(|r| r.log_id() == log_id).collect();
            let bytes: usize = in_cat.iter().map(|r| r.payload_len()).sum();
            prop_assert_eq!(stats.sizes(log_id), bytes);
            prop_assert_eq!(stats.elements(log_id), in_cat.len());

            let table_bytes: usize = stats.uid_table(log_id).iter().map(|e| e.sizes()).sum();
            let table_dropped: usize = stats.uid_table(log_id).iter().map(|e| e.dropped()).sum();
            let dropped: usize = in_cat.iter().map(|r| r.dropped_count()).sum();
            prop_assert_eq!(table_bytes, bytes);
            prop_assert_eq!(table_dropped, dropped);
        }

        let pid_bytes: usize = stats.pid_table().iter().map(|e| e.sizes()).sum();
        let resident_bytes: usize = resident.iter().map(|r| r.payload_len()).sum();
        prop_assert_eq!(pid_bytes, resident_bytes);
    }

    /// Entries exist exactly for keys that still own a resident record.
    #[test]
    fn no_empty_entries_survive(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut stats = Statistics::new(NullResolver);
        let resident = run_enabled(&mut stats, &ops);

        for entry in stats.pid_table().iter() {
            prop_assert!(entry.sizes() > 0 || entry.dropped() > 0);
        }
        for &log_id in LogId::all() {
            let mut owners: Vec<UserId> = resident
                .iter()
                .filter(|r| r.log_id() == log_id && (r.payload_len() > 0 || r.is_dropped()))
                .map(|r| r.uid())
                .collect();
            owners.sort();
            owners.dedup();
            let mut keys: Vec<UserId> = stats.uid_table(log_id).iter().map(|e| e.key()).collect();
            keys.sort();
            prop_assert_eq!(keys, owners);
        }
    }

    /// Every completed conversion is exactly one dropped-state transition.
    #[test]
    fn convert_to_dropped_transitions_once(sizes in prop::collection::vec(1usize..512, 1..32)) {
        let mut stats = Statistics::new(NullResolver);
        let mut transitions = 0usize;
        let mut placeholders = Vec::new();

        for size in sizes {
            let record = LogRecord::new(LogId::Main, UserId(1), ProcessId(1), size);
            stats.add(&record);
            let was_dropped = record.is_dropped();
            let placeholder = stats.convert_to_dropped(record);
            if !was_dropped && placeholder.is_dropped() {
                transitions += 1;
            }
            // A second conversion is not a transition.
            let again = stats.convert_to_dropped(placeholder);
            prop_assert!(again.is_dropped());
            placeholders.push(again);
        }

        let entry = stats.uid_table(LogId::Main).get(&UserId(1)).expect("entry");
        prop_assert_eq!(entry.dropped(), transitions);
        prop_assert_eq!(entry.sizes(), 0);
        prop_assert_eq!(transitions, placeholders.len());
    }

    /// Lifetime counters are monotonic under any sequence, toggles included.
    #[test]
    fn lifetime_counters_monotonic(ops in ops_with_toggles()) {
        let mut stats = Statistics::new(NullResolver);
        let mut resident: Vec<LogRecord> = Vec::new();
        let mut last = [(0usize, 0usize); 5];

        for op in &ops {
            match *op {
                Op::Add { log_id, uid, pid, size } => {
                    let record = LogRecord::new(log_id, UserId(uid), ProcessId(pid), size);
                    stats.add(&record);
                    resident.push(record);
                }
                Op::Remove(raw) if !resident.is_empty() => {
                    let record = resident.remove(raw % resident.len());
                    stats.subtract(&record);
                }
                Op::Toggle => {
                    if stats.is_enabled() {
                        stats.disable_statistics();
                    } else {
                        stats.enable_statistics();
                    }
                }
                _ => {}
            }

            for &log_id in LogId::all() {
                let now = (stats.sizes_total(log_id), stats.elements_total(log_id));
                let prev = last[log_id.index()];
                prop_assert!(now.0 >= prev.0 && now.1 >= prev.1);
                prop_assert!(stats.sizes(log_id) <= now.0);
                last[log_id.index()] = now;
            }
        }
    }

    /// select_top returns the n largest sizes, descending, cursor honours the cutoff.
    #[test]
    fn select_top_is_partial_sort(sizes in prop::collection::vec(0usize..100_000, 0..64), n in 0usize..16) {
        #[derive(Debug)]
        struct Weighted(usize);
        impl SizedEntry for Weighted {
            fn sizes(&self) -> usize {
                self.0
            }
        }

        let entries: Vec<Weighted> = sizes.iter().copied().map(Weighted).collect();
        let top = select_top(&entries, n);
        prop_assert_eq!(top.len(), n);

        let mut expected = sizes.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(n);
        let got: Vec<usize> = top.slots().iter().flatten().map(|e| e.sizes()).collect();
        prop_assert_eq!(got, expected);

        if let Some(first) = top.get(0) {
            let cutoff = first.sizes() / LONG_TAIL_DIVISOR;
            for (i, entry) in top.iter().enumerate() {
                prop_assert!(i == 0 || entry.sizes() > cutoff);
            }
        }
    }

    /// Sum of per-key sizes is independent of interleaving.
    #[test]
    fn pid_totals_accumulate(adds in prop::collection::vec((0u32..8, 0usize..1000), 0..100)) {
        let mut stats = Statistics::new(NullResolver);
        let mut expected: HashMap<u32, usize> = HashMap::new();
        for (pid, size) in &adds {
            stats.add(&LogRecord::new(LogId::Main, UserId(0), ProcessId(*pid), *size));
            *expected.entry(*pid).or_default() += size;
        }
        for (pid, size) in expected {
            let got = stats.pid_table().get(&ProcessId(pid)).map(|e| e.sizes());
            prop_assert_eq!(got, Some(size));
        }
    }
}
