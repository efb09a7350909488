//! Fuzz target for trace parsing and replay.
//!
//! Any byte stream either fails to parse with a line-numbered error or
//! replays without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logstat_core::replay::{declared_identities, parse_trace, ReplayBuffer};
use logstat_core::Statistics;

fuzz_target!(|data: &[u8]| {
    let Ok(events) = parse_trace(data) else {
        return;
    };

    let mut stats = Statistics::new(declared_identities(&events));
    let mut buffer = ReplayBuffer::new();
    let _ = buffer.replay(&mut stats, &events);
    let _ = stats.format(None, logstat_common::LogMask::ALL);
});
