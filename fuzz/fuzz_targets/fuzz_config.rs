//! Fuzz target for logstat.json parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logstat_config::validate::validate_config;
use logstat_config::StatsConfig;

fuzz_target!(|data: &[u8]| {
    // Parsing and validation return errors, never panic
    if let Ok(config) = serde_json::from_slice::<StatsConfig>(data) {
        let _ = validate_config(&config);
    }
});
