//! Fuzz target for the procfs identity parsers.
//!
//! `cmdline`, `status` and passwd content come from the host and must never
//! cause a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logstat_common::UserId;
use logstat_core::identity::{parse_cmdline_content, parse_passwd_content, parse_uid_from_status};

fuzz_target!(|data: &[u8]| {
    let _ = parse_cmdline_content(data);

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_uid_from_status(text);
        let _ = parse_passwd_content(text, UserId(0));
        let _ = parse_passwd_content(text, UserId(u32::MAX));
    }
});
