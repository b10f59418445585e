//! Fuzz target: voltage profile parser
//!
//! Feeds arbitrary UTF-8 to `Profile::parse` and verifies:
//! - No panics
//! - Errors always point at a real line
//! - Parsed profiles never contain zero-length voltage steps
//!
//! cargo fuzz run fuzz_profile_parser

#![no_main]

use batmon::adapters::sim::{Profile, Step};
use batmon::error::Error;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match Profile::parse(text) {
        Ok(profile) => {
            for step in profile.steps() {
                if let Step::Voltage { ticks, .. } = step {
                    assert!(*ticks > 0, "zero-tick step accepted");
                }
            }
        }
        Err(Error::Profile { line }) => {
            assert!(line >= 1 && line <= text.lines().count(), "bad line {line}");
        }
        Err(other) => panic!("unexpected error kind: {other}"),
    }
});
