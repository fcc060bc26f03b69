//! Fuzz target: `operator::parse_line`
//!
//! cargo fuzz run fuzz_operator_line

#![no_main]

use homenet::operator::parse_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = core::str::from_utf8(data) {
        let _ = parse_line(line);
    }
});
