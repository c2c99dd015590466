//! Fuzz target for ini-style config parsing.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_ini_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    sosguard_bundle::fuzz::parse_ini(&text);
});
