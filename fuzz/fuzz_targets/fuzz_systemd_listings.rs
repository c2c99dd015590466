//! Fuzz target for `systemctl list-unit-files` / `list-units` parsing.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_systemd_listings
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Listings {
    unit_files: String,
    units: String,
}

fuzz_target!(|input: Listings| {
    if input.unit_files.len() > 64 * 1024 || input.units.len() > 64 * 1024 {
        return;
    }
    sosguard_bundle::fuzz::parse_systemd_listings(&input.unit_files, &input.units);
});
