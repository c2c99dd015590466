//! Fuzz target for the expression lexer and parser.
//!
//! The parser must never panic; parse errors are fine.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_expression_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = sosguard_expr::fuzz::parse(text);
        // Repeated prefixes like `(`, `-` or `not ` reach the nesting limit.
        if !text.is_empty() && text.len() <= 16 {
            let _ = sosguard_expr::fuzz::parse(&text.repeat(4_096));
        }
    }
});
