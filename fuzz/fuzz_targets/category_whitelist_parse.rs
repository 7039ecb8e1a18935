//! Fuzz target for the `--categories` whitelist syntax.
//!
//! Run with:
//!   cargo +nightly fuzz run category_whitelist_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use labelcoco::CategoryWhitelist;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(whitelist) = text.parse::<CategoryWhitelist>() {
        let _ = whitelist.to_string();
    }
});
