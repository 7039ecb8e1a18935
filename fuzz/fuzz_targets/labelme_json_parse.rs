//! Fuzz target for label file parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run labelme_json_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run labelme_json_parse fuzz/corpus/labelme_json_parse/

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use labelcoco::ir::io_labelme_json::from_labelme_slice;
use labelcoco::materialize::decode_payload;

fuzz_target!(|data: &[u8]| {
    // Label files embed whole images; 10MB covers realistic inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(record) = from_labelme_slice(data, Path::new("fuzz.json")) {
        let _ = decode_payload(&record.image_data);
    }
});
