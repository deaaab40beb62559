//! Fuzz target for YOLO single-line label decoding.
//!
//! This fuzzer feeds arbitrary UTF-8 lines to the line decoder,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo_annotator::yolo::fuzz_decode_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_decode_line(line);
});
