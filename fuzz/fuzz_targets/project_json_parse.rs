//! Fuzz target for project snapshot JSON parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo_annotator::ir::io_json::from_json_str;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    let _ = from_json_str(json);
});
