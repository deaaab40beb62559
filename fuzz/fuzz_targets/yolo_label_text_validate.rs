//! Fuzz target for label text validation.
//!
//! Besides checking for panics, asserts that every reported issue points at
//! a non-blank line of the input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo_annotator::validation::validate_yolo_text;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let report = validate_yolo_text(text);
    let lines: Vec<&str> = text.lines().collect();
    for issue in &report.issues {
        assert!(issue.line >= 1 && issue.line <= lines.len());
        assert!(!lines[issue.line - 1].trim().is_empty());
    }
});
