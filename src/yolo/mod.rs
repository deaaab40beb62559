//! YOLO text format: label line codec.
//!
//! See [`codec`] for the line format. Validation of whole label blobs lives
//! in [`crate::validation`]; multi-file export in [`crate::export`].

pub mod codec;

pub use codec::{
    decode_line, decode_lines, encode_line, encode_lines, DecodeError, DecodeOutcome, LabelField,
    LineError, FIELD_COUNT, MAX_CLASS_ID,
};

#[cfg(feature = "fuzzing")]
pub use codec::fuzz_decode_line;
