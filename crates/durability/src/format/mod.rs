//! On-disk byte format of binary edit logs.
//!
//! This module centralizes all serialization logic for the binary stream.
//! Keeping the byte layout separate from streaming (how records are pulled
//! from or pushed to a file) keeps layout-version handling in one place.
//!
//! # Module Structure
//!
//! - `header`: stream header (layout version + flags)
//! - `frame`: record framing and checksums
//! - `field`: per-kind field encoding

pub mod field;
pub mod frame;
pub mod header;

pub use field::{read_field, write_field, FieldDecodeError};
pub use frame::{
    check_body_len, checksum, decode_body, encode_record, CRC_SIZE, FILLER_BYTE,
    FRAME_PREFIX_SIZE, MAX_OP_SIZE, MIN_BODY_LEN,
};
pub use header::{EditLogHeader, HEADER_SIZE, LAYOUT_FLAGS_NONE};
