//! Binary edit log codec.
//!
//! [`BinaryEditsReader`] decodes a stream lazily, one frame at a time;
//! [`BinaryEditsWriter`] encodes records at the current layout version.
//! Byte layout lives in [`crate::format`].

mod reader;
mod writer;

pub use reader::BinaryEditsReader;
pub use writer::BinaryEditsWriter;
