//! Structured-text codec for editlog
//!
//! Converts edit log records to and from a JSON document whose layout
//! mirrors the binary stream: a version stamp followed by records, each
//! naming its opcode and listing its fields in schema order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod json;

pub use json::{TextEditsReader, TextEditsWriter};
