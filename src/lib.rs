//! editlog - offline viewer and converter for filesystem edit logs
//!
//! Edit logs record namespace operations (create, rename, delete, ...) as a
//! stream of versioned, checksummed binary records. This crate converts them
//! to a structured-text document and back, and summarizes them as
//! per-opcode counts.
//!
//! # Quick Start
//!
//! ```ignore
//! use editlog::{convert, Processor};
//!
//! let outcome = convert("edits".as_ref(), "edits.json".as_ref(), Processor::ToText, false);
//! assert_eq!(outcome.code(), 0);
//! ```
//!
//! # Architecture
//!
//! All runs go through the [`OfflineEditsViewer`]. The codecs live in
//! `editlog-durability` (binary) and `editlog-wire` (text); only the
//! dispatcher API is re-exported here.

// Re-export the public API from editlog-executor
pub use editlog_executor::*;
