//! Binary edit log codec for editlog
//!
//! This crate handles everything that touches the binary byte stream:
//!
//! - Stream header: layout version and flags
//! - Record framing: opcode, length, txid, fields, CRC32
//! - Streaming reader with typed stop conditions (clean end, filler,
//!   truncation, corruption, unknown opcode)
//! - Streaming writer with optional filler padding
//! - Recovery: truncate a damaged tail instead of failing
//! - Sample-log and corruption helpers for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary; // Streaming reader and writer
pub mod format; // Header, frame and field byte layout
pub mod recovery; // Strict vs. recover handling of decode errors
pub mod testing; // Sample logs and corruption simulation

// === Re-exports ===
pub use binary::{BinaryEditsReader, BinaryEditsWriter};
pub use format::{EditLogHeader, FILLER_BYTE, HEADER_SIZE, MAX_OP_SIZE};
pub use recovery::{RecoveryMode, RecoveryReader, StopReason};
