//! Error types for edit log processing
//!
//! This module defines the error taxonomy shared by every codec and by the
//! processor dispatcher. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.
//!
//! Errors fall into two classes:
//!
//! | Class | Variants | Meaning |
//! |-------|----------|---------|
//! | Recoverable | `CorruptRecord`, `TruncatedStream` | Physical damage to the tail of a log |
//! | Structural | everything else | Format or version mismatch, never absorbed |

use crate::format::StreamFormat;
use std::io;
use thiserror::Error;

/// Result type alias for edit log operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for edit log decoding, encoding and conversion
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Decoding stopped inside a record: short body, short checksum,
    /// bad length prefix or checksum mismatch
    #[error("corrupt record at offset {offset}: {detail}")]
    CorruptRecord {
        /// Byte offset of the record that failed to decode
        offset: u64,
        /// Human-readable description
        detail: String,
    },

    /// Physical end of stream reached before a record frame could be read
    #[error("truncated stream at offset {offset}: {detail}")]
    TruncatedStream {
        /// Byte offset where the stream ended
        offset: u64,
        /// Human-readable description
        detail: String,
    },

    /// Opcode tag (or name) not present in the registry, or the invalid
    /// sentinel found in record position
    #[error("unknown opcode {opcode} at {offset}")]
    UnknownOpcode {
        /// Tag rendered as hex (binary input) or the symbolic name (text input)
        opcode: String,
        /// Byte offset when decoding binary input; record index when decoding
        /// text input or when a writer rejects a record
        offset: u64,
    },

    /// Detected input format is not what the requested processor consumes
    #[error("format mismatch: expected {expected} input, found {actual}")]
    FormatMismatch {
        /// Format the processor expects
        expected: StreamFormat,
        /// Format that was detected
        actual: String,
    },

    /// Field list does not match the opcode's declared schema
    #[error("schema violation in {opcode}: {detail}")]
    SchemaViolation {
        /// Symbolic opcode name
        opcode: String,
        /// What did not match
        detail: String,
    },

    /// Stream declares a layout version this build cannot decode
    #[error("unsupported layout version {version}")]
    UnsupportedLayoutVersion {
        /// Declared version
        version: i32,
    },

    /// Text document is not well-formed
    #[error("malformed text document: {0}")]
    MalformedText(String),

    /// Invalid configuration or command-line options
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a corrupt-record error
    pub fn corrupt(offset: u64, detail: impl Into<String>) -> Self {
        Error::CorruptRecord {
            offset,
            detail: detail.into(),
        }
    }

    /// Create a truncated-stream error
    pub fn truncated(offset: u64, detail: impl Into<String>) -> Self {
        Error::TruncatedStream {
            offset,
            detail: detail.into(),
        }
    }

    /// Create a schema-violation error
    pub fn schema(opcode: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::SchemaViolation {
            opcode: opcode.into(),
            detail: detail.into(),
        }
    }

    /// Whether recovery mode may absorb this error by truncating the stream.
    ///
    /// Only physical damage qualifies. Unknown opcodes and schema
    /// violations point at a format or version mismatch and stay fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::CorruptRecord { .. } | Error::TruncatedStream { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedText(e.to_string())
    }
}
