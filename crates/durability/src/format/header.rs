//! Edit log stream header.
//!
//! # Header Layout
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────┐
//! │ Layout Version (i32 BE)  │ Layout Flags (i32 BE)    │
//! └──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Layout versions are negative and decrease as the format evolves, so the
//! first byte of every supported stream is `0xFF` and the low-order byte
//! (offset 3) carries the distinguishing value.

use byteorder::{BigEndian, ByteOrder};
use editlog_core::{Error, LayoutVersion, Result};
use std::io::{ErrorKind, Read};

/// Size of the stream header in bytes
pub const HEADER_SIZE: usize = 8;

/// Only layout flag value understood by this codec
pub const LAYOUT_FLAGS_NONE: i32 = 0;

/// Decoded stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditLogHeader {
    /// Layout version the stream was written with
    pub layout_version: LayoutVersion,

    /// Feature flags; must be zero
    pub layout_flags: i32,
}

impl EditLogHeader {
    /// Header for the layout version this codec writes
    pub fn current() -> Self {
        EditLogHeader {
            layout_version: LayoutVersion::CURRENT,
            layout_flags: LAYOUT_FLAGS_NONE,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        BigEndian::write_i32(&mut bytes[0..4], self.layout_version.get());
        BigEndian::write_i32(&mut bytes[4..8], self.layout_flags);
        bytes
    }

    /// Deserialize and validate header bytes.
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        let raw_version = BigEndian::read_i32(&bytes[0..4]);
        let layout_flags = BigEndian::read_i32(&bytes[4..8]);

        let layout_version = LayoutVersion::supported(raw_version)?;
        if layout_flags != LAYOUT_FLAGS_NONE {
            return Err(Error::schema(
                "EDITS_HEADER",
                format!("unsupported layout flags {:#x}", layout_flags),
            ));
        }

        Ok(EditLogHeader {
            layout_version,
            layout_flags,
        })
    }

    /// Read and validate a header from the start of a stream.
    ///
    /// A stream shorter than the header is reported as truncated at offset 0.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut bytes) {
            Ok(()) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::truncated(
                0,
                format!("stream shorter than {}-byte header", HEADER_SIZE),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Cheap signature check used for format sniffing.
    ///
    /// Only checks that the first byte belongs to a negative layout version.
    /// A prefix shorter than the header still qualifies so that
    /// [`EditLogHeader::read_from`] can report it as truncated; full
    /// validation happens in [`EditLogHeader::from_bytes`].
    pub fn looks_like(prefix: &[u8]) -> bool {
        prefix.first() == Some(&0xFF)
    }
}

impl Default for EditLogHeader {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let bytes = EditLogHeader::current().to_bytes();
        assert_eq!(bytes, [0xFF, 0xFF, 0xFF, 0xBE, 0, 0, 0, 0]);
        assert_eq!(
            EditLogHeader::from_bytes(&bytes).unwrap(),
            EditLogHeader::current()
        );
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = EditLogHeader::current().to_bytes();
        bytes[3] = 0xF0; // -16
        assert!(matches!(
            EditLogHeader::from_bytes(&bytes),
            Err(Error::UnsupportedLayoutVersion { version: -16 })
        ));
    }

    #[test]
    fn test_nonzero_flags_rejected() {
        let mut bytes = EditLogHeader::current().to_bytes();
        bytes[7] = 1;
        assert!(matches!(
            EditLogHeader::from_bytes(&bytes),
            Err(Error::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_short_stream_is_truncated() {
        let mut short: &[u8] = &[0xFF, 0xFF, 0xFF];
        assert!(matches!(
            EditLogHeader::read_from(&mut short),
            Err(Error::TruncatedStream { offset: 0, .. })
        ));
    }

    #[test]
    fn test_looks_like() {
        assert!(EditLogHeader::looks_like(&EditLogHeader::current().to_bytes()));
        assert!(EditLogHeader::looks_like(&[0xFF; 4]));
        assert!(EditLogHeader::looks_like(&[0xFF]));
        assert!(!EditLogHeader::looks_like(&[]));
        assert!(!EditLogHeader::looks_like(b"{\"EDITS\"}"));
    }
}
