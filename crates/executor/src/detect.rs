//! Input format detection by content.
//!
//! File names are never consulted.

use editlog_core::{Result, StreamFormat};
use editlog_durability::EditLogHeader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes inspected when sniffing
const SNIFF_LEN: usize = 4096;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Classify a content prefix.
///
/// A leading `{` (after optional BOM and whitespace) is text; a prefix that
/// starts like a binary header is binary, even when cut short inside the
/// header so the binary reader can report the truncation.
pub fn sniff(prefix: &[u8]) -> Option<StreamFormat> {
    let body = prefix.strip_prefix(UTF8_BOM).unwrap_or(prefix);
    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'{') {
        return Some(StreamFormat::Text);
    }
    if EditLogHeader::looks_like(prefix) {
        return Some(StreamFormat::Binary);
    }
    None
}

/// Detect the format of the file at `path`.
pub fn detect_format(path: &Path) -> Result<Option<StreamFormat>> {
    let mut file = File::open(path)?;
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    file.by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut prefix)?;
    Ok(sniff(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_text() {
        assert_eq!(sniff(b"{\"EDITS_VERSION\": -66"), Some(StreamFormat::Text));
        assert_eq!(sniff(b"\n  \t{"), Some(StreamFormat::Text));
        assert_eq!(sniff(b"\xEF\xBB\xBF{}"), Some(StreamFormat::Text));
    }

    #[test]
    fn test_sniff_binary() {
        let header = EditLogHeader::current().to_bytes();
        assert_eq!(sniff(&header), Some(StreamFormat::Binary));
        assert_eq!(sniff(&header[..4]), Some(StreamFormat::Binary));
        assert_eq!(sniff(&header[..1]), Some(StreamFormat::Binary));
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(sniff(b""), None);
        assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(sniff(&[0u8; 16]), None);
    }

    #[test]
    fn test_detect_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edits.BIN");
        std::fs::write(&path, b"  {}").unwrap();
        assert_eq!(detect_format(&path).unwrap(), Some(StreamFormat::Text));

        let empty = dir.path().join("empty");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(detect_format(&empty).unwrap(), None);

        assert!(detect_format(&dir.path().join("missing")).is_err());
    }
}
