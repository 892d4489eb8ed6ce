//! Shared helpers for the integration suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use editlog::{OpCode, OpRegistry};
use editlog_core::OperationRecord;
use editlog_durability::BinaryEditsWriter;
use std::path::{Path, PathBuf};

pub use tempfile::TempDir;

/// Layout version occupies bytes 0..4; byte 3 is its low-order byte
pub const VERSION_BYTE: usize = 3;

/// Fresh scratch directory
pub fn scratch() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Encode `records` as a binary log, optionally padded with filler
pub fn binary_log(records: &[OperationRecord], pad_to: Option<u64>) -> Vec<u8> {
    let registry = OpRegistry::standard();
    let mut writer = BinaryEditsWriter::new(&registry, Vec::new()).unwrap();
    if let Some(len) = pad_to {
        writer = writer.with_padding(len);
    }
    for record in records {
        writer.write_record(record).unwrap();
    }
    writer.finish().unwrap()
}

/// Write `bytes` to `dir/name`
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Default-valued record for `op`
pub fn record(op: OpCode, txid: i64) -> OperationRecord {
    OpRegistry::standard().default_record(op, txid).unwrap()
}

/// Compare two binary logs ignoring trailing filler and the version byte.
pub fn assert_same_log(actual: &[u8], expected: &[u8]) {
    let trim = |b: &[u8]| -> Vec<u8> {
        let end = b.iter().rposition(|x| *x != 0xFF).map_or(0, |i| i + 1);
        let mut v = b[..end.max(8).min(b.len())].to_vec();
        v[VERSION_BYTE] = 0;
        v
    };
    assert_eq!(trim(actual), trim(expected));
}
