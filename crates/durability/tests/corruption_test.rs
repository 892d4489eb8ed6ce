//! Corruption detection tests
//!
//! These tests verify that damage to a binary edit log file is detected:
//! - CRC32 detects bit flips in a record body
//! - Truncated tails are reported as corruption or truncation
//! - Garbage after the filler is reported as an unknown opcode
//! - Header damage is fatal

use editlog_core::{Error, OpRegistry, OperationRecord, Result};
use editlog_durability::testing::{EditLogCorruptor, SampleEdits};
use editlog_durability::{BinaryEditsReader, HEADER_SIZE};
use std::path::Path;
use tempfile::TempDir;

fn read_all(registry: &OpRegistry, path: &Path) -> Vec<Result<OperationRecord>> {
    BinaryEditsReader::open(registry, path).unwrap().collect()
}

#[test]
fn test_crc_detects_bit_flip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edits");
    let registry = OpRegistry::standard();
    SampleEdits::new(&registry).write_binary(&path, None).unwrap();

    // First record is START_LOG_SEGMENT: 5-byte prefix, then txid
    EditLogCorruptor::new(&path)
        .flip_bits(HEADER_SIZE as u64 + 7, 0x10)
        .unwrap();

    let results = read_all(&registry, &path);
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(Error::CorruptRecord { offset, detail }) => {
            assert_eq!(*offset, HEADER_SIZE as u64);
            assert!(detail.contains("checksum mismatch"));
        }
        other => panic!("expected CorruptRecord, got {:?}", other),
    }
}

#[test]
fn test_truncated_tail_fails_strict_read() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edits");
    let registry = OpRegistry::standard();
    let sample = SampleEdits::new(&registry);
    sample.write_binary(&path, None).unwrap();
    let expected = sample.records().len();

    EditLogCorruptor::new(&path).truncate_tail(5).unwrap();

    let results = read_all(&registry, &path);
    assert_eq!(results.len(), expected);
    assert!(results[..expected - 1].iter().all(|r| r.is_ok()));
    assert!(results[expected - 1].as_ref().unwrap_err().is_recoverable());
}

#[test]
fn test_garbage_after_filler_is_unknown_opcode() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edits");
    let registry = OpRegistry::standard();
    SampleEdits::new(&registry)
        .write_binary(&path, Some(32 * 1024))
        .unwrap();
    EditLogCorruptor::new(&path)
        .append_garbage(&[0x00, 0x01])
        .unwrap();

    let results = read_all(&registry, &path);
    assert!(matches!(
        results.last(),
        Some(Err(Error::UnknownOpcode { .. }))
    ));
}

#[test]
fn test_truncated_header_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edits");
    let registry = OpRegistry::standard();
    SampleEdits::new(&registry).write_binary(&path, None).unwrap();
    EditLogCorruptor::new(&path).truncate_to(6).unwrap();

    assert!(matches!(
        BinaryEditsReader::open(&registry, &path),
        Err(Error::TruncatedStream { offset: 0, .. })
    ));
}

#[test]
fn test_layout_version_byte_is_checked() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edits");
    let registry = OpRegistry::standard();
    SampleEdits::new(&registry).write_binary(&path, None).unwrap();

    // -66 (0xBE) -> -2 (0xFE)
    EditLogCorruptor::new(&path).flip_bits(3, 0x40).unwrap();

    assert!(matches!(
        BinaryEditsReader::open(&registry, &path),
        Err(Error::UnsupportedLayoutVersion { version: -2 })
    ));
}
