//! Format guard tests: a processor never runs on input it cannot consume,
//! and a rejected run leaves no output behind.

use super::write_sample;
use crate::{Error, Flags, OfflineEditsViewer, Processor, StreamFormat};

#[test]
fn test_binary_input_rejected_by_to_binary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(dir.path(), "edits", None);
    let output = dir.path().join("out.bin");

    let outcome = OfflineEditsViewer::new().go(&input, &output, Processor::ToBinary, &Flags::default());

    assert_eq!(outcome.code(), -1);
    assert!(matches!(
        outcome.error(),
        Some(Error::FormatMismatch {
            expected: StreamFormat::Text,
            ..
        })
    ));
    assert!(!output.exists());
}

#[test]
fn test_text_input_rejected_by_to_text_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("edits.bin");
    std::fs::write(&input, "{\"EDITS_VERSION\": -66, \"RECORDS\": []}").unwrap();

    for processor in [Processor::ToText, Processor::Statistics] {
        let output = dir.path().join(format!("out-{}", processor));
        let outcome = OfflineEditsViewer::new().go(&input, &output, processor, &Flags::default());
        assert!(matches!(outcome.error(), Some(Error::FormatMismatch { .. })));
        assert!(!output.exists());
    }
}

#[test]
fn test_empty_and_unknown_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty");
    std::fs::write(&empty, b"").unwrap();
    let junk = dir.path().join("junk");
    std::fs::write(&junk, b"<?xml version=\"1.0\"?><EDITS/>").unwrap();

    for input in [&empty, &junk] {
        let output = dir.path().join("out");
        let outcome = OfflineEditsViewer::new().go(input, &output, Processor::ToText, &Flags::default());
        assert!(matches!(outcome.error(), Some(Error::FormatMismatch { .. })));
        assert!(!output.exists());
    }
}

#[test]
fn test_missing_input_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = crate::convert(
        &dir.path().join("missing"),
        &dir.path().join("out"),
        Processor::ToText,
        false,
    );
    assert_eq!(outcome.code(), -1);
    assert!(matches!(outcome.error(), Some(Error::Io(_))));
}
