//! Text edit log reader.

use super::decode::{expect_keys, json_to_record};
use super::keys;
use editlog_core::{Error, LayoutVersion, OpRegistry, OperationRecord, Result};
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Decodes a JSON edit log document.
///
/// The document is parsed up front; records are converted lazily, one per
/// call. After the first error the reader is fused.
pub struct TextEditsReader<'r> {
    registry: &'r OpRegistry,
    version: LayoutVersion,
    records: std::vec::IntoIter<JsonValue>,
    index: u64,
    finished: bool,
}

impl<'r> TextEditsReader<'r> {
    /// Open a text edit log file.
    pub fn open(registry: &'r OpRegistry, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(registry, BufReader::new(file))
    }

    /// Parse a document and validate its envelope.
    pub fn new<R: Read>(registry: &'r OpRegistry, reader: R) -> Result<Self> {
        let document: JsonValue = serde_json::from_reader(reader)?;
        Self::from_document(registry, document)
    }

    /// Validate an already-parsed document.
    pub fn from_document(registry: &'r OpRegistry, document: JsonValue) -> Result<Self> {
        let JsonValue::Object(mut root) = document else {
            return Err(Error::schema("EDITS", "document root is not an object"));
        };
        expect_keys(&root, &[keys::EDITS_VERSION, keys::RECORDS])
            .map_err(|detail| Error::schema("EDITS", detail))?;

        let raw_version = root[keys::EDITS_VERSION]
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| Error::schema("EDITS", "EDITS_VERSION is not a 32-bit integer"))?;
        let version = LayoutVersion::supported(raw_version)?;

        let records = match root.remove(keys::RECORDS) {
            Some(JsonValue::Array(records)) => records,
            _ => return Err(Error::schema("EDITS", "RECORDS is not an array")),
        };
        debug!(
            layout_version = version.get(),
            records = records.len(),
            "Parsed text edit log"
        );

        Ok(TextEditsReader {
            registry,
            version,
            records: records.into_iter(),
            index: 0,
            finished: false,
        })
    }

    /// Layout version declared by the document
    pub fn layout_version(&self) -> LayoutVersion {
        self.version
    }

    /// Records converted so far
    pub fn records_read(&self) -> u64 {
        self.index
    }

    /// Convert the next record, or `None` after the last.
    pub fn read_record(&mut self) -> Result<Option<OperationRecord>> {
        if self.finished {
            return Ok(None);
        }
        let Some(node) = self.records.next() else {
            self.finished = true;
            return Ok(None);
        };
        match json_to_record(self.registry, self.version, self.index, &node) {
            Ok(record) => {
                self.index += 1;
                Ok(Some(record))
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }
}

impl Iterator for TextEditsReader<'_> {
    type Item = Result<OperationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Vec<OperationRecord>> {
        let registry = OpRegistry::standard();
        TextEditsReader::new(&registry, text.as_bytes())?.collect()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(read(r#"{"EDITS_VERSION": -66, "RECORDS": []}"#).unwrap(), vec![]);
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(
            read(r#"{"EDITS_VERSION": -66, "RECORDS": ["#),
            Err(Error::MalformedText(_))
        ));
        assert!(matches!(read("not json"), Err(Error::MalformedText(_))));
    }

    #[test]
    fn test_envelope_checks() {
        assert!(matches!(
            read(r#"{"RECORDS": [], "EDITS_VERSION": -66}"#),
            Err(Error::SchemaViolation { .. })
        ));
        assert!(matches!(read("[]"), Err(Error::SchemaViolation { .. })));
        assert!(matches!(
            read(r#"{"EDITS_VERSION": -10, "RECORDS": []}"#),
            Err(Error::UnsupportedLayoutVersion { version: -10 })
        ));
        assert!(matches!(
            read(r#"{"EDITS_VERSION": -66, "RECORDS": {}}"#),
            Err(Error::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_fused_after_error() {
        let registry = OpRegistry::standard();
        let text = r#"{"EDITS_VERSION": -66, "RECORDS": [
            {"OPCODE": "OP_BOGUS", "DATA": {"TXID": 1}},
            {"OPCODE": "OP_END_LOG_SEGMENT", "DATA": {"TXID": 2}}
        ]}"#;
        let mut reader = TextEditsReader::new(&registry, text.as_bytes()).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(Error::UnknownOpcode { offset: 0, .. }))
        ));
        assert!(reader.next().is_none());
    }
}
