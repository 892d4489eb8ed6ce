//! Synthetic sample edit logs
//!
//! Builds a log segment containing one record for every supported opcode,
//! bracketed by `OP_START_LOG_SEGMENT` / `OP_END_LOG_SEGMENT`. Field values
//! are derived from the field name and the record's txid so that every codec
//! branch sees non-default data.

use crate::binary::BinaryEditsWriter;
use editlog_core::{
    AclEntry, AclEntryType, AclScope, Block, FieldKind, FieldSpec, FieldValue, FsAction, OpCode,
    OpRegistry, OpSchema, OperationRecord, PermissionStatus, Result, XAttr, XAttrNamespace,
};
use std::path::Path;

/// Sample log builder
#[derive(Debug, Clone)]
pub struct SampleEdits<'r> {
    registry: &'r OpRegistry,
    first_txid: i64,
    include_deprecated: bool,
}

impl<'r> SampleEdits<'r> {
    /// Sample over `registry`, starting at txid 1, without deprecated opcodes
    pub fn new(registry: &'r OpRegistry) -> Self {
        SampleEdits {
            registry,
            first_txid: 1,
            include_deprecated: false,
        }
    }

    /// Transaction id of the first record
    pub fn first_txid(mut self, txid: i64) -> Self {
        self.first_txid = txid;
        self
    }

    /// Also emit records for deprecated opcodes
    pub fn include_deprecated(mut self, include: bool) -> Self {
        self.include_deprecated = include;
        self
    }

    /// Opcodes the sample covers, in emission order
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = vec![OpCode::StartLogSegment];
        ops.extend(
            self.registry
                .schemas()
                .filter(|s| self.include_deprecated || !s.deprecated)
                .map(|s| s.opcode)
                .filter(|op| !matches!(op, OpCode::StartLogSegment | OpCode::EndLogSegment)),
        );
        ops.push(OpCode::EndLogSegment);
        ops.retain(|op| self.registry.schema(*op).is_some());
        ops
    }

    /// Build the records with consecutive txids
    pub fn records(&self) -> Vec<OperationRecord> {
        self.opcodes()
            .into_iter()
            .zip(self.first_txid..)
            .filter_map(|(op, txid)| {
                let schema = self.registry.schema(op)?;
                sample_record(schema, txid).ok()
            })
            .collect()
    }

    /// Encode the sample as a binary log, optionally padded with filler
    pub fn to_binary(&self, pad_to: Option<u64>) -> Result<Vec<u8>> {
        let mut writer = BinaryEditsWriter::new(self.registry, Vec::new())?;
        if let Some(len) = pad_to {
            writer = writer.with_padding(len);
        }
        for record in self.records() {
            writer.write_record(&record)?;
        }
        writer.finish()
    }

    /// Write the sample as a binary log file
    pub fn write_binary(&self, path: &Path, pad_to: Option<u64>) -> Result<()> {
        std::fs::write(path, self.to_binary(pad_to)?)?;
        Ok(())
    }
}

/// Deterministic, non-default value for a schema slot
fn sample_value(spec: &FieldSpec, txid: i64) -> FieldValue {
    let name = spec.name;
    match spec.kind {
        FieldKind::Bool => FieldValue::Bool(txid % 2 == 0),
        FieldKind::Byte => FieldValue::Byte(7),
        FieldKind::Short => FieldValue::Short(match name {
            "MODE" => 0o755,
            "REPLICATION" => 3,
            _ => (txid % 100) as i16 + 1,
        }),
        FieldKind::Int => FieldValue::Int(match name {
            "RPC_CALLID" => txid as i32,
            "CELLSIZE" => 1024 * 1024,
            _ => 6,
        }),
        FieldKind::Long => FieldValue::Long(match name {
            "INODEID" => 16_385 + txid,
            n if n.ends_with("TIME") || n.ends_with("TIMESTAMP") || n.ends_with("DATE") => {
                1_700_000_000_000 + txid * 1_000
            }
            _ => txid * 1_000 + 42,
        }),
        FieldKind::Str => FieldValue::Str(sample_string(name, txid)),
        FieldKind::Bytes => FieldValue::Bytes((0..16).map(|i| (txid as u8).wrapping_add(i)).collect()),
        FieldKind::StrList => FieldValue::StrList(vec![
            format!("/work/{}/part-0", txid),
            format!("/work/{}/part-1", txid),
        ]),
        FieldKind::Blocks => FieldValue::Blocks(vec![
            Block::new(1_073_741_825 + txid, 512, 1_001),
            Block::new(1_073_741_826 + txid, 0, 1_002),
        ]),
        FieldKind::Permissions => {
            FieldValue::Permissions(PermissionStatus::new("hdfs", "supergroup", 0o755))
        }
        FieldKind::AclEntries => FieldValue::AclEntries(vec![
            AclEntry {
                scope: AclScope::Access,
                entry_type: AclEntryType::User,
                name: "alice".into(),
                perm: FsAction::ALL,
            },
            AclEntry {
                scope: AclScope::Default,
                entry_type: AclEntryType::Group,
                name: String::new(),
                perm: FsAction::from_bits(0b101).unwrap_or(FsAction::NONE),
            },
        ]),
        FieldKind::XAttrs => FieldValue::XAttrs(vec![
            XAttr {
                namespace: XAttrNamespace::User,
                name: "checksum".into(),
                value: Some(b"crc32c".to_vec()),
            },
            XAttr {
                namespace: XAttrNamespace::Trusted,
                name: "marker".into(),
                value: None,
            },
        ]),
    }
}

fn sample_string(name: &str, txid: i64) -> String {
    match name {
        "PATH" | "SRC" | "TRG" | "SNAPSHOTROOT" => format!("/work/dir{}", txid),
        "DST" | "VALUE" => format!("/work/dir{}-target", txid),
        "RPC_CLIENTID" => "7334ec24-ad6f-4d96-8f22-3b7c6a2e2c4f".to_string(),
        "OPTIONS" => "TO_TRASH".to_string(),
        "CODEC" => "rs".to_string(),
        _ => format!("{}-{}", name.to_ascii_lowercase(), txid),
    }
}

/// Schema-valid record with sample values, for a single opcode
pub fn sample_record(schema: &OpSchema, txid: i64) -> Result<OperationRecord> {
    let fields = schema
        .fields
        .iter()
        .map(|spec| sample_value(spec, txid))
        .collect();
    OperationRecord::new(schema, txid, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryEditsReader;

    #[test]
    fn test_sample_covers_every_non_deprecated_opcode() {
        let registry = OpRegistry::standard();
        let records = SampleEdits::new(&registry).records();

        for schema in registry.schemas().filter(|s| !s.deprecated) {
            assert!(
                records.iter().any(|r| r.opcode() == schema.opcode),
                "missing {}",
                schema.name()
            );
        }
        assert!(!records.iter().any(|r| r.opcode() == OpCode::DatanodeAdd));
        assert_eq!(records.first().map(|r| r.opcode()), Some(OpCode::StartLogSegment));
        assert_eq!(records.last().map(|r| r.opcode()), Some(OpCode::EndLogSegment));
    }

    #[test]
    fn test_txids_are_consecutive() {
        let registry = OpRegistry::standard();
        let records = SampleEdits::new(&registry).first_txid(100).records();
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.txid(), 100 + i as i64);
        }
    }

    #[test]
    fn test_binary_sample_decodes() {
        let registry = OpRegistry::standard();
        let sample = SampleEdits::new(&registry).include_deprecated(true);
        let bytes = sample.to_binary(Some(64 * 1024)).unwrap();
        assert_eq!(bytes.len(), 64 * 1024);

        let decoded: Result<Vec<_>> = BinaryEditsReader::new(&registry, bytes.as_slice())
            .unwrap()
            .collect();
        assert_eq!(decoded.unwrap(), sample.records());
    }
}
