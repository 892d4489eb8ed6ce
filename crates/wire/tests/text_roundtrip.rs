//! Text codec round-trip tests
//!
//! Arbitrary schema-valid records must survive encode -> decode unchanged,
//! and re-encoding a decoded document must reproduce it byte for byte.

use editlog_core::{
    AclEntry, AclEntryType, AclScope, Block, FieldKind, FieldValue, FsAction, OpCode, OpRegistry,
    OperationRecord, PermissionStatus, XAttr, XAttrNamespace,
};
use editlog_durability::testing::SampleEdits;
use editlog_wire::{TextEditsReader, TextEditsWriter};
use proptest::prelude::*;

fn encode(registry: &OpRegistry, records: &[OperationRecord]) -> Vec<u8> {
    let mut writer = TextEditsWriter::new(registry, Vec::new()).unwrap();
    for r in records {
        writer.write_record(r).unwrap();
    }
    writer.finish().unwrap()
}

fn decode(registry: &OpRegistry, bytes: &[u8]) -> Vec<OperationRecord> {
    TextEditsReader::new(registry, bytes)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9/_. \\-\u{e9}\u{4e2d}\"\\\\\n]{0,12}"
}

fn field_strategy(kind: FieldKind) -> BoxedStrategy<FieldValue> {
    match kind {
        FieldKind::Bool => any::<bool>().prop_map(FieldValue::Bool).boxed(),
        FieldKind::Byte => any::<u8>().prop_map(FieldValue::Byte).boxed(),
        FieldKind::Short => any::<i16>().prop_map(FieldValue::Short).boxed(),
        FieldKind::Int => any::<i32>().prop_map(FieldValue::Int).boxed(),
        FieldKind::Long => any::<i64>().prop_map(FieldValue::Long).boxed(),
        FieldKind::Str => text().prop_map(FieldValue::Str).boxed(),
        FieldKind::Bytes => prop::collection::vec(any::<u8>(), 0..24)
            .prop_map(FieldValue::Bytes)
            .boxed(),
        FieldKind::StrList => prop::collection::vec(text(), 0..4)
            .prop_map(FieldValue::StrList)
            .boxed(),
        FieldKind::Blocks => prop::collection::vec(
            (any::<i64>(), any::<i64>(), any::<i64>()).prop_map(|(a, b, c)| Block::new(a, b, c)),
            0..4,
        )
        .prop_map(FieldValue::Blocks)
        .boxed(),
        FieldKind::Permissions => (text(), text(), any::<i16>())
            .prop_map(|(u, g, m)| FieldValue::Permissions(PermissionStatus::new(u, g, m)))
            .boxed(),
        FieldKind::AclEntries => prop::collection::vec(
            (0u8..2, 0u8..4, text(), 0u8..8).prop_map(|(s, t, name, p)| AclEntry {
                scope: AclScope::from_code(s).unwrap(),
                entry_type: AclEntryType::from_code(t).unwrap(),
                name,
                perm: FsAction::from_bits(p).unwrap(),
            }),
            0..4,
        )
        .prop_map(FieldValue::AclEntries)
        .boxed(),
        FieldKind::XAttrs => prop::collection::vec(
            (
                0u8..5,
                text(),
                proptest::option::of(prop::collection::vec(any::<u8>(), 0..8)),
            )
                .prop_map(|(ns, name, value)| XAttr {
                    namespace: XAttrNamespace::from_code(ns).unwrap(),
                    name,
                    value,
                }),
            0..3,
        )
        .prop_map(FieldValue::XAttrs)
        .boxed(),
    }
}

fn record_strategy() -> impl Strategy<Value = OperationRecord> {
    let opcodes: Vec<OpCode> = OpRegistry::standard().opcodes().collect();
    (prop::sample::select(opcodes), any::<i64>()).prop_flat_map(|(op, txid)| {
        let registry = OpRegistry::standard();
        let kinds: Vec<_> = registry
            .schema(op)
            .unwrap()
            .fields
            .iter()
            .map(|f| field_strategy(f.kind))
            .collect();
        kinds.prop_map(move |fields| {
            let registry = OpRegistry::standard();
            OperationRecord::new(registry.schema(op).unwrap(), txid, fields).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn prop_text_round_trip(records in prop::collection::vec(record_strategy(), 0..8)) {
        let registry = OpRegistry::standard();
        let first = encode(&registry, &records);
        let decoded = decode(&registry, &first);
        prop_assert_eq!(&decoded, &records);

        let second = encode(&registry, &decoded);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_sample_log_round_trip() {
    let registry = OpRegistry::standard();
    let records = SampleEdits::new(&registry).include_deprecated(true).records();
    let bytes = encode(&registry, &records);
    assert_eq!(decode(&registry, &bytes), records);
}

#[test]
fn test_file_extension_is_irrelevant() {
    let registry = OpRegistry::standard();
    let records = SampleEdits::new(&registry).records();
    let dir = tempfile::tempdir().unwrap();

    for name in ["edits.json", "edits.JSON", "edits.xml", "edits"] {
        let path = dir.path().join(name);
        std::fs::write(&path, encode(&registry, &records)).unwrap();
        let decoded: Vec<_> = TextEditsReader::open(&registry, &path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(decoded, records, "{}", name);
    }
}
