//! JSON to record conversion.
//!
//! Decoding is strict: `DATA` must list `TXID` and then exactly the fields
//! the schema declares at the document's layout version, in schema order.
//! Fields the version lacks keep their default value.

use super::keys;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use editlog_core::{
    AclEntry, AclEntryType, AclScope, Block, Error, FieldKind, FieldValue, FsAction,
    LayoutVersion, OpRegistry, OperationRecord, PermissionStatus, Result, XAttr, XAttrNamespace,
};
use serde_json::{Map, Value as JsonValue};

/// Convert the `index`-th record node of a document to a record.
pub fn json_to_record(
    registry: &OpRegistry,
    version: LayoutVersion,
    index: u64,
    node: &JsonValue,
) -> Result<OperationRecord> {
    let node = node
        .as_object()
        .ok_or_else(|| Error::schema("RECORDS", format!("record {} is not an object", index)))?;
    expect_keys(node, &[keys::OPCODE, keys::DATA])
        .map_err(|detail| Error::schema("RECORDS", format!("record {}: {}", index, detail)))?;

    let name = node[keys::OPCODE].as_str().ok_or_else(|| {
        Error::schema("RECORDS", format!("record {}: OPCODE is not a string", index))
    })?;
    let schema = registry
        .by_name(name)
        .filter(|s| s.exists_at(version))
        .ok_or_else(|| Error::UnknownOpcode {
            opcode: name.to_string(),
            offset: index,
        })?;

    let data = node[keys::DATA]
        .as_object()
        .ok_or_else(|| Error::schema(name, "DATA is not an object"))?;

    let mut expected = vec![keys::TXID];
    expected.extend(schema.fields_at(version).map(|(_, spec)| spec.name));
    expect_keys(data, &expected).map_err(|detail| Error::schema(name, detail))?;

    let txid = data[keys::TXID]
        .as_i64()
        .ok_or_else(|| Error::schema(name, "TXID is not a 64-bit integer"))?;

    let mut fields = schema.default_fields();
    for (slot, spec) in schema.fields_at(version) {
        fields[slot] = json_to_field(spec.kind, &data[spec.name])
            .map_err(|detail| Error::schema(name, format!("field {}: {}", spec.name, detail)))?;
    }

    OperationRecord::new(schema, txid, fields)
}

/// Convert a JSON value to a field of `kind`.
pub fn json_to_field(kind: FieldKind, json: &JsonValue) -> std::result::Result<FieldValue, String> {
    let value = match kind {
        FieldKind::Bool => FieldValue::Bool(json.as_bool().ok_or("expected boolean")?),
        FieldKind::Byte => FieldValue::Byte(int_in_range(json)?),
        FieldKind::Short => FieldValue::Short(int_in_range(json)?),
        FieldKind::Int => FieldValue::Int(int_in_range(json)?),
        FieldKind::Long => FieldValue::Long(int_in_range(json)?),
        FieldKind::Str => FieldValue::Str(string(json)?),
        FieldKind::Bytes => FieldValue::Bytes(bytes(json)?),
        FieldKind::StrList => FieldValue::StrList(
            array(json)?
                .iter()
                .map(string)
                .collect::<std::result::Result<_, String>>()?,
        ),
        FieldKind::Blocks => FieldValue::Blocks(
            array(json)?
                .iter()
                .map(|b| -> std::result::Result<Block, String> {
                    let obj = object(b, &["BLOCK_ID", "NUM_BYTES", "GENSTAMP"])?;
                    Ok(Block {
                        block_id: int_in_range(&obj["BLOCK_ID"])?,
                        num_bytes: int_in_range(&obj["NUM_BYTES"])?,
                        gen_stamp: int_in_range(&obj["GENSTAMP"])?,
                    })
                })
                .collect::<std::result::Result<_, String>>()?,
        ),
        FieldKind::Permissions => {
            let obj = object(json, &["USERNAME", "GROUPNAME", "MODE"])?;
            FieldValue::Permissions(PermissionStatus {
                user: string(&obj["USERNAME"])?,
                group: string(&obj["GROUPNAME"])?,
                mode: int_in_range(&obj["MODE"])?,
            })
        }
        FieldKind::AclEntries => FieldValue::AclEntries(
            array(json)?
                .iter()
                .map(|e| -> std::result::Result<AclEntry, String> {
                    let obj = object(e, &["SCOPE", "TYPE", "NAME", "PERM"])?;
                    Ok(AclEntry {
                        scope: label(&obj["SCOPE"], AclScope::from_label)?,
                        entry_type: label(&obj["TYPE"], AclEntryType::from_label)?,
                        name: string(&obj["NAME"])?,
                        perm: label(&obj["PERM"], FsAction::parse_symbol)?,
                    })
                })
                .collect::<std::result::Result<_, String>>()?,
        ),
        FieldKind::XAttrs => FieldValue::XAttrs(
            array(json)?
                .iter()
                .map(|x| -> std::result::Result<XAttr, String> {
                    let obj = object(x, &["NAMESPACE", "NAME", "VALUE"])?;
                    let value = match &obj["VALUE"] {
                        JsonValue::Null => None,
                        v => Some(bytes(v)?),
                    };
                    Ok(XAttr {
                        namespace: label(&obj["NAMESPACE"], XAttrNamespace::from_label)?,
                        name: string(&obj["NAME"])?,
                        value,
                    })
                })
                .collect::<std::result::Result<_, String>>()?,
        ),
    };
    Ok(value)
}

/// Require `map` to hold exactly `expected`, in that order.
pub(crate) fn expect_keys(
    map: &Map<String, JsonValue>,
    expected: &[&str],
) -> std::result::Result<(), String> {
    let actual: Vec<&str> = map.keys().map(String::as_str).collect();
    if actual == expected {
        return Ok(());
    }
    if let Some(missing) = expected.iter().find(|k| !map.contains_key(**k)) {
        return Err(format!("missing field {}", missing));
    }
    if let Some(extra) = actual.iter().find(|k| !expected.contains(*k)) {
        return Err(format!("unexpected field {}", extra));
    }
    Err(format!(
        "fields out of order: expected [{}], found [{}]",
        expected.join(", "),
        actual.join(", ")
    ))
}

fn object<'a>(
    json: &'a JsonValue,
    expected: &[&str],
) -> std::result::Result<&'a Map<String, JsonValue>, String> {
    let obj = json.as_object().ok_or("expected object")?;
    if obj.len() != expected.len() || !expected.iter().all(|k| obj.contains_key(*k)) {
        return Err(format!("expected object with keys [{}]", expected.join(", ")));
    }
    Ok(obj)
}

fn array(json: &JsonValue) -> std::result::Result<&Vec<JsonValue>, String> {
    json.as_array().ok_or_else(|| "expected array".to_string())
}

fn string(json: &JsonValue) -> std::result::Result<String, String> {
    json.as_str()
        .map(str::to_string)
        .ok_or_else(|| "expected string".to_string())
}

fn bytes(json: &JsonValue) -> std::result::Result<Vec<u8>, String> {
    let encoded = json.as_str().ok_or("expected base64 string")?;
    BASE64
        .decode(encoded)
        .map_err(|e| format!("invalid base64: {}", e))
}

fn int_in_range<T: TryFrom<i64>>(json: &JsonValue) -> std::result::Result<T, String> {
    let n = json.as_i64().ok_or("expected integer")?;
    T::try_from(n).map_err(|_| format!("integer {} out of range", n))
}

fn label<T>(
    json: &JsonValue,
    parse: impl Fn(&str) -> Option<T>,
) -> std::result::Result<T, String> {
    let s = json.as_str().ok_or("expected string")?;
    parse(s).ok_or_else(|| format!("unrecognized value {:?}", s))
}
