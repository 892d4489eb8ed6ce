//! Record to JSON conversion.
//!
//! | Field kind | JSON Representation |
//! |------------|---------------------|
//! | Bool, integers | JSON literal / number |
//! | Str | string |
//! | Bytes | base64 string |
//! | StrList | array of strings |
//! | Block | `{"BLOCK_ID", "NUM_BYTES", "GENSTAMP"}` |
//! | Permissions | `{"USERNAME", "GROUPNAME", "MODE"}` |
//! | AclEntry | `{"SCOPE", "TYPE", "NAME", "PERM"}` with `PERM` as `rwx` |
//! | XAttr | `{"NAMESPACE", "NAME", "VALUE"}` with `VALUE` base64 or null |

use super::keys;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use editlog_core::{FieldValue, OpSchema, OperationRecord};
use serde_json::{json, Map, Value as JsonValue};

/// Convert a record to its `{"OPCODE", "DATA"}` node.
///
/// `DATA` carries `TXID` followed by every schema field in schema order.
pub fn record_to_json(schema: &OpSchema, record: &OperationRecord) -> JsonValue {
    let mut data = Map::new();
    data.insert(keys::TXID.to_string(), JsonValue::from(record.txid()));
    for (spec, value) in schema.fields.iter().zip(record.fields()) {
        data.insert(spec.name.to_string(), field_to_json(value));
    }

    let mut node = Map::new();
    node.insert(
        keys::OPCODE.to_string(),
        JsonValue::String(record.opcode().name().to_string()),
    );
    node.insert(keys::DATA.to_string(), JsonValue::Object(data));
    JsonValue::Object(node)
}

/// Convert a single field value to JSON.
pub fn field_to_json(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Bool(b) => JsonValue::Bool(*b),
        FieldValue::Byte(v) => JsonValue::from(*v),
        FieldValue::Short(v) => JsonValue::from(*v),
        FieldValue::Int(v) => JsonValue::from(*v),
        FieldValue::Long(v) => JsonValue::from(*v),
        FieldValue::Str(s) => JsonValue::String(s.clone()),
        FieldValue::Bytes(b) => JsonValue::String(BASE64.encode(b)),
        FieldValue::StrList(items) => {
            JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
        }
        FieldValue::Blocks(blocks) => JsonValue::Array(
            blocks
                .iter()
                .map(|b| {
                    json!({
                        "BLOCK_ID": b.block_id,
                        "NUM_BYTES": b.num_bytes,
                        "GENSTAMP": b.gen_stamp,
                    })
                })
                .collect(),
        ),
        FieldValue::Permissions(p) => json!({
            "USERNAME": p.user,
            "GROUPNAME": p.group,
            "MODE": p.mode,
        }),
        FieldValue::AclEntries(entries) => JsonValue::Array(
            entries
                .iter()
                .map(|e| {
                    json!({
                        "SCOPE": e.scope.label(),
                        "TYPE": e.entry_type.label(),
                        "NAME": e.name,
                        "PERM": e.perm.symbol(),
                    })
                })
                .collect(),
        ),
        FieldValue::XAttrs(xattrs) => JsonValue::Array(
            xattrs
                .iter()
                .map(|x| {
                    json!({
                        "NAMESPACE": x.namespace.label(),
                        "NAME": x.name,
                        "VALUE": x.value.as_ref().map(|v| BASE64.encode(v)),
                    })
                })
                .collect(),
        ),
    }
}
