//! Operation records

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::schema::OpSchema;
use crate::value::FieldValue;

/// A single decoded edit log operation.
///
/// The field list always holds one value per schema slot, in schema order,
/// even when the record was decoded from an older layout that lacked some
/// fields (those slots carry the kind's default value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    opcode: OpCode,
    txid: i64,
    fields: Vec<FieldValue>,
}

impl OperationRecord {
    /// Build a record, validating `fields` against `schema`
    pub fn new(schema: &OpSchema, txid: i64, fields: Vec<FieldValue>) -> Result<Self> {
        schema.validate(&fields)?;
        Ok(Self::from_validated(schema.opcode, txid, fields))
    }

    pub(crate) fn from_validated(opcode: OpCode, txid: i64, fields: Vec<FieldValue>) -> Self {
        OperationRecord {
            opcode,
            txid,
            fields,
        }
    }

    /// Opcode of this record
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// Transaction id
    pub fn txid(&self) -> i64 {
        self.txid
    }

    /// Replace the transaction id
    pub fn set_txid(&mut self, txid: i64) {
        self.txid = txid;
    }

    /// Field values in schema order
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Field value by name
    pub fn field(&self, schema: &OpSchema, name: &str) -> Option<&FieldValue> {
        schema.field_index(name).and_then(|i| self.fields.get(i))
    }

    /// Replace a field by name, keeping the schema's type
    pub fn with_field(
        mut self,
        schema: &OpSchema,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Self> {
        let value = value.into();
        if schema.opcode != self.opcode {
            return Err(Error::schema(
                self.opcode.name(),
                format!("schema for {} does not apply", schema.name()),
            ));
        }
        let index = schema
            .field_index(name)
            .ok_or_else(|| Error::schema(schema.name(), format!("no field named {}", name)))?;
        let expected = schema.fields[index].kind;
        if expected != value.kind() {
            return Err(Error::schema(
                schema.name(),
                format!("field {} expects {}, got {}", name, expected, value.kind()),
            ));
        }
        let slot = self.fields.get_mut(index).ok_or_else(|| {
            Error::schema(schema.name(), format!("record has no slot for {}", name))
        })?;
        *slot = value;
        Ok(self)
    }
}
