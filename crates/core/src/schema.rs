//! Per-opcode field schemas

use crate::error::{Error, Result};
use crate::layout::{LayoutFeature, LayoutVersion};
use crate::opcode::OpCode;
use crate::value::{FieldKind, FieldValue};

/// One slot of an opcode schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Upper-snake name used by the text format
    pub name: &'static str,
    /// Value type
    pub kind: FieldKind,
    /// Layout feature that introduced the field, if any
    pub since: Option<LayoutFeature>,
}

impl FieldSpec {
    /// Whether the field is present on the wire at `version`
    pub fn present_at(&self, version: LayoutVersion) -> bool {
        self.since.map_or(true, |f| version.supports(f))
    }
}

/// Ordered, typed field list of an opcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSchema {
    /// Opcode this schema describes
    pub opcode: OpCode,
    /// Fields in wire order
    pub fields: Vec<FieldSpec>,
    /// Retained for decoding only; exempt from completeness checks
    pub deprecated: bool,
    /// Layout feature that introduced the opcode, if any
    pub since: Option<LayoutFeature>,
}

impl OpSchema {
    /// Start an empty schema for `opcode`
    pub fn new(opcode: OpCode) -> Self {
        OpSchema {
            opcode,
            fields: Vec::new(),
            deprecated: false,
            since: None,
        }
    }

    /// Append a field present in every supported version
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            since: None,
        });
        self
    }

    /// Append a field introduced by `feature`
    pub fn field_since(mut self, name: &'static str, kind: FieldKind, feature: LayoutFeature) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            since: Some(feature),
        });
        self
    }

    /// Append the retry-cache fields carried by idempotent client calls
    pub fn rpc_ids(self) -> Self {
        self.field("RPC_CLIENTID", FieldKind::Str)
            .field("RPC_CALLID", FieldKind::Int)
    }

    /// Mark the opcode deprecated
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Mark the opcode as introduced by `feature`
    pub fn since(mut self, feature: LayoutFeature) -> Self {
        self.since = Some(feature);
        self
    }

    /// Symbolic opcode name
    pub fn name(&self) -> &'static str {
        self.opcode.name()
    }

    /// Whether the opcode exists at `version`
    pub fn exists_at(&self, version: LayoutVersion) -> bool {
        self.since.map_or(true, |f| version.supports(f))
    }

    /// Fields present on the wire at `version`, with their slot index
    pub fn fields_at(&self, version: LayoutVersion) -> impl Iterator<Item = (usize, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, spec)| spec.present_at(version))
    }

    /// Slot index of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Default values for every slot
    pub fn default_fields(&self) -> Vec<FieldValue> {
        self.fields.iter().map(|f| f.kind.default_value()).collect()
    }

    /// Check that `fields` has exactly this schema's count, order and types
    pub fn validate(&self, fields: &[FieldValue]) -> Result<()> {
        if fields.len() != self.fields.len() {
            return Err(Error::schema(
                self.name(),
                format!("expected {} fields, got {}", self.fields.len(), fields.len()),
            ));
        }
        for (spec, value) in self.fields.iter().zip(fields) {
            if spec.kind != value.kind() {
                return Err(Error::schema(
                    self.name(),
                    format!(
                        "field {} expects {}, got {}",
                        spec.name,
                        spec.kind,
                        value.kind()
                    ),
                ));
            }
        }
        Ok(())
    }
}
