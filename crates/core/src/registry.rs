//! Operation Registry
//!
//! Static mapping from opcode to schema. The registry is built once,
//! never mutated, and passed explicitly to every codec. Tests can build a
//! reduced registry with [`OpRegistry::builder`] or [`OpRegistry::retain`].
//!
//! ## Opcode Groups
//!
//! | Range | Group |
//! |-------|-------|
//! | 0-17 | Namespace mutations (add, delete, mkdir, rename, quota, ...) |
//! | 18-22 | Security tokens and leases |
//! | 23-24 | Log segment boundaries |
//! | 25-33 | Blocks and snapshots |
//! | 34-39 | Centralized cache management |
//! | 40-48 | ACLs, rolling upgrade, xattrs, storage policy, truncate/append |
//! | 49-52 | Erasure coding policies |

use crate::layout::{LayoutFeature, LayoutVersion};
use crate::opcode::OpCode;
use crate::record::OperationRecord;
use crate::schema::OpSchema;
use crate::value::FieldKind::*;
use std::collections::BTreeMap;

/// Immutable opcode → schema table
#[derive(Debug, Clone)]
pub struct OpRegistry {
    schemas: BTreeMap<u8, OpSchema>,
}

impl OpRegistry {
    /// The full registry for the current layout version
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        for schema in standard_schemas() {
            builder = builder.register(schema);
        }
        builder.build()
    }

    /// Start an empty registry
    pub fn builder() -> OpRegistryBuilder {
        OpRegistryBuilder {
            schemas: BTreeMap::new(),
        }
    }

    /// Copy of this registry keeping only opcodes accepted by `keep`
    pub fn retain(&self, keep: impl Fn(OpCode) -> bool) -> Self {
        OpRegistry {
            schemas: self
                .schemas
                .iter()
                .filter(|(_, s)| keep(s.opcode))
                .map(|(tag, s)| (*tag, s.clone()))
                .collect(),
        }
    }

    /// Schema for a wire tag, regardless of layout version.
    ///
    /// The invalid sentinel is never registered, so it always misses.
    pub fn lookup(&self, tag: u8) -> Option<&OpSchema> {
        self.schemas.get(&tag)
    }

    /// Schema for a wire tag, only if the opcode exists at `version`
    pub fn lookup_at(&self, tag: u8, version: LayoutVersion) -> Option<&OpSchema> {
        self.lookup(tag).filter(|s| s.exists_at(version))
    }

    /// Schema for a symbolic name (exact match)
    pub fn by_name(&self, name: &str) -> Option<&OpSchema> {
        OpCode::from_name(name).and_then(|op| self.schema(op))
    }

    /// Schema for an opcode
    pub fn schema(&self, opcode: OpCode) -> Option<&OpSchema> {
        self.lookup(opcode.tag())
    }

    /// Registered opcodes in numeric order
    pub fn opcodes(&self) -> impl Iterator<Item = OpCode> + '_ {
        self.schemas.values().map(|s| s.opcode)
    }

    /// Registered schemas in numeric order
    pub fn schemas(&self) -> impl Iterator<Item = &OpSchema> {
        self.schemas.values()
    }

    /// Registered opcodes that are not deprecated
    pub fn supported(&self) -> impl Iterator<Item = OpCode> + '_ {
        self.schemas
            .values()
            .filter(|s| !s.deprecated)
            .map(|s| s.opcode)
    }

    /// Number of registered opcodes
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no opcode is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// A schema-valid record filled with default values
    pub fn default_record(&self, opcode: OpCode, txid: i64) -> Option<OperationRecord> {
        self.schema(opcode)
            .map(|s| OperationRecord::from_validated(s.opcode, txid, s.default_fields()))
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`OpRegistry`]
#[derive(Debug)]
pub struct OpRegistryBuilder {
    schemas: BTreeMap<u8, OpSchema>,
}

impl OpRegistryBuilder {
    /// Add or replace a schema. Schemas for the invalid sentinel are ignored.
    pub fn register(mut self, schema: OpSchema) -> Self {
        if !schema.opcode.is_invalid() {
            self.schemas.insert(schema.opcode.tag(), schema);
        }
        self
    }

    /// Freeze the registry
    pub fn build(self) -> OpRegistry {
        OpRegistry {
            schemas: self.schemas,
        }
    }
}

fn add_close(opcode: OpCode) -> OpSchema {
    OpSchema::new(opcode)
        .field("INODEID", Long)
        .field("PATH", Str)
        .field("REPLICATION", Short)
        .field("MTIME", Long)
        .field("ATIME", Long)
        .field("BLOCKSIZE", Long)
        .field("CLIENT_NAME", Str)
        .field("CLIENT_MACHINE", Str)
        .field("OVERWRITE", Bool)
        .field("BLOCKS", Blocks)
        .field("PERMISSION_STATUS", Permissions)
        .field("XATTRS", XAttrs)
        .field_since("ERASURE_CODING_POLICY_ID", Short, LayoutFeature::ErasureCoding)
        .rpc_ids()
}

fn delegation_token(opcode: OpCode) -> OpSchema {
    OpSchema::new(opcode)
        .field("TOKEN_IDENTIFIER", Bytes)
        .field("EXPIRY_TIME", Long)
}

fn snapshot(opcode: OpCode, names: &[&'static str]) -> OpSchema {
    let mut schema = OpSchema::new(opcode).field("SNAPSHOTROOT", Str);
    for name in names {
        schema = schema.field(*name, Str);
    }
    schema
        .field_since("MTIME", Long, LayoutFeature::SnapshotModificationTime)
        .rpc_ids()
}

fn ec_policy_name(opcode: OpCode) -> OpSchema {
    OpSchema::new(opcode)
        .field("POLICYNAME", Str)
        .rpc_ids()
        .since(LayoutFeature::ErasureCoding)
}

fn standard_schemas() -> Vec<OpSchema> {
    vec![
        add_close(OpCode::Add),
        OpSchema::new(OpCode::RenameOld)
            .field("SRC", Str)
            .field("DST", Str)
            .field("TIMESTAMP", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::Delete)
            .field("PATH", Str)
            .field("TIMESTAMP", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::Mkdir)
            .field("INODEID", Long)
            .field("PATH", Str)
            .field("TIMESTAMP", Long)
            .field("PERMISSION_STATUS", Permissions)
            .field("ACL_ENTRIES", AclEntries)
            .field("XATTRS", XAttrs),
        OpSchema::new(OpCode::SetReplication)
            .field("PATH", Str)
            .field("REPLICATION", Short),
        OpSchema::new(OpCode::DatanodeAdd)
            .field("DATANODE_ID", Str)
            .deprecated(),
        OpSchema::new(OpCode::DatanodeRemove)
            .field("DATANODE_ID", Str)
            .deprecated(),
        OpSchema::new(OpCode::SetPermissions)
            .field("SRC", Str)
            .field("MODE", Short),
        OpSchema::new(OpCode::SetOwner)
            .field("SRC", Str)
            .field("USERNAME", Str)
            .field("GROUPNAME", Str),
        add_close(OpCode::Close),
        OpSchema::new(OpCode::SetGenstampV1)
            .field("GENSTAMP", Long)
            .deprecated(),
        OpSchema::new(OpCode::SetNsQuota)
            .field("SRC", Str)
            .field("NSQUOTA", Long)
            .deprecated(),
        OpSchema::new(OpCode::ClearNsQuota)
            .field("SRC", Str)
            .deprecated(),
        OpSchema::new(OpCode::Times)
            .field("PATH", Str)
            .field("MTIME", Long)
            .field("ATIME", Long),
        OpSchema::new(OpCode::SetQuota)
            .field("SRC", Str)
            .field("NSQUOTA", Long)
            .field("DSQUOTA", Long),
        OpSchema::new(OpCode::Rename)
            .field("SRC", Str)
            .field("DST", Str)
            .field("TIMESTAMP", Long)
            .field("OPTIONS", Str)
            .rpc_ids(),
        OpSchema::new(OpCode::ConcatDelete)
            .field("TRG", Str)
            .field("SOURCES", StrList)
            .field("TIMESTAMP", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::Symlink)
            .field("INODEID", Long)
            .field("PATH", Str)
            .field("VALUE", Str)
            .field("MTIME", Long)
            .field("ATIME", Long)
            .field("PERMISSION_STATUS", Permissions)
            .rpc_ids(),
        delegation_token(OpCode::GetDelegationToken),
        delegation_token(OpCode::RenewDelegationToken),
        OpSchema::new(OpCode::CancelDelegationToken).field("TOKEN_IDENTIFIER", Bytes),
        OpSchema::new(OpCode::UpdateMasterKey)
            .field("KEY_ID", Int)
            .field("EXPIRY_DATE", Long)
            .field("KEY", Bytes),
        OpSchema::new(OpCode::ReassignLease)
            .field("LEASEHOLDER", Str)
            .field("PATH", Str)
            .field("NEWHOLDER", Str),
        OpSchema::new(OpCode::EndLogSegment),
        OpSchema::new(OpCode::StartLogSegment),
        OpSchema::new(OpCode::UpdateBlocks)
            .field("PATH", Str)
            .field("BLOCKS", Blocks)
            .rpc_ids(),
        snapshot(OpCode::CreateSnapshot, &["SNAPSHOTNAME"]),
        snapshot(OpCode::DeleteSnapshot, &["SNAPSHOTNAME"]),
        snapshot(OpCode::RenameSnapshot, &["SNAPSHOTOLDNAME", "SNAPSHOTNEWNAME"]),
        OpSchema::new(OpCode::AllowSnapshot).field("SNAPSHOTROOT", Str),
        OpSchema::new(OpCode::DisallowSnapshot).field("SNAPSHOTROOT", Str),
        OpSchema::new(OpCode::SetGenstampV2).field("GENSTAMPV2", Long),
        OpSchema::new(OpCode::AllocateBlockId).field("BLOCK_ID", Long),
        OpSchema::new(OpCode::AddBlock)
            .field("PATH", Str)
            .field("BLOCKS", Blocks)
            .rpc_ids(),
        OpSchema::new(OpCode::AddCacheDirective)
            .field("ID", Long)
            .field("PATH", Str)
            .field("REPLICATION", Short)
            .field("POOL", Str)
            .field("EXPIRATION", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::RemoveCacheDirective)
            .field("ID", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::AddCachePool)
            .field("POOLNAME", Str)
            .field("OWNERNAME", Str)
            .field("GROUPNAME", Str)
            .field("MODE", Short)
            .field("LIMIT", Long)
            .field("MAXRELATIVEEXPIRY", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::ModifyCachePool)
            .field("POOLNAME", Str)
            .field("LIMIT", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::RemoveCachePool)
            .field("POOLNAME", Str)
            .rpc_ids(),
        OpSchema::new(OpCode::ModifyCacheDirective)
            .field("ID", Long)
            .field("REPLICATION", Short)
            .field("EXPIRATION", Long)
            .rpc_ids(),
        OpSchema::new(OpCode::SetAcl)
            .field("SRC", Str)
            .field("ENTRIES", AclEntries),
        OpSchema::new(OpCode::RollingUpgradeStart).field("STARTTIME", Long),
        OpSchema::new(OpCode::RollingUpgradeFinalize).field("FINALIZETIME", Long),
        OpSchema::new(OpCode::SetXAttr)
            .field("SRC", Str)
            .field("XATTRS", XAttrs)
            .rpc_ids(),
        OpSchema::new(OpCode::RemoveXAttr)
            .field("SRC", Str)
            .field("XATTRS", XAttrs)
            .rpc_ids(),
        OpSchema::new(OpCode::SetStoragePolicy)
            .field("PATH", Str)
            .field("POLICYID", Byte),
        OpSchema::new(OpCode::Truncate)
            .field("SRC", Str)
            .field("CLIENTNAME", Str)
            .field("CLIENTMACHINE", Str)
            .field("NEWLENGTH", Long)
            .field("TIMESTAMP", Long)
            .field("BLOCKS", Blocks)
            .since(LayoutFeature::Truncate),
        OpSchema::new(OpCode::Append)
            .field("PATH", Str)
            .field("CLIENT_NAME", Str)
            .field("CLIENT_MACHINE", Str)
            .field("NEWBLOCK", Bool)
            .rpc_ids()
            .since(LayoutFeature::AppendNewBlock),
        OpSchema::new(OpCode::SetQuotaByStorageType)
            .field("SRC", Str)
            .field("STORAGETYPE", Short)
            .field("DSQUOTA", Long)
            .since(LayoutFeature::QuotaByStorageType),
        OpSchema::new(OpCode::AddErasureCodingPolicy)
            .field("CODEC", Str)
            .field("DATAUNITS", Int)
            .field("PARITYUNITS", Int)
            .field("CELLSIZE", Int)
            .rpc_ids()
            .since(LayoutFeature::ErasureCoding),
        ec_policy_name(OpCode::EnableErasureCodingPolicy),
        ec_policy_name(OpCode::DisableErasureCodingPolicy),
        ec_policy_name(OpCode::RemoveErasureCodingPolicy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_opcode_but_invalid() {
        let registry = OpRegistry::standard();
        assert_eq!(registry.len(), OpCode::ALL.len() - 1);
        for op in OpCode::ALL {
            assert_eq!(registry.schema(*op).is_some(), !op.is_invalid(), "{}", op);
        }
    }

    #[test]
    fn test_invalid_sentinel_never_resolves() {
        let registry = OpRegistry::standard();
        assert!(registry.lookup(0xFF).is_none());
        assert!(registry.by_name("OP_INVALID").is_none());

        let forced = OpRegistry::builder()
            .register(OpSchema::new(OpCode::Invalid))
            .build();
        assert!(forced.is_empty());
    }

    #[test]
    fn test_deprecated_set() {
        let registry = OpRegistry::standard();
        let deprecated: Vec<_> = registry
            .schemas()
            .filter(|s| s.deprecated)
            .map(|s| s.opcode)
            .collect();
        assert_eq!(
            deprecated,
            vec![
                OpCode::DatanodeAdd,
                OpCode::DatanodeRemove,
                OpCode::SetGenstampV1,
                OpCode::SetNsQuota,
                OpCode::ClearNsQuota,
            ]
        );
        assert_eq!(registry.supported().count(), registry.len() - 5);
    }

    #[test]
    fn test_lookup_at_respects_layout_version() {
        let registry = OpRegistry::standard();
        let old = LayoutVersion::new(-60);

        assert!(registry.lookup_at(OpCode::Truncate.tag(), old).is_none());
        assert!(registry
            .lookup_at(OpCode::Truncate.tag(), LayoutVersion::new(-61))
            .is_some());
        assert!(registry
            .lookup_at(OpCode::EnableErasureCodingPolicy.tag(), LayoutVersion::new(-63))
            .is_none());
        assert!(registry.lookup_at(OpCode::Mkdir.tag(), old).is_some());
    }

    #[test]
    fn test_field_names_unique_per_schema() {
        let registry = OpRegistry::standard();
        for schema in registry.schemas() {
            let mut names: Vec<_> = schema.fields.iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.fields.len(), "{}", schema.name());
            assert!(schema.field_index("TXID").is_none());
        }
    }

    #[test]
    fn test_retain_reduces_registry() {
        let registry = OpRegistry::standard().retain(|op| op == OpCode::Mkdir);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.opcodes().collect::<Vec<_>>(), vec![OpCode::Mkdir]);
        assert!(registry.by_name("OP_ADD").is_none());
    }

    #[test]
    fn test_default_record_is_schema_valid() {
        let registry = OpRegistry::standard();
        for schema in registry.schemas() {
            let record = registry.default_record(schema.opcode, 7).unwrap();
            assert_eq!(record.txid(), 7);
            assert!(schema.validate(record.fields()).is_ok());
        }
        assert!(registry.default_record(OpCode::Invalid, 1).is_none());
    }
}
