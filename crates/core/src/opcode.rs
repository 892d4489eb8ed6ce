//! Edit log opcodes
//!
//! Every record in an edit log starts with a one-byte opcode. The set of
//! opcodes is closed: values are stable across layout versions and are never
//! reused. Deprecated opcodes stay in the enumeration so that old logs can
//! still be decoded.
//!
//! `OP_INVALID` (numeric id -1, wire byte `0xFF`) is reserved. It never
//! starts a record; it terminates the log and fills unused trailing bytes.

use std::fmt;

/// Wire byte of the invalid sentinel, also used as filler
pub const OP_INVALID_TAG: u8 = 0xFF;

macro_rules! opcodes {
    ($($variant:ident = $tag:literal => $name:literal,)+) => {
        /// Edit log operation kinds with explicit wire values
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OpCode {
            $(
                #[doc = $name]
                $variant = $tag,
            )+
        }

        impl OpCode {
            /// Every opcode, in numeric order, including `OP_INVALID`
            pub const ALL: &'static [OpCode] = &[$(OpCode::$variant,)+];

            /// Symbolic name, e.g. `OP_MKDIR`
            pub fn name(&self) -> &'static str {
                match self {
                    $(OpCode::$variant => $name,)+
                }
            }

            /// Look up an opcode by its wire byte
            pub fn from_tag(tag: u8) -> Option<OpCode> {
                match tag {
                    $($tag => Some(OpCode::$variant),)+
                    _ => None,
                }
            }

            /// Look up an opcode by its symbolic name (exact match)
            pub fn from_name(name: &str) -> Option<OpCode> {
                match name {
                    $($name => Some(OpCode::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    Add = 0 => "OP_ADD",
    RenameOld = 1 => "OP_RENAME_OLD",
    Delete = 2 => "OP_DELETE",
    Mkdir = 3 => "OP_MKDIR",
    SetReplication = 4 => "OP_SET_REPLICATION",
    DatanodeAdd = 5 => "OP_DATANODE_ADD",
    DatanodeRemove = 6 => "OP_DATANODE_REMOVE",
    SetPermissions = 7 => "OP_SET_PERMISSIONS",
    SetOwner = 8 => "OP_SET_OWNER",
    Close = 9 => "OP_CLOSE",
    SetGenstampV1 = 10 => "OP_SET_GENSTAMP_V1",
    SetNsQuota = 11 => "OP_SET_NS_QUOTA",
    ClearNsQuota = 12 => "OP_CLEAR_NS_QUOTA",
    Times = 13 => "OP_TIMES",
    SetQuota = 14 => "OP_SET_QUOTA",
    Rename = 15 => "OP_RENAME",
    ConcatDelete = 16 => "OP_CONCAT_DELETE",
    Symlink = 17 => "OP_SYMLINK",
    GetDelegationToken = 18 => "OP_GET_DELEGATION_TOKEN",
    RenewDelegationToken = 19 => "OP_RENEW_DELEGATION_TOKEN",
    CancelDelegationToken = 20 => "OP_CANCEL_DELEGATION_TOKEN",
    UpdateMasterKey = 21 => "OP_UPDATE_MASTER_KEY",
    ReassignLease = 22 => "OP_REASSIGN_LEASE",
    EndLogSegment = 23 => "OP_END_LOG_SEGMENT",
    StartLogSegment = 24 => "OP_START_LOG_SEGMENT",
    UpdateBlocks = 25 => "OP_UPDATE_BLOCKS",
    CreateSnapshot = 26 => "OP_CREATE_SNAPSHOT",
    DeleteSnapshot = 27 => "OP_DELETE_SNAPSHOT",
    RenameSnapshot = 28 => "OP_RENAME_SNAPSHOT",
    AllowSnapshot = 29 => "OP_ALLOW_SNAPSHOT",
    DisallowSnapshot = 30 => "OP_DISALLOW_SNAPSHOT",
    SetGenstampV2 = 31 => "OP_SET_GENSTAMP_V2",
    AllocateBlockId = 32 => "OP_ALLOCATE_BLOCK_ID",
    AddBlock = 33 => "OP_ADD_BLOCK",
    AddCacheDirective = 34 => "OP_ADD_CACHE_DIRECTIVE",
    RemoveCacheDirective = 35 => "OP_REMOVE_CACHE_DIRECTIVE",
    AddCachePool = 36 => "OP_ADD_CACHE_POOL",
    ModifyCachePool = 37 => "OP_MODIFY_CACHE_POOL",
    RemoveCachePool = 38 => "OP_REMOVE_CACHE_POOL",
    ModifyCacheDirective = 39 => "OP_MODIFY_CACHE_DIRECTIVE",
    SetAcl = 40 => "OP_SET_ACL",
    RollingUpgradeStart = 41 => "OP_ROLLING_UPGRADE_START",
    RollingUpgradeFinalize = 42 => "OP_ROLLING_UPGRADE_FINALIZE",
    SetXAttr = 43 => "OP_SET_XATTR",
    RemoveXAttr = 44 => "OP_REMOVE_XATTR",
    SetStoragePolicy = 45 => "OP_SET_STORAGE_POLICY",
    Truncate = 46 => "OP_TRUNCATE",
    Append = 47 => "OP_APPEND",
    SetQuotaByStorageType = 48 => "OP_SET_QUOTA_BY_STORAGETYPE",
    AddErasureCodingPolicy = 49 => "OP_ADD_ERASURE_CODING_POLICY",
    EnableErasureCodingPolicy = 50 => "OP_ENABLE_ERASURE_CODING_POLICY",
    DisableErasureCodingPolicy = 51 => "OP_DISABLE_ERASURE_CODING_POLICY",
    RemoveErasureCodingPolicy = 52 => "OP_REMOVE_ERASURE_CODING_POLICY",
    Invalid = 0xFF => "OP_INVALID",
}

impl OpCode {
    /// Wire byte of this opcode
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Signed numeric id as shown in reports (`OP_INVALID` is -1)
    pub fn id(&self) -> i8 {
        *self as u8 as i8
    }

    /// Whether this is the reserved sentinel
    pub fn is_invalid(&self) -> bool {
        matches!(self, OpCode::Invalid)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
