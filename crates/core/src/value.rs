//! Typed field values carried by edit log records
//!
//! Each opcode schema is an ordered list of [`FieldKind`]s; a record carries
//! one [`FieldValue`] per schema slot. Composite values (blocks, permission
//! status, ACL entries, extended attributes) are plain structs so that both
//! codecs can pattern-match on them.

use std::fmt;

/// Type of a single schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean flag
    Bool,
    /// Unsigned 8-bit value (storage policy ids)
    Byte,
    /// Signed 16-bit value (replication, mode bits)
    Short,
    /// Signed 32-bit value
    Int,
    /// Signed 64-bit value (ids, timestamps, lengths)
    Long,
    /// UTF-8 string
    Str,
    /// Opaque bytes (token identifiers, keys)
    Bytes,
    /// Ordered list of strings
    StrList,
    /// Ordered list of blocks
    Blocks,
    /// Owner, group and mode
    Permissions,
    /// Ordered list of ACL entries
    AclEntries,
    /// Ordered list of extended attributes
    XAttrs,
}

impl FieldKind {
    /// Value used when a field is absent at the stream's layout version
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Byte => FieldValue::Byte(0),
            FieldKind::Short => FieldValue::Short(0),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Long => FieldValue::Long(0),
            FieldKind::Str => FieldValue::Str(String::new()),
            FieldKind::Bytes => FieldValue::Bytes(Vec::new()),
            FieldKind::StrList => FieldValue::StrList(Vec::new()),
            FieldKind::Blocks => FieldValue::Blocks(Vec::new()),
            FieldKind::Permissions => FieldValue::Permissions(PermissionStatus::default()),
            FieldKind::AclEntries => FieldValue::AclEntries(Vec::new()),
            FieldKind::XAttrs => FieldValue::XAttrs(Vec::new()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single decoded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Unsigned 8-bit value
    Byte(u8),
    /// Signed 16-bit value
    Short(i16),
    /// Signed 32-bit value
    Int(i32),
    /// Signed 64-bit value
    Long(i64),
    /// UTF-8 string
    Str(String),
    /// Opaque bytes
    Bytes(Vec<u8>),
    /// Ordered list of strings
    StrList(Vec<String>),
    /// Ordered list of blocks
    Blocks(Vec<Block>),
    /// Owner, group and mode
    Permissions(PermissionStatus),
    /// Ordered list of ACL entries
    AclEntries(Vec<AclEntry>),
    /// Ordered list of extended attributes
    XAttrs(Vec<XAttr>),
}

impl FieldValue {
    /// Kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Byte(_) => FieldKind::Byte,
            FieldValue::Short(_) => FieldKind::Short,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Long(_) => FieldKind::Long,
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::Bytes(_) => FieldKind::Bytes,
            FieldValue::StrList(_) => FieldKind::StrList,
            FieldValue::Blocks(_) => FieldKind::Blocks,
            FieldValue::Permissions(_) => FieldKind::Permissions,
            FieldValue::AclEntries(_) => FieldKind::AclEntries,
            FieldValue::XAttrs(_) => FieldKind::XAttrs,
        }
    }

    /// String payload, if this is a `Str`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload widened to i64, for any integral kind
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Byte(v) => Some(i64::from(*v)),
            FieldValue::Short(v) => Some(i64::from(*v)),
            FieldValue::Int(v) => Some(i64::from(*v)),
            FieldValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// A file block reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block {
    /// Block id
    pub block_id: i64,
    /// Number of bytes stored in the block
    pub num_bytes: i64,
    /// Generation stamp
    pub gen_stamp: i64,
}

impl Block {
    /// Create a block reference
    pub fn new(block_id: i64, num_bytes: i64, gen_stamp: i64) -> Self {
        Block {
            block_id,
            num_bytes,
            gen_stamp,
        }
    }
}

/// Owner, group and permission bits of an inode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionStatus {
    /// Owning user
    pub user: String,
    /// Owning group
    pub group: String,
    /// Permission bits (e.g. `0o755`)
    pub mode: i16,
}

impl PermissionStatus {
    /// Create a permission status
    pub fn new(user: impl Into<String>, group: impl Into<String>, mode: i16) -> Self {
        PermissionStatus {
            user: user.into(),
            group: group.into(),
            mode,
        }
    }
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $code:literal => $label:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl $name {
            /// Wire byte
            pub fn code(&self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// Decode from a wire byte
            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Upper-case name used by the text format
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Parse the upper-case text name
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

named_enum! {
    /// Whether an ACL entry applies to access checks or is inherited
    AclScope {
        Access = 0 => "ACCESS",
        Default = 1 => "DEFAULT",
    }
}

named_enum! {
    /// Principal an ACL entry names
    AclEntryType {
        User = 0 => "USER",
        Group = 1 => "GROUP",
        Mask = 2 => "MASK",
        Other = 3 => "OTHER",
    }
}

named_enum! {
    /// Extended attribute namespace
    XAttrNamespace {
        User = 0 => "USER",
        Trusted = 1 => "TRUSTED",
        Security = 2 => "SECURITY",
        System = 3 => "SYSTEM",
        Raw = 4 => "RAW",
    }
}

/// Read/write/execute bits of an ACL entry, rendered as `rwx`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsAction(u8);

impl FsAction {
    /// All permissions
    pub const ALL: FsAction = FsAction(0b111);
    /// No permissions
    pub const NONE: FsAction = FsAction(0);

    /// Build from the low three bits; higher bits are rejected
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits <= 0b111).then_some(FsAction(bits))
    }

    /// Raw bits
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Symbolic form, e.g. `r-x`
    pub fn symbol(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(if self.0 & 0b100 != 0 { 'r' } else { '-' });
        s.push(if self.0 & 0b010 != 0 { 'w' } else { '-' });
        s.push(if self.0 & 0b001 != 0 { 'x' } else { '-' });
        s
    }

    /// Parse the symbolic form
    pub fn parse_symbol(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return None;
        }
        let mut bits = 0u8;
        for (i, (&c, expected)) in bytes.iter().zip([b'r', b'w', b'x']).enumerate() {
            if c == expected {
                bits |= 0b100 >> i;
            } else if c != b'-' {
                return None;
            }
        }
        Some(FsAction(bits))
    }
}

/// A single ACL entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    /// Access or default scope
    pub scope: AclScope,
    /// Principal type
    pub entry_type: AclEntryType,
    /// Principal name; empty for the owning user/group entries
    pub name: String,
    /// Granted permissions
    pub perm: FsAction,
}

/// A single extended attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAttr {
    /// Namespace prefix
    pub namespace: XAttrNamespace,
    /// Attribute name without namespace prefix
    pub name: String,
    /// Attribute value; removals carry no value
    pub value: Option<Vec<u8>>,
}
