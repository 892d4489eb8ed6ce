//! Core types for the offline edit log viewer
//!
//! This crate defines the foundational types shared by every codec:
//! - OpCode: closed set of edit log operation kinds
//! - LayoutVersion / LayoutFeature: format revisions and what they enable
//! - FieldKind / FieldValue: typed record fields
//! - OpSchema / OpRegistry: opcode → ordered field list
//! - OperationRecord: a single decoded operation
//! - Error: error taxonomy (recoverable vs structural)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format;
pub mod layout;
pub mod opcode;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use format::StreamFormat;
pub use layout::{LayoutFeature, LayoutVersion};
pub use opcode::{OpCode, OP_INVALID_TAG};
pub use record::OperationRecord;
pub use registry::{OpRegistry, OpRegistryBuilder};
pub use schema::{FieldSpec, OpSchema};
pub use value::{
    AclEntry, AclEntryType, AclScope, Block, FieldKind, FieldValue, FsAction, PermissionStatus,
    XAttr, XAttrNamespace,
};
