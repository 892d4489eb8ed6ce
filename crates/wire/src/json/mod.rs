//! JSON text format for edit logs
//!
//! A document is a single object:
//!
//! ```text
//! {
//!   "EDITS_VERSION": -66,
//!   "RECORDS": [
//!     { "OPCODE": "OP_MKDIR", "DATA": { "TXID": 2, "INODEID": 16386, ... } }
//!   ]
//! }
//! ```
//!
//! Key order is significant and preserved (`serde_json` with
//! `preserve_order`).

pub mod decode;
pub mod encode;
mod reader;
mod writer;

pub use decode::{json_to_field, json_to_record};
pub use encode::{field_to_json, record_to_json};
pub use reader::TextEditsReader;
pub use writer::TextEditsWriter;

/// Document and record keys
pub mod keys {
    /// Root key holding the layout version
    pub const EDITS_VERSION: &str = "EDITS_VERSION";
    /// Root key holding the record array
    pub const RECORDS: &str = "RECORDS";
    /// Record key holding the symbolic opcode
    pub const OPCODE: &str = "OPCODE";
    /// Record key holding the field object
    pub const DATA: &str = "DATA";
    /// First key of every field object
    pub const TXID: &str = "TXID";
}
