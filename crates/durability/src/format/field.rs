//! Binary field encoding
//!
//! All integers are big-endian. Variable-length values carry a `u32` length
//! (or element count) prefix.
//!
//! | Kind | Encoding |
//! |------|----------|
//! | Bool, Byte | 1 byte |
//! | Short / Int / Long | 2 / 4 / 8 bytes |
//! | Str, Bytes | `u32` length + bytes |
//! | StrList, Blocks, AclEntries, XAttrs | `u32` count + elements |
//! | Block | block id, num bytes, gen stamp (3 × i64) |
//! | Permissions | Str user, Str group, Short mode |
//! | AclEntry | Byte scope, Byte type, Str name, Byte perm |
//! | XAttr | Byte namespace, Str name, Bool has value, \[Bytes value\] |

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use editlog_core::{
    AclEntry, AclEntryType, AclScope, Block, FieldKind, FieldValue, FsAction, PermissionStatus,
    XAttr, XAttrNamespace,
};
use std::io::{self, Write};
use thiserror::Error;

/// Failure decoding a field from a checksummed record body
#[derive(Debug, Error)]
pub enum FieldDecodeError {
    /// Body ended before the field was complete
    #[error("record body ended inside a field")]
    UnexpectedEnd,

    /// Declared length or count cannot fit in the remaining body
    #[error("declared length {declared} exceeds remaining {remaining} bytes")]
    LengthOverflow {
        /// Declared length or element count
        declared: u32,
        /// Bytes left in the body
        remaining: usize,
    },

    /// String field is not UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// Enumerated byte outside its range
    #[error("invalid {what} code {code}")]
    InvalidCode {
        /// Which enumeration
        what: &'static str,
        /// Offending byte
        code: u8,
    },
}

impl From<io::Error> for FieldDecodeError {
    fn from(_: io::Error) -> Self {
        // Reads come from an in-memory slice; the only failure is running out.
        FieldDecodeError::UnexpectedEnd
    }
}

/// Append the binary encoding of `value` to `w`
pub fn write_field<W: Write>(w: &mut W, value: &FieldValue) -> io::Result<()> {
    match value {
        FieldValue::Bool(v) => w.write_u8(u8::from(*v)),
        FieldValue::Byte(v) => w.write_u8(*v),
        FieldValue::Short(v) => w.write_i16::<BigEndian>(*v),
        FieldValue::Int(v) => w.write_i32::<BigEndian>(*v),
        FieldValue::Long(v) => w.write_i64::<BigEndian>(*v),
        FieldValue::Str(s) => write_bytes(w, s.as_bytes()),
        FieldValue::Bytes(b) => write_bytes(w, b),
        FieldValue::StrList(items) => {
            write_count(w, items.len())?;
            for s in items {
                write_bytes(w, s.as_bytes())?;
            }
            Ok(())
        }
        FieldValue::Blocks(blocks) => {
            write_count(w, blocks.len())?;
            for b in blocks {
                w.write_i64::<BigEndian>(b.block_id)?;
                w.write_i64::<BigEndian>(b.num_bytes)?;
                w.write_i64::<BigEndian>(b.gen_stamp)?;
            }
            Ok(())
        }
        FieldValue::Permissions(p) => {
            write_bytes(w, p.user.as_bytes())?;
            write_bytes(w, p.group.as_bytes())?;
            w.write_i16::<BigEndian>(p.mode)
        }
        FieldValue::AclEntries(entries) => {
            write_count(w, entries.len())?;
            for e in entries {
                w.write_u8(e.scope.code())?;
                w.write_u8(e.entry_type.code())?;
                write_bytes(w, e.name.as_bytes())?;
                w.write_u8(e.perm.bits())?;
            }
            Ok(())
        }
        FieldValue::XAttrs(xattrs) => {
            write_count(w, xattrs.len())?;
            for x in xattrs {
                w.write_u8(x.namespace.code())?;
                write_bytes(w, x.name.as_bytes())?;
                match &x.value {
                    Some(v) => {
                        w.write_u8(1)?;
                        write_bytes(w, v)?;
                    }
                    None => w.write_u8(0)?,
                }
            }
            Ok(())
        }
    }
}

/// Decode one field of `kind` from the front of `body`, advancing it
pub fn read_field(body: &mut &[u8], kind: FieldKind) -> Result<FieldValue, FieldDecodeError> {
    let value = match kind {
        FieldKind::Bool => FieldValue::Bool(body.read_u8()? != 0),
        FieldKind::Byte => FieldValue::Byte(body.read_u8()?),
        FieldKind::Short => FieldValue::Short(body.read_i16::<BigEndian>()?),
        FieldKind::Int => FieldValue::Int(body.read_i32::<BigEndian>()?),
        FieldKind::Long => FieldValue::Long(body.read_i64::<BigEndian>()?),
        FieldKind::Str => FieldValue::Str(read_string(body)?),
        FieldKind::Bytes => FieldValue::Bytes(read_bytes(body)?),
        FieldKind::StrList => {
            let count = read_count(body, 4)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_string(body)?);
            }
            FieldValue::StrList(items)
        }
        FieldKind::Blocks => {
            let count = read_count(body, 24)?;
            let mut blocks = Vec::with_capacity(count);
            for _ in 0..count {
                blocks.push(Block {
                    block_id: body.read_i64::<BigEndian>()?,
                    num_bytes: body.read_i64::<BigEndian>()?,
                    gen_stamp: body.read_i64::<BigEndian>()?,
                });
            }
            FieldValue::Blocks(blocks)
        }
        FieldKind::Permissions => FieldValue::Permissions(PermissionStatus {
            user: read_string(body)?,
            group: read_string(body)?,
            mode: body.read_i16::<BigEndian>()?,
        }),
        FieldKind::AclEntries => {
            let count = read_count(body, 7)?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let scope = read_code(body, "ACL scope", AclScope::from_code)?;
                let entry_type = read_code(body, "ACL entry type", AclEntryType::from_code)?;
                let name = read_string(body)?;
                let perm = read_code(body, "ACL permission", FsAction::from_bits)?;
                entries.push(AclEntry {
                    scope,
                    entry_type,
                    name,
                    perm,
                });
            }
            FieldValue::AclEntries(entries)
        }
        FieldKind::XAttrs => {
            let count = read_count(body, 6)?;
            let mut xattrs = Vec::with_capacity(count);
            for _ in 0..count {
                let namespace = read_code(body, "xattr namespace", XAttrNamespace::from_code)?;
                let name = read_string(body)?;
                let value = match body.read_u8()? {
                    0 => None,
                    1 => Some(read_bytes(body)?),
                    code => {
                        return Err(FieldDecodeError::InvalidCode {
                            what: "xattr value marker",
                            code,
                        })
                    }
                };
                xattrs.push(XAttr {
                    namespace,
                    name,
                    value,
                });
            }
            FieldValue::XAttrs(xattrs)
        }
    };
    Ok(value)
}

fn write_count<W: Write>(w: &mut W, count: usize) -> io::Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "field too large"))?;
    w.write_u32::<BigEndian>(count)
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_count(w, bytes.len())?;
    w.write_all(bytes)
}

/// Read a count prefix, rejecting counts that cannot fit even at
/// `min_element_size` bytes per element.
fn read_count(body: &mut &[u8], min_element_size: usize) -> Result<usize, FieldDecodeError> {
    let declared = body.read_u32::<BigEndian>()?;
    let needed = (declared as usize).saturating_mul(min_element_size);
    if needed > body.len() {
        return Err(FieldDecodeError::LengthOverflow {
            declared,
            remaining: body.len(),
        });
    }
    Ok(declared as usize)
}

fn read_bytes(body: &mut &[u8]) -> Result<Vec<u8>, FieldDecodeError> {
    let len = read_count(body, 1)?;
    let (head, tail) = body.split_at(len);
    let bytes = head.to_vec();
    *body = tail;
    Ok(bytes)
}

fn read_string(body: &mut &[u8]) -> Result<String, FieldDecodeError> {
    String::from_utf8(read_bytes(body)?).map_err(|_| FieldDecodeError::InvalidUtf8)
}

fn read_code<T>(
    body: &mut &[u8],
    what: &'static str,
    decode: impl Fn(u8) -> Option<T>,
) -> Result<T, FieldDecodeError> {
    let code = body.read_u8()?;
    decode(code).ok_or(FieldDecodeError::InvalidCode { what, code })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &FieldValue) -> Vec<u8> {
        let mut buf = Vec::new();
        write_field(&mut buf, value).unwrap();
        buf
    }

    #[test]
    fn test_fixed_width_layout() {
        assert_eq!(encode(&FieldValue::Short(0x0102)), vec![0x01, 0x02]);
        assert_eq!(encode(&FieldValue::Int(-2)), vec![0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(encode(&FieldValue::Bool(true)), vec![1]);
        assert_eq!(encode(&FieldValue::Str("ab".into())), vec![0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn test_composite_decode_consumes_exactly() {
        let value = FieldValue::XAttrs(vec![
            XAttr {
                namespace: XAttrNamespace::User,
                name: "a1".into(),
                value: Some(vec![1, 2, 3]),
            },
            XAttr {
                namespace: XAttrNamespace::Trusted,
                name: "a2".into(),
                value: None,
            },
        ]);
        let bytes = encode(&value);
        let mut body = bytes.as_slice();
        assert_eq!(read_field(&mut body, FieldKind::XAttrs).unwrap(), value);
        assert!(body.is_empty());
    }

    #[test]
    fn test_short_body_is_unexpected_end() {
        let bytes = encode(&FieldValue::Long(99));
        let mut body = &bytes[..5];
        assert!(matches!(
            read_field(&mut body, FieldKind::Long),
            Err(FieldDecodeError::UnexpectedEnd)
        ));
    }

    #[test]
    fn test_oversized_count_rejected_before_allocation() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        let mut body = &bytes[..];
        assert!(matches!(
            read_field(&mut body, FieldKind::Blocks),
            Err(FieldDecodeError::LengthOverflow { .. })
        ));
    }

    #[test]
    fn test_invalid_enum_code() {
        let bytes = [0, 0, 0, 1, 9, 0, 0, 0, 0, 0, 7];
        let mut body = &bytes[..];
        assert!(matches!(
            read_field(&mut body, FieldKind::AclEntries),
            Err(FieldDecodeError::InvalidCode { what: "ACL scope", code: 9 })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0, 0, 0, 2, 0xC3, 0x28];
        let mut body = &bytes[..];
        assert!(matches!(
            read_field(&mut body, FieldKind::Str),
            Err(FieldDecodeError::InvalidUtf8)
        ));
    }
}
