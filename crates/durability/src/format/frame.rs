//! Edit log record framing.
//!
//! # Record Layout
//!
//! ```text
//! ┌───────────┬─────────────────┬──────────────┬──────────────────┬───────────┐
//! │ Opcode (1)│ Length (i32 BE) │ TxId (i64 BE)│ Fields (variable)│ CRC32 (4) │
//! └───────────┴─────────────────┴──────────────┴──────────────────┴───────────┘
//! ```
//!
//! `Length` counts the txid and field bytes. The CRC32 covers everything
//! from the opcode byte through the last field byte.
//!
//! After the final record a writer may pad the stream with `0xFF` filler
//! bytes; the first filler byte sits in opcode position and decodes as
//! `OP_INVALID`.

use super::field::{read_field, write_field, FieldDecodeError};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use editlog_core::{Error, LayoutVersion, OpSchema, OperationRecord, Result};

/// Bytes preceding the record body: opcode + length
pub const FRAME_PREFIX_SIZE: usize = 5;

/// Trailing checksum size
pub const CRC_SIZE: usize = 4;

/// Smallest legal body: just the txid
pub const MIN_BODY_LEN: i32 = 8;

/// Largest legal body
pub const MAX_OP_SIZE: i32 = 50 * 1024 * 1024;

/// Filler byte written after the last record
pub const FILLER_BYTE: u8 = 0xFF;

/// Encode `record` as a complete frame appended to `buf`.
///
/// Every schema field is written; the codec only writes the current layout.
pub fn encode_record(record: &OperationRecord, buf: &mut Vec<u8>) -> Result<()> {
    let start = buf.len();
    buf.push(record.opcode().tag());
    let len_pos = buf.len();
    buf.write_i32::<BigEndian>(0)?;
    buf.write_i64::<BigEndian>(record.txid())?;
    for value in record.fields() {
        write_field(buf, value)?;
    }

    let body_len = buf.len() - len_pos - 4;
    let body_len = i32::try_from(body_len)
        .ok()
        .filter(|len| *len <= MAX_OP_SIZE)
        .ok_or_else(|| {
            Error::schema(
                record.opcode().name(),
                format!("record of {} bytes exceeds maximum op size", body_len),
            )
        })?;
    BigEndian::write_i32(&mut buf[len_pos..len_pos + 4], body_len);

    let crc = checksum(&buf[start..]);
    buf.write_u32::<BigEndian>(crc)?;
    Ok(())
}

/// Validate a length prefix read at `offset`
pub fn check_body_len(len: i32, offset: u64) -> Result<usize> {
    if !(MIN_BODY_LEN..=MAX_OP_SIZE).contains(&len) {
        return Err(Error::corrupt(
            offset,
            format!("invalid record length {}", len),
        ));
    }
    Ok(len as usize)
}

/// CRC32 of a frame's opcode, length and body bytes
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Decode a checksummed body into a record.
///
/// Fields the schema declares but `version` lacks keep their default value.
/// A body that does not match the schema exactly is a schema violation; the
/// checksum already vouched for the bytes themselves.
pub fn decode_body(
    schema: &OpSchema,
    version: LayoutVersion,
    mut body: &[u8],
) -> Result<OperationRecord> {
    let txid = body
        .read_i64::<BigEndian>()
        .map_err(|_| Error::schema(schema.name(), "record body shorter than txid"))?;

    let mut fields = schema.default_fields();
    for (slot, spec) in schema.fields_at(version) {
        fields[slot] = read_field(&mut body, spec.kind).map_err(|e: FieldDecodeError| {
            Error::schema(schema.name(), format!("field {}: {}", spec.name, e))
        })?;
    }

    if !body.is_empty() {
        return Err(Error::schema(
            schema.name(),
            format!("{} unexpected trailing bytes", body.len()),
        ));
    }

    OperationRecord::new(schema, txid, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use editlog_core::{OpCode, OpRegistry};

    fn mkdir_frame() -> Vec<u8> {
        let registry = OpRegistry::standard();
        let schema = registry.schema(OpCode::Mkdir).unwrap();
        let record = registry
            .default_record(OpCode::Mkdir, 7)
            .unwrap()
            .with_field(schema, "PATH", "/tmp")
            .unwrap();
        let mut buf = Vec::new();
        encode_record(&record, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_frame_layout() {
        let frame = mkdir_frame();
        assert_eq!(frame[0], OpCode::Mkdir.tag());

        let len = BigEndian::read_i32(&frame[1..5]) as usize;
        assert_eq!(frame.len(), FRAME_PREFIX_SIZE + len + CRC_SIZE);
        assert_eq!(BigEndian::read_i64(&frame[5..13]), 7);

        let crc_at = frame.len() - CRC_SIZE;
        let stored = BigEndian::read_u32(&frame[crc_at..]);
        assert_eq!(stored, checksum(&frame[..crc_at]));
    }

    #[test]
    fn test_decode_body_round_trip() {
        let registry = OpRegistry::standard();
        let schema = registry.schema(OpCode::Mkdir).unwrap();
        let frame = mkdir_frame();
        let body = &frame[FRAME_PREFIX_SIZE..frame.len() - CRC_SIZE];

        let record = decode_body(schema, LayoutVersion::CURRENT, body).unwrap();
        assert_eq!(record.txid(), 7);
        assert_eq!(
            record.field(schema, "PATH").and_then(|v| v.as_str()),
            Some("/tmp")
        );
    }

    #[test]
    fn test_trailing_bytes_violate_schema() {
        let registry = OpRegistry::standard();
        let schema = registry.schema(OpCode::Mkdir).unwrap();
        let frame = mkdir_frame();
        let mut body = frame[FRAME_PREFIX_SIZE..frame.len() - CRC_SIZE].to_vec();
        body.push(0);

        assert!(matches!(
            decode_body(schema, LayoutVersion::CURRENT, &body),
            Err(Error::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_body_len_bounds() {
        assert!(check_body_len(8, 0).is_ok());
        assert!(matches!(
            check_body_len(7, 13),
            Err(Error::CorruptRecord { offset: 13, .. })
        ));
        assert!(check_body_len(MAX_OP_SIZE + 1, 0).is_err());
        assert!(check_body_len(-1, 0).is_err());
    }
}
