//! Streaming reader for binary edit logs.
//!
//! The reader pulls one frame at a time from any `Read` source and yields
//! records lazily. It distinguishes the ways a stream can end:
//!
//! | Stream state | Result |
//! |--------------|--------|
//! | EOF at a record boundary | clean end |
//! | `0xFF` filler through EOF | clean end |
//! | `0xFF` followed by other bytes | `UnknownOpcode` |
//! | EOF inside the length prefix | `TruncatedStream` |
//! | bad length, short body, short or wrong CRC | `CorruptRecord` |
//! | CRC-valid body that does not fit the schema | `SchemaViolation` |
//!
//! After any error the reader is fused and yields nothing further.

use crate::format::{
    check_body_len, checksum, decode_body, EditLogHeader, CRC_SIZE, FILLER_BYTE,
    FRAME_PREFIX_SIZE, HEADER_SIZE,
};
use byteorder::{BigEndian, ByteOrder};
use editlog_core::{Error, LayoutVersion, OpRegistry, OperationRecord, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{debug, trace};

/// Lazy record decoder over a binary edit log.
pub struct BinaryEditsReader<'r, R> {
    /// Schemas used to decode record bodies
    registry: &'r OpRegistry,

    /// Byte source, positioned after the last consumed frame
    inner: R,

    /// Header decoded when the reader was opened
    header: EditLogHeader,

    /// Offset just past the last fully decoded record
    offset: u64,

    /// Records successfully decoded
    records_read: u64,

    /// Set after clean end or the first error
    finished: bool,
}

impl<'r> BinaryEditsReader<'r, BufReader<File>> {
    /// Open a binary edit log file.
    pub fn open(registry: &'r OpRegistry, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(registry, BufReader::new(file))
    }
}

impl<'r, R: Read> BinaryEditsReader<'r, R> {
    /// Read the stream header and prepare to decode records.
    ///
    /// Header problems (short stream, unsupported version, non-zero flags)
    /// are reported here and are never recoverable.
    pub fn new(registry: &'r OpRegistry, mut inner: R) -> Result<Self> {
        let header = EditLogHeader::read_from(&mut inner)?;
        debug!(
            layout_version = header.layout_version.get(),
            "Opened binary edit log"
        );
        Ok(BinaryEditsReader {
            registry,
            inner,
            header,
            offset: HEADER_SIZE as u64,
            records_read: 0,
            finished: false,
        })
    }

    /// Decoded stream header
    pub fn header(&self) -> &EditLogHeader {
        &self.header
    }

    /// Layout version declared by the stream
    pub fn layout_version(&self) -> LayoutVersion {
        self.header.layout_version
    }

    /// Offset just past the last fully decoded record.
    ///
    /// After an error this is the length of the valid prefix.
    pub fn valid_end(&self) -> u64 {
        self.offset
    }

    /// Number of records decoded so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Decode the next record, or `None` at a clean end of stream.
    pub fn read_record(&mut self) -> Result<Option<OperationRecord>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.decode_next();
        match &result {
            Ok(Some(_)) => self.records_read += 1,
            Ok(None) | Err(_) => self.finished = true,
        }
        result
    }

    fn decode_next(&mut self) -> Result<Option<OperationRecord>> {
        let start = self.offset;
        let version = self.header.layout_version;

        let mut tag = [0u8; 1];
        if read_up_to(&mut self.inner, &mut tag)? == 0 {
            debug!(offset = start, records = self.records_read, "End of edit log");
            return Ok(None);
        }
        let tag = tag[0];

        if tag == FILLER_BYTE {
            self.consume_filler(start)?;
            return Ok(None);
        }

        let schema = self
            .registry
            .lookup_at(tag, version)
            .ok_or_else(|| Error::UnknownOpcode {
                opcode: format!("{:#04x}", tag),
                offset: start,
            })?;

        let mut len_bytes = [0u8; 4];
        if read_up_to(&mut self.inner, &mut len_bytes)? < len_bytes.len() {
            return Err(Error::truncated(
                start,
                format!("stream ended inside length prefix of {}", schema.name()),
            ));
        }
        let body_len = check_body_len(BigEndian::read_i32(&len_bytes), start)?;

        let frame_len = FRAME_PREFIX_SIZE + body_len + CRC_SIZE;
        let mut frame = vec![0u8; frame_len];
        frame[0] = tag;
        frame[1..FRAME_PREFIX_SIZE].copy_from_slice(&len_bytes);
        let got = read_up_to(&mut self.inner, &mut frame[FRAME_PREFIX_SIZE..])?;
        if got < body_len + CRC_SIZE {
            return Err(Error::corrupt(
                start,
                format!(
                    "{} record cut short: expected {} bytes, found {}",
                    schema.name(),
                    body_len + CRC_SIZE,
                    got
                ),
            ));
        }

        let crc_at = FRAME_PREFIX_SIZE + body_len;
        let stored = BigEndian::read_u32(&frame[crc_at..]);
        let computed = checksum(&frame[..crc_at]);
        if stored != computed {
            return Err(Error::corrupt(
                start,
                format!(
                    "checksum mismatch in {}: stored {:#010x}, computed {:#010x}",
                    schema.name(),
                    stored,
                    computed
                ),
            ));
        }

        let record = decode_body(schema, version, &frame[FRAME_PREFIX_SIZE..crc_at])?;
        trace!(opcode = schema.name(), txid = record.txid(), offset = start, "Decoded record");
        self.offset = start + frame_len as u64;
        Ok(Some(record))
    }

    /// Drain trailing filler. Anything other than `0xFF` after the first
    /// filler byte means the sentinel sat in record position.
    fn consume_filler(&mut self, start: u64) -> Result<()> {
        let mut chunk = [0u8; 4096];
        let mut filler = 1u64;
        loop {
            let n = read_up_to(&mut self.inner, &mut chunk)?;
            if n == 0 {
                break;
            }
            if chunk[..n].iter().any(|b| *b != FILLER_BYTE) {
                return Err(Error::UnknownOpcode {
                    opcode: format!("{:#04x}", FILLER_BYTE),
                    offset: start,
                });
            }
            filler += n as u64;
        }
        debug!(offset = start, filler_bytes = filler, "Reached trailing filler");
        Ok(())
    }
}

impl<R: Read> Iterator for BinaryEditsReader<'_, R> {
    type Item = Result<OperationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Fill `buf` as far as the source allows, returning the bytes read.
///
/// Unlike `read_exact`, a short count at EOF is not an error; callers use
/// it to tell a clean boundary from a truncated frame.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
