//! Streaming writer for binary edit logs.
//!
//! The writer stamps the current layout version, appends framed records and,
//! when asked, pads the finished stream with `0xFF` filler up to a target
//! length the way preallocated log segments look on disk.

use crate::format::{encode_record, EditLogHeader, FILLER_BYTE, HEADER_SIZE};
use editlog_core::{Error, LayoutVersion, OpRegistry, OperationRecord, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Binary edit log encoder.
pub struct BinaryEditsWriter<'r, W: Write> {
    /// Schemas used to validate records before encoding
    registry: &'r OpRegistry,

    /// Byte sink
    inner: W,

    /// Reused frame buffer
    buf: Vec<u8>,

    /// Total bytes written, header included
    bytes_written: u64,

    /// Records written
    records_written: u64,

    /// Pad the stream with filler up to this length on finish
    pad_to: Option<u64>,
}

impl<'r> BinaryEditsWriter<'r, BufWriter<File>> {
    /// Create (or truncate) a binary edit log file.
    pub fn create(registry: &'r OpRegistry, path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(registry, BufWriter::new(file))
    }
}

impl<'r, W: Write> BinaryEditsWriter<'r, W> {
    /// Write the stream header and prepare to append records.
    pub fn new(registry: &'r OpRegistry, mut inner: W) -> Result<Self> {
        inner.write_all(&EditLogHeader::current().to_bytes())?;
        Ok(BinaryEditsWriter {
            registry,
            inner,
            buf: Vec::new(),
            bytes_written: HEADER_SIZE as u64,
            records_written: 0,
            pad_to: None,
        })
    }

    /// Pad the finished stream with filler up to `len` bytes.
    ///
    /// No filler is written if the records already reach `len`.
    pub fn with_padding(mut self, len: u64) -> Self {
        self.pad_to = Some(len);
        self
    }

    /// Validate and append one record.
    pub fn write_record(&mut self, record: &OperationRecord) -> Result<()> {
        let schema = self
            .registry
            .schema(record.opcode())
            .filter(|s| s.exists_at(LayoutVersion::CURRENT))
            .ok_or_else(|| Error::UnknownOpcode {
                opcode: record.opcode().name().to_string(),
                offset: self.records_written,
            })?;
        schema.validate(record.fields())?;

        self.buf.clear();
        encode_record(record, &mut self.buf)?;
        self.inner.write_all(&self.buf)?;
        self.bytes_written += self.buf.len() as u64;
        self.records_written += 1;
        Ok(())
    }

    /// Bytes written so far, header included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Write any requested filler, flush, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if let Some(target) = self.pad_to {
            let filler = target.saturating_sub(self.bytes_written);
            let chunk = [FILLER_BYTE; 4096];
            let mut remaining = filler;
            while remaining > 0 {
                let n = remaining.min(chunk.len() as u64) as usize;
                self.inner.write_all(&chunk[..n])?;
                remaining -= n as u64;
            }
            self.bytes_written += filler;
        }
        self.inner.flush()?;
        debug!(
            records = self.records_written,
            bytes = self.bytes_written,
            "Finished binary edit log"
        );
        Ok(self.inner)
    }
}
