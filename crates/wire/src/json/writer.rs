//! Text edit log writer.

use super::encode::record_to_json;
use super::keys;
use editlog_core::{Error, LayoutVersion, OpRegistry, OperationRecord, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

const RECORD_INDENT: &str = "    ";

/// Streams a JSON edit log document.
///
/// The prelude is written on construction, each record as it arrives, and
/// the closing brackets in [`TextEditsWriter::finish`]. Output is
/// deterministic for identical input.
pub struct TextEditsWriter<'r, W: Write> {
    registry: &'r OpRegistry,
    inner: W,
    records_written: u64,
}

impl<'r> TextEditsWriter<'r, BufWriter<File>> {
    /// Create (or truncate) a text edit log file.
    pub fn create(registry: &'r OpRegistry, path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(registry, BufWriter::new(file))
    }
}

impl<'r, W: Write> TextEditsWriter<'r, W> {
    /// Write the document prelude, stamping the current layout version.
    pub fn new(registry: &'r OpRegistry, mut inner: W) -> Result<Self> {
        write!(
            inner,
            "{{\n  \"{}\": {},\n  \"{}\": [",
            keys::EDITS_VERSION,
            LayoutVersion::CURRENT.get(),
            keys::RECORDS
        )?;
        Ok(TextEditsWriter {
            registry,
            inner,
            records_written: 0,
        })
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

        let pretty = serde_json::to_string_pretty(&record_to_json(schema, record))?;
        if self.records_written > 0 {
            self.inner.write_all(b",")?;
        }
        for line in pretty.lines() {
            self.inner.write_all(b"\n")?;
            self.inner.write_all(RECORD_INDENT.as_bytes())?;
            self.inner.write_all(line.as_bytes())?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Close the document, flush, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.records_written > 0 {
            self.inner.write_all(b"\n  ]\n}\n")?;
        } else {
            self.inner.write_all(b"]\n}\n")?;
        }
        self.inner.flush()?;
        debug!(records = self.records_written, "Finished text edit log");
        Ok(self.inner)
    }
}
